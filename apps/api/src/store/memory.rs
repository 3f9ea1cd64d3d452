use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::errors::AppError;
use crate::models::investor::{Investor, InvestorProfile, StoredRecommendation};
use crate::models::startup::Startup;
use crate::store::{ProfileStore, StartupFilter};

/// In-memory store with failure injection for tests.
#[derive(Default)]
pub struct InMemoryProfileStore {
    startups: Mutex<Vec<Startup>>,
    investors: Mutex<Vec<Investor>>,
    failing_writes: Mutex<HashSet<String>>,
    fail_startup_scan: Mutex<bool>,
    writes: Mutex<Vec<String>>,
}

impl InMemoryProfileStore {
    pub fn new(startups: Vec<Startup>, investors: Vec<Investor>) -> Self {
        Self {
            startups: Mutex::new(startups),
            investors: Mutex::new(investors),
            ..Default::default()
        }
    }

    pub fn fail_writes_for(&self, investor_id: &str) {
        self.failing_writes
            .lock()
            .unwrap()
            .insert(investor_id.to_string());
    }

    pub fn fail_startup_scan(&self) {
        *self.fail_startup_scan.lock().unwrap() = true;
    }

    pub fn investor(&self, investor_id: &str) -> Investor {
        self.investors
            .lock()
            .unwrap()
            .iter()
            .find(|i| i.investor_id == investor_id)
            .cloned()
            .expect("investor present in fixture")
    }

    /// Investor ids in the order their recommendations were written.
    pub fn writes(&self) -> Vec<String> {
        self.writes.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn list_startups(&self, filter: &StartupFilter) -> Result<Vec<Startup>, AppError> {
        if *self.fail_startup_scan.lock().unwrap() {
            return Err(AppError::Dependency("startup table unavailable".to_string()));
        }
        let startups = self.startups.lock().unwrap();
        let limit = filter.limit.map(|l| l as usize).unwrap_or(usize::MAX);
        Ok(startups
            .iter()
            .filter(|s| {
                filter
                    .industry
                    .as_deref()
                    .map_or(true, |industry| s.industry == industry)
            })
            .take(limit)
            .cloned()
            .collect())
    }

    async fn get_startup(&self, startup_id: &str) -> Result<Option<Startup>, AppError> {
        Ok(self
            .startups
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.startup_id == startup_id)
            .cloned())
    }

    async fn list_investors(&self) -> Result<Vec<Investor>, AppError> {
        Ok(self.investors.lock().unwrap().clone())
    }

    async fn get_investor(&self, investor_id: &str) -> Result<Option<Investor>, AppError> {
        Ok(self
            .investors
            .lock()
            .unwrap()
            .iter()
            .find(|i| i.investor_id == investor_id)
            .cloned())
    }

    async fn upsert_investor(&self, profile: &InvestorProfile) -> Result<(), AppError> {
        let mut investors = self.investors.lock().unwrap();
        let existing = investors
            .iter()
            .position(|i| i.investor_id == profile.investor_id);

        let (recommendations, last_matched, last_sent, created_at) = existing
            .map(|idx| {
                let i = &investors[idx];
                (
                    i.recommendations.clone(),
                    i.last_matched,
                    i.last_recommendation_sent,
                    i.created_at,
                )
            })
            .unwrap_or((vec![], None, None, None));

        let investor = Investor {
            investor_id: profile.investor_id.clone(),
            email: profile.email.clone(),
            name: profile.name.clone(),
            preferred_industries: profile.preferred_industries.clone(),
            preferred_funding_stages: profile.preferred_funding_stages.clone(),
            min_investment: profile.min_investment,
            max_investment: profile.max_investment,
            recommendations,
            last_matched,
            daily_recommendations: profile.daily_recommendations,
            preferred_time: profile.preferred_time,
            last_recommendation_sent: last_sent,
            created_at: created_at.or(profile.created_at),
            updated_at: profile.updated_at,
        };

        match existing {
            Some(idx) => investors[idx] = investor,
            None => investors.push(investor),
        }
        Ok(())
    }

    async fn write_recommendations(
        &self,
        investor_id: &str,
        recommendations: &[StoredRecommendation],
        matched_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        if self.failing_writes.lock().unwrap().contains(investor_id) {
            return Err(AppError::Dependency("investor table unavailable".to_string()));
        }
        let mut investors = self.investors.lock().unwrap();
        let investor = investors
            .iter_mut()
            .find(|i| i.investor_id == investor_id)
            .ok_or_else(|| AppError::NotFound(format!("Investor {investor_id} not found")))?;
        investor.recommendations = recommendations.to_vec();
        investor.last_matched = Some(matched_at);
        self.writes.lock().unwrap().push(investor_id.to_string());
        Ok(())
    }

    async fn list_digest_subscribers(&self) -> Result<Vec<Investor>, AppError> {
        Ok(self
            .investors
            .lock()
            .unwrap()
            .iter()
            .filter(|i| i.daily_recommendations)
            .cloned()
            .collect())
    }

    async fn mark_recommendation_sent(
        &self,
        investor_id: &str,
        sent_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let mut investors = self.investors.lock().unwrap();
        let investor = investors
            .iter_mut()
            .find(|i| i.investor_id == investor_id)
            .ok_or_else(|| AppError::NotFound(format!("Investor {investor_id} not found")))?;
        investor.last_recommendation_sent = Some(sent_at);
        Ok(())
    }
}
