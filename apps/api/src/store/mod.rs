//! Profile Store: startups and investors.
//!
//! `AppState` holds an `Arc<dyn ProfileStore>`. Production uses `PgProfileStore`;
//! tests use the in-memory store.

pub mod postgres;

#[cfg(test)]
pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::errors::AppError;
use crate::models::investor::{Investor, InvestorProfile, StoredRecommendation};
use crate::models::startup::Startup;

/// Filter for listing startups. `industry` is an exact match.
#[derive(Debug, Clone, Default)]
pub struct StartupFilter {
    pub industry: Option<String>,
    pub limit: Option<u32>,
}

impl StartupFilter {
    /// Every startup, no limit.
    pub fn all() -> Self {
        Self::default()
    }
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn list_startups(&self, filter: &StartupFilter) -> Result<Vec<Startup>, AppError>;

    async fn get_startup(&self, startup_id: &str) -> Result<Option<Startup>, AppError>;

    async fn list_investors(&self) -> Result<Vec<Investor>, AppError>;

    async fn get_investor(&self, investor_id: &str) -> Result<Option<Investor>, AppError>;

    /// Creates or replaces the profile fields of an investor.
    /// Stored recommendations and matching timestamps are left untouched.
    async fn upsert_investor(&self, profile: &InvestorProfile) -> Result<(), AppError>;

    /// Replaces `recommendations` and sets `last_matched` in a single update.
    async fn write_recommendations(
        &self,
        investor_id: &str,
        recommendations: &[StoredRecommendation],
        matched_at: DateTime<Utc>,
    ) -> Result<(), AppError>;

    /// Investors that opted into the daily digest.
    async fn list_digest_subscribers(&self) -> Result<Vec<Investor>, AppError>;

    async fn mark_recommendation_sent(
        &self,
        investor_id: &str,
        sent_at: DateTime<Utc>,
    ) -> Result<(), AppError>;
}
