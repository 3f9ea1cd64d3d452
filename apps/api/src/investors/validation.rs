use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::investor::{
    parse_preferred_time, InvestorProfile, DEFAULT_MAX_INVESTMENT, DEFAULT_MIN_INVESTMENT,
};

/// Body of `POST /api/v1/investors`. Everything is optional at the wire level so
/// missing fields surface as validation errors rather than extractor rejections.
#[derive(Debug, Default, Deserialize)]
pub struct SaveInvestorRequest {
    pub investor_id: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    #[serde(default)]
    pub preferred_industries: Vec<String>,
    #[serde(default)]
    pub preferred_funding_stages: Vec<String>,
    pub min_investment: Option<f64>,
    pub max_investment: Option<f64>,
    pub daily_recommendations: Option<bool>,
    pub preferred_time: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl SaveInvestorRequest {
    /// Validates and normalizes the request. No store access happens here.
    pub fn into_profile(self, now: DateTime<Utc>) -> Result<InvestorProfile, AppError> {
        let investor_id = non_blank(self.investor_id);
        let email = non_blank(self.email);
        let (Some(investor_id), Some(email)) = (investor_id, email) else {
            return Err(AppError::Validation(
                "investor_id and email are required".to_string(),
            ));
        };

        if !looks_like_email(&email) {
            return Err(AppError::Validation(format!(
                "email '{email}' is not a valid address"
            )));
        }

        let min_investment = self.min_investment.unwrap_or(DEFAULT_MIN_INVESTMENT);
        let max_investment = self.max_investment.unwrap_or(DEFAULT_MAX_INVESTMENT);
        if min_investment < 0.0 || max_investment < 0.0 {
            return Err(AppError::Validation(
                "investment bounds must not be negative".to_string(),
            ));
        }
        if min_investment > max_investment {
            return Err(AppError::Validation(
                "min_investment must not exceed max_investment".to_string(),
            ));
        }

        let preferred_time = match non_blank(self.preferred_time) {
            Some(raw) => Some(parse_preferred_time(&raw).ok_or_else(|| {
                AppError::Validation(format!("preferred_time '{raw}' must be HH:MM"))
            })?),
            None => None,
        };

        let daily_recommendations = self.daily_recommendations.unwrap_or(false);
        if daily_recommendations && preferred_time.is_none() {
            return Err(AppError::Validation(
                "preferred_time is required when daily_recommendations is enabled".to_string(),
            ));
        }

        Ok(InvestorProfile {
            name: non_blank(self.name).unwrap_or_else(|| email.clone()),
            investor_id,
            email,
            preferred_industries: normalize_list(self.preferred_industries),
            preferred_funding_stages: normalize_list(self.preferred_funding_stages),
            min_investment,
            max_investment,
            daily_recommendations,
            preferred_time,
            created_at: self.created_at.or(Some(now)),
            updated_at: self.updated_at.or(Some(now)),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.contains('@'),
        None => false,
    }
}

/// Trims entries, drops blanks, and removes duplicates keeping first occurrence.
fn normalize_list(values: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(values.len());
    for value in values {
        let value = value.trim().to_string();
        if !value.is_empty() && !out.contains(&value) {
            out.push(value);
        }
    }
    out
}
