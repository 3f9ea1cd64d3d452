use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

pub const DEFAULT_MIN_INVESTMENT: f64 = 0.0;
pub const DEFAULT_MAX_INVESTMENT: f64 = 10_000_000_000.0;

/// Persisted projection of a match, stored on the investor record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRecommendation {
    pub startup_id: String,
    pub name: String,
    pub industry: String,
    pub funding_stage: String,
    pub match_score: u32,
}

/// Raw `investors` row as stored.
#[derive(Debug, Clone, FromRow)]
pub struct InvestorRow {
    pub investor_id: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub preferred_industries: Vec<String>,
    pub preferred_funding_stages: Vec<String>,
    pub min_investment: Option<f64>,
    pub max_investment: Option<f64>,
    pub recommendations: Json<Vec<StoredRecommendation>>,
    pub last_matched: Option<DateTime<Utc>>,
    pub daily_recommendations: bool,
    pub preferred_time: Option<String>,
    pub last_recommendation_sent: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// An investor profile, parsed and normalized at the store boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Investor {
    pub investor_id: String,
    /// Notification address. Empty when the stored record has none.
    pub email: String,
    pub name: String,
    pub preferred_industries: Vec<String>,
    pub preferred_funding_stages: Vec<String>,
    pub min_investment: f64,
    pub max_investment: f64,
    pub recommendations: Vec<StoredRecommendation>,
    pub last_matched: Option<DateTime<Utc>>,
    pub daily_recommendations: bool,
    pub preferred_time: Option<NaiveTime>,
    pub last_recommendation_sent: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<InvestorRow> for Investor {
    fn from(row: InvestorRow) -> Self {
        let email = row.email.map(|e| e.trim().to_string()).unwrap_or_default();
        let name = row
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| {
                if email.is_empty() {
                    row.investor_id.clone()
                } else {
                    email.clone()
                }
            });

        Investor {
            investor_id: row.investor_id,
            email,
            name,
            preferred_industries: drop_blank(row.preferred_industries),
            preferred_funding_stages: drop_blank(row.preferred_funding_stages),
            min_investment: row.min_investment.unwrap_or(DEFAULT_MIN_INVESTMENT),
            max_investment: row.max_investment.unwrap_or(DEFAULT_MAX_INVESTMENT),
            recommendations: row.recommendations.0,
            last_matched: row.last_matched,
            daily_recommendations: row.daily_recommendations,
            preferred_time: row.preferred_time.as_deref().and_then(parse_preferred_time),
            last_recommendation_sent: row.last_recommendation_sent,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Validated profile fields written by the save-investor endpoint.
/// Recommendations and matching timestamps are owned by the matching run and never set here.
#[derive(Debug, Clone, PartialEq)]
pub struct InvestorProfile {
    pub investor_id: String,
    pub email: String,
    pub name: String,
    pub preferred_industries: Vec<String>,
    pub preferred_funding_stages: Vec<String>,
    pub min_investment: f64,
    pub max_investment: f64,
    pub daily_recommendations: bool,
    pub preferred_time: Option<NaiveTime>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Accepts `HH:MM` or `HH:MM:SS`.
pub fn parse_preferred_time(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .ok()
}

pub fn drop_blank(values: Vec<String>) -> Vec<String> {
    values.into_iter().filter(|v| !v.trim().is_empty()).collect()
}
