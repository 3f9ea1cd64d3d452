use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Raw `startups` row. Every attribute except the key may be missing.
#[derive(Debug, Clone, FromRow)]
pub struct StartupRow {
    pub startup_id: String,
    pub name: Option<String>,
    pub industry: Option<String>,
    pub funding_stage: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub funding_amount: Option<f64>,
    pub founded_year: Option<i32>,
    pub team_size: Option<i32>,
}

/// A startup listed on the marketplace. Read-only for matching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Startup {
    pub startup_id: String,
    pub name: String,
    pub industry: String,
    pub funding_stage: String,
    pub description: String,
    pub location: String,
    pub website: String,
    pub funding_amount: Option<f64>,
    pub founded_year: Option<i32>,
    pub team_size: Option<i32>,
}

impl From<StartupRow> for Startup {
    fn from(row: StartupRow) -> Self {
        Startup {
            startup_id: row.startup_id,
            name: row
                .name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| "Unknown".to_string()),
            industry: row.industry.unwrap_or_default(),
            funding_stage: row.funding_stage.unwrap_or_default(),
            description: row.description.unwrap_or_default(),
            location: row.location.unwrap_or_default(),
            website: row.website.unwrap_or_default(),
            funding_amount: row.funding_amount,
            founded_year: row.founded_year,
            team_size: row.team_size,
        }
    }
}
