//! Fixture builders shared by unit tests.

use crate::models::investor::{Investor, DEFAULT_MAX_INVESTMENT, DEFAULT_MIN_INVESTMENT};
use crate::models::startup::Startup;

pub fn startup(id: &str, industry: &str, funding_stage: &str) -> Startup {
    Startup {
        startup_id: id.to_string(),
        name: format!("Startup {id}"),
        industry: industry.to_string(),
        funding_stage: funding_stage.to_string(),
        description: format!("{id} builds things for the {industry} market."),
        location: "Barcelona".to_string(),
        website: format!("https://{id}.example.com"),
        funding_amount: Some(250_000.0),
        founded_year: Some(2021),
        team_size: Some(8),
    }
}

pub fn investor(id: &str, industries: &[&str], stages: &[&str]) -> Investor {
    Investor {
        investor_id: id.to_string(),
        email: format!("{id}@example.com"),
        name: format!("Investor {id}"),
        preferred_industries: industries.iter().map(|s| s.to_string()).collect(),
        preferred_funding_stages: stages.iter().map(|s| s.to_string()).collect(),
        min_investment: DEFAULT_MIN_INVESTMENT,
        max_investment: DEFAULT_MAX_INVESTMENT,
        recommendations: vec![],
        last_matched: None,
        daily_recommendations: false,
        preferred_time: None,
        last_recommendation_sent: None,
        created_at: None,
        updated_at: None,
    }
}
