use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use serde::Serialize;
use tracing::info;

use crate::errors::AppError;
use crate::investors::validation::SaveInvestorRequest;
use crate::models::investor::Investor;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SaveInvestorResponse {
    pub message: String,
    pub investor_id: String,
}

/// POST /api/v1/investors
pub async fn handle_save_investor(
    State(state): State<AppState>,
    Json(req): Json<SaveInvestorRequest>,
) -> Result<Json<SaveInvestorResponse>, AppError> {
    let profile = req.into_profile(Utc::now())?;
    state.store.upsert_investor(&profile).await?;

    info!(investor_id = %profile.investor_id, "saved investor profile");
    Ok(Json(SaveInvestorResponse {
        message: "Investor profile saved successfully".to_string(),
        investor_id: profile.investor_id,
    }))
}

/// GET /api/v1/investors/:id
pub async fn handle_get_investor(
    State(state): State<AppState>,
    Path(investor_id): Path<String>,
) -> Result<Json<Investor>, AppError> {
    let investor = state
        .store
        .get_investor(&investor_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Investor {investor_id} not found")))?;
    Ok(Json(investor))
}
