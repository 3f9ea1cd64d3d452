use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::models::startup::Startup;
use crate::state::AppState;
use crate::store::StartupFilter;

const DEFAULT_LIMIT: u32 = 25;
const MAX_LIMIT: u32 = 100;

#[derive(Debug, Deserialize)]
pub struct StartupListQuery {
    pub industry: Option<String>,
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct StartupListResponse {
    pub startups: Vec<Startup>,
    pub count: usize,
}

#[derive(Debug, Deserialize)]
pub struct ContactRequest {
    pub investor_id: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ContactResponse {
    pub message: String,
    pub startup_id: String,
}

/// GET /api/v1/startups?industry=&limit=
pub async fn handle_list_startups(
    State(state): State<AppState>,
    Query(params): Query<StartupListQuery>,
) -> Result<Json<StartupListResponse>, AppError> {
    let filter = list_filter(params)?;
    let startups = state.store.list_startups(&filter).await?;
    Ok(Json(StartupListResponse {
        count: startups.len(),
        startups,
    }))
}

/// GET /api/v1/startups/:id
pub async fn handle_get_startup(
    State(state): State<AppState>,
    Path(startup_id): Path<String>,
) -> Result<Json<Startup>, AppError> {
    let startup = state
        .store
        .get_startup(&startup_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Startup not found".to_string()))?;
    Ok(Json(startup))
}

/// POST /api/v1/startups/:id/contact
///
/// Acknowledges a contact request. Nothing is forwarded yet.
pub async fn handle_contact_startup(
    State(state): State<AppState>,
    Path(startup_id): Path<String>,
    Json(req): Json<ContactRequest>,
) -> Result<Json<ContactResponse>, AppError> {
    if req.message.as_deref().is_some_and(|m| m.trim().is_empty()) {
        return Err(AppError::Validation("message cannot be empty".to_string()));
    }
    if state.store.get_startup(&startup_id).await?.is_none() {
        return Err(AppError::NotFound("Startup not found".to_string()));
    }

    info!(%startup_id, investor_id = ?req.investor_id, "contact request received");
    Ok(Json(ContactResponse {
        message: "Contact request sent".to_string(),
        startup_id,
    }))
}

fn list_filter(params: StartupListQuery) -> Result<StartupFilter, AppError> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT);
    if limit == 0 || limit > MAX_LIMIT {
        return Err(AppError::Validation(format!(
            "limit must be between 1 and {MAX_LIMIT}"
        )));
    }
    Ok(StartupFilter {
        industry: params.industry.filter(|i| !i.trim().is_empty()),
        limit: Some(limit),
    })
}
