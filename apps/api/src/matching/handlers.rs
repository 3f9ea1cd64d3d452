//! Axum route handlers for the Matching API.

use axum::{body::Bytes, extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::matching::run::{
    claim_investors, run_claimed, run_guarded, MatchRunSummary, MatchScope,
};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct RunMatchingRequest {
    pub investor_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TriggerMatchingRequest {
    pub investor_id: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TriggerMatchingResponse {
    pub message: String,
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/matching/run
///
/// Runs matching synchronously for one investor (`investor_id`, also accepted as an
/// email address) or for everyone when the body is empty. The body is parsed as JSON
/// whatever its content type; a body that does not parse is a 400, never a full run.
pub async fn handle_run_matching(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<MatchRunSummary>, AppError> {
    let request = parse_run_request(&body)?;
    let scope = MatchScope::from_request(request.investor_id);
    info!(?scope, "matching requested");

    let summary = run_guarded(
        state.run_guard.as_ref(),
        state.store.as_ref(),
        state.notifier.as_ref(),
        &state.config.dashboard_url,
        &scope,
        Utc::now(),
    )
    .await?;

    Ok(Json(summary))
}

/// POST /api/v1/matching/trigger
///
/// Starts a background matching run for one investor and returns immediately.
/// `email` must be the address on the investor's profile.
/// Rejected with 409 while any run holds the investor.
pub async fn handle_trigger_matching(
    State(state): State<AppState>,
    Json(request): Json<TriggerMatchingRequest>,
) -> Result<Json<TriggerMatchingResponse>, AppError> {
    let investor_id = required(request.investor_id, "investor_id")?;
    let email = required(request.email, "email")?;

    let investor = state
        .store
        .get_investor(&investor_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Investor {investor_id} not found")))?;
    if !investor.email.eq_ignore_ascii_case(&email) {
        warn!(%investor_id, "trigger email does not match investor profile");
        return Err(AppError::Validation(
            "email does not match the investor profile".to_string(),
        ));
    }

    let scope = MatchScope::Investor(investor_id.clone());
    let investors = vec![investor];
    let ticket =
        claim_investors(state.run_guard.as_ref(), &scope, &investors, Utc::now()).await?;
    info!(%investor_id, run_id = %ticket.run_id, "starting background matching run");

    let response = TriggerMatchingResponse {
        message: "Matching process started successfully".to_string(),
        run_id: ticket.run_id,
        started_at: ticket.started_at,
    };

    tokio::spawn(async move {
        let run_id = ticket.run_id;
        let result = run_claimed(
            state.run_guard.as_ref(),
            state.store.as_ref(),
            state.notifier.as_ref(),
            &state.config.dashboard_url,
            investors,
            ticket,
        )
        .await;
        if let Err(e) = result {
            error!(%run_id, error = %e, "background matching run failed");
        }
    });

    Ok(Json(response))
}

fn parse_run_request(body: &[u8]) -> Result<RunMatchingRequest, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(RunMatchingRequest::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| AppError::Validation(format!("Invalid request body: {e}")))
}

fn required(value: Option<String>, field: &str) -> Result<String, AppError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::Validation(format!("Missing required field: {field}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_body_runs_everyone() {
        assert!(parse_run_request(b"").unwrap().investor_id.is_none());
        assert!(parse_run_request(b" \n").unwrap().investor_id.is_none());
        assert!(parse_run_request(b"{}").unwrap().investor_id.is_none());
    }

    #[test]
    fn test_malformed_body_is_rejected() {
        for body in [&br#"{"investor_id": 42}"#[..], &b"not json"[..], &b"null"[..]] {
            let err = parse_run_request(body).unwrap_err();
            assert!(matches!(err, AppError::Validation(_)));
        }
    }

    #[test]
    fn test_body_parses_without_content_type() {
        let request = parse_run_request(br#"{"investor_id":"inv-1"}"#).unwrap();
        assert_eq!(request.investor_id.as_deref(), Some("inv-1"));
    }
}
