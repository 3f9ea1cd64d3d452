use axum::{extract::State, Json};
use chrono::Utc;

use crate::digest::batch::{run_digest_batch, DigestBatchStats};
use crate::errors::AppError;
use crate::state::AppState;

/// POST /api/v1/digest/run
///
/// Runs one digest pass now, the same pass the hourly scheduler performs.
pub async fn handle_run_digest(
    State(state): State<AppState>,
) -> Result<Json<DigestBatchStats>, AppError> {
    let stats = run_digest_batch(
        state.run_guard.as_ref(),
        state.store.as_ref(),
        state.notifier.as_ref(),
        &state.config.dashboard_url,
        Utc::now(),
    )
    .await?;
    Ok(Json(stats))
}
