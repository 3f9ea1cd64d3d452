//! Run Guard: one writer per investor.
//!
//! Locks are keyed on `investor_id` after the scope is resolved, so a run
//! requested by email and a full run contend for the same keys.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::matching::run::MatchScope;

#[async_trait]
pub trait RunGuard: Send + Sync {
    /// Claims `key` for `run_id`. Returns `false` when another run holds it.
    async fn acquire(&self, key: &str, run_id: Uuid) -> Result<bool, AppError>;

    /// Releases `key` if `run_id` still holds it.
    async fn release(&self, key: &str, run_id: Uuid) -> Result<(), AppError>;
}

/// Held by a full run so two of them never overlap.
pub const FULL_RUN_KEY: &str = "matching:all";

/// Lock key for one investor. Every run that writes an investor holds this key,
/// whatever scope it was requested with.
pub fn investor_key(investor_id: &str) -> String {
    format!("matching:investor:{investor_id}")
}

/// Locks claimed by one run. Hand it back to `finish_run`.
#[derive(Debug, Clone, Serialize)]
pub struct RunTicket {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    /// Investors this run owns, in claim order.
    pub investor_ids: Vec<String>,
    /// Investors a full run left alone because another run holds them.
    pub busy: Vec<String>,
    #[serde(skip)]
    keys: Vec<String>,
}

impl RunTicket {
    pub fn owns(&self, investor_id: &str) -> bool {
        self.investor_ids.iter().any(|id| id == investor_id)
    }
}

fn duplicate_run() -> AppError {
    AppError::DuplicateRun(
        "A matching run is already in progress. Please wait a moment and try again.".to_string(),
    )
}

/// Claims the per-investor locks for a run over `investor_ids`.
///
/// A full run (`MatchScope::All`) first takes `FULL_RUN_KEY`, then claims every
/// free investor and records the busy ones in `RunTicket::busy`. A targeted run
/// is all-or-nothing: one busy investor rejects it with `DuplicateRun` and the
/// locks already taken are released.
pub async fn begin_run(
    guard: &dyn RunGuard,
    scope: &MatchScope,
    investor_ids: &[String],
    now: DateTime<Utc>,
) -> Result<RunTicket, AppError> {
    let full = matches!(scope, MatchScope::All);
    let mut ticket = RunTicket {
        run_id: Uuid::new_v4(),
        started_at: now,
        investor_ids: Vec::new(),
        busy: Vec::new(),
        keys: Vec::new(),
    };

    if full {
        if !guard.acquire(FULL_RUN_KEY, ticket.run_id).await? {
            warn!(key = FULL_RUN_KEY, "full matching run already in progress");
            return Err(duplicate_run());
        }
        ticket.keys.push(FULL_RUN_KEY.to_string());
    }

    let mut seen = HashSet::new();
    for investor_id in investor_ids {
        if !seen.insert(investor_id.as_str()) {
            continue;
        }

        let key = investor_key(investor_id);
        let claimed = match guard.acquire(&key, ticket.run_id).await {
            Ok(claimed) => claimed,
            Err(e) => {
                finish_run(guard, &ticket).await;
                return Err(e);
            }
        };

        if claimed {
            ticket.keys.push(key);
            ticket.investor_ids.push(investor_id.clone());
        } else if full {
            debug!(%investor_id, "investor has a run in flight; leaving it out");
            ticket.busy.push(investor_id.clone());
        } else {
            warn!(%investor_id, "matching run already in progress for investor");
            finish_run(guard, &ticket).await;
            return Err(duplicate_run());
        }
    }

    debug!(
        run_id = %ticket.run_id,
        claimed = ticket.investor_ids.len(),
        busy = ticket.busy.len(),
        "matching run started"
    );
    Ok(ticket)
}

/// Releases every lock on the ticket. A failed release only delays the next run
/// until the lock expires.
pub async fn finish_run(guard: &dyn RunGuard, ticket: &RunTicket) {
    for key in &ticket.keys {
        if let Err(e) = guard.release(key, ticket.run_id).await {
            warn!(%key, run_id = %ticket.run_id, error = %e, "failed to release run lock");
        }
    }
}
