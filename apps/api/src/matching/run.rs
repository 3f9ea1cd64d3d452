//! Matching run: load profiles, compute matches, write back, notify.
//!
//! Investors are processed one after another, so each investor's write-back is
//! serialized. A failure for one investor is counted in `RunStats` and never
//! stops the others. Re-running overwrites the same records.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::errors::AppError;
use crate::matching::dispatcher::{dispatch, DispatchOutcome};
use crate::matching::engine::{compute_matches, Match};
use crate::matching::guard::{begin_run, finish_run, RunGuard, RunTicket};
use crate::matching::writer::write_back;
use crate::models::investor::Investor;
use crate::notify::email::TOP_MATCHES;
use crate::notify::Notifier;
use crate::store::{ProfileStore, StartupFilter};

/// Which investors a run covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchScope {
    All,
    /// Matches on `investor_id` or on `email`.
    Investor(String),
}

impl MatchScope {
    pub fn from_request(investor_id: Option<String>) -> Self {
        match investor_id.filter(|id| !id.trim().is_empty()) {
            Some(id) => MatchScope::Investor(id.trim().to_string()),
            None => MatchScope::All,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    pub written: usize,
    pub write_failures: usize,
    pub cleared: usize,
    pub notified: usize,
    pub notify_skipped: usize,
    pub notify_failures: usize,
    /// Investors a full run left out because another run held them.
    pub in_flight: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct InvestorMatchSummary {
    pub investor_id: String,
    pub investor_email: String,
    pub match_count: usize,
    pub top_matches: Vec<Match>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchRunSummary {
    pub message: String,
    /// Matches across investors that have an email address.
    pub total_matches: usize,
    pub investors_processed: usize,
    pub matches_summary: Vec<InvestorMatchSummary>,
    pub stats: RunStats,
}

impl MatchRunSummary {
    fn empty(message: &str) -> Self {
        MatchRunSummary {
            message: message.to_string(),
            total_matches: 0,
            investors_processed: 0,
            matches_summary: vec![],
            stats: RunStats::default(),
        }
    }
}

/// Matches, writes back and notifies `investors` without taking any lock.
/// Callers own the investors' run locks.
pub async fn match_investors(
    store: &dyn ProfileStore,
    notifier: &dyn Notifier,
    dashboard_url: &str,
    investors: &[Investor],
    now: DateTime<Utc>,
) -> Result<MatchRunSummary, AppError> {
    if investors.is_empty() {
        info!("no investors found; nothing to match");
        return Ok(MatchRunSummary::empty("No investors found"));
    }

    let startups = store.list_startups(&StartupFilter::all()).await?;
    info!(
        investors = investors.len(),
        startups = startups.len(),
        "processing matching run"
    );

    let mut outcomes = compute_matches(investors, &startups);
    let mut stats = RunStats::default();
    let mut total_matches = 0;
    let mut matches_summary = Vec::new();

    for investor in investors {
        let Some(outcome) = outcomes.remove(&investor.investor_id) else {
            // duplicate id in the scan; the first occurrence already consumed it
            continue;
        };

        match write_back(
            store,
            &investor.investor_id,
            &outcome.matches,
            outcome.clear,
            now,
        )
        .await
        {
            Ok(()) if outcome.clear => stats.cleared += 1,
            Ok(()) => stats.written += 1,
            Err(_) => stats.write_failures += 1,
        }

        if outcome.clear {
            continue;
        }

        match dispatch(notifier, investor, &outcome.matches, dashboard_url).await {
            DispatchOutcome::Sent { .. } => stats.notified += 1,
            DispatchOutcome::Failed { .. } => stats.notify_failures += 1,
            DispatchOutcome::SkippedNoMatches | DispatchOutcome::SkippedNoEmail => {
                stats.notify_skipped += 1
            }
        }

        if !outcome.matches.is_empty() && !investor.email.trim().is_empty() {
            total_matches += outcome.matches.len();
            matches_summary.push(InvestorMatchSummary {
                investor_id: investor.investor_id.clone(),
                investor_email: investor.email.clone(),
                match_count: outcome.matches.len(),
                top_matches: outcome.matches.into_iter().take(TOP_MATCHES).collect(),
            });
        }
    }

    info!(
        total_matches,
        investors = investors.len(),
        written = stats.written,
        cleared = stats.cleared,
        write_failures = stats.write_failures,
        notified = stats.notified,
        notify_failures = stats.notify_failures,
        "matching run complete"
    );

    Ok(MatchRunSummary {
        message: "Matching completed successfully".to_string(),
        total_matches,
        investors_processed: investors.len(),
        matches_summary,
        stats,
    })
}

/// Claims run locks for already-resolved investors.
pub async fn claim_investors(
    guard: &dyn RunGuard,
    scope: &MatchScope,
    investors: &[Investor],
    now: DateTime<Utc>,
) -> Result<RunTicket, AppError> {
    let ids: Vec<String> = investors.iter().map(|i| i.investor_id.clone()).collect();
    begin_run(guard, scope, &ids, now).await
}

/// Runs `match_investors` over the investors `ticket` owns, then releases the ticket.
pub async fn run_claimed(
    guard: &dyn RunGuard,
    store: &dyn ProfileStore,
    notifier: &dyn Notifier,
    dashboard_url: &str,
    investors: Vec<Investor>,
    ticket: RunTicket,
) -> Result<MatchRunSummary, AppError> {
    let owned: Vec<Investor> = investors
        .into_iter()
        .filter(|i| ticket.owns(&i.investor_id))
        .collect();

    let result = if owned.is_empty() {
        info!(busy = ticket.busy.len(), "every investor already has a run in flight");
        Ok(MatchRunSummary::empty(
            "All investors already have a matching run in progress",
        ))
    } else {
        match_investors(store, notifier, dashboard_url, &owned, ticket.started_at).await
    };
    finish_run(guard, &ticket).await;

    result.map(|mut summary| {
        summary.stats.in_flight = ticket.busy.len();
        summary
    })
}

/// Resolves `scope`, locks each resolved investor and runs matching for them.
///
/// A targeted run whose investor is held by another run (full or targeted, by id
/// or by email) fails with `AppError::DuplicateRun`. A full run skips held
/// investors and counts them in `RunStats::in_flight`.
pub async fn run_guarded(
    guard: &dyn RunGuard,
    store: &dyn ProfileStore,
    notifier: &dyn Notifier,
    dashboard_url: &str,
    scope: &MatchScope,
    now: DateTime<Utc>,
) -> Result<MatchRunSummary, AppError> {
    let investors = resolve_scope(store, scope).await?;
    if investors.is_empty() {
        info!("no investors found; nothing to match");
        return Ok(MatchRunSummary::empty("No investors found"));
    }

    let ticket = claim_investors(guard, scope, &investors, now).await?;
    run_claimed(guard, store, notifier, dashboard_url, investors, ticket).await
}

/// Investors covered by `scope`. A targeted scope matches `investor_id` first,
/// then `email`, and is `NotFound` when neither matches.
pub async fn resolve_scope(
    store: &dyn ProfileStore,
    scope: &MatchScope,
) -> Result<Vec<Investor>, AppError> {
    match scope {
        MatchScope::All => store.list_investors().await,
        MatchScope::Investor(requested) => {
            if let Some(investor) = store.get_investor(requested).await? {
                return Ok(vec![investor]);
            }
            // Fall back to the email address, which callers also use as an identifier.
            let by_email: Vec<Investor> = store
                .list_investors()
                .await?
                .into_iter()
                .filter(|i| i.email.eq_ignore_ascii_case(requested))
                .collect();
            if by_email.is_empty() {
                return Err(AppError::NotFound(format!("Investor {requested} not found")));
            }
            info!(requested = %requested, count = by_email.len(), "matched investor by email");
            Ok(by_email)
        }
    }
}
