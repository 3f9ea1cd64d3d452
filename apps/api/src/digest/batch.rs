use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::digest::schedule::{evaluate, DigestDecision};
use crate::errors::AppError;
use crate::matching::guard::RunGuard;
use crate::matching::run::{run_guarded, MatchScope};
use crate::notify::Notifier;
use crate::store::ProfileStore;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DigestBatchStats {
    pub processed: usize,
    pub triggered: usize,
    pub skipped: usize,
    pub duplicates: usize,
    pub errored: usize,
    pub total_matches: usize,
}

/// One pass of the daily digest over every opted-in investor.
///
/// Each due investor gets a guarded single-investor matching run. When the run
/// completes, `last_recommendation_sent` moves to `now` even if no email went out
/// (no matches, or delivery failed): the stamp records the day's attempt, and
/// delivery failures are reported in the run stats instead of retried. When the
/// run itself fails the stamp is left alone so the next hourly pass retries.
/// Per-investor failures are counted, never raised.
pub async fn run_digest_batch(
    guard: &dyn RunGuard,
    store: &dyn ProfileStore,
    notifier: &dyn Notifier,
    dashboard_url: &str,
    now: DateTime<Utc>,
) -> Result<DigestBatchStats, AppError> {
    let subscribers = store.list_digest_subscribers().await?;
    let mut stats = DigestBatchStats {
        processed: subscribers.len(),
        ..Default::default()
    };

    for investor in &subscribers {
        let investor_id = investor.investor_id.as_str();

        let decision = evaluate(investor, now);
        if decision != DigestDecision::Due {
            debug!(investor_id, ?decision, "digest not due");
            stats.skipped += 1;
            continue;
        }

        let scope = MatchScope::Investor(investor.investor_id.clone());
        match run_guarded(guard, store, notifier, dashboard_url, &scope, now).await {
            Ok(summary) => {
                stats.triggered += 1;
                stats.total_matches += summary.total_matches;
                if let Err(e) = store.mark_recommendation_sent(investor_id, now).await {
                    error!(investor_id, error = %e, "failed to record digest send time");
                    stats.errored += 1;
                }
            }
            Err(AppError::DuplicateRun(_)) => {
                warn!(investor_id, "digest skipped: matching run already in flight");
                stats.duplicates += 1;
            }
            Err(e) => {
                error!(
                    investor_id,
                    dependency = e.is_dependency(),
                    error = %e,
                    "digest matching run failed; will retry next pass"
                );
                stats.errored += 1;
            }
        }
    }

    info!(
        processed = stats.processed,
        triggered = stats.triggered,
        skipped = stats.skipped,
        duplicates = stats.duplicates,
        errored = stats.errored,
        "digest batch complete"
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::guard::memory::InMemoryRunGuard;
    use crate::matching::run::claim_investors;
    use crate::matching::guard::investor_key;
    use crate::models::investor::Investor;
    use crate::notify::memory::RecordingNotifier;
    use crate::store::memory::InMemoryProfileStore;
    use crate::test_support::{investor, startup};
    use chrono::{Duration, NaiveTime, TimeZone};

    const DASHBOARD: &str = "https://dash.example.com";

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 9, 2, 0).unwrap()
    }

    fn subscriber(id: &str, hour: u32) -> Investor {
        let mut inv = investor(id, &["FinTech"], &[]);
        inv.daily_recommendations = true;
        inv.preferred_time = NaiveTime::from_hms_opt(hour, 0, 0);
        inv
    }

    fn store_with(investors: Vec<Investor>) -> InMemoryProfileStore {
        InMemoryProfileStore::new(vec![startup("s1", "FinTech", "seed")], investors)
    }

    #[tokio::test]
    async fn test_due_investor_is_matched_and_stamped() {
        let store = store_with(vec![subscriber("inv-1", 9), subscriber("inv-2", 14)]);
        let notifier = RecordingNotifier::default();
        let guard = InMemoryRunGuard::default();

        let stats = run_digest_batch(&guard, &store, &notifier, DASHBOARD, now())
            .await
            .unwrap();

        assert_eq!(stats.processed, 2);
        assert_eq!(stats.triggered, 1);
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.total_matches, 1);
        assert_eq!(store.investor("inv-1").last_recommendation_sent, Some(now()));
        assert!(store.investor("inv-2").last_recommendation_sent.is_none());
        assert_eq!(notifier.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_recent_send_is_skipped() {
        let mut inv = subscriber("inv-1", 9);
        let earlier = now() - Duration::hours(3);
        inv.last_recommendation_sent = Some(earlier);
        let store = store_with(vec![inv]);
        let notifier = RecordingNotifier::default();
        let guard = InMemoryRunGuard::default();

        let stats = run_digest_batch(&guard, &store, &notifier, DASHBOARD, now())
            .await
            .unwrap();

        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.triggered, 0);
        assert_eq!(store.investor("inv-1").last_recommendation_sent, Some(earlier));
    }

    #[tokio::test]
    async fn test_failed_run_leaves_timestamp_for_retry() {
        let store = store_with(vec![subscriber("inv-1", 9)]);
        store.fail_startup_scan();
        let notifier = RecordingNotifier::default();
        let guard = InMemoryRunGuard::default();

        let stats = run_digest_batch(&guard, &store, &notifier, DASHBOARD, now())
            .await
            .unwrap();

        assert_eq!(stats.errored, 1);
        assert!(store.investor("inv-1").last_recommendation_sent.is_none());
        assert!(!guard.is_held(&investor_key("inv-1")));
    }

    #[tokio::test]
    async fn test_in_flight_run_counts_as_duplicate() {
        let store = store_with(vec![subscriber("inv-1", 9)]);
        let notifier = RecordingNotifier::default();
        let guard = InMemoryRunGuard::default();
        guard
            .acquire(&investor_key("inv-1"), uuid::Uuid::new_v4())
            .await
            .unwrap();

        let stats = run_digest_batch(&guard, &store, &notifier, DASHBOARD, now())
            .await
            .unwrap();

        assert_eq!(stats.duplicates, 1);
        assert!(store.investor("inv-1").last_recommendation_sent.is_none());
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn test_investor_held_by_full_run_counts_as_duplicate() {
        let store = store_with(vec![subscriber("inv-1", 9)]);
        let notifier = RecordingNotifier::default();
        let guard = InMemoryRunGuard::default();
        let everyone = store.list_investors().await.unwrap();
        let _full = claim_investors(&guard, &MatchScope::All, &everyone, now())
            .await
            .unwrap();

        let stats = run_digest_batch(&guard, &store, &notifier, DASHBOARD, now())
            .await
            .unwrap();

        assert_eq!(stats.duplicates, 1);
        assert!(store.writes().is_empty());
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn test_stamped_even_without_matches() {
        let mut inv = subscriber("inv-1", 9);
        inv.preferred_industries = vec!["Space".to_string()];
        let store = store_with(vec![inv]);
        let notifier = RecordingNotifier::default();
        let guard = InMemoryRunGuard::default();

        let stats = run_digest_batch(&guard, &store, &notifier, DASHBOARD, now())
            .await
            .unwrap();

        assert_eq!(stats.triggered, 1);
        assert!(notifier.sent().is_empty());
        assert_eq!(store.investor("inv-1").last_recommendation_sent, Some(now()));
    }

    #[tokio::test]
    async fn test_non_subscribers_are_ignored() {
        let store = store_with(vec![investor("inv-1", &["FinTech"], &[])]);
        let notifier = RecordingNotifier::default();
        let guard = InMemoryRunGuard::default();

        let stats = run_digest_batch(&guard, &store, &notifier, DASHBOARD, now())
            .await
            .unwrap();

        assert_eq!(stats, DigestBatchStats::default());
    }
}
