use chrono::{DateTime, Duration, Timelike, Utc};
use serde::Serialize;

use crate::models::investor::Investor;

/// Minimum gap between two digests. Slightly under a day so hourly runs that
/// drift a few minutes still land in the preferred hour the next day.
pub const RESEND_WINDOW_HOURS: i64 = 23;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DigestDecision {
    Due,
    NotOptedIn,
    NoPreferredTime,
    OutsidePreferredHour,
    SentRecently,
}

/// Decides whether `investor` gets a digest run at `now`.
///
/// Hour granularity, UTC as the single reference zone.
pub fn evaluate(investor: &Investor, now: DateTime<Utc>) -> DigestDecision {
    if !investor.daily_recommendations {
        return DigestDecision::NotOptedIn;
    }
    let Some(preferred) = investor.preferred_time else {
        return DigestDecision::NoPreferredTime;
    };
    if preferred.hour() != now.hour() {
        return DigestDecision::OutsidePreferredHour;
    }
    if let Some(last_sent) = investor.last_recommendation_sent {
        if now.signed_duration_since(last_sent) < Duration::hours(RESEND_WINDOW_HOURS) {
            return DigestDecision::SentRecently;
        }
    }
    DigestDecision::Due
}
