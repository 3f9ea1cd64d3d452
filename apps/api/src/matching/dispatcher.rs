use serde::Serialize;
use tracing::{error, info};

use crate::matching::engine::Match;
use crate::models::investor::Investor;
use crate::notify::email::build_match_summary;
use crate::notify::Notifier;

/// What happened to an investor's notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DispatchOutcome {
    Sent { message_id: String },
    SkippedNoMatches,
    SkippedNoEmail,
    Failed { reason: String },
}

/// Sends the match summary when the investor has matches and an email address.
///
/// Never fails: skips and delivery errors are logged and reported in the outcome.
/// Delivery is attempted once; recommendations already written stay in place.
pub async fn dispatch(
    notifier: &dyn Notifier,
    investor: &Investor,
    matches: &[Match],
    dashboard_url: &str,
) -> DispatchOutcome {
    let investor_id = investor.investor_id.as_str();

    if matches.is_empty() {
        info!(investor_id, "no matches for investor; skipping notification");
        return DispatchOutcome::SkippedNoMatches;
    }
    if investor.email.trim().is_empty() {
        info!(investor_id, "no email address for investor; skipping notification");
        return DispatchOutcome::SkippedNoEmail;
    }

    let message = build_match_summary(investor, matches, dashboard_url);
    match notifier.send(&message).await {
        Ok(message_id) => {
            info!(investor_id, to = %message.to, %message_id, "match summary sent");
            DispatchOutcome::Sent { message_id }
        }
        Err(e) => {
            error!(investor_id, to = %message.to, error = %e, "failed to send match summary");
            DispatchOutcome::Failed {
                reason: e.to_string(),
            }
        }
    }
}
