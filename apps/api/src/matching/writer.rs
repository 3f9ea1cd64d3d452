use chrono::{DateTime, Utc};
use tracing::{error, info};

use crate::errors::AppError;
use crate::matching::engine::Match;
use crate::models::investor::StoredRecommendation;
use crate::store::ProfileStore;

/// Replaces the investor's stored recommendations with this run's result and stamps `last_matched`.
///
/// Always a full replace, also when `matches` is empty. A `clear` outcome writes an empty list.
/// Failures are logged here and returned so the caller can count them; they never abort
/// processing of other investors.
pub async fn write_back(
    store: &dyn ProfileStore,
    investor_id: &str,
    matches: &[Match],
    clear: bool,
    now: DateTime<Utc>,
) -> Result<(), AppError> {
    let recommendations: Vec<StoredRecommendation> = if clear {
        vec![]
    } else {
        matches.iter().map(StoredRecommendation::from).collect()
    };

    match store
        .write_recommendations(investor_id, &recommendations, now)
        .await
    {
        Ok(()) => {
            if clear {
                info!(investor_id, "cleared recommendations for investor with no preferences");
            } else {
                info!(
                    investor_id,
                    count = recommendations.len(),
                    "stored recommendations"
                );
            }
            Ok(())
        }
        Err(e) => {
            error!(investor_id, error = %e, "failed to store recommendations");
            Err(e)
        }
    }
}
