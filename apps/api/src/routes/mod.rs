pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::digest::handlers as digest;
use crate::investors::handlers as investors;
use crate::matching::handlers as matching;
use crate::startups::handlers as startups;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Catalogue
        .route("/api/v1/startups", get(startups::handle_list_startups))
        .route("/api/v1/startups/:id", get(startups::handle_get_startup))
        .route(
            "/api/v1/startups/:id/contact",
            post(startups::handle_contact_startup),
        )
        // Investor profiles
        .route("/api/v1/investors", post(investors::handle_save_investor))
        .route("/api/v1/investors/:id", get(investors::handle_get_investor))
        // Matching
        .route("/api/v1/matching/run", post(matching::handle_run_matching))
        .route(
            "/api/v1/matching/trigger",
            post(matching::handle_trigger_matching),
        )
        .route("/api/v1/digest/run", post(digest::handle_run_digest))
        .with_state(state)
}
