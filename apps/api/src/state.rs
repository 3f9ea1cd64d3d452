use std::sync::Arc;

use crate::config::Config;
use crate::matching::guard::RunGuard;
use crate::notify::Notifier;
use crate::store::ProfileStore;

/// Shared application state injected into all route handlers via Axum extractors.
/// Clients are built once in `main`; tests swap in in-memory fakes.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ProfileStore>,
    pub notifier: Arc<dyn Notifier>,
    /// Duplicate-run detection for matching runs.
    pub run_guard: Arc<dyn RunGuard>,
    pub config: Config,
}
