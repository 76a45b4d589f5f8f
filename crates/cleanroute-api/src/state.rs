//! Shared application state, built once in `main` and cloned as an `Arc`
//! into every handler (ambient addition, modeled on the teacher's
//! `AppState`).

use cleanroute_config::AppConfig;
use cleanroute_storage::PostgresStore;
use std::time::Instant;

pub struct AppState {
    pub store: PostgresStore,
    pub config: AppConfig,
    pub start_time: Instant,
}
