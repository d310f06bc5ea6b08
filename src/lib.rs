pub mod attachments;
pub mod auth;
pub mod config;
pub mod db;
pub mod models;
pub mod pagination;
pub mod service;

use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber. Call once at process start.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();
}
