//! Terminal shell around the chat widget core.
mod app;
mod config;
mod effects;
mod logging;
mod persistence;
mod ui;

pub use app::run_app;

/// Wall-clock milliseconds since the Unix epoch.
pub(crate) fn now_ms() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0)
}
