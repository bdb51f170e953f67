//! Market Export Runner: configuration, run orchestration, summary log.
//!
//! This crate builds on `marketexport-core` to provide:
//! - TOML configuration with defaults and environment overrides
//! - The full and incremental export passes
//! - The append-only run summary log
//! - Progress reporting hooks for the CLI

pub mod config;
pub mod launch;
pub mod orchestrator;
pub mod progress;
pub mod summary;

pub use config::{ApiSettings, ConfigError, ExportConfig, PacingSection};
pub use launch::{run_configured, LaunchError};
pub use orchestrator::{
    EntityFailure, ExchangeOutcome, Exporter, OpCounts, RunReport, Stage, StageError,
};
pub use progress::{ExportProgress, SilentProgress, StdoutProgress};
pub use summary::{update_rate, RunMode, SummaryEntry, SummaryLog};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn config_types_are_send_sync() {
        assert_send::<ExportConfig>();
        assert_sync::<ExportConfig>();
        assert_send::<ConfigError>();
        assert_sync::<ConfigError>();
    }

    #[test]
    fn report_types_are_send_sync() {
        assert_send::<RunReport>();
        assert_sync::<RunReport>();
        assert_send::<SummaryEntry>();
        assert_sync::<SummaryEntry>();
        assert_send::<EntityFailure>();
        assert_sync::<EntityFailure>();
    }

    #[test]
    fn exporter_is_send_sync() {
        assert_send::<Exporter<'static>>();
        assert_sync::<Exporter<'static>>();
    }
}
