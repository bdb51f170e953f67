//! Wire a loaded configuration into a run against the disk tree and the
//! HTTP provider.

use thiserror::Error;

use marketexport_core::data::{FetchError, HttpProvider};
use marketexport_core::pacing::ThreadSleep;
use marketexport_core::store::JsonFileStore;

use crate::config::{ConfigError, ExportConfig};
use crate::orchestrator::{Exporter, RunReport};
use crate::progress::ExportProgress;
use crate::summary::RunMode;

/// Startup failures. Anything past startup is recorded in the report instead.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to build upstream client: {0}")]
    Provider(#[from] FetchError),
}

/// Validate `config`, then run one export pass with the production provider
/// and store.
pub fn run_configured(
    config: &ExportConfig,
    mode: RunMode,
    progress: &dyn ExportProgress,
) -> Result<RunReport, LaunchError> {
    config.validate()?;
    let registry = config.registry()?;
    let provider = HttpProvider::new(config.provider.http_config())?;
    let store = JsonFileStore::new(config.data_dir.clone());

    tracing::info!(
        data_dir = %config.data_dir.display(),
        base_url = %config.provider.base_url,
        "export configured"
    );

    let report = Exporter::new(&provider, &store, &registry)
        .with_pacing(config.pacing.exchanges.policy(), config.pacing.stocks.policy())
        .with_pause(&ThreadSleep)
        .with_progress(progress)
        .run(mode);
    Ok(report)
}
