//! Export configuration loaded from TOML.
//!
//! Every field has a default, so running without a config file exports the
//! ten default exchanges into `market_data/`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use marketexport_core::data::{Exchange, ExchangeRegistry, HttpProviderConfig};
use marketexport_core::pacing::PacingPolicy;
use marketexport_core::store::layout::DEFAULT_DATA_DIR;

/// Config file picked up from the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "marketexport.toml";

/// Environment variable overriding `provider.base_url`.
pub const PROVIDER_URL_ENV: &str = "MARKETEXPORT_PROVIDER_URL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Root of the exported tree.
    pub data_dir: PathBuf,
    pub provider: ProviderSettings,
    pub pacing: PacingSettings,
    /// Exchanges to export, in order.
    pub exchanges: Vec<Exchange>,
    pub api: ApiSettings,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            provider: ProviderSettings::default(),
            pacing: PacingSettings::default(),
            exchanges: ExchangeRegistry::african_markets().exchanges().to_vec(),
            api: ApiSettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    pub base_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Trading days covered by the performance snapshot.
    pub performance_window_days: u32,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        let http = HttpProviderConfig::default();
        Self {
            base_url: http.base_url,
            timeout_secs: http.timeout.as_secs(),
            user_agent: http.user_agent,
            performance_window_days: http.performance_window_days,
        }
    }
}

impl ProviderSettings {
    pub fn http_config(&self) -> HttpProviderConfig {
        HttpProviderConfig {
            base_url: self.base_url.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            user_agent: self.user_agent.clone(),
            performance_window_days: self.performance_window_days,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingSettings {
    pub exchanges: PacingSection,
    pub stocks: PacingSection,
}

/// TOML form of a [`PacingPolicy`], delays in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingSection {
    pub batch_size: usize,
    pub entity_delay_ms: u64,
    pub batch_delay_ms: u64,
}

impl Default for PacingSection {
    fn default() -> Self {
        let policy = PacingPolicy::default();
        Self {
            batch_size: policy.batch_size,
            entity_delay_ms: policy.entity_delay.as_millis() as u64,
            batch_delay_ms: policy.batch_delay.as_millis() as u64,
        }
    }
}

impl PacingSection {
    pub fn policy(&self) -> PacingPolicy {
        PacingPolicy {
            batch_size: self.batch_size,
            entity_delay: Duration::from_millis(self.entity_delay_ms),
            batch_delay: Duration::from_millis(self.batch_delay_ms),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    pub bind: String,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8000".into(),
        }
    }
}

impl ExportConfig {
    /// Load a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve the config for a CLI invocation: the explicit file if given,
    /// else `marketexport.toml` in the working directory if present, else
    /// defaults. Environment overrides are applied last.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Replace `data_dir` when the command line names one.
    pub fn with_data_dir(mut self, data_dir: Option<PathBuf>) -> Self {
        if let Some(dir) = data_dir {
            self.data_dir = dir;
        }
        self
    }

    /// Apply environment-style overrides through `lookup`.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(PROVIDER_URL_ENV).filter(|u| !u.trim().is_empty()) {
            self.provider.base_url = url;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.provider.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("provider.base_url must not be empty".into()));
        }
        if self.provider.timeout_secs == 0 {
            return Err(ConfigError::Invalid("provider.timeout_secs must be at least 1".into()));
        }
        for (name, section) in [
            ("pacing.exchanges", &self.pacing.exchanges),
            ("pacing.stocks", &self.pacing.stocks),
        ] {
            if section.batch_size == 0 {
                return Err(ConfigError::Invalid(format!(
                    "{name}.batch_size must be at least 1"
                )));
            }
        }
        if self.exchanges.is_empty() {
            return Err(ConfigError::Invalid("at least one exchange is required".into()));
        }
        self.registry()?;
        Ok(())
    }

    /// The configured exchanges as a registry.
    pub fn registry(&self) -> Result<ExchangeRegistry, ConfigError> {
        ExchangeRegistry::new(self.exchanges.clone()).map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = ExportConfig::from_toml("").unwrap();
        assert_eq!(config, ExportConfig::default());
        assert_eq!(config.data_dir, PathBuf::from("market_data"));
        assert_eq!(config.exchanges.len(), 10);
        assert_eq!(config.pacing.stocks.policy(), PacingPolicy::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = ExportConfig::from_toml(
            r#"
data_dir = "/srv/market"

[provider]
base_url = "https://upstream.example/api"

[pacing.stocks]
batch_size = 5
"#,
        )
        .unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/srv/market"));
        assert_eq!(config.provider.base_url, "https://upstream.example/api");
        assert_eq!(config.provider.timeout_secs, 30);
        assert_eq!(config.pacing.stocks.batch_size, 5);
        assert_eq!(config.pacing.stocks.entity_delay_ms, 1000);
        assert_eq!(config.pacing.exchanges.batch_size, 3);
    }

    #[test]
    fn command_line_data_dir_wins() {
        let config = ExportConfig::from_toml("data_dir = \"/srv/market\"\n").unwrap();

        let kept = config.clone().with_data_dir(None);
        assert_eq!(kept.data_dir, PathBuf::from("/srv/market"));

        let moved = config.with_data_dir(Some(PathBuf::from("/tmp/elsewhere")));
        assert_eq!(moved.data_dir, PathBuf::from("/tmp/elsewhere"));
    }

    #[test]
    fn exchanges_can_be_replaced() {
        let config = ExportConfig::from_toml(
            r#"
[[exchanges]]
code = "JSE"
name = "Johannesburg Stock Exchange"

[[exchanges]]
code = "ngx"
name = "Nigerian Exchange"
"#,
        )
        .unwrap();

        let registry = config.registry().unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.exchanges()[0].code.as_str(), "jse");
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        let err = ExportConfig::from_toml("[pacing.exchanges]\nbatch_size = 0\n").unwrap_err();
        assert!(err.to_string().contains("pacing.exchanges.batch_size"), "{err}");
    }

    #[test]
    fn duplicate_exchanges_are_rejected() {
        let err = ExportConfig::from_toml(
            "[[exchanges]]\ncode = \"jse\"\nname = \"a\"\n[[exchanges]]\ncode = \"jse\"\nname = \"b\"\n",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn invalid_exchange_code_fails_to_parse() {
        let err = ExportConfig::from_toml("[[exchanges]]\ncode = \"../x\"\nname = \"a\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn provider_url_override() {
        let mut config = ExportConfig::default();
        config.apply_overrides(|key| {
            (key == PROVIDER_URL_ENV).then(|| "http://override.test".to_string())
        });
        assert_eq!(config.provider.base_url, "http://override.test");

        let mut config = ExportConfig::default();
        config.apply_overrides(|_| Some("   ".into()));
        assert_eq!(config.provider.base_url, ProviderSettings::default().base_url);
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = ExportConfig::from_file(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn http_config_carries_settings() {
        let settings = ProviderSettings {
            timeout_secs: 5,
            performance_window_days: 20,
            ..ProviderSettings::default()
        };
        let http = settings.http_config();
        assert_eq!(http.timeout, Duration::from_secs(5));
        assert_eq!(http.performance_window_days, 20);
    }
}
