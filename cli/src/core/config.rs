use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use druid_query::query::{Granularity, resolve_time_zone};
use serde::Deserialize;

use super::cli::CliConfig;
use super::constants::{
    APP_DOT_FOLDER, CONFIG_FILE_NAME, DEFAULT_BROKER_URL, DEFAULT_GRANULARITY,
    DEFAULT_TIMEOUT_SECS,
};

// =============================================================================
// File Configuration
// =============================================================================

/// File-based configuration (JSON)
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub broker_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub granularity: Option<String>,
    pub time_zone: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

impl FileConfig {
    /// Load configuration from a JSON file
    fn load_from_file(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "Loading config file");
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        tracing::trace!(config = ?config, "Parsed config file");
        Ok(config)
    }

    /// Warn about unknown fields in the config
    fn warn_unknown_fields(&self) {
        if let serde_json::Value::Object(map) = &self.extra
            && !map.is_empty()
        {
            let keys_str: String = map
                .keys()
                .map(|k| k.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            tracing::warn!(
                fields = %keys_str,
                "Unknown fields in config file (possible typos)"
            );
        }
    }

    /// Merge another FileConfig into this one (other takes precedence)
    fn merge(&mut self, other: FileConfig) {
        if other.broker_url.is_some() {
            self.broker_url = other.broker_url;
        }
        if other.timeout_secs.is_some() {
            self.timeout_secs = other.timeout_secs;
        }
        if other.granularity.is_some() {
            self.granularity = other.granularity;
        }
        if other.time_zone.is_some() {
            self.time_zone = other.time_zone;
        }
    }
}

// =============================================================================
// Resolved Configuration
// =============================================================================

#[derive(Debug, Clone)]
pub struct BrokerConfig {
    pub url: String,
    pub timeout_secs: u64,
}

/// Defaults applied to every built query
#[derive(Debug, Clone)]
pub struct QueryDefaults {
    pub granularity: String,
    pub time_zone: Option<String>,
}

/// Where config files are looked up when no `--config` path is given
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    /// `~/.druidq/druidq.json`, `None` without a home directory
    pub profile: Option<PathBuf>,
    /// `druidq.json` in the working directory
    pub local: PathBuf,
}

impl Default for ConfigPaths {
    fn default() -> Self {
        Self {
            profile: get_profile_config_path(),
            local: PathBuf::from(CONFIG_FILE_NAME),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub broker: BrokerConfig,
    pub query: QueryDefaults,
}

impl AppConfig {
    /// Layer configs: defaults -> profile file -> local or `--config` file -> CLI/env
    pub fn load(cli: &CliConfig) -> Result<Self> {
        Self::load_from(cli, &ConfigPaths::default())
    }

    /// Same as [`AppConfig::load`] with explicit profile and local paths
    pub fn load_from(cli: &CliConfig, paths: &ConfigPaths) -> Result<Self> {
        tracing::debug!("Loading application configuration");
        tracing::trace!(cli = ?cli, "CLI config");

        let mut file_config = FileConfig::default();
        let mut found_configs: Vec<String> = Vec::new();

        // 1. Profile dir (~/.druidq/druidq.json), skipped if missing
        if let Some(profile_path) = &paths.profile
            && profile_path.exists()
        {
            let profile_config = FileConfig::load_from_file(profile_path)?;
            profile_config.warn_unknown_fields();
            file_config.merge(profile_config);
            found_configs.push(profile_path.display().to_string());
        }

        // 2. CLI-specified path OR local directory
        let overlay_path = if let Some(ref path) = cli.config {
            let expanded = expand_home(&path.to_string_lossy());
            if !expanded.exists() {
                anyhow::bail!("Config file not found: {}", expanded.display());
            }
            Some(expanded)
        } else {
            paths.local.exists().then(|| paths.local.clone())
        };

        if let Some(path) = overlay_path {
            let overlay_config = FileConfig::load_from_file(&path)?;
            overlay_config.warn_unknown_fields();
            file_config.merge(overlay_config);
            found_configs.push(path.display().to_string());
        }

        tracing::debug!(configs = ?found_configs, "Config files loaded");

        // 3. CLI/env overrides
        let config = Self {
            broker: BrokerConfig {
                url: cli
                    .broker_url
                    .clone()
                    .or(file_config.broker_url)
                    .unwrap_or_else(|| DEFAULT_BROKER_URL.to_string()),
                timeout_secs: cli
                    .timeout_secs
                    .or(file_config.timeout_secs)
                    .unwrap_or(DEFAULT_TIMEOUT_SECS),
            },
            query: QueryDefaults {
                granularity: file_config
                    .granularity
                    .unwrap_or_else(|| DEFAULT_GRANULARITY.to_string()),
                time_zone: cli.time_zone.clone().or(file_config.time_zone),
            },
        };

        config.validate()?;
        tracing::debug!(
            broker_url = %config.broker.url,
            timeout_secs = config.broker.timeout_secs,
            granularity = %config.query.granularity,
            "Configuration loaded"
        );
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let url = self.broker.url.trim();
        if url.is_empty() {
            anyhow::bail!("Configuration error: broker_url must not be empty");
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            anyhow::bail!(
                "Configuration error: broker_url must be an http(s) URL, got '{}'",
                url
            );
        }

        if self.broker.timeout_secs == 0 {
            anyhow::bail!("Configuration error: timeout_secs must be greater than 0");
        }

        resolve_time_zone(self.query.time_zone.as_deref()).with_context(|| {
            format!(
                "Configuration error: invalid time_zone '{}'",
                self.query.time_zone.as_deref().unwrap_or_default()
            )
        })?;

        Granularity::parse(&self.query.granularity, self.query.time_zone.as_deref())
            .with_context(|| {
                format!(
                    "Configuration error: invalid granularity '{}'",
                    self.query.granularity
                )
            })?;

        Ok(())
    }
}

/// Get the profile config path (~/.druidq/druidq.json)
fn get_profile_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(APP_DOT_FOLDER).join(CONFIG_FILE_NAME))
}

/// Expand a leading `~` to the home directory
fn expand_home(path: &str) -> PathBuf {
    let path = path.trim();
    match path.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') || rest.starts_with('\\') => {
            match dirs::home_dir() {
                Some(home) => home.join(rest.trim_start_matches(['/', '\\'])),
                None => PathBuf::from(path),
            }
        }
        _ => PathBuf::from(path),
    }
}
