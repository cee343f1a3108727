//! # CLI Configuration File
//!
//! Optional YAML file passed with `--config`:
//!
//! ```yaml
//! api:
//!   base_url: https://ops.example.com
//!   timeout_secs: 10
//! refresh:
//!   period_secs: 30
//! view:
//!   page_size: 20
//!   status: InProgress
//!   date_range: today
//!   warehouse: WH-1
//!   search: budi
//!   sort: departure:desc
//! ```
//!
//! Every key is optional. `TRIPWATCH_API_URL` and `TRIPWATCH_TIMEOUT_SECS`
//! override the `api` section; the token is read from
//! `TRIPWATCH_API_TOKEN` only and never from the file.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use tripwatch_client::SourceConfig;
use tripwatch_monitor::{RefreshConfig, DEFAULT_REFRESH_PERIOD};
use tripwatch_query::{QueryParams, DEFAULT_PAGE_SIZE};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    pub api: ApiSection,
    pub refresh: RefreshSection,
    pub view: ViewSection,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApiSection {
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RefreshSection {
    pub period_secs: u64,
}

impl Default for RefreshSection {
    fn default() -> Self {
        Self {
            period_secs: DEFAULT_REFRESH_PERIOD.as_secs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewSection {
    pub page_size: usize,
    pub search: Option<String>,
    pub status: Option<String>,
    pub date_range: Option<String>,
    pub warehouse: Option<String>,
    pub sort: Option<String>,
}

impl Default for ViewSection {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            search: None,
            status: None,
            date_range: None,
            warehouse: None,
            sort: None,
        }
    }
}

impl ViewSection {
    pub fn query_params(&self) -> QueryParams {
        QueryParams {
            search: self.search.clone(),
            status: self.status.clone(),
            date_range: self.date_range.clone(),
            warehouse_id: self.warehouse.clone(),
            sort: self.sort.clone(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: String,
        source: serde_yaml::Error,
    },
    #[error("refresh.period_secs must be at least 1")]
    ZeroPeriod,
    #[error(transparent)]
    Source(#[from] tripwatch_client::ConfigError),
}

impl CliConfig {
    /// Load from a YAML file, or defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Self = serde_yaml::from_str(&raw).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            source: e,
        })?;
        if config.refresh.period_secs == 0 {
            return Err(ConfigError::ZeroPeriod);
        }
        Ok(config)
    }

    /// Source configuration: environment first, then this file, then defaults.
    pub fn source_config(&self) -> Result<SourceConfig, ConfigError> {
        let mut source = SourceConfig::from_env()?;
        if std::env::var_os("TRIPWATCH_API_URL").is_none() {
            if let Some(url) = &self.api.base_url {
                source.base_url = SourceConfig::new(url)?.base_url;
            }
        }
        if std::env::var_os("TRIPWATCH_TIMEOUT_SECS").is_none() {
            if let Some(secs) = self.api.timeout_secs {
                source.timeout_secs = secs;
            }
        }
        Ok(source)
    }

    pub fn refresh_config(&self) -> RefreshConfig {
        RefreshConfig {
            period: Duration::from_secs(self.refresh.period_secs.max(1)),
            page_size: self.view.page_size.max(1),
        }
    }
}
