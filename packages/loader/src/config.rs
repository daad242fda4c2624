//! Loader configuration.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::source::{DataSource, file::FileSource, http::HttpSource};
use crate::{LoaderError, retry};

/// Default province boundary file.
pub const DEFAULT_PROVINCES_FILE: &str = "/data/prov_37.geojson";

/// Default national district boundary file, filtered per province when
/// the province has no districts file of its own.
pub const DEFAULT_DISTRICTS_FILE: &str = "/data/kab_37.geojson";

/// Default static root; `/data/...` paths resolve to `public/data/...`.
pub const DEFAULT_DATA_DIR: &str = "public";

/// Default per-request timeout.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Default retry count for transient HTTP failures.
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Where boundary files are read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataLocation {
    /// Base URL; file paths are appended to it.
    Url(String),
    /// Local static root; file paths are resolved under it.
    Dir(PathBuf),
}

/// Loader settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderConfig {
    /// Where files are read from.
    pub location: DataLocation,
    /// Province boundary file.
    pub provinces_file: String,
    /// District boundary file for provinces without their own.
    pub default_districts_file: String,
    /// Per-request timeout.
    pub fetch_timeout: Duration,
    /// Retries for transient HTTP failures.
    pub max_retries: u32,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            location: DataLocation::Dir(PathBuf::from(DEFAULT_DATA_DIR)),
            provinces_file: DEFAULT_PROVINCES_FILE.to_string(),
            default_districts_file: DEFAULT_DISTRICTS_FILE.to_string(),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

impl LoaderConfig {
    /// Reads the configuration from the environment.
    ///
    /// * `WILAYAH_DATA_URL`: fetch over HTTP from this base URL
    /// * `WILAYAH_DATA_DIR`: read from this local static root (ignored when
    ///   `WILAYAH_DATA_URL` is set)
    /// * `WILAYAH_PROVINCES_FILE`, `WILAYAH_DISTRICTS_FILE`
    /// * `WILAYAH_FETCH_TIMEOUT_SECS`, `WILAYAH_MAX_RETRIES`
    ///
    /// Unset or unparsable variables fall back to the defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let location = env_string("WILAYAH_DATA_URL").map_or_else(
            || {
                env_string("WILAYAH_DATA_DIR")
                    .map_or(defaults.location, |dir| DataLocation::Dir(PathBuf::from(dir)))
            },
            DataLocation::Url,
        );

        Self {
            location,
            provinces_file: env_string("WILAYAH_PROVINCES_FILE")
                .unwrap_or(defaults.provinces_file),
            default_districts_file: env_string("WILAYAH_DISTRICTS_FILE")
                .unwrap_or(defaults.default_districts_file),
            fetch_timeout: std::env::var("WILAYAH_FETCH_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map_or(defaults.fetch_timeout, Duration::from_secs),
            max_retries: std::env::var("WILAYAH_MAX_RETRIES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_retries),
        }
    }

    /// Upper bound on one logical fetch, including every retry and its
    /// backoff.
    #[must_use]
    pub fn fetch_deadline(&self) -> Duration {
        let attempts = self.max_retries.saturating_add(1);
        self.fetch_timeout.saturating_mul(attempts) + retry::total_backoff(self.max_retries)
    }

    /// Builds the data source for [`Self::location`].
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn source(&self) -> Result<Arc<dyn DataSource>, LoaderError> {
        Ok(match &self.location {
            DataLocation::Url(base) => Arc::new(HttpSource::new(
                base.clone(),
                self.fetch_timeout,
                self.max_retries,
            )?),
            DataLocation::Dir(root) => Arc::new(FileSource::new(root.clone())),
        })
    }
}

fn env_string(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
