//! Client configuration
//!
//! Settings resolve in layers: built-in defaults, then an optional TOML file
//! at `{config_dir}/sillage/config.toml`, then environment variables. The
//! backend defaults match a locally running workflow service.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for the workflow client and the reveal cadence.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SillageConfig {
    /// Workflow service host.
    pub backend_host: String,
    /// Workflow service port.
    pub backend_port: u16,
    /// Whole-request timeout in milliseconds.
    pub request_timeout_ms: u64,
    /// Reveal cadence: time per character, in milliseconds.
    pub reveal_interval_ms: u64,
    /// Use the streaming chat endpoint variant. When false, requests run as
    /// a single buffered exchange and also return the workflow metadata
    /// (clarified query, research result, interview history).
    pub streaming: bool,
}

impl Default for SillageConfig {
    fn default() -> Self {
        Self {
            backend_host: "localhost".to_string(),
            backend_port: 8000,
            request_timeout_ms: 120_000,
            reveal_interval_ms: 15,
            streaming: true,
        }
    }
}

impl SillageConfig {
    /// Resolve configuration from the default file location plus environment.
    ///
    /// A missing file is not an error; an unreadable or invalid one is
    /// logged and otherwise treated as absent.
    pub fn load() -> Self {
        let mut config = match default_config_path() {
            Some(ref path) if path.exists() => match Self::load_from_path(path) {
                Ok(config) => config,
                Err(error) => {
                    tracing::warn!(%error, "ignoring config file");
                    Self::default()
                }
            },
            _ => Self::default(),
        };
        config.apply_env();
        config
    }

    /// Load configuration from a specific TOML file.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Overlay settings from `SILLAGE_*` environment variables.
    ///
    /// Recognized: `SILLAGE_BACKEND_HOST`, `SILLAGE_BACKEND_PORT`,
    /// `SILLAGE_REVEAL_MS`, `SILLAGE_STREAMING` (`0`/`false` disables).
    pub fn apply_env(&mut self) {
        if let Ok(host) = std::env::var("SILLAGE_BACKEND_HOST") {
            self.backend_host = host;
        }
        if let Some(port) = std::env::var("SILLAGE_BACKEND_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            self.backend_port = port;
        }
        if let Some(interval) = std::env::var("SILLAGE_REVEAL_MS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            self.reveal_interval_ms = interval;
        }
        if let Ok(streaming) = std::env::var("SILLAGE_STREAMING") {
            self.streaming = streaming != "0" && streaming.to_lowercase() != "false";
        }
    }

    /// Base URL of the workflow service.
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.backend_host, self.backend_port)
    }

    /// Whole-request timeout as a [`Duration`].
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Reveal cadence as a [`Duration`].
    pub fn reveal_interval(&self) -> Duration {
        Duration::from_millis(self.reveal_interval_ms)
    }
}

/// Default location of the config file, under the platform config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("sillage").join("config.toml"))
}

/// Errors from loading a config file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file exists but could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// The file is not valid TOML for this configuration.
    #[error("failed to parse {path}: {source}")]
    Parse {
        /// Path that was being parsed.
        path: PathBuf,
        /// Underlying TOML error.
        source: toml::de::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_defaults_point_at_local_backend() {
        let config = SillageConfig::default();
        assert_eq!(config.base_url(), "http://localhost:8000");
        assert_eq!(config.request_timeout(), Duration::from_secs(120));
        assert_eq!(config.reveal_interval(), Duration::from_millis(15));
        assert!(config.streaming);
    }

    #[test]
    fn test_load_from_path_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "backend_host = \"scent.example\"").unwrap();
        writeln!(file, "streaming = false").unwrap();

        let config = SillageConfig::load_from_path(file.path()).unwrap();
        assert_eq!(config.backend_host, "scent.example");
        assert!(!config.streaming);
        assert_eq!(config.backend_port, 8000);
        assert_eq!(config.reveal_interval_ms, 15);
    }

    #[test]
    fn test_load_from_path_rejects_bad_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "backend_port = \"not a number\"").unwrap();

        let error = SillageConfig::load_from_path(file.path()).unwrap_err();
        assert!(matches!(error, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_load_from_missing_path_is_read_error() {
        let error =
            SillageConfig::load_from_path(Path::new("/nonexistent/sillage.toml")).unwrap_err();
        assert!(matches!(error, ConfigError::Read { .. }));
    }
}
