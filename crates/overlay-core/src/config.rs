//! Configuration loading and typed config structures for the Overlay Hub.
//!
//! Configuration lives in a YAML file (by default `overlay-hub.yaml` at
//! the project root).
//! Every field has a default, so an empty or missing file yields a
//! working configuration. A handful of environment variables override
//! the file for container deployments.

use std::path::Path;

use serde::Deserialize;

use crate::model::ToggleMode;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The configuration parsed but is inconsistent.
    #[error("invalid config: {0}")]
    Invalid(String),
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level Overlay Hub configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct HubConfig {
    /// Listener and static-file settings.
    #[serde(default)]
    pub server: ServerSection,

    /// Toggle policy.
    #[serde(default)]
    pub overlays: OverlaysSection,

    /// HTTP response shape options.
    #[serde(default)]
    pub http: HttpSection,

    /// Long-poll limits.
    #[serde(default)]
    pub poll: PollSection,
}

impl HubConfig {
    /// Load configuration from a YAML file, then apply env overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if it is not valid YAML, or
    /// [`ConfigError::Invalid`] if validation fails.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string, then apply env overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if validation fails.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise start from defaults.
    ///
    /// # Errors
    ///
    /// Same as [`from_file`](Self::from_file) when the file exists.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Self::parse("")
        }
    }

    /// Apply environment variable overrides.
    ///
    /// - `OVERLAY_HOST` overrides `server.host`
    /// - `OVERLAY_PORT` overrides `server.port`
    /// - `OVERLAY_STATIC_DIR` overrides `server.static_dir`
    /// - `OVERLAY_MODE` overrides `overlays.mode`
    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(host) = std::env::var("OVERLAY_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("OVERLAY_PORT") {
            self.server.port = port
                .parse()
                .map_err(|e| ConfigError::Invalid(format!("invalid OVERLAY_PORT: {e}")))?;
        }
        if let Ok(dir) = std::env::var("OVERLAY_STATIC_DIR") {
            self.server.static_dir = dir;
        }
        if let Ok(mode) = std::env::var("OVERLAY_MODE") {
            self.overlays.mode = mode
                .parse()
                .map_err(|e| ConfigError::Invalid(format!("invalid OVERLAY_MODE: {e}")))?;
        }
        Ok(())
    }

    /// Check cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the default poll timeout
    /// exceeds the maximum.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll.default_timeout_ms > self.poll.max_timeout_ms {
            return Err(ConfigError::Invalid(format!(
                "poll.default_timeout_ms ({}) exceeds poll.max_timeout_ms ({})",
                self.poll.default_timeout_ms, self.poll.max_timeout_ms
            )));
        }
        Ok(())
    }
}

/// Listener and static-file settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerSection {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory holding `index.html`, `admin.html`, and static assets.
    #[serde(default = "default_static_dir")]
    pub static_dir: String,

    /// `max-age` for responses under `/static/`.
    #[serde(default = "default_static_max_age_secs")]
    pub static_max_age_secs: u32,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
            static_max_age_secs: default_static_max_age_secs(),
        }
    }
}

/// Toggle policy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct OverlaysSection {
    /// Whether enabling one overlay turns the others off.
    #[serde(default)]
    pub mode: ToggleMode,
}

/// HTTP response shape options.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HttpSection {
    /// Include the new `version` in toggle responses.
    #[serde(default = "default_true")]
    pub include_version: bool,
}

impl Default for HttpSection {
    fn default() -> Self {
        Self {
            include_version: true,
        }
    }
}

/// Long-poll limits.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PollSection {
    /// Wait used when a poll request omits `timeout_ms`.
    #[serde(default = "default_poll_timeout_ms")]
    pub default_timeout_ms: u64,

    /// Upper bound on any requested wait.
    #[serde(default = "default_poll_max_timeout_ms")]
    pub max_timeout_ms: u64,
}

impl Default for PollSection {
    fn default() -> Self {
        Self {
            default_timeout_ms: default_poll_timeout_ms(),
            max_timeout_ms: default_poll_max_timeout_ms(),
        }
    }
}

fn default_host() -> String {
    String::from("0.0.0.0")
}

const fn default_port() -> u16 {
    8000
}

fn default_static_dir() -> String {
    String::from("static")
}

const fn default_static_max_age_secs() -> u32 {
    300
}

const fn default_true() -> bool {
    true
}

const fn default_poll_timeout_ms() -> u64 {
    25_000
}

const fn default_poll_max_timeout_ms() -> u64 {
    60_000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_yaml_yields_defaults() {
        let config = HubConfig::parse("");
        assert!(config.is_ok());
        let config = config.unwrap_or_default();
        assert_eq!(config.poll.default_timeout_ms, 25_000);
        assert_eq!(config.poll.max_timeout_ms, 60_000);
        assert!(config.http.include_version);
        assert_eq!(config.server.static_max_age_secs, 300);
    }

    #[test]
    fn sections_parse_from_yaml() {
        let yaml = r"
overlays:
  mode: independent
http:
  include_version: false
poll:
  default_timeout_ms: 1000
  max_timeout_ms: 2000
";
        let config = serde_yml::from_str::<HubConfig>(yaml);
        assert!(config.is_ok(), "parse failed: {config:?}");
        let config = config.unwrap_or_default();
        assert_eq!(config.overlays.mode, ToggleMode::Independent);
        assert!(!config.http.include_version);
        assert_eq!(config.poll.default_timeout_ms, 1000);
        assert_eq!(config.poll.max_timeout_ms, 2000);
    }

    #[test]
    fn default_timeout_above_max_is_rejected() {
        let mut config = HubConfig::default();
        config.poll.default_timeout_ms = 90_000;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("overlay-hub.yaml");
        if path.exists() {
            let config = HubConfig::from_file(&path);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
        }
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("does-not-exist.yaml");
        assert!(HubConfig::load_or_default(&path).is_ok());
    }
}
