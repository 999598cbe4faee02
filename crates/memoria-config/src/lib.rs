//! Configuration management for Memoria.
//!
//! Parses `memoria.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `api.base_url`
//! - `api.admin_token`

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// CLI settings that override configuration file values.
///
/// Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override API base URL.
    pub base_url: Option<String>,
    /// Override administrator token.
    pub admin_token: Option<String>,
    /// Override request timeout.
    pub timeout_secs: Option<u64>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "memoria.toml";

/// Largest page size accepted for either listing.
const MAX_PAGE_SIZE: u32 = 100;

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Remote comment API.
    pub api: ApiConfig,
    /// Comment panel behavior.
    pub comments: CommentsConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Remote API configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Server root; requests go to `{base_url}/api/...`.
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Bearer token for moderation endpoints. Empty means unset.
    pub admin_token: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_owned(),
            timeout_secs: 30,
            admin_token: None,
        }
    }
}

impl ApiConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Comment panel configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CommentsConfig {
    /// Comments per page on the public panel.
    pub page_size: u32,
    /// Comments per page on the moderation panel.
    pub admin_page_size: u32,
    /// Local access-session lifetime when the server does not report one.
    pub session_ttl_secs: u64,
}

impl Default for CommentsConfig {
    fn default() -> Self {
        Self {
            page_size: 10,
            admin_page_size: 20,
            session_ttl_secs: 120,
        }
    }
}

impl CommentsConfig {
    #[must_use]
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`api.admin_token`").
        field: String,
        /// Error message (e.g., "${`MEMORIA_ADMIN_TOKEN`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

fn require_page_size(value: u32, field: &str) -> Result<(), ConfigError> {
    if value == 0 || value > MAX_PAGE_SIZE {
        return Err(ConfigError::Validation(format!(
            "{field} must be between 1 and {MAX_PAGE_SIZE}"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `memoria.toml` in current directory and parents,
    /// falling back to defaults.
    ///
    /// CLI settings are applied after loading, then the result is validated.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing or
    /// expansion fails, or the final values are invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        config.validate()?;
        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(base_url) = &settings.base_url {
            self.api.base_url.clone_from(base_url);
        }
        if let Some(token) = &settings.admin_token {
            self.api.admin_token = Some(token.clone()).filter(|t| !t.is_empty());
        }
        if let Some(timeout_secs) = settings.timeout_secs {
            self.api.timeout_secs = timeout_secs;
        }
    }

    /// Get the administrator token required by moderation commands.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if no token is configured.
    pub fn require_admin_token(&self) -> Result<&str, ConfigError> {
        self.api
            .admin_token
            .as_deref()
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                ConfigError::Validation(
                    "api.admin_token required for moderation (set MEMORIA_ADMIN_TOKEN)".into(),
                )
            })
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_api()?;
        self.validate_comments()?;
        Ok(())
    }

    fn validate_api(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.api.base_url, "api.base_url")?;
        require_http_url(&self.api.base_url, "api.base_url")?;
        if self.api.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "api.timeout_secs must be greater than 0".to_owned(),
            ));
        }
        Ok(())
    }

    fn validate_comments(&self) -> Result<(), ConfigError> {
        require_page_size(self.comments.page_size, "comments.page_size")?;
        require_page_size(self.comments.admin_page_size, "comments.admin_page_size")?;
        if self.comments.session_ttl_secs == 0 {
            return Err(ConfigError::Validation(
                "comments.session_ttl_secs must be greater than 0".to_owned(),
            ));
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.api.base_url = expand::expand_env(&self.api.base_url, "api.base_url")?;
        self.api.admin_token = match self.api.admin_token.take() {
            Some(token) => {
                Some(expand::expand_env(&token, "api.admin_token")?).filter(|t| !t.is_empty())
            }
            None => None,
        };
        Ok(())
    }
}
