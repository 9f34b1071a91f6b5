//! Runtime settings: backend location, request timeout, check debounce.
//!
//! Sources are applied in order, later ones winning:
//!
//! 1. Built-in defaults
//! 2. `$XDG_CONFIG_HOME/cocoa/config.json` (or an explicit file)
//! 3. The `COCOA_API_URL` environment variable
//! 4. Values set on the [`SettingsBuilder`]
//!
//! ```rust
//! use std::time::Duration;
//! use cocoa_core::config::SettingsBuilder;
//!
//! let settings = SettingsBuilder::new()
//!     .without_env()
//!     .without_default_file()
//!     .with_base_url(Some("https://pm.example.org/api".to_string()))
//!     .with_timeout(Some(Duration::from_secs(5)))
//!     .build()?;
//! assert_eq!(settings.base_url, "https://pm.example.org/api");
//! # Ok::<(), cocoa_core::CocoaError>(())
//! ```

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use log::debug;
use serde::Deserialize;

use crate::error::{CocoaError, Result, ResultExt};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Environment variable that overrides the configured base URL.
pub const API_URL_ENV: &str = "COCOA_API_URL";

/// Resolved runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// API root, e.g. `http://localhost:8000/api`
    pub base_url: String,
    /// Applied to every HTTP request; expiry is a transport error
    pub timeout: Duration,
    /// Quiet period before a name check is sent
    pub debounce: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            debounce: DEFAULT_DEBOUNCE,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct SettingsFile {
    base_url: Option<String>,
    timeout_secs: Option<u64>,
    debounce_ms: Option<u64>,
}

/// Builder for resolving [`Settings`].
#[derive(Debug, Clone)]
pub struct SettingsBuilder {
    config_file: Option<PathBuf>,
    base_url: Option<String>,
    timeout: Option<Duration>,
    debounce: Option<Duration>,
    use_env: bool,
    use_default_file: bool,
}

impl SettingsBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config_file: None,
            base_url: None,
            timeout: None,
            debounce: None,
            use_env: true,
            use_default_file: true,
        }
    }

    /// Reads settings from this file instead of the XDG location. Unlike the
    /// XDG file, an explicit file must exist.
    pub fn with_config_file<P: AsRef<Path>>(mut self, path: Option<P>) -> Self {
        if let Some(path) = path {
            self.config_file = Some(path.as_ref().to_path_buf());
        }
        self
    }

    pub fn with_base_url(mut self, base_url: Option<String>) -> Self {
        if base_url.is_some() {
            self.base_url = base_url;
        }
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        if timeout.is_some() {
            self.timeout = timeout;
        }
        self
    }

    pub fn with_debounce(mut self, debounce: Option<Duration>) -> Self {
        if debounce.is_some() {
            self.debounce = debounce;
        }
        self
    }

    /// Ignores `COCOA_API_URL`.
    pub fn without_env(mut self) -> Self {
        self.use_env = false;
        self
    }

    /// Skips the XDG config file lookup.
    pub fn without_default_file(mut self) -> Self {
        self.use_default_file = false;
        self
    }

    /// Resolves the settings.
    ///
    /// # Errors
    ///
    /// Returns `CocoaError::FileSystem` if an explicit config file cannot be
    /// read, `CocoaError::Configuration` if a config file is malformed, and
    /// `CocoaError::InvalidInput` if the resolved values are unusable.
    pub fn build(self) -> Result<Settings> {
        let mut settings = Settings::default();

        let file = match self.config_file {
            Some(path) => Some(path),
            None if self.use_default_file => Self::default_config_file(),
            None => None,
        };
        if let Some(path) = file {
            debug!("Loading settings from {}", path.display());
            apply_file(&mut settings, &path)?;
        }

        if self.use_env {
            if let Ok(url) = std::env::var(API_URL_ENV) {
                if !url.trim().is_empty() {
                    settings.base_url = url.trim().to_string();
                }
            }
        }

        if let Some(base_url) = self.base_url {
            settings.base_url = base_url;
        }
        if let Some(timeout) = self.timeout {
            settings.timeout = timeout;
        }
        if let Some(debounce) = self.debounce {
            settings.debounce = debounce;
        }

        validate_settings(&settings)?;
        Ok(settings)
    }

    /// Returns the XDG config file if one exists:
    /// `$XDG_CONFIG_HOME/cocoa/config.json` or `~/.config/cocoa/config.json`.
    fn default_config_file() -> Option<PathBuf> {
        xdg::BaseDirectories::with_prefix("cocoa").find_config_file("config.json")
    }
}

impl Default for SettingsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn apply_file(settings: &mut Settings, path: &Path) -> Result<()> {
    let contents = std::fs::read_to_string(path).map_err(|e| CocoaError::FileSystem {
        path: path.to_path_buf(),
        source: e,
    })?;
    let file: SettingsFile = serde_json::from_str(&contents)
        .with_context(format!("Invalid config file {}", path.display()))?;

    if let Some(base_url) = file.base_url {
        settings.base_url = base_url;
    }
    if let Some(secs) = file.timeout_secs {
        settings.timeout = Duration::from_secs(secs);
    }
    if let Some(ms) = file.debounce_ms {
        settings.debounce = Duration::from_millis(ms);
    }
    Ok(())
}

fn validate_settings(settings: &Settings) -> Result<()> {
    let url = settings.base_url.trim();
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(CocoaError::invalid_input("base_url")
            .with_reason(format!("'{url}' must start with http:// or https://")));
    }
    if settings.timeout.is_zero() {
        return Err(CocoaError::invalid_input("timeout").with_reason("must be greater than zero"));
    }
    Ok(())
}
