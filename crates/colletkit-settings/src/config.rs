//! Configuration management for ColletKit
//!
//! Configuration is organized into sections:
//! - Store settings (hosted project URL, key variable, timeout)
//! - Cache settings (local storage directory and quota)
//! - Admin settings (bootstrap administrators, signed-in identity)
//! - Advisor settings (model, key variable, temperature)
//!
//! Files are JSON or TOML, chosen by extension, and live in the
//! platform configuration directory by default.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{SettingsError, SettingsResult};

const APP_DIR: &str = "colletkit";

/// Administrators seeded on first use
pub const INITIAL_ADMINS: [&str; 3] = [
    "marcelo.sousa@ufg.br",
    "ipelab.suporte@gmail.com",
    "pedrogoncalves@ufg.br",
];

/// Hosted data store settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// Project URL; empty means fallback data only
    pub url: String,
    /// Environment variable holding the project key
    pub api_key_env: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            url: String::new(),
            api_key_env: "SUPABASE_ANON_KEY".to_string(),
            timeout_secs: 10,
        }
    }
}

impl StoreSettings {
    pub fn is_configured(&self) -> bool {
        !self.url.trim().is_empty()
    }

    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
    }
}

/// Local cache settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Storage directory; platform data directory when unset
    pub directory: Option<PathBuf>,
    /// Byte budget of the local storage, unlimited when unset
    pub quota_bytes: Option<usize>,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            directory: None,
            quota_bytes: Some(5 * 1024 * 1024),
        }
    }
}

impl CacheSettings {
    /// Directory the local storage writes to
    pub fn resolve_directory(&self) -> SettingsResult<PathBuf> {
        match &self.directory {
            Some(dir) => Ok(dir.clone()),
            None => dirs::data_local_dir()
                .map(|d| d.join(APP_DIR).join("cache"))
                .ok_or_else(|| {
                    SettingsError::ConfigDirectory("no local data directory".to_string())
                }),
        }
    }
}

/// Administrator settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminSettings {
    /// Seed of the administrator set
    pub bootstrap: Vec<String>,
    /// Email of the signed-in user
    pub identity: Option<String>,
}

impl Default for AdminSettings {
    fn default() -> Self {
        Self {
            bootstrap: INITIAL_ADMINS.iter().map(|s| s.to_string()).collect(),
            identity: None,
        }
    }
}

/// Cutting-parameter advisor settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisorSettings {
    pub model: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    pub temperature: f32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for AdvisorSettings {
    fn default() -> Self {
        Self {
            model: "gemini-3-flash-preview".to_string(),
            api_key_env: "API_KEY".to_string(),
            temperature: 0.2,
            timeout_secs: 30,
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub store: StoreSettings,
    pub cache: CacheSettings,
    pub admin: AdminSettings,
    pub advisor: AdvisorSettings,
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// `<config dir>/colletkit/config.toml`
    pub fn default_path() -> SettingsResult<PathBuf> {
        dirs::config_dir()
            .map(|d| d.join(APP_DIR).join("config.toml"))
            .ok_or_else(|| SettingsError::ConfigDirectory("no config directory".to_string()))
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SettingsError::LoadError(format!("{}: {}", path.display(), e)))?;

        let config: Self = match Format::of(path)? {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Load from a file when it exists, defaults otherwise
    pub fn load_or_default(path: &Path) -> SettingsResult<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            tracing::info!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match Format::of(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)
            .map_err(|e| SettingsError::SaveError(format!("{}: {}", path.display(), e)))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> SettingsResult<()> {
        let url = self.store.url.trim();
        if !url.is_empty() && !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(SettingsError::invalid("store.url", "must be an http(s) URL"));
        }

        if self.store.timeout_secs == 0 {
            return Err(SettingsError::invalid("store.timeout_secs", "must be > 0"));
        }

        if self.store.api_key_env.trim().is_empty() {
            return Err(SettingsError::invalid("store.api_key_env", "must not be empty"));
        }

        if self.cache.quota_bytes == Some(0) {
            return Err(SettingsError::invalid("cache.quota_bytes", "must be > 0"));
        }

        if let Some(email) = self.admin.bootstrap.iter().find(|e| !e.contains('@')) {
            return Err(SettingsError::invalid(
                "admin.bootstrap",
                format!("'{}' is not an email address", email),
            ));
        }

        if self.advisor.model.trim().is_empty() {
            return Err(SettingsError::invalid("advisor.model", "must not be empty"));
        }

        if !(0.0..=2.0).contains(&self.advisor.temperature) {
            return Err(SettingsError::invalid(
                "advisor.temperature",
                "must be between 0 and 2",
            ));
        }

        if self.advisor.timeout_secs == 0 {
            return Err(SettingsError::invalid("advisor.timeout_secs", "must be > 0"));
        }

        Ok(())
    }
}

enum Format {
    Json,
    Toml,
}

impl Format {
    fn of(path: &Path) -> SettingsResult<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Ok(Format::Json),
            Some("toml") => Ok(Format::Toml),
            other => Err(SettingsError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }
}
