//! Configuration for the credentials panel
//!
//! A single JSON document holds the mock login server settings, the sign-on
//! helper's TLS trust settings and the list of account providers. Missing
//! files fall back to defaults; a few environment variables override the
//! values that test rigs usually need to change.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::accounts::Provider;
use crate::error::{ConfigError, ConfigResult};

/// Port the mock login server listens on unless told otherwise
pub const DEFAULT_SERVER_PORT: u16 = 5120;

/// Certificate the mock login server presents
pub const DEFAULT_SERVER_CERTIFICATE: &str = "/etc/ssl/certs/uoa-test-server.pem";

pub const ENV_CONFIG_PATH: &str = "CREDENTIALS_PANEL_CONFIG";
pub const ENV_SERVER_PORT: &str = "CREDENTIALS_PANEL_SERVER_PORT";
pub const ENV_SERVER_CERT: &str = "CREDENTIALS_PANEL_SERVER_CERT";
pub const ENV_CA_CERT: &str = "CREDENTIALS_PANEL_CA_CERT";

/// Mock login server settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MockServerConfig {
    pub host: String,
    /// 0 lets the OS pick a free port
    pub port: u16,
    /// PEM file holding the certificate chain followed by the private key
    pub certificate_path: PathBuf,
}

impl Default for MockServerConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: DEFAULT_SERVER_PORT,
            certificate_path: PathBuf::from(DEFAULT_SERVER_CERTIFICATE),
        }
    }
}

impl MockServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Sign-on helper settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignonConfig {
    /// Extra CA certificate trusted when talking to providers
    pub ca_certificate_path: Option<PathBuf>,
    pub request_timeout_secs: u64,
}

impl Default for SignonConfig {
    fn default() -> Self {
        Self {
            ca_certificate_path: None,
            request_timeout_secs: 30,
        }
    }
}

impl SignonConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Complete panel configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    pub server: MockServerConfig,
    pub signon: SignonConfig,
    pub providers: Vec<Provider>,
    /// Where accounts are persisted; `None` keeps them in memory only
    pub accounts_dir: Option<PathBuf>,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            server: MockServerConfig::default(),
            signon: SignonConfig::default(),
            providers: vec![Provider::fake_oauth(DEFAULT_SERVER_PORT)],
            accounts_dir: None,
        }
    }
}

impl PanelConfig {
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: PanelConfig = serde_json::from_str(json).map_err(|e| ConfigError::FileError {
            path: "<inline>".to_string(),
            error: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load configuration from `path`, or defaults when the file does not exist
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            debug!("No configuration at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::FileError {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        let config: PanelConfig = serde_json::from_str(&content).map_err(|e| ConfigError::FileError {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from the default location and apply environment overrides
    pub fn load() -> ConfigResult<Self> {
        let mut config = Self::load_from(&default_config_path())?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        let json = self.to_json().map_err(|e| ConfigError::FileError {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| ConfigError::FileError {
                    path: parent.display().to_string(),
                    error: e.to_string(),
                })?;
            }
        }
        fs::write(path, json).map_err(|e| ConfigError::FileError {
            path: path.display().to_string(),
            error: e.to_string(),
        })
    }

    pub fn apply_env_overrides(&mut self) -> ConfigResult<()> {
        if let Ok(port) = std::env::var(ENV_SERVER_PORT) {
            self.server.port = port.parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::EnvironmentError {
                    variable: ENV_SERVER_PORT.to_string(),
                    error: e.to_string(),
                }
            })?;
        }
        if let Ok(cert) = std::env::var(ENV_SERVER_CERT) {
            self.server.certificate_path = PathBuf::from(cert);
        }
        if let Ok(ca) = std::env::var(ENV_CA_CERT) {
            self.signon.ca_certificate_path = Some(PathBuf::from(ca));
        }
        Ok(())
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.server.host.trim().is_empty() {
            return Err(ConfigError::InvalidParameter {
                parameter: "server.host".to_string(),
                value: self.server.host.clone(),
                reason: "host must not be empty".to_string(),
            });
        }

        let mut seen = HashSet::new();
        for provider in &self.providers {
            if provider.name.trim().is_empty() {
                return Err(ConfigError::InvalidParameter {
                    parameter: "providers.name".to_string(),
                    value: provider.name.clone(),
                    reason: "provider name must not be empty".to_string(),
                });
            }
            if !seen.insert(provider.name.as_str()) {
                return Err(ConfigError::InvalidParameter {
                    parameter: "providers.name".to_string(),
                    value: provider.name.clone(),
                    reason: "duplicate provider".to_string(),
                });
            }
            if let Err(e) = url::Url::parse(&provider.oauth.authorization_url) {
                warn!("Provider {} has an unusable authorization URL: {e}", provider.name);
                return Err(ConfigError::InvalidParameter {
                    parameter: format!("providers.{}.oauth.authorization_url", provider.name),
                    value: provider.oauth.authorization_url.clone(),
                    reason: e.to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn provider(&self, name: &str) -> Option<&Provider> {
        self.providers.iter().find(|p| p.name == name)
    }
}

/// Platform-appropriate default config file path.
/// Priority:
/// 1) CREDENTIALS_PANEL_CONFIG env var
/// 2) the user's config dir, e.g. ~/.config/credentials-panel/config.json
/// 3) ./config.json
pub fn default_config_path() -> PathBuf {
    if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
        return PathBuf::from(p);
    }

    dirs::config_dir()
        .map(|dir| dir.join("credentials-panel").join("config.json"))
        .unwrap_or_else(|| PathBuf::from("config.json"))
}

/// Default directory for persisted accounts
pub fn default_accounts_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("credentials-panel")
        .join("accounts")
}
