use std::fs;
use std::path::Path;
use std::time::Duration;

use protocol::Acl;
use serde::{Deserialize, Serialize};

pub const DEFAULT_SESSION_TIMEOUT_SECS: u64 = 10;

/// Client configuration, usually loaded from a TOML file.
///
/// `chroot` and `default_acl` configure the client itself; `servers`,
///  `session_timeout_secs` and `allow_read_only` are for building the
///  session it runs on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// `host:port` pairs of the ensemble members
    pub servers: Vec<String>,
    /// root every caller path is resolved under
    #[serde(default)]
    pub chroot: Option<String>,
    #[serde(default = "default_session_timeout_secs")]
    pub session_timeout_secs: u64,
    /// ACL for created nodes when a caller doesn't pass one
    #[serde(default = "default_acl")]
    pub default_acl: Vec<Acl>,
    /// whether the session may settle for a read-only server
    #[serde(default)]
    pub allow_read_only: bool,
}

fn default_session_timeout_secs() -> u64 {
    DEFAULT_SESSION_TIMEOUT_SECS
}

fn default_acl() -> Vec<Acl> {
    vec![Acl::unrestricted()]
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            servers: vec!["localhost:2181".to_string()],
            chroot: None,
            session_timeout_secs: default_session_timeout_secs(),
            default_acl: default_acl(),
            allow_read_only: false,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

impl ClientConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: ClientConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path.as_ref())?;
        tracing::debug!("Loaded config from {}", path.as_ref().display());
        Self::from_toml_str(&contents)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn session_timeout(&self) -> Duration {
        Duration::from_secs(self.session_timeout_secs)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.servers.is_empty() {
            return Err(ConfigError::Invalid("no servers configured".to_string()));
        }
        if let Some(server) = self.servers.iter().find(|server| server.trim().is_empty()) {
            return Err(ConfigError::Invalid(format!("empty server address {:?}", server)));
        }
        if let Some(chroot) = &self.chroot {
            if !chroot.starts_with('/') {
                return Err(ConfigError::Invalid(format!(
                    "chroot must be absolute, got {:?}",
                    chroot
                )));
            }
        }
        if self.session_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "session timeout must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
