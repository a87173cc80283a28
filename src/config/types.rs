//! Core configuration types and loading.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use super::defaults::{
    default_idle_timeout, default_opers_path, default_quit_grace, default_realname,
    default_reconnect_delay, default_username,
};
use super::validation::{self, ValidationError};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {}", join_errors(.0))]
    Invalid(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Bot configuration.
///
/// ```toml
/// master  = "owner!ident@host.example"
/// nick    = "vanira"
/// channel = "#vanira"
/// server  = "irc.example.net"
/// port    = 6667
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Hostmask of the owner; always the first authorization entry.
    pub master: String,
    /// Nickname to register with.
    pub nick: String,
    /// The one channel the bot joins and guards.
    pub channel: String,
    /// Server hostname or address.
    pub server: String,
    /// Server port.
    pub port: u16,
    /// Local source address to bind before connecting.
    #[serde(default)]
    pub bind: Option<String>,
    /// Connection password sent as PASS.
    #[serde(default)]
    pub password: Option<String>,
    /// Username (ident) sent in USER.
    #[serde(default = "default_username")]
    pub username: String,
    /// Realname sent in USER.
    #[serde(default = "default_realname")]
    pub realname: String,
    /// Path to the authorization list, one hostmask per line.
    #[serde(default = "default_opers_path")]
    pub opers: PathBuf,
    /// Timer configuration.
    #[serde(default)]
    pub timeouts: TimeoutsConfig,
}

/// Timers, in seconds.
#[derive(Debug, Clone, Deserialize)]
pub struct TimeoutsConfig {
    /// Seconds without any inbound data before the link is considered dead (default: 600).
    #[serde(default = "default_idle_timeout")]
    pub idle: u64,

    /// Seconds to wait between connection attempts (default: 30).
    #[serde(default = "default_reconnect_delay")]
    pub reconnect: u64,

    /// Seconds to wait for the server to close the link after QUIT on shutdown (default: 4).
    #[serde(default = "default_quit_grace")]
    pub quit: u64,
}

impl Default for TimeoutsConfig {
    fn default() -> Self {
        Self {
            idle: default_idle_timeout(),
            reconnect: default_reconnect_delay(),
            quit: default_quit_grace(),
        }
    }
}

impl TimeoutsConfig {
    pub fn idle(&self) -> Duration {
        Duration::from_secs(self.idle)
    }

    pub fn reconnect(&self) -> Duration {
        Duration::from_secs(self.reconnect)
    }

    pub fn quit(&self) -> Duration {
        Duration::from_secs(self.quit)
    }
}

/// Who the bot is on the network. Fixed for the lifetime of the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub nick: String,
    pub channel: String,
    pub username: String,
    pub realname: String,
    pub password: Option<String>,
}

/// Where to connect, and from where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
    pub bind: Option<String>,
}

impl Config {
    /// Load and validate configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        validation::validate(&config).map_err(ConfigError::Invalid)?;
        Ok(config)
    }

    pub fn identity(&self) -> Identity {
        Identity {
            nick: self.nick.clone(),
            channel: self.channel.clone(),
            username: self.username.clone(),
            realname: self.realname.clone(),
            password: self.password.clone(),
        }
    }

    pub fn endpoint(&self) -> Endpoint {
        Endpoint {
            host: self.server.clone(),
            port: self.port,
            bind: self.bind.clone(),
        }
    }
}
