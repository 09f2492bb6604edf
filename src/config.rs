//! Link configuration loaded from environment variables.
//!
//! All settings come from environment variables (or a `.env` file via
//! `dotenvy`); the binary then applies command-line overrides on top.
//! Validation errors here are the only fatal errors the bridge knows.

use std::time::Duration;

use crate::error::LinkError;
use crate::framing::SharedSecret;

/// Default WebSocket port of the controller.
pub const DEFAULT_PORT: u16 = 80;

/// Default WebSocket path served by the controller.
pub const DEFAULT_PATH: &str = "/ws";

/// Default delay between a failed session and the next connect attempt.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Target of the duplex link: `ws://host:port/path`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Host name or IP literal of the controller.
    pub host: String,
    /// TCP port.
    pub port: u16,
    /// Request path, always starting with `/`.
    pub path: String,
}

impl Endpoint {
    /// Builds and validates an endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::Config`] if the host is empty or contains
    /// whitespace or `/`, the port is zero, or the path does not start
    /// with `/`.
    pub fn new(host: impl Into<String>, port: u16, path: impl Into<String>) -> Result<Self, LinkError> {
        let host = host.into();
        let path = path.into();

        if host.is_empty() {
            return Err(LinkError::Config("target host is empty".to_string()));
        }
        if host.chars().any(|c| c.is_whitespace() || c == '/') {
            return Err(LinkError::Config(format!("invalid target host: {host:?}")));
        }
        if port == 0 {
            return Err(LinkError::Config("target port must be non-zero".to_string()));
        }
        if !path.starts_with('/') {
            return Err(LinkError::Config(format!("path must start with '/': {path:?}")));
        }

        Ok(Self { host, port, path })
    }

    /// Returns the `ws://` URI for this endpoint. IPv6 literals are
    /// bracketed.
    #[must_use]
    pub fn uri(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("ws://[{}]:{}{}", self.host, self.port, self.path)
        } else {
            format!("ws://{}:{}{}", self.host, self.port, self.path)
        }
    }
}

/// Top-level bridge configuration.
///
/// Loaded once at startup via [`LinkConfig::from_env`].
#[derive(Debug, Clone)]
pub struct LinkConfig {
    /// Controller endpoint.
    pub endpoint: Endpoint,

    /// Pre-shared secret; `None` sends commands unauthenticated.
    pub secret: Option<SharedSecret>,

    /// Fixed wait between sessions.
    pub reconnect_delay: Duration,
}

/// Raw settings gathered from the environment and the command line
/// before validation. `None` falls back to the defaults.
#[derive(Debug, Clone, Default)]
pub struct RawSettings {
    /// Target host.
    pub host: Option<String>,
    /// Target port.
    pub port: Option<u16>,
    /// WebSocket path.
    pub path: Option<String>,
    /// Shared secret.
    pub secret: Option<String>,
    /// Reconnect delay in seconds.
    pub reconnect_delay_secs: Option<u64>,
}

impl RawSettings {
    /// Reads settings through `lookup`, which maps a variable name to its
    /// value.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::Config`] if a numeric variable is set but does
    /// not parse.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, LinkError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            host: lookup("SAUNA_HOST"),
            port: parse_var(&lookup, "SAUNA_PORT")?,
            path: lookup("SAUNA_WS_PATH"),
            secret: lookup("SAUNA_SECRET"),
            reconnect_delay_secs: parse_var(&lookup, "SAUNA_RECONNECT_DELAY_SECS")?,
        })
    }

    /// Overlays `other` on top of `self`; values set in `other` win.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self {
            host: other.host.or(self.host),
            port: other.port.or(self.port),
            path: other.path.or(self.path),
            secret: other.secret.or(self.secret),
            reconnect_delay_secs: other.reconnect_delay_secs.or(self.reconnect_delay_secs),
        }
    }
}

impl LinkConfig {
    /// Loads configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::Config`] if the resulting settings are invalid.
    pub fn from_env() -> Result<Self, LinkError> {
        Self::from_env_with_overrides(RawSettings::default())
    }

    /// Loads configuration from environment variables, then applies
    /// `overrides` (typically command-line arguments) on top.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::Config`] if an environment variable does not
    /// parse or the merged settings are invalid.
    pub fn from_env_with_overrides(overrides: RawSettings) -> Result<Self, LinkError> {
        dotenvy::dotenv().ok();
        let env = RawSettings::from_lookup(|key| std::env::var(key).ok())?;
        Self::from_settings(env.merge(overrides))
    }

    /// Validates raw settings into a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::Config`] if the host is missing, the endpoint
    /// is invalid, or the secret is present but empty.
    pub fn from_settings(raw: RawSettings) -> Result<Self, LinkError> {
        let Some(host) = raw.host else {
            return Err(LinkError::Config(
                "target host is required (argument or SAUNA_HOST)".to_string(),
            ));
        };

        let endpoint = Endpoint::new(
            host,
            raw.port.unwrap_or(DEFAULT_PORT),
            raw.path.unwrap_or_else(|| DEFAULT_PATH.to_string()),
        )?;

        let secret = raw.secret.map(SharedSecret::new).transpose()?;

        let reconnect_delay = raw
            .reconnect_delay_secs
            .map_or(DEFAULT_RECONNECT_DELAY, Duration::from_secs);

        Ok(Self {
            endpoint,
            secret,
            reconnect_delay,
        })
    }
}

/// Parses a variable as `T`. A missing variable is `None`; a present one
/// that does not parse is an error.
fn parse_var<F, T>(lookup: &F, key: &str) -> Result<Option<T>, LinkError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    lookup(key)
        .map(|v| {
            v.trim()
                .parse()
                .map_err(|_| LinkError::Config(format!("invalid {key}: {v:?}")))
        })
        .transpose()
}
