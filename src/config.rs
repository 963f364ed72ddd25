//! Configuration for wm-offerwall.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferwallConfig {
    /// Retry policy for the payment prompt.
    #[serde(default)]
    pub retry: RetryPolicy,

    /// Payment verifier configuration.
    #[serde(default)]
    pub verifier: VerifierConfig,

    /// Preview tool server configuration.
    #[serde(default)]
    pub tool: ToolConfig,

    /// Log level.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Bounds for the payment prompt's retry loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Maximum number of attempts before giving up.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// How long each attempt waits for a monetization event, in milliseconds.
    #[serde(default = "default_attempt_timeout_ms")]
    pub attempt_timeout_ms: u64,

    /// Pause after a failed verification, in milliseconds.
    #[serde(default = "default_failure_pause_ms")]
    pub failure_pause_ms: u64,
}

/// Payment verifier configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerifierConfig {
    /// Request timeout for incoming payment lookups, in seconds.
    ///
    /// Unset means the request is bounded only by the HTTP client defaults.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

/// Preview tool server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolConfig {
    /// Address the tool server listens on.
    #[serde(default = "default_listen")]
    pub listen: SocketAddr,

    /// Host of the CDN serving `offerwall.js`, without environment prefix.
    #[serde(default = "default_cdn_host")]
    pub cdn_host: String,
}

impl Default for OfferwallConfig {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            verifier: VerifierConfig::default(),
            tool: ToolConfig::default(),
            log_level: default_log_level(),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            attempt_timeout_ms: default_attempt_timeout_ms(),
            failure_pause_ms: default_failure_pause_ms(),
        }
    }
}

impl RetryPolicy {
    /// Per-attempt wait for a monetization event.
    #[must_use]
    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_millis(self.attempt_timeout_ms)
    }

    /// Pause after a failed verification.
    #[must_use]
    pub fn failure_pause(&self) -> Duration {
        Duration::from_millis(self.failure_pause_ms)
    }
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            cdn_host: default_cdn_host(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

const fn default_max_attempts() -> u32 {
    8
}

const fn default_attempt_timeout_ms() -> u64 {
    3_000
}

const fn default_failure_pause_ms() -> u64 {
    1_000
}

fn default_listen() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8787))
}

fn default_cdn_host() -> String {
    "publisher-tools-cdn.webmonetization.workers.dev".to_string()
}

impl OfferwallConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid configuration.
    pub fn from_toml(content: &str) -> crate::Result<Self> {
        toml::from_str(content).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Render configuration as TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> crate::Result<String> {
        toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Save configuration to a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn to_file(&self, path: &std::path::Path) -> crate::Result<()> {
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }
}
