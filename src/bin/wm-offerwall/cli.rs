//! Command-line interface definition.

use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use wm_offerwall::config::OfferwallConfig;

/// Web Monetization custom offerwall choice and publisher preview tool.
#[derive(Parser, Debug)]
#[command(name = "wm-offerwall")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Command to run.
    #[command(subcommand)]
    pub command: Command,

    /// Maximum number of prompt attempts.
    #[arg(long, global = true, env = "WM_OFFERWALL_MAX_ATTEMPTS")]
    pub max_attempts: Option<u32>,

    /// Per-attempt wait for a monetization event, in milliseconds.
    #[arg(long, global = true, env = "WM_OFFERWALL_ATTEMPT_TIMEOUT_MS")]
    pub attempt_timeout_ms: Option<u64>,

    /// Pause after a failed verification, in milliseconds.
    #[arg(long, global = true, env = "WM_OFFERWALL_FAILURE_PAUSE_MS")]
    pub failure_pause_ms: Option<u64>,

    /// Timeout for incoming payment lookups, in seconds.
    #[arg(long, global = true, env = "WM_OFFERWALL_REQUEST_TIMEOUT_SECS")]
    pub request_timeout_secs: Option<u64>,

    /// Address the preview tool listens on.
    #[arg(long, global = true, env = "WM_OFFERWALL_LISTEN")]
    pub listen: Option<SocketAddr>,

    /// CDN host serving `offerwall.js`, without environment prefix.
    #[arg(long, global = true, env = "WM_OFFERWALL_CDN_HOST")]
    pub cdn_host: Option<String>,

    /// Log level. Overrides `log_level` from the config file.
    #[arg(long, global = true, env = "RUST_LOG")]
    pub log_level: Option<String>,

    /// Path to configuration file.
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,
}

/// Subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Serve the publisher preview tool.
    Serve,

    /// Run the custom choice against monetization events read from stdin.
    ///
    /// Each line is one JSON event in the browser's `MonetizationEvent`
    /// shape. Exits successfully only if access is granted.
    Watch {
        /// `rel` values of the page's `<link>` elements.
        #[arg(long = "link-rel", default_value = "monetization")]
        link_rels: Vec<String>,

        /// Offerwall language code passed to initialization.
        #[arg(long)]
        language: Option<String>,
    },

    /// Print the effective configuration as TOML.
    PrintConfig,
}

impl Cli {
    /// Merge CLI arguments over the configuration file (or defaults).
    ///
    /// # Errors
    ///
    /// Returns an error if a config file is specified but cannot be loaded.
    pub fn to_config(&self) -> color_eyre::Result<OfferwallConfig> {
        let mut config = if let Some(ref path) = self.config {
            OfferwallConfig::from_file(path)?
        } else {
            OfferwallConfig::default()
        };

        if let Some(max_attempts) = self.max_attempts {
            config.retry.max_attempts = max_attempts;
        }
        if let Some(timeout) = self.attempt_timeout_ms {
            config.retry.attempt_timeout_ms = timeout;
        }
        if let Some(pause) = self.failure_pause_ms {
            config.retry.failure_pause_ms = pause;
        }
        if self.request_timeout_secs.is_some() {
            config.verifier.request_timeout_secs = self.request_timeout_secs;
        }
        if let Some(listen) = self.listen {
            config.tool.listen = listen;
        }
        if let Some(ref cdn_host) = self.cdn_host {
            config.tool.cdn_host.clone_from(cdn_host);
        }
        if let Some(ref log_level) = self.log_level {
            config.log_level.clone_from(log_level);
        }

        Ok(config)
    }
}
