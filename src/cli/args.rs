//! CLI argument definitions
//!
//! Global CLI options and configuration merging logic.

use std::io::IsTerminal;
use std::time::Duration;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, ValueEnum};

use crate::config::{Config, ConfigColorMode, PortalConfig};
use crate::consts::{DEFAULT_SERVICE, DEFAULT_TIMEOUT_SECS};

use super::commands::Commands;

#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq)]
pub(crate) enum ColorMode {
    /// Auto-detect based on terminal (default)
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "sessions-portal")]
#[command(about = "List, inspect and download recording sessions", version)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Option<Commands>,

    /// Session list endpoint
    #[arg(long, global = true, value_name = "URL", env = "SESSIONS_API_URL")]
    pub(crate) api_url: Option<String>,

    /// Download resolution endpoint
    #[arg(long, global = true, value_name = "URL", env = "SESSIONS_DOWNLOAD_URL")]
    pub(crate) download_url: Option<String>,

    /// Region used for request signing
    #[arg(long, global = true, env = "SESSIONS_REGION")]
    pub(crate) region: Option<String>,

    /// Service name used for request signing [default: lambda]
    #[arg(long, global = true, value_name = "NAME")]
    pub(crate) service: Option<String>,

    /// Sign requests with AWS SigV4 using credentials from the environment
    #[arg(long, global = true, env = "SESSIONS_SIGNED")]
    pub(crate) signed: bool,

    /// HTTP timeout in seconds [default: 30]
    #[arg(long, global = true, value_name = "SECS")]
    pub(crate) timeout: Option<u64>,

    /// Output as JSON
    #[arg(short, long, global = true)]
    pub(crate) json: bool,

    /// Reload the session list every SECS seconds
    #[arg(long, value_name = "SECS")]
    pub(crate) watch: Option<u64>,

    /// Color output mode
    #[arg(long, global = true, value_enum, default_value = "auto")]
    pub(crate) color: ColorMode,

    /// Disable colored output (shorthand for --color=never)
    #[arg(long, global = true)]
    pub(crate) no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub(crate) debug: bool,
}

impl Cli {
    /// Merge config file values into CLI (CLI args take precedence)
    pub(crate) fn with_config(mut self, config: &Config) -> Self {
        if !self.signed && config.signed {
            self.signed = true;
        }
        if !self.json && config.json {
            self.json = true;
        }

        if let Some(color) = config.color
            && self.color == ColorMode::Auto
        {
            self.color = match color {
                ConfigColorMode::Auto => ColorMode::Auto,
                ConfigColorMode::Always => ColorMode::Always,
                ConfigColorMode::Never => ColorMode::Never,
            };
        }

        if self.api_url.is_none() {
            self.api_url = config.list_endpoint.clone();
        }
        if self.download_url.is_none() {
            self.download_url = config.download_endpoint.clone();
        }
        if self.region.is_none() {
            self.region = config.region.clone();
        }
        if self.service.is_none() {
            self.service = config.service.clone();
        }
        if self.timeout.is_none() {
            self.timeout = config.timeout_secs;
        }

        self
    }

    pub(crate) fn portal_config(&self) -> PortalConfig {
        PortalConfig {
            list_endpoint: self.api_url.clone(),
            download_endpoint: self.download_url.clone(),
            region: self.region.clone(),
            service: self
                .service
                .clone()
                .unwrap_or_else(|| DEFAULT_SERVICE.to_string()),
            use_signed_requests: self.signed,
            timeout: Duration::from_secs(self.timeout.unwrap_or(DEFAULT_TIMEOUT_SECS)),
        }
    }

    /// Reject flag combinations clap cannot express on its own
    pub(crate) fn validate(&self) -> Result<(), clap::Error> {
        if self.watch.is_some() && !matches!(self.command, None | Some(Commands::List)) {
            return Err(Cli::command().error(
                ErrorKind::ArgumentConflict,
                "--watch only applies to listing sessions",
            ));
        }
        Ok(())
    }

    pub(crate) fn use_color(&self) -> bool {
        if self.no_color {
            return false;
        }
        match self.color {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Auto => std::io::stdout().is_terminal(),
        }
    }
}
