use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use url::Url;

use crate::consts::{APP_NAME, DEFAULT_SERVICE, DEFAULT_TIMEOUT_SECS};
use crate::error::PortalError;
use crate::signing::Credentials;

#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub(crate) enum ConfigColorMode {
    Auto,
    Always,
    Never,
}

/// Contents of `config.toml`; every field is optional
#[derive(Debug, Default, Deserialize)]
pub(crate) struct Config {
    #[serde(default)]
    pub(crate) list_endpoint: Option<String>,
    #[serde(default)]
    pub(crate) download_endpoint: Option<String>,
    #[serde(default)]
    pub(crate) region: Option<String>,
    #[serde(default)]
    pub(crate) service: Option<String>,
    #[serde(default)]
    pub(crate) signed: bool,
    #[serde(default)]
    pub(crate) timeout_secs: Option<u64>,
    #[serde(default)]
    pub(crate) json: bool,
    #[serde(default)]
    pub(crate) color: Option<ConfigColorMode>,
    #[serde(default)]
    pub(crate) credentials: Option<Credentials>,
}

impl Config {
    pub(crate) fn load() -> Self {
        for path in Self::get_config_paths() {
            if path.exists()
                && let Some(config) = Self::load_from(&path)
            {
                return config;
            }
        }
        Self::default()
    }

    /// Parse one config file; unreadable or invalid files are skipped with a warning
    pub(crate) fn load_from(path: &Path) -> Option<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("Failed to read {}: {}", path.display(), e);
                return None;
            }
        };
        match toml::from_str::<Config>(&content) {
            Ok(config) => {
                tracing::debug!("Loaded config from {}", path.display());
                Some(config)
            }
            Err(e) => {
                tracing::warn!("Failed to parse {}: {}", path.display(), e);
                None
            }
        }
    }

    fn get_config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        // 1. XDG config: ~/.config/sessions-portal/config.toml
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".config").join(APP_NAME).join("config.toml"));
        }

        // 2. Platform config dir (macOS Application Support, Windows AppData)
        if let Some(config_dir) = dirs::config_dir() {
            let platform_path = config_dir.join(APP_NAME).join("config.toml");
            if !paths.contains(&platform_path) {
                paths.push(platform_path);
            }
        }

        // 3. Home directory: ~/.sessions-portal.toml
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(format!(".{APP_NAME}.toml")));
        }

        paths
    }
}

/// Resolved settings handed to the fetcher and resolver.
///
/// Endpoints are kept as raw strings and validated when used, so a missing
/// or broken value only fails the operation that needs it.
#[derive(Debug, Clone)]
pub(crate) struct PortalConfig {
    pub(crate) list_endpoint: Option<String>,
    pub(crate) download_endpoint: Option<String>,
    pub(crate) region: Option<String>,
    pub(crate) service: String,
    pub(crate) use_signed_requests: bool,
    pub(crate) timeout: Duration,
}

impl Default for PortalConfig {
    fn default() -> Self {
        PortalConfig {
            list_endpoint: None,
            download_endpoint: None,
            region: None,
            service: DEFAULT_SERVICE.to_string(),
            use_signed_requests: false,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_endpoint(raw: &str) -> Result<Url, PortalError> {
    Url::parse(raw).map_err(|e| PortalError::InvalidUrl {
        input: raw.to_string(),
        reason: e.to_string(),
    })
}

impl PortalConfig {
    pub(crate) fn list_endpoint(&self) -> Result<Url, PortalError> {
        let raw = non_blank(&self.list_endpoint)
            .ok_or(PortalError::ConfigurationMissing("list endpoint"))?;
        parse_endpoint(raw)
    }

    pub(crate) fn download_endpoint(&self) -> Result<Url, PortalError> {
        let raw = non_blank(&self.download_endpoint)
            .ok_or(PortalError::ConfigurationMissing("download endpoint"))?;
        parse_endpoint(raw)
    }

    pub(crate) fn has_download_endpoint(&self) -> bool {
        non_blank(&self.download_endpoint).is_some()
    }

    /// Identity of the fetch target; a change means in-flight loads are stale
    pub(crate) fn target_key(&self) -> String {
        format!(
            "{}|{}|{}",
            self.list_endpoint.as_deref().unwrap_or_default(),
            self.use_signed_requests,
            self.region.as_deref().unwrap_or_default()
        )
    }
}
