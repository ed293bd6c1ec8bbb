//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.spa-nav/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.
//!
//! [`Settings`] are the manager's construction options. They are fixed once
//! the manager is built; [`SettingsOverrides`] is the sparse form that any
//! source (TOML, JSON, CLI) fills in. Unknown keys are ignored.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::core::link::ClickEventKind;
use crate::fetch::FetchOptions;
use crate::fetch::http::{DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT};

// ============================================================================
// Manager settings
// ============================================================================

pub const DEFAULT_LINKS_SELECTOR: &str = "a";
pub const DEFAULT_START_URL: &str = "http://localhost:8000/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Intercept document clicks at all.
    pub listen_links: bool,
    /// Which clicked elements count as links.
    pub links_selector: String,
    /// Which pointer event activates links.
    pub click_event: ClickEventKind,
}

impl Default for Settings {
    fn default() -> Self {
        Self::for_host(false)
    }
}

impl Settings {
    pub fn for_host(supports_touch: bool) -> Self {
        Self {
            listen_links: true,
            links_selector: DEFAULT_LINKS_SELECTOR.to_string(),
            click_event: ClickEventKind::for_host(supports_touch),
        }
    }

    /// Applies every override that is set, leaving the rest untouched.
    pub fn apply(mut self, overrides: &SettingsOverrides) -> Self {
        if let Some(listen_links) = overrides.listen_links {
            self.listen_links = listen_links;
        }
        if let Some(ref selector) = overrides.links_selector {
            self.links_selector = selector.clone();
        }
        if let Some(click_event) = overrides.click_event {
            self.click_event = click_event;
        }
        self
    }
}

/// Sparse construction options. Field names follow the camelCase option
/// names as well as snake_case so either spelling is accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct SettingsOverrides {
    #[serde(alias = "listenLinks")]
    pub listen_links: Option<bool>,
    #[serde(alias = "linksSelector")]
    pub links_selector: Option<String>,
    #[serde(alias = "clickEvent")]
    pub click_event: Option<ClickEventKind>,
}

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct SpaNavConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub navigation: SettingsOverrides,
    #[serde(default)]
    pub fetch: FetchConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub start_url: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct FetchConfig {
    pub user_agent: Option<String>,
    pub timeout_secs: Option<u64>,
}

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub start_url: String,
    pub settings: Settings,
    pub fetch: FetchOptions,
}

/// Values that came from the command line (None = not specified).
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub start_url: Option<String>,
    pub navigation: SettingsOverrides,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.spa-nav/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".spa-nav").join("config.toml"))
}

/// Load config from `~/.spa-nav/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `SpaNavConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<SpaNavConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(SpaNavConfig::default());
        }
    };

    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(&path);
        return Ok(SpaNavConfig::default());
    }

    let contents = fs::read_to_string(&path).map_err(ConfigError::Io)?;
    let config = parse_config(&contents)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

pub fn parse_config(contents: &str) -> Result<SpaNavConfig, ConfigError> {
    toml::from_str(contents).map_err(ConfigError::Parse)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &PathBuf) {
    let default_content = r#"# spa-nav Configuration
# All settings are optional. Defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# start_url = "http://localhost:8000/"   # Or set SPA_NAV_START_URL

# [navigation]
# listen_links = true                    # Intercept link activations at all
# links_selector = "a"                   # e.g. "a[data-spa], a.internal"
# click_event = "click"                  # "click" or "touchstart"

# [fetch]
# user_agent = "spa-nav/0.1.0"           # Or set SPA_NAV_USER_AGENT
# timeout_secs = 30
"#;

    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            warn!("Failed to create config directory: {}", e);
            return;
        }
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &SpaNavConfig, cli: &CliOverrides) -> ResolvedConfig {
    resolve_with_env(config, cli, |key| std::env::var(key).ok())
}

/// Same as [`resolve`] with an injectable environment lookup.
pub fn resolve_with_env<E>(config: &SpaNavConfig, cli: &CliOverrides, env: E) -> ResolvedConfig
where
    E: Fn(&str) -> Option<String>,
{
    // Start URL: CLI → env → config → default
    let start_url = cli
        .start_url
        .clone()
        .or_else(|| env("SPA_NAV_START_URL"))
        .or_else(|| config.general.start_url.clone())
        .unwrap_or_else(|| DEFAULT_START_URL.to_string());

    // Navigation settings: defaults → config → CLI
    let settings = Settings::default()
        .apply(&config.navigation)
        .apply(&cli.navigation);

    // User agent: env → config → default
    let user_agent = env("SPA_NAV_USER_AGENT")
        .or_else(|| config.fetch.user_agent.clone())
        .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());

    let timeout = Duration::from_secs(config.fetch.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS));

    ResolvedConfig {
        start_url,
        settings,
        fetch: FetchOptions {
            user_agent,
            timeout,
        },
    }
}
