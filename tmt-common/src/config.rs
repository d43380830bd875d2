//! Configuration loading and setting resolution
//!
//! Settings resolve in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing config file is not an error: defaults are used and a warning is
//! logged. A config file that exists but cannot be parsed is an error.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_ENV: &str = "TMT_CONFIG";
/// Environment override for the HTTP User-Agent
pub const USER_AGENT_ENV: &str = "TMT_USER_AGENT";
/// Environment override for the discovery result cap
pub const MAX_MAPS_ENV: &str = "TMT_MAX_MAPS";

/// Default HTTP User-Agent sent to both map services
pub const DEFAULT_USER_AGENT: &str = "TMX-Times-Generator/1.0";
/// Default discovery result cap
pub const DEFAULT_MAX_MAPS: usize = 100;
/// Default per-request timeout (seconds)
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
/// Default client-side request rate (requests per second)
pub const DEFAULT_REQUESTS_PER_SECOND: u32 = 4;
/// Default number of leaderboard entries requested per track
pub const DEFAULT_LEADERBOARD_LENGTH: usize = 20;
/// Default number of tracks fetched concurrently
pub const DEFAULT_WORKERS: usize = 4;

/// Configuration file contents
///
/// Every field is optional so that resolution can tell "absent from the
/// file" apart from "set to the default value".
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TomlConfig {
    /// HTTP User-Agent header value
    #[serde(default)]
    pub user_agent: Option<String>,

    /// Maximum number of tracks returned by discovery
    #[serde(default)]
    pub max_maps: Option<usize>,

    /// Per-request timeout in seconds
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    /// Client-side rate limit shared by all requests
    #[serde(default)]
    pub requests_per_second: Option<u32>,

    /// Leaderboard entries requested from trackmania.io
    #[serde(default)]
    pub leaderboard_length: Option<usize>,

    /// Concurrent per-track workers
    #[serde(default)]
    pub workers: Option<usize>,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Values supplied on the command line, all optional
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub user_agent: Option<String>,
    pub max_maps: Option<usize>,
    pub workers: Option<usize>,
}

/// Fully resolved runtime settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub user_agent: String,
    pub max_maps: usize,
    pub request_timeout_secs: u64,
    pub requests_per_second: u32,
    pub leaderboard_length: usize,
    pub workers: usize,
    pub log_level: String,
}

impl Settings {
    /// Resolve every setting from CLI, environment, TOML and defaults
    pub fn resolve(cli: &CliOverrides, toml_config: &TomlConfig) -> Self {
        let user_agent = resolve_setting(
            "user_agent",
            cli.user_agent.clone(),
            USER_AGENT_ENV,
            toml_config.user_agent.clone(),
            DEFAULT_USER_AGENT.to_string(),
        );
        let user_agent = if user_agent.trim().is_empty() {
            warn!("Empty user agent configured, using default");
            DEFAULT_USER_AGENT.to_string()
        } else {
            user_agent
        };

        let max_maps = resolve_setting(
            "max_maps",
            cli.max_maps,
            MAX_MAPS_ENV,
            toml_config.max_maps,
            DEFAULT_MAX_MAPS,
        );
        let max_maps = if max_maps == 0 {
            warn!(default = DEFAULT_MAX_MAPS, "max_maps of 0 would discard every track, using default");
            DEFAULT_MAX_MAPS
        } else {
            max_maps
        };

        Self {
            user_agent,
            max_maps,
            request_timeout_secs: toml_config
                .request_timeout_secs
                .filter(|secs| *secs > 0)
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
            requests_per_second: toml_config
                .requests_per_second
                .filter(|rate| *rate > 0)
                .unwrap_or(DEFAULT_REQUESTS_PER_SECOND),
            leaderboard_length: toml_config
                .leaderboard_length
                .unwrap_or(DEFAULT_LEADERBOARD_LENGTH),
            workers: cli
                .workers
                .or(toml_config.workers)
                .unwrap_or(DEFAULT_WORKERS),
            log_level: toml_config.logging.level.clone(),
        }
    }
}

/// Resolve a single setting: CLI → ENV → TOML → default
///
/// An environment value that fails to parse is ignored with a warning.
pub fn resolve_setting<T>(
    name: &str,
    cli_value: Option<T>,
    env_var_name: &str,
    toml_value: Option<T>,
    default: T,
) -> T
where
    T: FromStr,
{
    // Priority 1: Command-line argument
    if let Some(value) = cli_value {
        debug!(setting = name, "Using command-line value");
        return value;
    }

    // Priority 2: Environment variable
    if let Ok(raw) = std::env::var(env_var_name) {
        match raw.trim().parse::<T>() {
            Ok(value) => {
                debug!(setting = name, env = env_var_name, "Using environment value");
                return value;
            }
            Err(_) => warn!(
                setting = name,
                env = env_var_name,
                value = %raw,
                "Ignoring unparseable environment value"
            ),
        }
    }

    // Priority 3: TOML config file
    if let Some(value) = toml_value {
        debug!(setting = name, "Using TOML value");
        return value;
    }

    // Priority 4: Compiled default
    default
}

/// Load configuration
///
/// Path priority: explicit argument, then `TMT_CONFIG`, then the
/// platform config directory (`<config_dir>/tmt/config.toml`).
pub fn load_config(explicit_path: Option<&Path>) -> Result<TomlConfig> {
    let path = match explicit_path {
        Some(path) => {
            if !path.exists() {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            path.to_path_buf()
        }
        None => match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => PathBuf::from(path),
            Err(_) => match default_config_path() {
                Some(path) => path,
                None => {
                    warn!("Could not determine config directory, using defaults");
                    return Ok(TomlConfig::default());
                }
            },
        },
    };

    if !path.exists() {
        warn!(path = %path.display(), "Config file not found, using defaults");
        return Ok(TomlConfig::default());
    }

    let config = read_toml_config(&path)?;
    info!(path = %path.display(), "Loaded configuration");
    Ok(config)
}

/// Parse a TOML config file
pub fn read_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    let config = toml::from_str(&content)?;
    Ok(config)
}

/// Default config file location for the platform
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("tmt").join("config.toml"))
}
