//! Configuration file parsing and management.
//!
//! This module loads TOML configuration files, merges them with precedence
//! rules, and reads `DW_*` environment variables.

use crate::error::DomainWatchdogError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Configuration loaded from TOML files.
///
/// ```toml
/// [defaults]
/// domains = ["example.com", "example.net"]
/// concurrency = 5
/// timeout = "15s"
///
/// [servers]
/// de = "whois.denic.de"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct FileConfig {
    /// Default values for CLI options
    #[serde(skip_serializing_if = "Option::is_none")]
    pub defaults: Option<DefaultsConfig>,

    /// TLD -> WHOIS server overrides
    #[serde(skip_serializing_if = "Option::is_none")]
    pub servers: Option<HashMap<String, String>>,
}

/// Default configuration values that map to CLI options.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct DefaultsConfig {
    /// Domains to watch when none are given on the command line
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domains: Option<Vec<String>>,

    /// Default concurrency level
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concurrency: Option<usize>,

    /// Default timeout (as string, e.g., "5s", "30s")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,

    /// Default JSON output
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json: Option<bool>,
}

/// Configuration discovery and loading functionality.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigManager;

impl ConfigManager {
    /// Create a new configuration manager.
    pub fn new() -> Self {
        Self
    }

    /// Load and validate configuration from a specific file.
    pub fn load_file<P: AsRef<Path>>(&self, path: P) -> Result<FileConfig, DomainWatchdogError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(DomainWatchdogError::file_error(
                path.to_string_lossy(),
                "Configuration file not found",
            ));
        }

        let content = fs::read_to_string(path).map_err(|e| {
            DomainWatchdogError::file_error(
                path.to_string_lossy(),
                format!("Failed to read configuration file: {}", e),
            )
        })?;

        let config: FileConfig = toml::from_str(&content)?;
        self.validate_config(&config)?;

        debug!(path = %path.display(), "Loaded configuration file");

        Ok(config)
    }

    /// Discover and load configuration files in precedence order.
    ///
    /// XDG config < global config < local config. A file that fails to
    /// load is skipped with a warning.
    pub fn discover_and_load(&self) -> Result<FileConfig, DomainWatchdogError> {
        let candidates = [
            self.get_xdg_config_path(),
            self.get_global_config_path(),
            self.get_local_config_path(),
        ];

        Ok(self.load_layered(candidates.into_iter().flatten()))
    }

    /// Load files from lowest to highest precedence and merge them.
    fn load_layered<I: IntoIterator<Item = PathBuf>>(&self, paths: I) -> FileConfig {
        let mut merged_config = FileConfig::default();

        for path in paths {
            match self.load_file(&path) {
                Ok(config) => merged_config = self.merge_configs(merged_config, config),
                Err(e) => warn!(path = %path.display(), error = %e, "Ignoring config file"),
            }
        }

        merged_config
    }

    /// Look for configuration files in the current directory.
    fn get_local_config_path(&self) -> Option<PathBuf> {
        let candidates = ["./domain-watchdog.toml", "./.domain-watchdog.toml"];

        candidates
            .iter()
            .map(Path::new)
            .find(|path| path.exists())
            .map(Path::to_path_buf)
    }

    /// Look for configuration files in the user's home directory.
    fn get_global_config_path(&self) -> Option<PathBuf> {
        let home = env::var_os("HOME")?;
        let candidates = [".domain-watchdog.toml", "domain-watchdog.toml"];

        candidates
            .iter()
            .map(|candidate| Path::new(&home).join(candidate))
            .find(|path| path.exists())
    }

    /// Follows the XDG Base Directory Specification.
    fn get_xdg_config_path(&self) -> Option<PathBuf> {
        let config_dir = env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| env::var_os("HOME").map(|home| Path::new(&home).join(".config")))?;

        let path = config_dir.join("domain-watchdog").join("config.toml");
        if path.exists() {
            Some(path)
        } else {
            None
        }
    }

    /// Merge two configurations. Values from `higher` win.
    fn merge_configs(&self, lower: FileConfig, higher: FileConfig) -> FileConfig {
        FileConfig {
            defaults: match (lower.defaults, higher.defaults) {
                (Some(mut lower_defaults), Some(higher_defaults)) => {
                    if higher_defaults.domains.is_some() {
                        lower_defaults.domains = higher_defaults.domains;
                    }
                    if higher_defaults.concurrency.is_some() {
                        lower_defaults.concurrency = higher_defaults.concurrency;
                    }
                    if higher_defaults.timeout.is_some() {
                        lower_defaults.timeout = higher_defaults.timeout;
                    }
                    if higher_defaults.json.is_some() {
                        lower_defaults.json = higher_defaults.json;
                    }
                    Some(lower_defaults)
                }
                (lower_defaults, higher_defaults) => higher_defaults.or(lower_defaults),
            },
            servers: match (lower.servers, higher.servers) {
                (Some(mut lower_servers), Some(higher_servers)) => {
                    lower_servers.extend(higher_servers);
                    Some(lower_servers)
                }
                (lower_servers, higher_servers) => higher_servers.or(lower_servers),
            },
        }
    }

    /// Validate a configuration for common issues.
    fn validate_config(&self, config: &FileConfig) -> Result<(), DomainWatchdogError> {
        if let Some(defaults) = &config.defaults {
            if let Some(concurrency) = defaults.concurrency {
                if concurrency == 0 || concurrency > 100 {
                    return Err(DomainWatchdogError::config(
                        "Concurrency must be between 1 and 100",
                    ));
                }
            }

            if let Some(timeout_str) = &defaults.timeout {
                if parse_timeout_string(timeout_str).is_none() {
                    return Err(DomainWatchdogError::config(format!(
                        "Invalid timeout format '{}'. Use format like '5s', '30s', '2m'",
                        timeout_str
                    )));
                }
            }
        }

        if let Some(servers) = &config.servers {
            for (tld, server) in servers {
                if tld.is_empty() || tld.contains('.') || tld.contains(' ') {
                    return Err(DomainWatchdogError::config(format!(
                        "Invalid TLD '{}' in [servers]",
                        tld
                    )));
                }
                if server.trim().is_empty() {
                    return Err(DomainWatchdogError::config(format!(
                        "WHOIS server for '{}' cannot be empty",
                        tld
                    )));
                }
            }
        }

        Ok(())
    }
}

/// Environment variable configuration that mirrors CLI options.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnvConfig {
    pub domains: Option<Vec<String>>,
    pub concurrency: Option<usize>,
    pub timeout: Option<String>,
    pub json: Option<bool>,
    pub config: Option<String>,
}

/// Load configuration from `DW_*` environment variables.
///
/// Invalid values are logged as warnings and ignored.
pub fn load_env_config() -> EnvConfig {
    env_config_from(|key| env::var(key).ok())
}

/// Build an [`EnvConfig`] from any variable lookup.
fn env_config_from<F>(lookup: F) -> EnvConfig
where
    F: Fn(&str) -> Option<String>,
{
    let mut env_config = EnvConfig::default();

    // DW_DOMAINS - comma-separated domain list
    if let Some(list) = lookup("DW_DOMAINS") {
        let domains = crate::utils::split_domain_list(&list);
        if !domains.is_empty() {
            env_config.domains = Some(domains);
        }
    }

    // DW_CONCURRENCY - concurrent lookups
    if let Some(val) = lookup("DW_CONCURRENCY") {
        match val.trim().parse::<usize>() {
            Ok(concurrency) if (1..=100).contains(&concurrency) => {
                env_config.concurrency = Some(concurrency);
            }
            _ => warn!(value = %val, "Invalid DW_CONCURRENCY, must be 1-100"),
        }
    }

    // DW_TIMEOUT - per-step network timeout
    if let Some(timeout_str) = lookup("DW_TIMEOUT") {
        if parse_timeout_string(&timeout_str).is_some() {
            env_config.timeout = Some(timeout_str);
        } else {
            warn!(value = %timeout_str, "Invalid DW_TIMEOUT, use format like '5s', '30s', '2m'");
        }
    }

    // DW_JSON - JSON output
    if let Some(val) = lookup("DW_JSON") {
        env_config.json = parse_bool(&val);
        if env_config.json.is_none() {
            warn!(value = %val, "Invalid DW_JSON, use true/false");
        }
    }

    // DW_CONFIG - explicit config file
    if let Some(path) = lookup("DW_CONFIG") {
        if !path.trim().is_empty() {
            env_config.config = Some(path);
        }
    }

    env_config
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a timeout string like "5s", "30s", "2m" into seconds.
///
/// A bare number is read as seconds. Zero is rejected.
pub fn parse_timeout_string(timeout_str: &str) -> Option<u64> {
    let timeout_str = timeout_str.trim().to_lowercase();

    let secs = if let Some(secs) = timeout_str.strip_suffix('s') {
        secs.parse::<u64>().ok()
    } else if let Some(mins) = timeout_str.strip_suffix('m') {
        mins.parse::<u64>().ok().and_then(|m| m.checked_mul(60))
    } else {
        timeout_str.parse::<u64>().ok()
    };

    secs.filter(|&s| s > 0)
}
