//! Daemon configuration: TOML file with full defaults.
//!
//! Lookup order: `$HOTPLUGD_CONFIG` (must exist), then
//! [`DEFAULT_CONFIG_PATH`] (optional), then built-in defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::errors::{HotplugError, Result};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "HOTPLUGD_CONFIG";

/// Config file read when no override is given.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/hotplugd.toml";

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Detach from the controlling terminal after the socket is bound.
    pub daemonize: bool,
    /// Filesystem locations and external programs.
    pub paths: PathsConfig,
    /// Startup scan settings.
    pub coldplug: ColdplugConfig,
    /// Lifecycle log sinks.
    pub logging: LoggingConfig,
}

/// Filesystem locations and external programs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    /// sysfs mount point walked by the cold-plug scan.
    pub sysfs_root: PathBuf,
    /// Module loading program, resolved through `PATH` when bare.
    pub modprobe: PathBuf,
}

/// What the cold-plug scan does when a `modalias` file cannot be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColdplugPolicy {
    /// Stop the whole scan at the first unreadable entry.
    #[default]
    AbortScan,
    /// Skip the unreadable entry and keep walking.
    SkipEntry,
}

/// Startup scan settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColdplugConfig {
    /// Run the scan at all.
    pub enabled: bool,
    /// Reaction to an unreadable `modalias` file.
    pub on_entry_error: ColdplugPolicy,
}

/// Lifecycle log sinks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Send records to the system logger.
    pub syslog: bool,
    /// Datagram socket of the system logger.
    pub syslog_socket: PathBuf,
    /// Tag prefixed to every syslog record.
    pub identity: String,
    /// Optional append-only JSONL file mirroring every record.
    pub jsonl_path: Option<PathBuf>,
    /// Emit per-event debug records in addition to the lifecycle lines.
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            daemonize: true,
            paths: PathsConfig::default(),
            coldplug: ColdplugConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            sysfs_root: PathBuf::from("/sys"),
            modprobe: PathBuf::from("modprobe"),
        }
    }
}

impl Default for ColdplugConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            on_entry_error: ColdplugPolicy::AbortScan,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            syslog: true,
            syslog_socket: PathBuf::from("/dev/log"),
            identity: "hotplugd".to_string(),
            jsonl_path: None,
            debug: false,
        }
    }
}

impl Config {
    /// Resolve and load the configuration for the daemon.
    pub fn load() -> Result<Self> {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) if !path.is_empty() => Self::load_from(Path::new(&path)),
            _ => {
                let default_path = Path::new(DEFAULT_CONFIG_PATH);
                if default_path.exists() {
                    Self::load_from(default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Load and validate a specific config file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(HotplugError::MissingConfig {
                    path: path.to_path_buf(),
                });
            }
            Err(err) => return Err(HotplugError::io(path, err)),
        };
        Self::parse(&raw)
    }

    /// Parse and validate config text.
    pub fn parse(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the daemon cannot start with.
    pub fn validate(&self) -> Result<()> {
        if self.logging.identity.trim().is_empty() {
            return Err(HotplugError::InvalidConfig {
                details: "logging.identity must not be empty".to_string(),
            });
        }
        if self.paths.modprobe.as_os_str().is_empty() {
            return Err(HotplugError::InvalidConfig {
                details: "paths.modprobe must not be empty".to_string(),
            });
        }
        // daemon(3) moves the working directory to `/`.
        require_absolute("paths.sysfs_root", &self.paths.sysfs_root)?;
        require_absolute("logging.syslog_socket", &self.logging.syslog_socket)?;
        if let Some(path) = &self.logging.jsonl_path {
            require_absolute("logging.jsonl_path", path)?;
        }
        Ok(())
    }
}

fn require_absolute(field: &str, path: &Path) -> Result<()> {
    if path.is_absolute() {
        return Ok(());
    }
    Err(HotplugError::InvalidConfig {
        details: format!("{field} must be absolute, got {}", path.display()),
    })
}
