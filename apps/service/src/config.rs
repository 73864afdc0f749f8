use std::{env, fmt, fs, path};

use pingmon::{DEFAULT_PING_INTERVAL_SECS, DEFAULT_PROBE_TIMEOUT_SECS};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read config file: {0}")]
    ReadFailed(std::io::Error),
    #[error("failed to write config file: {0}")]
    WriteFailed(std::io::Error),
    #[error("failed to parse config file: {0}")]
    ParseFailed(String),
    #[error("no usable config directory (set XDG_CONFIG_HOME or HOME)")]
    ConfigPathUnavailable,
    #[error("monitor.interval_seconds must be greater than zero")]
    ZeroInterval,
    #[error("monitor.timeout_seconds must be greater than zero")]
    ZeroTimeout,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    pub monitor: Monitor,
    pub http: Http,
    pub storage: Storage,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Monitor {
    /// Seconds between two probe cycles
    pub interval_seconds: u64,
    /// Seconds before an unanswered probe counts as a failure
    pub timeout_seconds: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Http {
    /// Socket address the HTTP API binds to
    pub listen: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Storage {
    /// Path of the local database file
    pub path: String,
}

/// Used to ensure we are actually reading a toml file
fn normalize_toml_path(path: &path::Path) -> path::PathBuf {
    let mut path = path.to_path_buf();
    if path.extension().map(|ext| ext != "toml").unwrap_or(true) {
        path.set_extension("toml");
    }
    path
}

/// Get default config path ($XDG_CONFIG_HOME/pingmon/config.toml or
/// $HOME/.config/...)
fn default_config_path() -> Result<path::PathBuf, Error> {
    let path = if let Ok(config_home) = env::var("XDG_CONFIG_HOME") {
        path::PathBuf::from(config_home)
    } else if let Some(home_dir) = env::home_dir() {
        home_dir.join(".config")
    } else {
        return Err(Error::ConfigPathUnavailable);
    };

    Ok(path.join("pingmon/config.toml"))
}

impl Default for Config {
    fn default() -> Self {
        Self {
            monitor: Monitor {
                interval_seconds: DEFAULT_PING_INTERVAL_SECS,
                timeout_seconds: DEFAULT_PROBE_TIMEOUT_SECS,
            },
            http: Http { listen: "0.0.0.0:8000".into() },
            storage: Storage { path: "pingmon.db".into() },
        }
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let write_indented = |level: usize| {
            move |f: &mut fmt::Formatter<'_>, label: &str, value: &dyn fmt::Display| {
                writeln!(f, "  {:indent$}{}: {}", "", label, value, indent = level * 2)
            }
        };
        let write_title_indented = |level: usize| {
            move |f: &mut fmt::Formatter<'_>, label: &str| {
                writeln!(f, "{:indent$}{}", "", label, indent = level * 2)
            }
        };

        let write_title_1 = write_title_indented(1);
        let write_1 = write_indented(1);

        writeln!(f, "Current Internal Configuration State:")?;
        write_title_1(f, "Monitor")?;
        write_1(f, "Ping Interval (s)", &self.monitor.interval_seconds)?;
        write_1(f, "Probe Timeout (s)", &self.monitor.timeout_seconds)?;
        write_title_1(f, "HTTP")?;
        write_1(f, "Listen Address", &self.http.listen)?;
        write_title_1(f, "Storage")?;
        write_1(f, "Database Path", &self.storage.path)?;

        Ok(())
    }
}

impl Config {
    /// Generate Config structure from file
    ///
    /// Creates a default config in ~/.config/pingmon/config.toml
    ///  or the specified path, with the name config.toml if one does not exist
    ///
    /// ```rust
    /// let cfg = config::Config::from_config(None::<&path::Path>)?;
    /// println!("{}", cfg);
    /// ```
    pub fn from_config(optional_path: Option<impl AsRef<path::Path>>) -> Result<Self, Error> {
        let config_path: path::PathBuf = if let Some(path) = optional_path {
            normalize_toml_path(path.as_ref())
        } else {
            default_config_path()?
        };

        if config_path.exists() {
            let raw_string = fs::read_to_string(&config_path).map_err(Error::ReadFailed)?;
            toml::from_str(raw_string.as_str()).map_err(|err| Error::ParseFailed(err.to_string()))
        } else {
            let config = Self::default();
            config.write_config(&config_path)?;
            Ok(config)
        }
    }

    /// Reject values the monitor cannot run with. Checked after CLI
    /// overrides are applied, so a bad flag fails the same way as a bad
    /// config file.
    pub fn validate(&self) -> Result<(), Error> {
        if self.monitor.interval_seconds == 0 {
            return Err(Error::ZeroInterval);
        }
        if self.monitor.timeout_seconds == 0 {
            return Err(Error::ZeroTimeout);
        }
        Ok(())
    }

    /// Serialize and write a config to a file
    pub fn write_config(&self, path: &std::path::Path) -> Result<(), Error> {
        let config_str: String =
            toml::to_string_pretty(self).map_err(|err| Error::ParseFailed(err.to_string()))?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(Error::WriteFailed)?;
        }

        std::fs::write(path, config_str).map_err(Error::WriteFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = Config::default();
        let serialized = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&serialized).unwrap();

        assert_eq!(parsed.monitor.interval_seconds, DEFAULT_PING_INTERVAL_SECS);
        assert_eq!(parsed.monitor.timeout_seconds, DEFAULT_PROBE_TIMEOUT_SECS);
        assert_eq!(parsed.http.listen, "0.0.0.0:8000");
        assert_eq!(parsed.storage.path, "pingmon.db");
    }

    #[test]
    fn missing_config_is_created_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = Config::from_config(Some(&path)).unwrap();

        assert!(path.exists());
        assert_eq!(config.http.listen, "0.0.0.0:8000");
    }

    #[test]
    fn zero_interval_or_timeout_is_rejected() {
        let mut config = Config::default();
        config.monitor.interval_seconds = 0;
        assert!(matches!(config.validate(), Err(Error::ZeroInterval)));

        let mut config = Config::default();
        config.monitor.timeout_seconds = 0;
        assert!(matches!(config.validate(), Err(Error::ZeroTimeout)));

        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn non_toml_extension_is_normalized() {
        assert_eq!(
            normalize_toml_path(path::Path::new("/tmp/pingmon.cfg")),
            path::PathBuf::from("/tmp/pingmon.toml")
        );
        assert_eq!(
            normalize_toml_path(path::Path::new("/tmp/pingmon.toml")),
            path::PathBuf::from("/tmp/pingmon.toml")
        );
    }
}
