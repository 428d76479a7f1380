//! `config.toml` loading. Every section and field falls back to its default,
//! and a missing file yields the defaults outright.

use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

use crate::chat::DEFAULT_CHAT_HISTORY;
use crate::error::ConfigError;
use crate::publisher::DEFAULT_SUMMARY_WIDTH;

pub const COCKPIT_HOME_DIR: &str = ".autoglm-cockpit";
pub const CONFIG_FILE: &str = "config.toml";
pub const LOG_FILE: &str = "cockpit.log";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CockpitConfig {
    pub device: DeviceConfig,
    pub display: DisplayConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    pub ip: String,
    pub adb_port: u16,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            ip: "192.168.2.13".to_string(),
            adb_port: 34333,
        }
    }
}

impl DeviceConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.ip, self.adb_port)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Summary entries longer than this many characters are cut. Values above
    /// the default of 100 are capped.
    pub summary_width: usize,
    /// Entries the detail pane keeps before dropping the oldest.
    pub detail_capacity: usize,
    pub chat_history: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            summary_width: DEFAULT_SUMMARY_WIDTH,
            detail_capacity: 2000,
            chat_history: DEFAULT_CHAT_HISTORY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Defaults to `logs/` under the cockpit home. A leading `~` is expanded.
    pub dir: Option<PathBuf>,
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            dir: None,
            level: "info".to_string(),
        }
    }
}

impl LogConfig {
    pub fn resolved_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.dir {
            Some(dir) => expand_home(dir),
            None => Ok(cockpit_home()?.join("logs")),
        }
    }
}

pub fn cockpit_home() -> Result<PathBuf, ConfigError> {
    dirs::home_dir()
        .map(|home| home.join(COCKPIT_HOME_DIR))
        .ok_or(ConfigError::NoHomeDir)
}

pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    Ok(cockpit_home()?.join(CONFIG_FILE))
}

fn expand_home(path: &Path) -> Result<PathBuf, ConfigError> {
    match path.strip_prefix("~") {
        Ok(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .ok_or(ConfigError::NoHomeDir),
        Err(_) => Ok(path.to_path_buf()),
    }
}

impl CockpitConfig {
    /// Load from `path`, or from the default location when `None`.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => default_config_path()?,
        };
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match Self::read(path)? {
            Some(config) => Ok(config),
            None => {
                tracing::warn!(path = %path.display(), "config file not found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Like [`Self::load_from`], but a missing file is `None` and nothing is
    /// logged, for callers that install logging from the loaded config.
    pub fn read(path: &Path) -> Result<Option<Self>, ConfigError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(ConfigError::read(path, err)),
        };
        let config: Self =
            toml::from_str(&contents).map_err(|err| ConfigError::parse(path, err))?;
        tracing::debug!(path = %path.display(), "config loaded");
        Ok(Some(config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = CockpitConfig::load_from(&dir.path().join("absent.toml")).expect("load");
        assert_eq!(config, CockpitConfig::default());
        assert_eq!(config.device.address(), "192.168.2.13:34333");
        assert_eq!(config.display.summary_width, 100);
    }

    #[test]
    fn read_reports_a_missing_file_as_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert_eq!(
            CockpitConfig::read(&dir.path().join("absent.toml")).expect("read"),
            None
        );
    }

    #[test]
    fn partial_sections_merge_with_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(
            &path,
            "[device]\nip = \"10.0.0.7\"\n\n[display]\ndetail_capacity = 50\n",
        )
        .expect("write");

        let config = CockpitConfig::load(Some(&path)).expect("load");
        assert_eq!(config.device.address(), "10.0.0.7:34333");
        assert_eq!(config.display.detail_capacity, 50);
        assert_eq!(config.display.chat_history, DEFAULT_CHAT_HISTORY);
        assert_eq!(config.log, LogConfig::default());
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "[device]\nadb_port = \"not a port\"\n").expect("write");

        let err = CockpitConfig::load_from(&path).expect_err("should fail");
        assert_matches!(err, ConfigError::Parse { path: failed, .. } if failed == path);
    }

    #[test]
    fn explicit_log_dir_is_used_as_is() {
        let log = LogConfig {
            dir: Some(PathBuf::from("/var/log/cockpit")),
            level: "debug".to_string(),
        };
        assert_eq!(
            log.resolved_dir().expect("dir"),
            PathBuf::from("/var/log/cockpit")
        );
    }
}
