//! Timetable configuration.

use std::path::{Path, PathBuf};

use chrono_tz::Tz;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::{TimetableError, TimetableResult};
use crate::resolver::RecurrenceFloor;
use crate::time::DEFAULT_TIMEZONE;

static DEFAULT_DATA_DIR: &str = "~/.timetable";

fn default_data_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_DIR)
}

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.name().to_string()
}

/// Configuration at ~/.config/timetable/config.toml, overridable with
/// `TIMETABLE_*` environment variables.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TimetableConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// IANA name of the reference timezone.
    #[serde(default = "default_timezone")]
    pub timezone: String,

    #[serde(default)]
    pub recurrence_floor: RecurrenceFloor,

    /// Refuse to save a block that overlaps an existing one.
    #[serde(default)]
    pub reject_overlaps: bool,
}

impl Default for TimetableConfig {
    fn default() -> Self {
        TimetableConfig {
            data_dir: default_data_dir(),
            timezone: default_timezone(),
            recurrence_floor: RecurrenceFloor::default(),
            reject_overlaps: false,
        }
    }
}

impl TimetableConfig {
    pub fn config_path() -> TimetableResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| TimetableError::Config("Could not determine config directory".into()))?
            .join("timetable");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from the default location, creating a commented default file on
    /// first run.
    pub fn load() -> TimetableResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> TimetableResult<Self> {
        Self::load_with_env(path, None)
    }

    /// `env` stands in for the process environment when given.
    fn load_with_env(path: &Path, env: Option<config::Map<String, String>>) -> TimetableResult<Self> {
        let config: TimetableConfig = Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix("TIMETABLE").try_parsing(true).source(env))
            .build()
            .map_err(|e| TimetableError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| TimetableError::Config(e.to_string()))?;

        config.timezone()?;
        Ok(config)
    }

    /// Data directory with `~` expanded.
    pub fn data_path(&self) -> PathBuf {
        let full_path_str = shellexpand::tilde(&self.data_dir.to_string_lossy()).into_owned();
        PathBuf::from(full_path_str)
    }

    pub fn timezone(&self) -> TimetableResult<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| TimetableError::Config(format!("Unknown timezone '{}'", self.timezone)))
    }

    pub fn to_toml(&self) -> TimetableResult<String> {
        toml::to_string_pretty(self).map_err(|e| TimetableError::Config(e.to_string()))
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> TimetableResult<()> {
        let contents = format!(
            "\
# timetable configuration

# Where subjects, time blocks and completion records are stored:
# data_dir = \"{}\"

# Timezone used to decide what \"today\" and \"now\" are:
# timezone = \"{}\"

# Whether weekly blocks show up on dates before they were created
# (\"unbounded\") or only from their creation date on (\"created_on\"):
# recurrence_floor = \"unbounded\"

# Refuse to save blocks that overlap an existing block:
# reject_overlaps = false
",
            DEFAULT_DATA_DIR,
            DEFAULT_TIMEZONE.name()
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                TimetableError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| TimetableError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commented_default_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        TimetableConfig::create_default_config(&path).unwrap();

        let config = TimetableConfig::load_from(&path).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("~/.timetable"));
        assert_eq!(config.timezone().unwrap(), DEFAULT_TIMEZONE);
        assert_eq!(config.recurrence_floor, RecurrenceFloor::Unbounded);
        assert!(!config.reject_overlaps);
    }

    #[test]
    fn reads_explicit_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "data_dir = \"/tmp/tt\"\ntimezone = \"Europe/Berlin\"\nrecurrence_floor = \"created_on\"\nreject_overlaps = true\n",
        )
        .unwrap();

        let config = TimetableConfig::load_from(&path).unwrap();
        assert_eq!(config.data_path(), PathBuf::from("/tmp/tt"));
        assert_eq!(config.timezone().unwrap(), chrono_tz::Europe::Berlin);
        assert_eq!(config.recurrence_floor, RecurrenceFloor::CreatedOn);
        assert!(config.reject_overlaps);
    }

    #[test]
    fn unknown_timezone_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "timezone = \"Mars/Olympus\"\n").unwrap();

        let err = TimetableConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, TimetableError::Config(_)));
    }

    #[test]
    fn environment_overrides_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "recurrence_floor = \"unbounded\"\nreject_overlaps = false\n").unwrap();

        let env: config::Map<String, String> = [
            ("TIMETABLE_RECURRENCE_FLOOR", "created_on"),
            ("TIMETABLE_REJECT_OVERLAPS", "true"),
            ("OTHER_TIMEZONE", "Mars/Olympus"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let config = TimetableConfig::load_with_env(&path, Some(env)).unwrap();
        assert_eq!(config.recurrence_floor, RecurrenceFloor::CreatedOn);
        assert!(config.reject_overlaps);
        assert_eq!(config.timezone().unwrap(), DEFAULT_TIMEZONE);
    }

    #[test]
    fn tilde_is_expanded() {
        let config = TimetableConfig::default();
        assert!(!config.data_path().to_string_lossy().starts_with('~'));
    }
}
