//! Application configuration — TOML-based, platform-aware paths.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::arbiter::{BankPolicy, DedupPolicy};
use crate::led::CurrentLimits;
use crate::protocol;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Brightness control file. `{zone}` is 1..=3, `{color}` is R, G or B.
    #[serde(default = "default_brightness_path")]
    pub brightness_path: String,

    /// Drive current control file, same placeholders as `brightness_path`.
    #[serde(default = "default_current_path")]
    pub current_path: String,

    /// Sequencer program memory file.
    #[serde(default = "default_sequencer_load_path")]
    pub sequencer_load_path: String,

    /// Sequencer mode file. `{sequencer}` is 1..=3.
    #[serde(default = "default_sequencer_mode_path")]
    pub sequencer_mode_path: String,

    /// Sequencer run/hold file. `{sequencer}` is 1..=3.
    #[serde(default = "default_sequencer_run_path")]
    pub sequencer_run_path: String,

    /// Current cap while a notification is shown.
    #[serde(default = "default_current_max_notifications")]
    pub current_max_notifications: u8,

    /// Current cap while the charging indicator is shown.
    #[serde(default = "default_current_max_charging")]
    pub current_max_charging: u8,

    /// Dedup policy: "source" or "strict".
    #[serde(default)]
    pub dedup: DedupPolicy,

    /// Bank sharing policy: "split" or "shared".
    #[serde(default)]
    pub policy: BankPolicy,
}

fn default_brightness_path() -> String {
    "/sys/class/leds/LED{zone}_{color}/brightness".into()
}
fn default_current_path() -> String {
    "/sys/class/leds/LED{zone}_{color}/led_current".into()
}
fn default_sequencer_load_path() -> String {
    "/sys/class/leds/LED1_R/device/sequencer_load".into()
}
fn default_sequencer_mode_path() -> String {
    "/sys/class/leds/LED1_R/device/sequencer{sequencer}_mode".into()
}
fn default_sequencer_run_path() -> String {
    "/sys/class/leds/LED1_R/device/sequencer{sequencer}_run".into()
}
fn default_current_max_notifications() -> u8 {
    protocol::DEFAULT_CURRENT_MAX_NOTIFICATIONS
}
fn default_current_max_charging() -> u8 {
    protocol::DEFAULT_CURRENT_MAX_CHARGING
}

impl Default for Config {
    fn default() -> Self {
        Config {
            brightness_path: default_brightness_path(),
            current_path: default_current_path(),
            sequencer_load_path: default_sequencer_load_path(),
            sequencer_mode_path: default_sequencer_mode_path(),
            sequencer_run_path: default_sequencer_run_path(),
            current_max_notifications: default_current_max_notifications(),
            current_max_charging: default_current_max_charging(),
            dedup: DedupPolicy::default(),
            policy: BankPolicy::default(),
        }
    }
}

/// Validation errors that [`Config::validate`] can return.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A path template lacks a placeholder it needs.
    MissingPlaceholder {
        field: &'static str,
        placeholder: &'static str,
    },
    /// A path is empty.
    EmptyPath(&'static str),
    /// The charging cap exceeds the notification cap.
    ChargingCapAboveNotificationCap { charging: u8, notifications: u8 },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::MissingPlaceholder { field, placeholder } => {
                write!(f, "{field} must contain {placeholder}")
            }
            ValidationError::EmptyPath(field) => write!(f, "{field} cannot be empty"),
            ValidationError::ChargingCapAboveNotificationCap {
                charging,
                notifications,
            } => write!(
                f,
                "current_max_charging ({charging}) exceeds current_max_notifications ({notifications})"
            ),
        }
    }
}

impl Config {
    /// Platform-specific config directory.
    pub fn dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("ledarbiter"))
    }

    /// Full path to config file.
    pub fn path() -> Option<PathBuf> {
        Self::dir().map(|d| d.join("config.toml"))
    }

    /// Load config from disk, or return defaults if not found.
    pub fn load() -> Self {
        let (config, warnings) = Self::load_with_warnings();
        for w in &warnings {
            log::warn!("{w}");
        }
        config
    }

    /// Load config from an arbitrary path, returning the config and any parse warnings.
    ///
    /// Returns `(defaults, [])` if the file doesn't exist.
    /// Returns `(defaults, [warning])` if the file exists but can't be parsed.
    pub fn load_from(path: &Path) -> (Self, Vec<String>) {
        match std::fs::read_to_string(path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => (config, vec![]),
                Err(e) => {
                    let warning = format!(
                        "config parse error ({}), using defaults: {e}",
                        path.display()
                    );
                    (Self::default(), vec![warning])
                }
            },
            Err(_) => (Self::default(), vec![]),
        }
    }

    /// Load config from the default path, returning the config and any parse warnings.
    pub fn load_with_warnings() -> (Self, Vec<String>) {
        let Some(path) = Self::path() else {
            return (Self::default(), vec![]);
        };
        Self::load_from(&path)
    }

    pub fn current_limits(&self) -> CurrentLimits {
        CurrentLimits {
            notifications: self.current_max_notifications,
            charging: self.current_max_charging,
        }
    }

    /// Validate the entire config, collecting all errors.
    pub fn validate(&self) -> std::result::Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        let templates: [(&'static str, &str, &[&'static str]); 5] = [
            ("brightness_path", &self.brightness_path, &["{zone}", "{color}"]),
            ("current_path", &self.current_path, &["{zone}", "{color}"]),
            ("sequencer_load_path", &self.sequencer_load_path, &[]),
            ("sequencer_mode_path", &self.sequencer_mode_path, &["{sequencer}"]),
            ("sequencer_run_path", &self.sequencer_run_path, &["{sequencer}"]),
        ];
        for (field, value, placeholders) in templates {
            if value.trim().is_empty() {
                errors.push(ValidationError::EmptyPath(field));
                continue;
            }
            for &placeholder in placeholders {
                if !value.contains(placeholder) {
                    errors.push(ValidationError::MissingPlaceholder { field, placeholder });
                }
            }
        }

        if self.current_max_charging > self.current_max_notifications {
            errors.push(ValidationError::ChargingCapAboveNotificationCap {
                charging: self.current_max_charging,
                notifications: self.current_max_notifications,
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
