use crate::error::AppError;
use crate::geolocation::GeolocationError;
use crate::model::{Coordinates, JobStatus, Priority};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_FILE_NAME: &str = "config.json";
const CONFIG_ENV_VAR: &str = "FIELDOPS_CONFIG_PATH";
const APP_DIR: &str = "fieldops";
pub const DEFAULT_CHAT_REPLY_DELAY_MS: u64 = 1500;

/// ANSI colours for the console. The default palette is colourless.
#[derive(Debug, Clone)]
pub struct Palette {
    pub accent: &'static str,
    pub muted: &'static str,
    pub success: &'static str,
    pub warning: &'static str,
    pub danger: &'static str,
    pub reset: &'static str,
}

impl Palette {
    fn paint(&self, code: &'static str, text: &str) -> String {
        if code.is_empty() {
            text.to_string()
        } else {
            format!("{}{}{}", code, text, self.reset)
        }
    }

    pub fn accentize(&self, text: &str) -> String {
        self.paint(self.accent, text)
    }

    pub fn mutedize(&self, text: &str) -> String {
        self.paint(self.muted, text)
    }

    pub fn status(&self, status: JobStatus, text: &str) -> String {
        match status {
            JobStatus::Pending => self.paint(self.muted, text),
            JobStatus::InProgress => self.paint(self.warning, text),
            JobStatus::Completed => self.paint(self.success, text),
        }
    }

    pub fn priority(&self, priority: Priority, text: &str) -> String {
        match priority {
            Priority::High => self.paint(self.danger, text),
            Priority::Medium => self.paint(self.warning, text),
            Priority::Low => self.paint(self.accent, text),
        }
    }
}

pub fn palette_for_theme(theme: Option<&str>) -> Palette {
    match theme.and_then(canonical_theme_name) {
        Some(ref name) if name == "noir" => Palette {
            accent: "\x1b[38;5;39m",
            muted: "\x1b[38;5;250m",
            success: "\x1b[38;5;114m",
            warning: "\x1b[38;5;208m",
            danger: "\x1b[38;5;203m",
            reset: "\x1b[0m",
        },
        Some(ref name) if name == "solarized" => Palette {
            accent: "\x1b[38;5;33m",
            muted: "\x1b[38;5;245m",
            success: "\x1b[38;5;64m",
            warning: "\x1b[38;5;136m",
            danger: "\x1b[38;5;160m",
            reset: "\x1b[0m",
        },
        _ => Palette {
            accent: "",
            muted: "",
            success: "",
            warning: "",
            danger: "",
            reset: "",
        },
    }
}

pub fn canonical_theme_name(raw: &str) -> Option<String> {
    let cleaned = canonical_key(raw);
    if cleaned.is_empty() {
        return Some("default".into());
    }

    match cleaned.as_str() {
        "vanilla" | "light" | "terang" => Some("default".to_string()),
        "dark" | "dark_mode" | "darkmode" | "gelap" => Some("noir".to_string()),
        other => Some(other.to_string()),
    }
}

/// Lowercases and collapses every run of non-alphanumerics into one `_`.
pub fn canonical_key(raw: &str) -> String {
    let mut cleaned = String::new();
    let mut previous_underscore = false;

    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            cleaned.push(ch.to_ascii_lowercase());
            previous_underscore = false;
        } else if !previous_underscore && !cleaned.is_empty() {
            cleaned.push('_');
            previous_underscore = true;
        }
    }

    cleaned.trim_matches('_').to_string()
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub aliases: HashMap<String, String>,
    #[serde(default)]
    pub chat_reply_delay_ms: Option<u64>,
    #[serde(default)]
    pub device_position: Option<Coordinates>,
    #[serde(default)]
    pub geolocation_error: Option<String>,
    #[serde(default)]
    pub seed_path: Option<PathBuf>,
    #[serde(default)]
    pub desktop_notifications: bool,
}

impl Config {
    pub fn chat_reply_delay(&self) -> Duration {
        Duration::from_millis(
            self.chat_reply_delay_ms
                .unwrap_or(DEFAULT_CHAT_REPLY_DELAY_MS),
        )
    }

    /// Device behaviour for location requests: a simulated error wins over a
    /// configured position; with neither the device has no geolocation.
    pub fn geolocation_outcome(&self) -> Result<Coordinates, GeolocationError> {
        if let Some(raw) = self.geolocation_error.as_deref()
            && let Some(error) = GeolocationError::parse(raw)
        {
            return Err(error);
        }

        self.device_position.ok_or(GeolocationError::Unsupported)
    }
}

#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: Config,
    pub error: Option<AppError>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ConfigOverrides {
    pub theme: Option<String>,
    pub aliases: HashMap<String, String>,
    pub chat_reply_delay_ms: Option<u64>,
    pub device_position: Option<Option<Coordinates>>,
    pub geolocation_error: Option<Option<String>>,
    pub seed_path: Option<PathBuf>,
    pub desktop_notifications: Option<bool>,
}

pub fn config_path() -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    if cfg!(windows) {
        let appdata =
            std::env::var("APPDATA").map_err(|_| AppError::invalid_data("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata).join(APP_DIR).join(CONFIG_FILE_NAME))
    } else {
        let home = std::env::var("HOME").map_err(|_| AppError::invalid_data("HOME is not set"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join(APP_DIR)
            .join(CONFIG_FILE_NAME))
    }
}

pub fn load_config_with_fallback() -> ConfigLoad {
    match config_path() {
        Ok(path) => load_config_with_fallback_from_path(&path),
        Err(err) => ConfigLoad {
            config: Config::default(),
            error: Some(err),
        },
    }
}

fn load_config_with_fallback_from_path(path: &Path) -> ConfigLoad {
    if !path.exists() {
        return ConfigLoad {
            config: Config::default(),
            error: None,
        };
    }

    match load_config_from_path(path) {
        Ok(config) => ConfigLoad {
            config,
            error: None,
        },
        Err(err) => ConfigLoad {
            config: Config::default(),
            error: Some(err),
        },
    }
}

fn load_config_from_path(path: &Path) -> Result<Config, AppError> {
    let content = std::fs::read_to_string(path)
        .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))?;
    let mut config: Config = serde_json::from_str(&content).map_err(|err| {
        AppError::invalid_data(format!("invalid JSON in {}: {}", path.display(), err))
    })?;
    config.theme = config.theme.and_then(|name| canonical_theme_name(&name));
    if let Some(raw) = config.geolocation_error.take() {
        let error = GeolocationError::parse(&raw).ok_or_else(|| {
            AppError::invalid_data(format!(
                "unknown geolocation_error '{raw}' in {}",
                path.display()
            ))
        })?;
        config.geolocation_error = Some(error.code().to_string());
    }
    Ok(config)
}

pub fn merge_overrides(base: &Config, overrides: &ConfigOverrides) -> Config {
    let mut merged = base.clone();
    if let Some(theme) = overrides.theme.as_ref()
        && let Some(normalized) = canonical_theme_name(theme)
    {
        merged.theme = Some(normalized);
    }

    for (alias, value) in overrides.aliases.iter() {
        merged.aliases.insert(alias.clone(), value.clone());
    }

    if let Some(delay) = overrides.chat_reply_delay_ms {
        merged.chat_reply_delay_ms = Some(delay);
    }
    if let Some(position) = overrides.device_position {
        merged.device_position = position;
    }
    if let Some(error) = overrides.geolocation_error.as_ref() {
        merged.geolocation_error = error.clone();
    }
    if let Some(path) = overrides.seed_path.as_ref() {
        merged.seed_path = Some(path.clone());
    }
    if let Some(desktop) = overrides.desktop_notifications {
        merged.desktop_notifications = desktop;
    }

    merged
}
