use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

const APP_DIR_NAME: &str = "tasklist";
const CONFIG_FILE_NAME: &str = "config.json";
const STORE_FILE_NAME: &str = "tasks.json";
const CONFIG_ENV_VAR: &str = "TASKLIST_CONFIG_PATH";
pub const STORE_ENV_VAR: &str = "TASKLIST_STORE_PATH";

#[derive(Debug, Clone)]
pub struct Palette {
    pub accent: &'static str,
    pub muted: &'static str,
    pub reset: &'static str,
}

impl Palette {
    pub fn accentize(&self, text: &str) -> String {
        if self.accent.is_empty() {
            text.to_string()
        } else {
            format!("{}{}{}", self.accent, text, self.reset)
        }
    }

    pub fn mutedize(&self, text: &str) -> String {
        if self.muted.is_empty() {
            text.to_string()
        } else {
            format!("{}{}{}", self.muted, text, self.reset)
        }
    }
}

pub fn palette_for_theme(theme: Option<&str>) -> Palette {
    match theme.and_then(canonical_theme_name).as_deref() {
        Some("noir") => Palette {
            accent: "\x1b[38;5;208m",
            muted: "\x1b[38;5;250m",
            reset: "\x1b[0m",
        },
        Some("solarized") => Palette {
            accent: "\x1b[38;5;108m",
            muted: "\x1b[38;5;250m",
            reset: "\x1b[0m",
        },
        _ => Palette {
            accent: "",
            muted: "",
            reset: "",
        },
    }
}

/// Lowercases and snake_cases a user supplied name, so `Dark-Mode` and
/// `dark_mode` compare equal.
pub fn canonical_name(raw: &str) -> String {
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

pub fn canonical_theme_name(raw: &str) -> Option<String> {
    let cleaned = canonical_name(raw);
    match cleaned.as_str() {
        "" | "vanilla" | "light" => Some("default".to_string()),
        "dark" | "dark_mode" | "darkmode" => Some("noir".to_string()),
        other => Some(other.to_string()),
    }
}

/// What to do when the task file exists but cannot be parsed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorruptPolicy {
    /// Refuse to start and leave the file alone.
    #[default]
    Abort,
    /// Move the file aside, warn, and start with an empty list.
    StartEmpty,
}

impl FromStr for CorruptPolicy {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match canonical_name(raw).as_str() {
            "abort" => Ok(Self::Abort),
            "start_empty" | "empty" => Ok(Self::StartEmpty),
            other => Err(AppError::invalid_input(format!(
                "unknown corrupt storage policy '{other}' (expected abort or start_empty)"
            ))),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub store_path: Option<PathBuf>,
    #[serde(default)]
    pub on_corrupt: CorruptPolicy,
    #[serde(default)]
    pub theme: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: Config,
    pub error: Option<AppError>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub store_path: Option<PathBuf>,
    pub on_corrupt: Option<CorruptPolicy>,
    pub theme: Option<String>,
}

fn app_dir() -> Result<PathBuf, AppError> {
    if cfg!(windows) {
        let appdata = std::env::var("APPDATA")
            .map_err(|_| AppError::invalid_config("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata).join(APP_DIR_NAME))
    } else {
        let home =
            std::env::var("HOME").map_err(|_| AppError::invalid_config("HOME is not set"))?;
        Ok(PathBuf::from(home).join(".config").join(APP_DIR_NAME))
    }
}

fn non_blank_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
}

pub fn config_path() -> Result<PathBuf, AppError> {
    match non_blank_env(CONFIG_ENV_VAR) {
        Some(path) => Ok(PathBuf::from(path)),
        None => Ok(app_dir()?.join(CONFIG_FILE_NAME)),
    }
}

pub fn default_store_path() -> Result<PathBuf, AppError> {
    Ok(app_dir()?.join(STORE_FILE_NAME))
}

/// Picks the task file: explicit flag, then `TASKLIST_STORE_PATH`, then the
/// config file, then the platform default.
pub fn resolve_store_path(config: &Config, flag: Option<&Path>) -> Result<PathBuf, AppError> {
    resolve_store_path_with(config, flag, non_blank_env(STORE_ENV_VAR))
}

fn resolve_store_path_with(
    config: &Config,
    flag: Option<&Path>,
    env_value: Option<String>,
) -> Result<PathBuf, AppError> {
    if let Some(path) = flag {
        return Ok(path.to_path_buf());
    }

    if let Some(path) = env_value {
        return Ok(PathBuf::from(path));
    }

    if let Some(path) = config.store_path.as_ref() {
        return Ok(path.clone());
    }

    default_store_path()
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
        .map_err(|err| AppError::invalid_config(format!("{}: {}", path.display(), err)))?;
    let mut config: Config = serde_json::from_str(&content).map_err(|err| {
        AppError::invalid_config(format!("invalid JSON in {}: {}", path.display(), err))
    })?;
    config.theme = config.theme.and_then(|name| canonical_theme_name(&name));
    Ok(config)
}

pub fn merge_overrides(base: &Config, overrides: &ConfigOverrides) -> Config {
    let mut merged = base.clone();

    if let Some(path) = overrides.store_path.as_ref() {
        merged.store_path = Some(path.clone());
    }

    if let Some(policy) = overrides.on_corrupt {
        merged.on_corrupt = policy;
    }

    if let Some(theme) = overrides.theme.as_ref()
        && let Some(normalized) = canonical_theme_name(theme)
    {
        merged.theme = Some(normalized);
    }

    merged
}
