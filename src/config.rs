use anyhow::{Context, Result, anyhow};
use chrono_tz::Tz;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_TIMEZONE: &str = "America/Sao_Paulo";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default)]
    pub event: EventConfig,
    #[serde(default)]
    pub resolver: ResolverConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventConfig {
    pub duration_minutes: i64,
    pub default_title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Time used when a date is given without a time
    pub default_hour: u32,
    pub default_minute: u32,
}

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}

impl Default for EventConfig {
    fn default() -> Self {
        Self { duration_minutes: 30, default_title: "Reunião".to_string() }
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self { default_hour: 9, default_minute: 0 }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            event: EventConfig::default(),
            resolver: ResolverConfig::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = get_config_path()?;

        // If config doesn't exist, create default
        if !config_path.exists() {
            let default_config = Config::default();
            default_config.save_to(&config_path)?;
            return Ok(default_config);
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        config.tz()?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).context("Failed to write config file")?;

        Ok(())
    }

    /// The configured zone, e.g. `America/Sao_Paulo`
    pub fn tz(&self) -> Result<Tz> {
        self.timezone.parse::<Tz>().map_err(|e| anyhow!("Invalid timezone '{}': {}", self.timezone, e))
    }
}

fn get_config_path() -> Result<PathBuf> {
    let proj_dirs =
        ProjectDirs::from("com", "mia", "mia").context("Failed to determine config directory")?;

    Ok(proj_dirs.config_dir().join("config.toml"))
}
