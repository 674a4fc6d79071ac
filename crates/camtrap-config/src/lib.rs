//! Configuration for the camtrap dashboard.
//!
//! Layered with figment: built-in defaults, then a TOML file, then
//! `CAMTRAP_`-prefixed environment variables (`__` separates sections,
//! e.g. `CAMTRAP_WEATHER__TIMEZONE`). The TUI applies CLI flag overrides
//! on top of the result.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use camtrap_api::{ForecastClient, TransportConfig};

pub const ENV_PREFIX: &str = "CAMTRAP_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("forecast client setup failed: {0}")]
    Client(#[from] camtrap_api::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub weather: WeatherConfig,

    #[serde(default)]
    pub ui: UiConfig,
}

/// Where the site documents, boundary and imagery live.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DataConfig {
    /// Directory holding one sub-directory per region.
    #[serde(default = "default_sites_dir")]
    pub sites_dir: PathBuf,

    /// GeoJSON document with the study-area boundary. Optional at runtime.
    #[serde(default = "default_boundary_file")]
    pub boundary_file: PathBuf,

    /// Root of the `{region}/{label}/sample.jpg` image tree.
    #[serde(default = "default_images_dir")]
    pub images_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            sites_dir: default_sites_dir(),
            boundary_file: default_boundary_file(),
            images_dir: default_images_dir(),
        }
    }
}

fn default_sites_dir() -> PathBuf {
    PathBuf::from("site_info/Additional_summary_2")
}
fn default_boundary_file() -> PathBuf {
    PathBuf::from("senegal.geojson")
}
fn default_images_dir() -> PathBuf {
    PathBuf::from("site_info/images")
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct WeatherConfig {
    /// Full forecast endpoint URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Timezone the provider reports timestamps in.
    #[serde(default = "default_timezone")]
    pub timezone: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timezone: default_timezone(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.open-meteo.com/v1/forecast".into()
}
fn default_timezone() -> String {
    "GMT".into()
}
fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct UiConfig {
    #[serde(default = "default_tick_rate_ms")]
    pub tick_rate_ms: u64,

    #[serde(default = "default_render_rate_ms")]
    pub render_rate_ms: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: default_tick_rate_ms(),
            render_rate_ms: default_render_rate_ms(),
        }
    }
}

fn default_tick_rate_ms() -> u64 {
    250
}
fn default_render_rate_ms() -> u64 {
    33
}

// ── Validation and translation ──────────────────────────────────────

impl WeatherConfig {
    pub fn url(&self) -> Result<Url, ConfigError> {
        let url: Url = self.base_url.parse().map_err(|e| ConfigError::Validation {
            field: "weather.base_url".into(),
            reason: format!("{e}: {}", self.base_url),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Validation {
                field: "weather.base_url".into(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }
        Ok(url)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Build the forecast client described by this section.
    pub fn forecast_client(&self) -> Result<ForecastClient, ConfigError> {
        let transport = TransportConfig::default().with_timeout(self.timeout());
        Ok(ForecastClient::new(self.url()?, self.timezone.clone(), &transport)?)
    }
}

impl Config {
    /// Reject values that would only fail later at runtime.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.weather.url()?;
        if self.weather.timezone.trim().is_empty() {
            return Err(ConfigError::Validation {
                field: "weather.timezone".into(),
                reason: "must not be empty".into(),
            });
        }
        if self.weather.timeout_secs == 0 {
            return Err(ConfigError::Validation {
                field: "weather.timeout_secs".into(),
                reason: "must be at least 1".into(),
            });
        }
        if self.ui.tick_rate_ms == 0 || self.ui.render_rate_ms == 0 {
            return Err(ConfigError::Validation {
                field: "ui".into(),
                reason: "tick and render rates must be positive".into(),
            });
        }
        Ok(())
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("org", "camtrap", "camtrap").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Directory for log files.
pub fn data_dir() -> PathBuf {
    ProjectDirs::from("org", "camtrap", "camtrap")
        .map_or_else(dirs_fallback, |dirs| dirs.data_local_dir().to_path_buf())
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("camtrap");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load from the platform config path + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file + environment. A missing file is not an error.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    config.validate()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`.
pub fn save_config(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}
