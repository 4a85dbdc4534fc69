//! Configuration file support for the atlas client.
//!
//! Settings are stored as versioned JSON under the platform config directory.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_SERVER_URL, MIN_MARKER_SIZE, MIN_ZOOM_FOR_ZOOM_OUT, PAN_STEP, TAP_MAX_DURATION,
    WHEEL_ZOOM_STEP, ZOOM_STEP,
};
use crate::keybindings::{KeyBindings, KeyCode};

/// Log level setting for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    /// Get the display name for this log level.
    pub fn name(&self) -> &'static str {
        match self {
            LogLevel::Error => "Error",
            LogLevel::Warn => "Warn",
            LogLevel::Info => "Info",
            LogLevel::Debug => "Debug",
            LogLevel::Trace => "Trace",
        }
    }

    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// How a committed selection is named.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NamingFrontend {
    /// Structured name/description form
    #[default]
    Dialog,
    /// Sequence of plain text prompts
    Prompt,
}

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Version of the configuration file format
    pub version: u32,

    /// Selection backend
    #[serde(default)]
    pub server: ServerConfig,

    /// User preferences
    #[serde(default)]
    pub preferences: UserPreferences,

    /// Navigation and overlay tuning
    #[serde(default)]
    pub view: ViewConfig,

    /// Keybinding configuration
    #[serde(default)]
    pub keybindings: KeyBindings,
}

/// Selection backend settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Base URL the `/selections` endpoint hangs off
    #[serde(default = "default_server_url")]
    pub url: String,
}

fn default_server_url() -> String {
    DEFAULT_SERVER_URL.to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: default_server_url(),
        }
    }
}

/// User preferences section of the config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct UserPreferences {
    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Naming front-end used after commit
    #[serde(default)]
    pub naming: NamingFrontend,
}

/// Zoom, pan and overlay tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewConfig {
    #[serde(default = "default_zoom_step")]
    pub zoom_step: f32,
    #[serde(default = "default_wheel_zoom_step")]
    pub wheel_zoom_step: f32,
    /// Zoom-out is refused below this zoom
    #[serde(default = "default_min_zoom_for_zoom_out")]
    pub min_zoom_for_zoom_out: f32,
    /// Arrow-key pan distance in screen units
    #[serde(default = "default_pan_step")]
    pub pan_step: f32,
    #[serde(default = "default_min_marker_size")]
    pub min_marker_size: f32,
    #[serde(default = "default_tap_max_ms")]
    pub tap_max_ms: u64,
}

fn default_zoom_step() -> f32 {
    ZOOM_STEP
}

fn default_wheel_zoom_step() -> f32 {
    WHEEL_ZOOM_STEP
}

fn default_min_zoom_for_zoom_out() -> f32 {
    MIN_ZOOM_FOR_ZOOM_OUT
}

fn default_pan_step() -> f32 {
    PAN_STEP
}

fn default_min_marker_size() -> f32 {
    MIN_MARKER_SIZE
}

fn default_tap_max_ms() -> u64 {
    TAP_MAX_DURATION.as_millis() as u64
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            zoom_step: default_zoom_step(),
            wheel_zoom_step: default_wheel_zoom_step(),
            min_zoom_for_zoom_out: default_min_zoom_for_zoom_out(),
            pan_step: default_pan_step(),
            min_marker_size: default_min_marker_size(),
            tap_max_ms: default_tap_max_ms(),
        }
    }
}

impl ViewConfig {
    pub fn tap_max_duration(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.tap_max_ms)
    }
}

impl AppConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            server: ServerConfig::default(),
            preferences: UserPreferences::default(),
            view: ViewConfig::default(),
            keybindings: KeyBindings::default(),
        }
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;

        // Validate version compatibility
        if config.version > CONFIG_VERSION {
            return Err(ConfigError::VersionTooNew {
                file_version: config.version,
                supported_version: CONFIG_VERSION,
            });
        }

        if let Some(key) = config.keybindings.duplicate_key() {
            return Err(ConfigError::DuplicateKey(key));
        }

        Ok(config)
    }

    /// Get the default config filename.
    pub fn default_filename() -> &'static str {
        "place-atlas-config.json"
    }

    /// Get the default config file path for auto-load/save.
    pub fn default_path() -> Option<PathBuf> {
        // Try to use XDG config directory, fall back to home directory
        if let Some(config_dir) = dirs::config_dir() {
            Some(config_dir.join("place-atlas").join(Self::default_filename()))
        } else {
            dirs::home_dir().map(|home_dir| {
                home_dir
                    .join(".config")
                    .join("place-atlas")
                    .join(Self::default_filename())
            })
        }
    }

    /// Load configuration from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Try to load configuration from the default path.
    /// Returns None if the file doesn't exist or can't be read.
    pub fn load_from_default_path() -> Option<Self> {
        let path = Self::default_path()?;
        if !path.exists() {
            log::debug!("No config file found at {:?}", path);
            return None;
        }

        match Self::load_from(&path) {
            Ok(config) => Some(config),
            Err(e) => {
                log::warn!("Failed to load config file {:?}: {}", path, e);
                None
            }
        }
    }

    /// Save configuration to a path, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = self.to_json()?;
        std::fs::write(path, json)?;
        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Save configuration to the default path.
    pub fn save_to_default_path(&self) -> Result<(), ConfigError> {
        let path = Self::default_path().ok_or_else(|| {
            ConfigError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Could not determine config directory",
            ))
        })?;
        self.save_to(&path)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// JSON parsing error
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Configuration version is newer than supported
    #[error(
        "Configuration file version {file_version} is newer than supported version {supported_version}"
    )]
    VersionTooNew {
        file_version: u32,
        supported_version: u32,
    },

    /// One key is bound to two actions
    #[error("Key {0:?} is bound to more than one action")]
    DuplicateKey(KeyCode),

    /// I/O error when reading/writing config
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
