//! Viewer configuration
//!
//! Configuration is loaded from multiple sources with the following priority (lowest to highest):
//! 1. `config/default.toml` (version controlled)
//! 2. `config/user.toml` (gitignored, user overrides)
//! 3. Environment variables (`MODELVIEW_SECTION__KEY`)

use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main viewer configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewerConfig {
    /// Window configuration
    #[serde(default)]
    pub window: WindowConfig,
    /// Initial view and interaction tuning
    #[serde(default)]
    pub controls: ControlsConfig,
    /// Export destinations
    #[serde(default)]
    pub export: ExportConfig,
}

impl ViewerConfig {
    /// Load configuration from the `config` directory
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific config directory
    ///
    /// Missing files are skipped; built-in defaults fill whatever no source sets.
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();
        let default_path = config_dir.join("default.toml");
        let user_path = config_dir.join("user.toml");

        let mut figment = Figment::from(Serialized::defaults(ViewerConfig::default()));

        if default_path.exists() {
            figment = figment.merge(Toml::file(&default_path));
        }

        if user_path.exists() {
            figment = figment.merge(Toml::file(&user_path));
        }

        // MODELVIEW_CONTROLS__MAX_ZOOM=8 -> controls.max_zoom = 8
        figment = figment.merge(Env::prefixed("MODELVIEW_").split("__"));

        let config: Self = figment.extract()?;
        log::debug!("loaded configuration from {}", config_dir.display());
        Ok(config)
    }
}

/// Window configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    /// Initial width in pixels
    pub width: u32,
    /// Initial height in pixels
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "modelview".to_string(),
            width: 800,
            height: 600,
        }
    }
}

/// Initial view state and mouse tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    /// Degrees
    pub yaw: f64,
    /// Degrees
    pub pitch: f64,
    /// Degrees
    pub roll: f64,
    pub zoom: f64,
    pub translate: [f64; 3],
    pub fill: bool,
    pub shade: bool,
    pub edges: bool,
    pub vertices: bool,
    /// Zoom change per scroll notch
    pub zoom_step: f64,
    /// Zoom change per secondary-button drag event
    pub drag_zoom_step: f64,
    /// Upper bound applied to scroll zoom
    pub max_zoom: f64,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.0,
            roll: 0.0,
            zoom: 1.0,
            translate: [0.0; 3],
            fill: true,
            shade: true,
            edges: false,
            vertices: false,
            zoom_step: 0.15,
            drag_zoom_step: 0.05,
            max_zoom: 5.0,
        }
    }
}

/// Export destinations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Where single images and models are written
    pub directory: PathBuf,
    /// Where a whole-store export is written
    pub batch_directory: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            batch_directory: PathBuf::from("dump"),
        }
    }
}

/// Configuration error
#[derive(Debug, Error)]
#[error("configuration error: {0}")]
pub struct ConfigError(#[from] Box<figment::Error>);

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        ConfigError(Box::new(e))
    }
}
