//! Configuration file support for screenmark.
//!
//! This module handles loading and validating user settings from the configuration file
//! located at `~/.config/screenmark/config.toml`. Settings include the default element
//! style, drop shadow parameters, and how overlays are presented.
//!
//! If no config file exists, the built-in defaults are used automatically.

pub mod enums;
pub mod types;

// Re-export commonly used types at module level
pub use enums::{BackendKind, ColorSpec};
pub use types::{PresentationConfig, ShadowConfig, StyleConfig};

use anyhow::{Context, Result};
use log::{debug, info};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::draw::{
    BLACK, FontDescriptor, RED, Renderer, SHADOW, ShadowStyle, Style, YELLOW,
};

/// Main configuration structure containing all user settings.
///
/// This is the root configuration type that gets deserialized from the TOML file.
/// All fields have defaults and will use those if not specified in the config file.
///
/// # Example TOML
/// ```toml
/// [style]
/// line_color = "red"
/// line_width = 2
/// font_size = 12.0
///
/// [shadow]
/// blur_radius = 4
/// offset = 5
/// color = [10, 10, 10, 200]
///
/// [presentation]
/// backend = "auto"
/// default_seconds = 3.0
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, JsonSchema)]
pub struct Config {
    /// Default element style
    #[serde(default)]
    pub style: StyleConfig,

    /// Drop shadow settings
    #[serde(default)]
    pub shadow: ShadowConfig,

    /// Presentation backend and timing
    #[serde(default)]
    pub presentation: PresentationConfig,
}

impl Config {
    /// Validates and clamps all configuration values to acceptable ranges.
    ///
    /// Invalid values are clamped to the nearest valid value and a warning is logged.
    ///
    /// Validated ranges:
    /// - `style.line_width`: 1 - 50
    /// - `style.font_size`: 4.0 - 200.0
    /// - `shadow.blur_radius`: 0 - 32
    /// - `shadow.offset`: 0 - 64
    /// - `presentation.default_seconds`: 0.0 - 3600.0
    /// - `presentation.screen_width` / `screen_height`: 1 - 16384
    fn validate_and_clamp(&mut self) {
        if !(1..=50).contains(&self.style.line_width) {
            log::warn!(
                "Invalid line_width {}, clamping to 1-50 range",
                self.style.line_width
            );
            self.style.line_width = self.style.line_width.clamp(1, 50);
        }

        if !(4.0..=200.0).contains(&self.style.font_size) {
            log::warn!(
                "Invalid font_size {:.1}, clamping to 4.0-200.0 range",
                self.style.font_size
            );
            self.style.font_size = if self.style.font_size.is_nan() {
                12.0
            } else {
                self.style.font_size.clamp(4.0, 200.0)
            };
        }

        if self.style.font_family.trim().is_empty() {
            log::warn!("Empty font_family, falling back to 'Sans'");
            self.style.font_family = "Sans".to_string();
        }

        if self.shadow.blur_radius > 32 {
            log::warn!(
                "Invalid shadow blur_radius {}, clamping to 0-32 range",
                self.shadow.blur_radius
            );
            self.shadow.blur_radius = 32;
        }

        if !(0..=64).contains(&self.shadow.offset) {
            log::warn!(
                "Invalid shadow offset {}, clamping to 0-64 range",
                self.shadow.offset
            );
            self.shadow.offset = self.shadow.offset.clamp(0, 64);
        }

        if !(0.0..=3600.0).contains(&self.presentation.default_seconds) {
            log::warn!(
                "Invalid default_seconds {:.2}, clamping to 0.0-3600.0 range",
                self.presentation.default_seconds
            );
            self.presentation.default_seconds = if self.presentation.default_seconds.is_nan() {
                3.0
            } else {
                self.presentation.default_seconds.clamp(0.0, 3600.0)
            };
        }

        for (name, value) in [
            ("screen_width", &mut self.presentation.screen_width),
            ("screen_height", &mut self.presentation.screen_height),
        ] {
            if !(1..=16384).contains(value) {
                log::warn!("Invalid {} {}, clamping to 1-16384 range", name, value);
                *value = (*value).clamp(1, 16384);
            }
        }

        for (name, spec) in [
            ("style.line_color", &self.style.line_color),
            ("style.color", &self.style.color),
            ("style.label_background", &self.style.label_background),
            ("shadow.color", &self.shadow.color),
        ] {
            if !spec.is_valid() {
                log::warn!("Invalid {} {:?}, the built-in default will be used", name, spec);
            }
        }
    }

    /// Returns the path to the configuration file.
    ///
    /// The config file is located at `~/.config/screenmark/config.toml`.
    ///
    /// # Errors
    /// Returns an error if the config directory cannot be determined (e.g., HOME not set).
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not find config directory")?
            .join("screenmark");

        Ok(config_dir.join("config.toml"))
    }

    /// Loads configuration from the default location, or returns defaults if not found.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The config directory path cannot be determined
    /// - The file exists but cannot be read
    /// - The file exists but contains invalid TOML syntax
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if !config_path.exists() {
            info!("Config file not found, using defaults");
            debug!("Expected config at: {}", config_path.display());
            return Ok(Self::default());
        }

        Self::load_from(&config_path)
    }

    /// Loads and validates configuration from an explicit path.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        let config_str = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config from {}", config_path.display()))?;

        let mut config: Config = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config from {}", config_path.display()))?;

        config.validate_and_clamp();

        info!("Loaded config from {}", config_path.display());
        debug!("Config: {:?}", config);

        Ok(config)
    }

    /// Creates a default configuration file with documentation comments.
    ///
    /// Writes the example config from `config.example.toml` to the user's config directory
    /// and returns its path.
    ///
    /// # Errors
    /// Returns an error if:
    /// - A config file already exists at the target path
    /// - The config directory cannot be created
    /// - The file cannot be written
    pub fn create_default_file() -> Result<PathBuf> {
        let config_path = Self::get_config_path()?;

        if config_path.exists() {
            return Err(anyhow::anyhow!(
                "Config file already exists at {}",
                config_path.display()
            ));
        }

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let default_config = include_str!("../../config.example.toml");
        fs::write(&config_path, default_config)
            .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

        info!("Created default config at {}", config_path.display());
        Ok(config_path)
    }

    /// JSON schema describing the configuration file.
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Config)
    }

    /// Style applied to newly added elements.
    pub fn default_style(&self) -> Style {
        Style {
            line_color: self.style.line_color.to_color(RED),
            color: self.style.color.to_color(BLACK),
            line_width: self.style.line_width,
            font_size: self.style.font_size,
            ..Style::default()
        }
    }

    /// Renderer configured with the font, label badge color and shadow settings.
    pub fn renderer(&self) -> Renderer {
        Renderer {
            font: FontDescriptor::with_family(self.style.font_family.clone()),
            label_background: self.style.label_background.to_color(YELLOW),
            shadow: ShadowStyle {
                enabled: self.shadow.enabled,
                blur_radius: self.shadow.blur_radius,
                offset: self.shadow.offset,
                color: self.shadow.color.to_color(SHADOW),
            },
        }
    }

}

impl PresentationConfig {
    /// Directory for headless frame dumps, with `~` expanded.
    pub fn dump_path(&self) -> Option<PathBuf> {
        self.dump_directory.as_deref().map(crate::util::expand_tilde)
    }
}
