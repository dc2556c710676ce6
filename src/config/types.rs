//! Configuration type definitions.

use super::enums::{BackendKind, ColorSpec};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Default appearance of newly added elements.
///
/// Every value can still be overridden per element through the style configurator.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct StyleConfig {
    /// Stroke color of boxes and circles
    #[serde(default = "default_line_color")]
    pub line_color: ColorSpec,

    /// Text color of labels
    #[serde(default = "default_text_color")]
    pub color: ColorSpec,

    /// Badge color behind label text
    #[serde(default = "default_label_background")]
    pub label_background: ColorSpec,

    /// Stroke width in pixels (valid range: 1 - 50)
    #[serde(default = "default_line_width")]
    pub line_width: i32,

    /// Label font size in pixels (valid range: 4.0 - 200.0)
    #[serde(default = "default_font_size")]
    pub font_size: f64,

    /// Font family for labels (e.g., "Sans", "Monospace", "DejaVu Sans")
    #[serde(default = "default_font_family")]
    pub font_family: String,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            line_color: default_line_color(),
            color: default_text_color(),
            label_background: default_label_background(),
            line_width: default_line_width(),
            font_size: default_font_size(),
            font_family: default_font_family(),
        }
    }
}

/// Drop shadow settings.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ShadowConfig {
    /// Draw a drop shadow under every element
    #[serde(default = "default_shadow_enabled")]
    pub enabled: bool,

    /// Gaussian blur radius in pixels (valid range: 0 - 32)
    #[serde(default = "default_blur_radius")]
    pub blur_radius: u32,

    /// Down-right shadow offset in pixels (valid range: 0 - 64)
    #[serde(default = "default_shadow_offset")]
    pub offset: i32,

    /// Shadow tint, alpha included
    #[serde(default = "default_shadow_color")]
    pub color: ColorSpec,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            enabled: default_shadow_enabled(),
            blur_radius: default_blur_radius(),
            offset: default_shadow_offset(),
            color: default_shadow_color(),
        }
    }
}

/// How and for how long overlays are shown.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PresentationConfig {
    /// Presentation backend: auto, wayland or headless
    #[serde(default)]
    pub backend: BackendKind,

    /// Seconds an overlay stays up when no duration is given (valid range: 0.0 - 3600.0)
    #[serde(default = "default_seconds")]
    pub default_seconds: f64,

    /// Screen width used by the headless backend
    #[serde(default = "default_screen_width")]
    pub screen_width: u32,

    /// Screen height used by the headless backend
    #[serde(default = "default_screen_height")]
    pub screen_height: u32,

    /// Directory where the headless backend writes each presented frame as PNG
    #[serde(default)]
    pub dump_directory: Option<String>,
}

impl Default for PresentationConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            default_seconds: default_seconds(),
            screen_width: default_screen_width(),
            screen_height: default_screen_height(),
            dump_directory: None,
        }
    }
}

// =============================================================================
// Default value functions
// =============================================================================

fn default_line_color() -> ColorSpec {
    ColorSpec::Name("red".to_string())
}

fn default_text_color() -> ColorSpec {
    ColorSpec::Name("black".to_string())
}

fn default_label_background() -> ColorSpec {
    ColorSpec::Name("yellow".to_string())
}

fn default_line_width() -> i32 {
    2
}

fn default_font_size() -> f64 {
    12.0
}

fn default_font_family() -> String {
    "Sans".to_string()
}

fn default_shadow_enabled() -> bool {
    true
}

fn default_blur_radius() -> u32 {
    4
}

fn default_shadow_offset() -> i32 {
    5
}

fn default_shadow_color() -> ColorSpec {
    ColorSpec::Rgba([10, 10, 10, 200])
}

fn default_seconds() -> f64 {
    3.0
}

fn default_screen_width() -> u32 {
    1920
}

fn default_screen_height() -> u32 {
    1080
}
