//! Configuration enum types.

use crate::draw::Color;
use log::warn;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Which host windowing layer presents the overlay.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum BackendKind {
    /// Wayland when `WAYLAND_DISPLAY` is set, headless otherwise
    #[default]
    Auto,
    /// Always use the Wayland layer-shell overlay
    Wayland,
    /// Never touch the display; frames are only recorded (and optionally dumped)
    Headless,
}

/// Color specification - a named color, a hex string, or RGB(A) values.
///
/// # Examples
/// ```toml
/// # Named color
/// line_color = "red"
///
/// # Hex color
/// line_color = "#ff8000"
///
/// # Custom RGB color (0-255 per component)
/// line_color = [255, 128, 0]
///
/// # Custom RGBA color
/// color = [10, 10, 10, 200]
/// ```
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
#[serde(untagged)]
pub enum ColorSpec {
    /// Named color (red, green, blue, yellow, orange, pink, white, black, transparent) or `#rrggbb[aa]`
    Name(String),
    /// RGB color as [red, green, blue] where each component is 0-255
    Rgb([u8; 3]),
    /// RGBA color as [red, green, blue, alpha] where each component is 0-255
    Rgba([u8; 4]),
}

impl ColorSpec {
    /// Converts the color specification to a [`Color`].
    ///
    /// Unknown names log a warning and yield `fallback`.
    pub fn to_color(&self, fallback: Color) -> Color {
        match self {
            ColorSpec::Name(name) => crate::util::parse_color(name).unwrap_or_else(|| {
                warn!("Unknown color '{}', using fallback", name);
                fallback
            }),
            ColorSpec::Rgb([r, g, b]) => Color::from_rgba8(*r, *g, *b, 255),
            ColorSpec::Rgba([r, g, b, a]) => Color::from_rgba8(*r, *g, *b, *a),
        }
    }

    /// Returns true if the specification names a color we can resolve.
    pub fn is_valid(&self) -> bool {
        match self {
            ColorSpec::Name(name) => crate::util::parse_color(name).is_some(),
            _ => true,
        }
    }
}
