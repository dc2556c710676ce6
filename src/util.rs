//! Geometry helpers and color name lookup.
//!
//! This module provides:
//! - [`ScreenLocation`] and [`ScreenRegion`], the screen-coordinate types that
//!   callers hand to the canvas adders
//! - [`Rect`], the axis-aligned rectangle used for element bounds
//! - Name-to-color mapping used by the config file and the CLI
//! - Home directory expansion for configured paths

use std::path::PathBuf;

use crate::draw::{Color, color::*};

// ============================================================================
// Screen Coordinates
// ============================================================================

/// A point on the screen in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScreenLocation {
    pub x: i32,
    pub y: i32,
}

impl ScreenLocation {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for ScreenLocation {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

/// A rectangular area of the screen, e.g. the result of an image match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScreenRegion {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl ScreenRegion {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Geometric center of the region (rounded towards the top-left).
    pub fn center(&self) -> ScreenLocation {
        ScreenLocation::new(
            self.x.saturating_add(self.width / 2),
            self.y.saturating_add(self.height / 2),
        )
    }

    /// Bounding rectangle as `(x, y, width, height)`.
    pub fn bounds(&self) -> (i32, i32, i32, i32) {
        (self.x, self.y, self.width, self.height)
    }
}

// ============================================================================
// Color Mapping
// ============================================================================

/// Maps color name strings to Color values.
///
/// Used by the configuration system and the CLI to parse color names.
///
/// # Supported Names (case-insensitive)
/// - "red", "green", "blue", "yellow", "orange", "pink", "white", "black", "transparent"
pub fn name_to_color(name: &str) -> Option<Color> {
    match name.to_lowercase().as_str() {
        "red" => Some(RED),
        "green" => Some(GREEN),
        "blue" => Some(BLUE),
        "yellow" => Some(YELLOW),
        "orange" => Some(ORANGE),
        "pink" => Some(PINK),
        "white" => Some(WHITE),
        "black" => Some(BLACK),
        "transparent" => Some(TRANSPARENT),
        _ => None,
    }
}

/// Parses a color from either a name or a `#rrggbb` / `#rrggbbaa` hex string.
pub fn parse_color(value: &str) -> Option<Color> {
    let value = value.trim();
    let Some(hex) = value.strip_prefix('#') else {
        return name_to_color(value);
    };

    if !matches!(hex.len(), 6 | 8) || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    let alpha = if hex.len() == 8 { channel(6)? } else { 255 };
    Some(Color::from_rgba8(channel(0)?, channel(2)?, channel(4)?, alpha))
}

/// Expand tilde (~) in path strings.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(stripped);
    }
    PathBuf::from(path)
}

// ============================================================================
// Geometry Utilities
// ============================================================================

/// Axis-aligned rectangle with positive area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    /// Creates a new rectangle. Returns `None` unless width and height are positive.
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Option<Self> {
        if width <= 0 || height <= 0 {
            None
        } else {
            Some(Self {
                x,
                y,
                width,
                height,
            })
        }
    }

    /// Builds a rectangle from min/max bounds (inclusive min, exclusive max).
    pub fn from_min_max(min_x: i32, min_y: i32, max_x: i32, max_y: i32) -> Option<Self> {
        let width = max_x.saturating_sub(min_x);
        let height = max_y.saturating_sub(min_y);
        Self::new(min_x, min_y, width, height)
    }

    /// Exclusive right edge.
    pub fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height)
    }

    /// Grows the rectangle by `by` pixels on every side.
    pub fn inflate(&self, by: i32) -> Option<Rect> {
        Rect::from_min_max(
            self.x.saturating_sub(by),
            self.y.saturating_sub(by),
            self.right().saturating_add(by),
            self.bottom().saturating_add(by),
        )
    }

    /// Returns the overlapping area of two rectangles, if any.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        Rect::from_min_max(
            self.x.max(other.x),
            self.y.max(other.y),
            self.right().min(other.right()),
            self.bottom().min(other.bottom()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::{BLACK, RED, WHITE};

    #[test]
    fn region_center_uses_integer_midpoint() {
        let region = ScreenRegion::new(100, 100, 50, 40);
        assert_eq!(region.center(), ScreenLocation::new(125, 120));

        let odd = ScreenRegion::new(0, 0, 5, 3);
        assert_eq!(odd.center(), ScreenLocation::new(2, 1));
    }

    #[test]
    fn name_color_mappings() {
        assert_eq!(name_to_color("white").unwrap(), WHITE);
        assert_eq!(name_to_color("BLACK").unwrap(), BLACK);
        assert!(name_to_color("chartreuse").is_none());
    }

    #[test]
    fn parse_color_accepts_names_and_hex() {
        assert_eq!(parse_color("red").unwrap(), RED);
        assert_eq!(parse_color("#ff0000").unwrap(), RED);
        assert_eq!(
            parse_color("#0a0a0ac8").unwrap().to_rgba8(),
            [10, 10, 10, 200]
        );
        assert!(parse_color("#12345").is_none());
        assert!(parse_color("#gg0000").is_none());
    }

    #[test]
    fn test_expand_tilde() {
        let expanded = expand_tilde("~/Pictures");
        assert!(!expanded.to_string_lossy().starts_with("~"));

        let no_tilde = expand_tilde("/absolute/path");
        assert_eq!(no_tilde, PathBuf::from("/absolute/path"));
    }

    #[test]
    fn rect_rejects_empty_area() {
        assert!(Rect::new(0, 0, 0, 10).is_none());
        assert!(Rect::new(0, 0, 10, -1).is_none());
        assert!(Rect::new(5, 5, 1, 1).is_some());
    }

    #[test]
    fn rect_intersection() {
        let a = Rect::new(0, 0, 10, 10).unwrap();
        let b = Rect::new(5, 5, 10, 10).unwrap();
        assert_eq!(a.intersection(&b), Rect::new(5, 5, 5, 5));

        let c = Rect::new(20, 20, 5, 5).unwrap();
        assert!(a.intersection(&c).is_none());
    }

    #[test]
    fn extreme_coordinates_saturate() {
        let far = Rect::new(i32::MAX - 5, i32::MIN, i32::MAX, 10).unwrap();
        assert_eq!(far.right(), i32::MAX);
        assert_eq!(far.inflate(2).unwrap().x, i32::MAX - 7);
        let screen = Rect::new(0, 0, 100, 100).unwrap();
        assert!(far.intersection(&screen).is_none());

        let region = ScreenRegion::new(i32::MAX, i32::MAX, 10, 10);
        assert_eq!(region.center(), ScreenLocation::new(i32::MAX, i32::MAX));
    }
}
