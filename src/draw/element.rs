//! Overlay element definitions.

use super::bitmap::Bitmap;
use super::color::{BLACK, Color, RED};
use crate::util::Rect;

/// Vertical placement of a label relative to its element rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VerticalAlignment {
    Top,
    #[default]
    Middle,
    Bottom,
}

/// Horizontal placement of a label relative to its element rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HorizontalAlignment {
    Left,
    #[default]
    Center,
    Right,
}

/// Appearance shared by every element kind.
#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    /// Stroke color for boxes and circles
    pub line_color: Color,
    /// Foreground (text) color
    pub color: Color,
    /// Fill behind the shape; labels fall back to the renderer's badge color when unset
    pub background_color: Option<Color>,
    /// Stroke width in pixels
    pub line_width: i32,
    /// Label font size in pixels
    pub font_size: f64,
    pub vertical_alignment: VerticalAlignment,
    pub horizontal_alignment: HorizontalAlignment,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            line_color: RED,
            color: BLACK,
            background_color: None,
            line_width: 2,
            font_size: 12.0,
            vertical_alignment: VerticalAlignment::default(),
            horizontal_alignment: HorizontalAlignment::default(),
        }
    }
}

/// Kind-specific payload of an element.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementKind {
    /// Rectangle outline
    Box,
    /// Ellipse outline inscribed in the element rectangle
    Circle,
    /// Text on a filled badge; sized from the measured text at render time
    Label { text: String },
    /// Raster image; the element size mirrors the bitmap size
    Image { bitmap: Bitmap },
}

/// A single shape in a scene, anchored at `(x, y)` in screen pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub style: Style,
    pub kind: ElementKind,
}

impl Element {
    /// Rectangle outline covering `(x, y, width, height)`.
    pub fn rect(x: i32, y: i32, width: i32, height: i32, style: Style) -> Self {
        Self {
            x,
            y,
            width,
            height,
            style,
            kind: ElementKind::Box,
        }
    }

    /// 20x20 circle centered on `(cx, cy)`.
    pub fn circle(cx: i32, cy: i32, style: Style) -> Self {
        Self {
            x: cx.saturating_sub(10),
            y: cy.saturating_sub(10),
            width: 20,
            height: 20,
            style,
            kind: ElementKind::Circle,
        }
    }

    /// Label anchored at `(x, y)`; its size is only known once the text is measured.
    pub fn label(x: i32, y: i32, text: String, style: Style) -> Self {
        Self {
            x,
            y,
            width: 0,
            height: 0,
            style,
            kind: ElementKind::Label { text },
        }
    }

    /// Image with its top-left corner at `(x, y)`.
    pub fn image(x: i32, y: i32, bitmap: Bitmap, style: Style) -> Self {
        Self {
            x,
            y,
            width: bitmap.width() as i32,
            height: bitmap.height() as i32,
            style,
            kind: ElementKind::Image { bitmap },
        }
    }

    /// Short kind name, used in log output.
    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            ElementKind::Box => "box",
            ElementKind::Circle => "circle",
            ElementKind::Label { .. } => "label",
            ElementKind::Image { .. } => "image",
        }
    }

    /// Returns the area covered by the shape, before shadow and padding.
    ///
    /// Negative sizes clamp to zero, in which case there is nothing to draw and
    /// `None` is returned. Labels return `None` because their extent depends on
    /// text measurement.
    pub fn bounds(&self) -> Option<Rect> {
        match self.kind {
            ElementKind::Label { .. } => None,
            _ => Rect::new(self.x, self.y, self.width.max(0), self.height.max(0)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_style_matches_documented_defaults() {
        let style = Style::default();
        assert_eq!(style.line_color, RED);
        assert_eq!(style.color, BLACK);
        assert_eq!(style.background_color, None);
        assert_eq!(style.line_width, 2);
        assert_eq!(style.font_size, 12.0);
        assert_eq!(style.vertical_alignment, VerticalAlignment::Middle);
        assert_eq!(style.horizontal_alignment, HorizontalAlignment::Center);
    }

    #[test]
    fn circle_is_centered_on_location() {
        let circle = Element::circle(200, 200, Style::default());
        assert_eq!((circle.x, circle.y), (190, 190));
        assert_eq!((circle.width, circle.height), (20, 20));
    }

    #[test]
    fn circle_near_coordinate_limit_saturates() {
        let circle = Element::circle(i32::MIN + 3, i32::MIN, Style::default());
        assert_eq!((circle.x, circle.y), (i32::MIN, i32::MIN));
    }

    #[test]
    fn image_takes_size_from_bitmap() {
        let element = Element::image(4, 5, Bitmap::transparent(32, 16), Style::default());
        assert_eq!((element.width, element.height), (32, 16));
        assert_eq!(element.bounds(), Rect::new(4, 5, 32, 16));
    }

    #[test]
    fn negative_geometry_has_no_bounds() {
        let mut element = Element::rect(10, 10, 40, 30, Style::default());
        assert!(element.bounds().is_some());
        element.width = -5;
        assert!(element.bounds().is_none());
    }

    #[test]
    fn labels_have_no_static_bounds() {
        let label = Element::label(0, 0, String::new(), Style::default());
        assert!(label.bounds().is_none());
        assert_eq!(label.kind_name(), "label");
    }
}
