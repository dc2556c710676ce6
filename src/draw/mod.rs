//! Overlay model and Cairo rendering.
//!
//! This module defines the core drawing types used for screen overlays:
//! - [`Color`]: RGBA color representation with predefined color constants
//! - [`Element`]: the four shape kinds (box, circle, label, image) plus their [`Style`]
//! - [`Scene`]: ordered container of elements, insertion order is paint order
//! - [`Bitmap`]: immutable RGBA raster exchanged with callers
//! - [`Renderer`]: content raster, drop shadow and scene composite

pub mod bitmap;
pub mod color;
pub mod element;
pub mod error;
pub mod font;
pub mod render;
pub mod scene;
pub mod shadow;

// Re-export commonly used types at module level
pub use bitmap::Bitmap;
pub use color::Color;
pub use element::{Element, ElementKind, HorizontalAlignment, Style, VerticalAlignment};
pub use error::RenderError;
pub use font::FontDescriptor;
pub use render::{ElementLayers, RenderedElement, Renderer};
pub use scene::Scene;
pub use shadow::ShadowStyle;

pub use color::{BLACK, BLUE, GREEN, ORANGE, PINK, RED, SHADOW, TRANSPARENT, WHITE, YELLOW};
