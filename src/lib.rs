//! Timed on-screen overlays for visualizing screen-automation results.
//!
//! Describe boxes, circles, labels and images anchored to screen coordinates
//! through a [`Canvas`], then either composite them into a [`Bitmap`] or show
//! them as a click-through overlay for a few seconds.

pub mod backend;
pub mod canvas;
pub mod config;
pub mod draw;
pub mod util;

pub use backend::{PresentError, Presenter};
pub use canvas::{Canvas, DisplayDuration, DisplayError, StyleConfigurator};
pub use config::Config;
pub use draw::{Bitmap, Color, RenderError};
pub use util::{ScreenLocation, ScreenRegion};
