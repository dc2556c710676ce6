//! Errors raised while rasterizing elements or converting bitmaps.

use thiserror::Error;

/// Errors that can occur while rendering a scene or handling bitmaps.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Cairo error: {0}")]
    Cairo(#[from] cairo::Error),

    #[error("Cairo surface data is still borrowed: {0}")]
    SurfaceBorrow(#[from] cairo::BorrowError),

    #[error("Bitmap data has {len} bytes, expected {width}x{height}x4")]
    InvalidBitmap { width: u32, height: u32, len: usize },

    #[error("Bitmap dimensions {width}x{height} exceed the rasterizer limit")]
    TooLarge { width: u32, height: u32 },

    #[error("PNG error: {0}")]
    Png(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<cairo::IoError> for RenderError {
    fn from(err: cairo::IoError) -> Self {
        match err {
            cairo::IoError::Io(io) => RenderError::Io(io),
            other => RenderError::Png(other.to_string()),
        }
    }
}
