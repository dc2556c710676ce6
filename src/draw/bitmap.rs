//! Immutable RGBA raster images.
//!
//! [`Bitmap`] is the exchange format at the crate boundary: callers pass one to
//! [`Canvas::add_image`](crate::canvas::Canvas::add_image), and
//! [`Canvas::create_image`](crate::canvas::Canvas::create_image) returns the
//! composite as one. Pixels are stored as straight (non-premultiplied) RGBA,
//! 8 bits per channel, row-major without padding. Cloning is cheap; the pixel
//! buffer is shared.

use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use super::error::RenderError;

/// Largest edge Cairo's image backend accepts.
const MAX_DIMENSION: u32 = 32767;

#[derive(Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    pixels: Arc<[u8]>,
}

impl fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bitmap")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl Bitmap {
    /// Wraps an RGBA buffer of exactly `width * height * 4` bytes.
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self, RenderError> {
        if width > MAX_DIMENSION || height > MAX_DIMENSION {
            return Err(RenderError::TooLarge { width, height });
        }
        if rgba.len() != width as usize * height as usize * 4 {
            return Err(RenderError::InvalidBitmap {
                width,
                height,
                len: rgba.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels: rgba.into(),
        })
    }

    /// A fully transparent bitmap.
    pub fn transparent(width: u32, height: u32) -> Self {
        Self::filled(width, height, [0, 0, 0, 0])
    }

    /// A bitmap where every pixel has the given RGBA value.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let count = width as usize * height as usize;
        let pixels: Vec<u8> = rgba.iter().copied().cycle().take(count * 4).collect();
        Self {
            width,
            height,
            pixels: pixels.into(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA bytes, row-major.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// RGBA value at `(x, y)`, or `None` outside the bitmap.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        let px = &self.pixels[offset..offset + 4];
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Returns true when every pixel has zero alpha.
    pub fn is_fully_transparent(&self) -> bool {
        self.pixels.chunks_exact(4).all(|px| px[3] == 0)
    }

    /// Copies a Cairo image surface into a new bitmap, un-premultiplying alpha.
    ///
    /// The surface must not be the target of a live `cairo::Context`.
    pub fn from_surface(surface: &mut cairo::ImageSurface) -> Result<Self, RenderError> {
        let format = surface.format();
        if format != cairo::Format::ARgb32 && format != cairo::Format::Rgb24 {
            let mut converted = repaint_as_argb(surface)?;
            return Self::from_surface(&mut converted);
        }

        surface.flush();
        let width = surface.width().max(0) as u32;
        let height = surface.height().max(0) as u32;
        let stride = surface.stride() as usize;
        let opaque = format == cairo::Format::Rgb24;
        let data = surface.data()?;

        let mut rgba = Vec::with_capacity(width as usize * height as usize * 4);
        for row in 0..height as usize {
            let line = &data[row * stride..row * stride + width as usize * 4];
            for px in line.chunks_exact(4) {
                let argb = u32::from_ne_bytes([px[0], px[1], px[2], px[3]]);
                let a = if opaque { 255 } else { (argb >> 24) as u8 };
                let r = unpremultiply((argb >> 16) as u8, a);
                let g = unpremultiply((argb >> 8) as u8, a);
                let b = unpremultiply(argb as u8, a);
                rgba.extend_from_slice(&[r, g, b, a]);
            }
        }
        drop(data);

        Self::new(width, height, rgba)
    }

    /// Creates a Cairo ARGB32 surface holding a premultiplied copy of this bitmap.
    pub fn to_surface(&self) -> Result<cairo::ImageSurface, RenderError> {
        let stride = cairo::Format::ARgb32.stride_for_width(self.width)?;
        let row_bytes = stride as usize;
        let mut data = vec![0u8; row_bytes * self.height as usize];

        for (row, line) in self.pixels.chunks_exact(self.width.max(1) as usize * 4).enumerate() {
            let out = &mut data[row * row_bytes..row * row_bytes + line.len()];
            for (src, dst) in line.chunks_exact(4).zip(out.chunks_exact_mut(4)) {
                let a = src[3];
                let argb = (a as u32) << 24
                    | (premultiply(src[0], a) as u32) << 16
                    | (premultiply(src[1], a) as u32) << 8
                    | premultiply(src[2], a) as u32;
                dst.copy_from_slice(&argb.to_ne_bytes());
            }
        }

        let surface = cairo::ImageSurface::create_for_data(
            data,
            cairo::Format::ARgb32,
            self.width as i32,
            self.height as i32,
            stride,
        )?;
        Ok(surface)
    }

    /// Loads a PNG file.
    pub fn load_png(path: &Path) -> Result<Self, RenderError> {
        let mut reader = BufReader::new(File::open(path)?);
        let mut surface = cairo::ImageSurface::create_from_png(&mut reader)?;
        Self::from_surface(&mut surface)
    }

    /// Encodes this bitmap as PNG into `writer`.
    pub fn write_png<W: Write>(&self, writer: &mut W) -> Result<(), RenderError> {
        let surface = self.to_surface()?;
        surface.write_to_png(writer)?;
        Ok(())
    }

    /// Writes this bitmap as a PNG file.
    pub fn save_png(&self, path: &Path) -> Result<(), RenderError> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_png(&mut writer)?;
        writer.flush()?;
        log::debug!(
            "Wrote {}x{} bitmap to {}",
            self.width,
            self.height,
            path.display()
        );
        Ok(())
    }
}

fn repaint_as_argb(surface: &cairo::ImageSurface) -> Result<cairo::ImageSurface, RenderError> {
    let target =
        cairo::ImageSurface::create(cairo::Format::ARgb32, surface.width(), surface.height())?;
    {
        let ctx = cairo::Context::new(&target)?;
        ctx.set_source_surface(surface, 0.0, 0.0)?;
        ctx.paint()?;
    }
    Ok(target)
}

fn premultiply(channel: u8, alpha: u8) -> u8 {
    ((channel as u32 * alpha as u32 + 127) / 255) as u8
}

fn unpremultiply(channel: u8, alpha: u8) -> u8 {
    if alpha == 0 {
        return 0;
    }
    ((channel as u32 * 255 + alpha as u32 / 2) / alpha as u32).min(255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_mismatched_buffer() {
        let err = Bitmap::new(2, 2, vec![0; 15]).unwrap_err();
        assert!(matches!(
            err,
            RenderError::InvalidBitmap {
                width: 2,
                height: 2,
                len: 15
            }
        ));
    }

    #[test]
    fn pixel_lookup_is_bounds_checked() {
        let bitmap = Bitmap::filled(3, 2, [1, 2, 3, 4]);
        assert_eq!(bitmap.pixel(2, 1), Some([1, 2, 3, 4]));
        assert_eq!(bitmap.pixel(3, 0), None);
        assert_eq!(bitmap.pixel(0, 2), None);
    }

    #[test]
    fn transparent_bitmap_reports_transparent() {
        assert!(Bitmap::transparent(8, 8).is_fully_transparent());
        assert!(!Bitmap::filled(1, 1, [0, 0, 0, 1]).is_fully_transparent());
    }

    #[test]
    fn surface_conversion_preserves_opaque_pixels() {
        let mut rgba = Vec::new();
        for color in [[255, 0, 0, 255], [0, 255, 0, 255], [0, 0, 255, 255], [9, 8, 7, 255]] {
            rgba.extend_from_slice(&color);
        }
        let bitmap = Bitmap::new(2, 2, rgba).unwrap();

        let mut surface = bitmap.to_surface().unwrap();
        let back = Bitmap::from_surface(&mut surface).unwrap();
        assert_eq!(back, bitmap);
    }

    #[test]
    fn surface_conversion_keeps_translucent_color_close() {
        let bitmap = Bitmap::filled(1, 1, [200, 100, 50, 128]);
        let mut surface = bitmap.to_surface().unwrap();
        let back = Bitmap::from_surface(&mut surface).unwrap();
        let px = back.pixel(0, 0).unwrap();
        assert_eq!(px[3], 128);
        for (got, want) in px[..3].iter().zip([200u8, 100, 50]) {
            assert!((*got as i32 - want as i32).abs() <= 2, "{px:?}");
        }
    }

    #[test]
    fn png_encoding_writes_signature() {
        let mut buffer = Vec::new();
        Bitmap::filled(4, 4, [255, 255, 0, 255])
            .write_png(&mut buffer)
            .unwrap();
        assert_eq!(&buffer[0..8], &[137, 80, 78, 71, 13, 10, 26, 10]);
    }
}
