//! Drop shadow generation.
//!
//! A shadow is the alpha silhouette of an element's content raster, tinted
//! with the shadow color and softened with a separable Gaussian blur. Cairo has
//! no blur primitive, so the blur runs on the raw surface data.

use super::color::{Color, SHADOW};
use super::error::RenderError;

/// Drop shadow parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowStyle {
    /// Draw shadows at all
    pub enabled: bool,
    /// Blur radius in pixels; the silhouette grows by this much on every side
    pub blur_radius: u32,
    /// Down-right displacement of the shadow relative to the content, in pixels
    pub offset: i32,
    /// Shadow tint (alpha scales the blurred silhouette)
    pub color: Color,
}

impl Default for ShadowStyle {
    fn default() -> Self {
        Self {
            enabled: true,
            blur_radius: 4,
            offset: 5,
            color: SHADOW,
        }
    }
}

impl ShadowStyle {
    /// Shadows switched off.
    pub fn none() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Extra size the enclosing bitmap needs on each axis: `2 * blur_radius + offset`.
    pub fn margin(&self) -> i32 {
        if self.enabled {
            2 * self.blur_radius as i32 + self.offset
        } else {
            0
        }
    }
}

/// Normalized 1-D Gaussian kernel with `2 * radius + 1` taps and sigma `radius / 2`.
pub fn gaussian_kernel(radius: u32) -> Vec<f64> {
    if radius == 0 {
        return vec![1.0];
    }
    let sigma = radius as f64 / 2.0;
    let r = radius as i32;
    let weights: Vec<f64> = (-r..=r)
        .map(|i| (-((i * i) as f64) / (2.0 * sigma * sigma)).exp())
        .collect();
    let sum: f64 = weights.iter().sum();
    weights.into_iter().map(|w| w / sum).collect()
}

/// Blurs an 8-bit alpha plane. Samples outside the plane count as transparent.
pub fn blur_alpha(alpha: &[u8], width: usize, height: usize, radius: u32) -> Vec<u8> {
    debug_assert_eq!(alpha.len(), width * height);
    if radius == 0 || width == 0 || height == 0 {
        return alpha.to_vec();
    }

    let kernel = gaussian_kernel(radius);
    let r = radius as isize;

    // Horizontal pass keeps full precision for the vertical pass.
    let mut horizontal = vec![0.0f64; width * height];
    for y in 0..height {
        let row = &alpha[y * width..(y + 1) * width];
        for x in 0..width {
            let mut acc = 0.0;
            for (k, weight) in kernel.iter().enumerate() {
                let sx = x as isize + k as isize - r;
                if sx >= 0 && (sx as usize) < width {
                    acc += row[sx as usize] as f64 * weight;
                }
            }
            horizontal[y * width + x] = acc;
        }
    }

    let mut out = vec![0u8; width * height];
    for y in 0..height {
        for x in 0..width {
            let mut acc = 0.0;
            for (k, weight) in kernel.iter().enumerate() {
                let sy = y as isize + k as isize - r;
                if sy >= 0 && (sy as usize) < height {
                    acc += horizontal[sy as usize * width + x] * weight;
                }
            }
            out[y * width + x] = acc.round().clamp(0.0, 255.0) as u8;
        }
    }
    out
}

/// Builds the blurred, tinted shadow raster for `content`.
///
/// The result is `blur_radius` larger than the content on every side; the
/// silhouette sits at `(blur_radius, blur_radius)` inside it. `content` must not
/// be the target of a live `cairo::Context`.
pub fn shadow_surface(
    content: &mut cairo::ImageSurface,
    style: &ShadowStyle,
) -> Result<cairo::ImageSurface, RenderError> {
    content.flush();
    let width = content.width().max(0) as usize;
    let height = content.height().max(0) as usize;
    let radius = style.blur_radius as usize;
    let out_width = width + 2 * radius;
    let out_height = height + 2 * radius;

    let mut silhouette = vec![0u8; out_width * out_height];
    {
        let stride = content.stride() as usize;
        let data = content.data()?;
        for y in 0..height {
            let line = &data[y * stride..y * stride + width * 4];
            for (x, px) in line.chunks_exact(4).enumerate() {
                let argb = u32::from_ne_bytes([px[0], px[1], px[2], px[3]]);
                silhouette[(y + radius) * out_width + x + radius] = (argb >> 24) as u8;
            }
        }
    }

    let blurred = blur_alpha(&silhouette, out_width, out_height, style.blur_radius);

    let mut shadow = cairo::ImageSurface::create(
        cairo::Format::ARgb32,
        out_width as i32,
        out_height as i32,
    )?;
    let [tr, tg, tb, ta] = style.color.to_rgba8();
    {
        let stride = shadow.stride() as usize;
        let mut data = shadow.data()?;
        for y in 0..out_height {
            for x in 0..out_width {
                let coverage = blurred[y * out_width + x] as u32;
                if coverage == 0 {
                    continue;
                }
                let a = (ta as u32 * coverage + 127) / 255;
                let premul = |c: u8| (c as u32 * a + 127) / 255;
                let argb = a << 24 | premul(tr) << 16 | premul(tg) << 8 | premul(tb);
                let offset = y * stride + x * 4;
                data[offset..offset + 4].copy_from_slice(&argb.to_ne_bytes());
            }
        }
    }
    shadow.mark_dirty();

    Ok(shadow)
}
