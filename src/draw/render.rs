//! Cairo-based rendering of overlay elements.
//!
//! Every element goes through the same pipeline:
//!
//! 1. a tight *content raster* holding the shape, text or image,
//! 2. a blurred, tinted *shadow* of that raster, offset down-right,
//! 3. an *enclosing* raster with the shadow underneath and the content on top,
//!    positioned so the content lands exactly on the element's anchor.
//!
//! [`Renderer::composite`] paints the enclosing rasters of a whole scene onto a
//! transparent screen-sized surface in insertion order. Content rasters there are
//! clipped to the screen plus the shadow margin, so huge or far-away elements
//! never need a surface larger than the screen.

use log::debug;

use super::bitmap::Bitmap;
use super::color::{Color, YELLOW};
use super::element::{Element, ElementKind, HorizontalAlignment, VerticalAlignment};
use super::error::RenderError;
use super::font::FontDescriptor;
use super::scene::Scene;
use super::shadow::{ShadowStyle, shadow_surface};
use crate::util::Rect;

/// Transparent border around box, circle and image content rasters.
pub const CONTENT_PADDING: i32 = 2;

/// Horizontal space between the label badge edge and the text.
pub const LABEL_PADDING_X: i32 = 2;

/// Vertical space between the label badge top and the text.
pub const LABEL_PADDING_Y: i32 = 1;

/// Renders elements with a shared font, label badge color and shadow style.
#[derive(Debug, Clone)]
pub struct Renderer {
    pub font: FontDescriptor,
    /// Badge fill for labels without an explicit background color
    pub label_background: Color,
    pub shadow: ShadowStyle,
}

impl Default for Renderer {
    fn default() -> Self {
        Self {
            font: FontDescriptor::default(),
            label_background: YELLOW,
            shadow: ShadowStyle::default(),
        }
    }
}

/// An element's enclosing raster and where it goes on screen.
#[derive(Debug)]
pub struct RenderedElement {
    /// Screen position of the raster's top-left corner
    pub origin: (i32, i32),
    /// Screen position of the content (shape without shadow) inside the raster
    pub content_origin: (i32, i32),
    pub surface: cairo::ImageSurface,
}

impl RenderedElement {
    /// Screen area covered by the enclosing raster.
    pub fn bounds(&self) -> Option<Rect> {
        Rect::new(
            self.origin.0,
            self.origin.1,
            self.surface.width(),
            self.surface.height(),
        )
    }
}

/// Content and shadow of one element as separate bitmaps, with screen origins.
#[derive(Debug)]
pub struct ElementLayers {
    pub content: Bitmap,
    pub content_origin: (i32, i32),
    pub shadow: Option<Bitmap>,
    pub shadow_origin: (i32, i32),
}

/// Content raster plus the screen position of its top-left corner.
struct Content {
    surface: cairo::ImageSurface,
    origin: (i32, i32),
}

impl Renderer {
    /// Renders every element of `scene` onto a transparent `width x height` bitmap.
    ///
    /// Elements are painted in insertion order, so later elements cover earlier ones.
    pub fn composite(&self, scene: &Scene, width: u32, height: u32) -> Result<Bitmap, RenderError> {
        let mut target =
            cairo::ImageSurface::create(cairo::Format::ARgb32, width as i32, height as i32)?;
        let screen = Rect::new(0, 0, width as i32, height as i32);
        let window = screen.and_then(|screen| screen.inflate(self.shadow.margin()));

        {
            let ctx = cairo::Context::new(&target)?;
            for element in scene {
                let Some(rendered) = self.render_within(element, window)? else {
                    debug!(
                        "Skipping empty or off-screen {} at ({}, {})",
                        element.kind_name(),
                        element.x,
                        element.y
                    );
                    continue;
                };

                let visible = match (rendered.bounds(), screen) {
                    (Some(bounds), Some(screen)) => bounds.intersection(&screen).is_some(),
                    _ => false,
                };
                if !visible {
                    debug!("Skipping off-screen {}", element.kind_name());
                    continue;
                }

                let (ox, oy) = rendered.origin;
                ctx.set_source_surface(&rendered.surface, ox as f64, oy as f64)?;
                ctx.paint()?;
            }
        }

        Bitmap::from_surface(&mut target)
    }

    /// Renders one element into its enclosing raster.
    ///
    /// Returns `Ok(None)` when the element has nothing to draw (zero or negative size).
    pub fn render_element(&self, element: &Element) -> Result<Option<RenderedElement>, RenderError> {
        self.render_within(element, None)
    }

    /// Renders `element` with its content raster clipped to `window`, if given.
    fn render_within(
        &self,
        element: &Element,
        window: Option<Rect>,
    ) -> Result<Option<RenderedElement>, RenderError> {
        let Some(mut content) = self.content(element, window)? else {
            return Ok(None);
        };

        if !self.shadow.enabled {
            return Ok(Some(RenderedElement {
                origin: content.origin,
                content_origin: content.origin,
                surface: content.surface,
            }));
        }

        let blur = self.shadow.blur_radius as i32;
        let offset = self.shadow.offset as f64;
        let shadow = shadow_surface(&mut content.surface, &self.shadow)?;

        let margin = self.shadow.margin();
        let enclosing = cairo::ImageSurface::create(
            cairo::Format::ARgb32,
            content.surface.width() + margin,
            content.surface.height() + margin,
        )?;
        {
            let ctx = cairo::Context::new(&enclosing)?;
            ctx.set_source_surface(&shadow, offset, offset)?;
            ctx.paint()?;
            ctx.set_source_surface(&content.surface, blur as f64, blur as f64)?;
            ctx.paint()?;
        }

        let origin = (
            content.origin.0.saturating_sub(blur),
            content.origin.1.saturating_sub(blur),
        );
        debug!(
            "Rendered {} at ({}, {}): {}x{} enclosing raster at {:?}",
            element.kind_name(),
            element.x,
            element.y,
            enclosing.width(),
            enclosing.height(),
            origin
        );

        Ok(Some(RenderedElement {
            origin,
            content_origin: content.origin,
            surface: enclosing,
        }))
    }

    /// Renders one element's content and shadow separately, for inspection.
    pub fn render_layers(&self, element: &Element) -> Result<Option<ElementLayers>, RenderError> {
        let Some(mut content) = self.content(element, None)? else {
            return Ok(None);
        };

        let blur = self.shadow.blur_radius as i32;
        let shadow = if self.shadow.enabled {
            let mut surface = shadow_surface(&mut content.surface, &self.shadow)?;
            Some(Bitmap::from_surface(&mut surface)?)
        } else {
            None
        };
        let shift = self.shadow.offset - blur;
        let shadow_origin = (
            content.origin.0.saturating_add(shift),
            content.origin.1.saturating_add(shift),
        );

        Ok(Some(ElementLayers {
            content: Bitmap::from_surface(&mut content.surface)?,
            content_origin: content.origin,
            shadow,
            shadow_origin,
        }))
    }

    /// Measures `text` at `font_size` pixels, returning its logical size.
    pub fn measure_text(&self, text: &str, font_size: f64) -> Result<(i32, i32), RenderError> {
        // A tiny surface is enough; only the layout is needed.
        let surface = cairo::ImageSurface::create(cairo::Format::ARgb32, 1, 1)?;
        let ctx = cairo::Context::new(&surface)?;
        let layout = self.text_layout(&ctx, text, font_size);
        Ok(layout.pixel_size())
    }

    /// Screen rectangle the label badge of `element` occupies, after alignment.
    ///
    /// Returns `None` for non-label elements.
    pub fn label_bounds(&self, element: &Element) -> Result<Option<Rect>, RenderError> {
        let ElementKind::Label { text } = &element.kind else {
            return Ok(None);
        };
        let (badge_w, badge_h) = self.badge_size(text, element.style.font_size)?;
        let (x, y) = aligned_origin(element, badge_w, badge_h);
        Ok(Rect::new(x, y, badge_w, badge_h))
    }

    fn content(&self, element: &Element, window: Option<Rect>) -> Result<Option<Content>, RenderError> {
        match &element.kind {
            ElementKind::Box => self.outline(element, false, window),
            ElementKind::Circle => self.outline(element, true, window),
            ElementKind::Label { text } => self.label(element, text, window),
            ElementKind::Image { bitmap } => self.image(element, bitmap, window),
        }
    }

    /// Stroked rectangle or ellipse inside the element bounds.
    fn outline(
        &self,
        element: &Element,
        ellipse: bool,
        window: Option<Rect>,
    ) -> Result<Option<Content>, RenderError> {
        let Some(bounds) = element.bounds() else {
            return Ok(None);
        };
        let Some(area) = ClippedArea::new(bounds, window) else {
            return Ok(None);
        };
        let style = &element.style;
        let surface = area.surface()?;

        {
            let ctx = cairo::Context::new(&surface)?;
            area.translate(&ctx);
            let line_width = style.line_width.max(0) as f64;

            // Inset by half the stroke so the visible line stays inside the bounds.
            let inset = line_width / 2.0;
            let x = CONTENT_PADDING as f64 + inset;
            let y = CONTENT_PADDING as f64 + inset;
            let w = (bounds.width as f64 - line_width).max(0.0);
            let h = (bounds.height as f64 - line_width).max(0.0);

            if ellipse {
                if w > 0.0 && h > 0.0 {
                    ctx.save()?;
                    ctx.translate(x + w / 2.0, y + h / 2.0);
                    ctx.scale(w / 2.0, h / 2.0);
                    ctx.arc(0.0, 0.0, 1.0, 0.0, 2.0 * std::f64::consts::PI);
                    ctx.restore()?;
                }
            } else {
                ctx.rectangle(x, y, w, h);
            }

            if let Some(background) = style.background_color {
                background.apply(&ctx);
                ctx.fill_preserve()?;
            }

            if line_width > 0.0 {
                style.line_color.apply(&ctx);
                ctx.set_line_width(line_width);
                ctx.set_line_join(cairo::LineJoin::Miter);
                ctx.stroke()?;
            } else {
                ctx.new_path();
            }
        }

        Ok(Some(Content {
            surface,
            origin: area.origin(),
        }))
    }

    /// Text on a filled badge, positioned by the element's alignment.
    fn label(
        &self,
        element: &Element,
        text: &str,
        window: Option<Rect>,
    ) -> Result<Option<Content>, RenderError> {
        let style = &element.style;
        let (badge_w, badge_h) = self.badge_size(text, style.font_size)?;
        let origin = aligned_origin(element, badge_w, badge_h);
        let visible = match (Rect::new(origin.0, origin.1, badge_w, badge_h), window) {
            (Some(badge), Some(window)) => badge.intersection(&window).is_some(),
            (badge, None) => badge.is_some(),
            (None, Some(_)) => false,
        };
        if !visible {
            return Ok(None);
        }
        let surface = cairo::ImageSurface::create(cairo::Format::ARgb32, badge_w, badge_h)?;

        {
            let ctx = cairo::Context::new(&surface)?;
            style
                .background_color
                .unwrap_or(self.label_background)
                .apply(&ctx);
            ctx.paint()?;

            let layout = self.text_layout(&ctx, text, style.font_size);
            ctx.move_to(LABEL_PADDING_X as f64, LABEL_PADDING_Y as f64);
            style.color.apply(&ctx);
            pangocairo::functions::show_layout(&ctx, &layout);
        }

        Ok(Some(Content { surface, origin }))
    }

    fn image(
        &self,
        element: &Element,
        bitmap: &Bitmap,
        window: Option<Rect>,
    ) -> Result<Option<Content>, RenderError> {
        let Some(bounds) = Rect::new(
            element.x,
            element.y,
            bitmap.width() as i32,
            bitmap.height() as i32,
        ) else {
            return Ok(None);
        };
        let Some(area) = ClippedArea::new(bounds, window) else {
            return Ok(None);
        };
        let surface = area.surface()?;
        let source = bitmap.to_surface()?;

        {
            let ctx = cairo::Context::new(&surface)?;
            area.translate(&ctx);
            let pad = CONTENT_PADDING as f64;
            if let Some(background) = element.style.background_color {
                background.apply(&ctx);
                ctx.rectangle(pad, pad, bounds.width as f64, bounds.height as f64);
                ctx.fill()?;
            }
            ctx.set_source_surface(&source, pad, pad)?;
            ctx.paint()?;
        }

        Ok(Some(Content {
            surface,
            origin: area.origin(),
        }))
    }

    fn badge_size(&self, text: &str, font_size: f64) -> Result<(i32, i32), RenderError> {
        let (text_w, text_h) = self.measure_text(text, font_size)?;
        Ok((text_w + 2 * LABEL_PADDING_X, text_h + 2 * LABEL_PADDING_Y))
    }

    fn text_layout(&self, ctx: &cairo::Context, text: &str, font_size: f64) -> pango::Layout {
        // Grayscale antialiasing; subpixel fringes look wrong on a transparent overlay.
        ctx.set_antialias(cairo::Antialias::Best);
        let layout = pangocairo::functions::create_layout(ctx);
        let font = self.font.to_pango(font_size);
        layout.set_font_description(Some(&font));
        layout.set_text(text);
        layout
    }
}

/// Part of a padded content raster that actually gets allocated.
///
/// Drawing code works in padded-raster coordinates; [`ClippedArea::translate`]
/// maps them onto the allocated part.
struct ClippedArea {
    /// `bounds` plus [`CONTENT_PADDING`] on every side
    padded: Rect,
    /// Allocated part of `padded`, in screen coordinates
    area: Rect,
}

impl ClippedArea {
    /// Returns `None` when nothing of the padded bounds lies inside `window`.
    fn new(bounds: Rect, window: Option<Rect>) -> Option<Self> {
        let padded = bounds.inflate(CONTENT_PADDING)?;
        let area = match window {
            Some(window) => padded.intersection(&window)?,
            None => padded,
        };
        Some(Self { padded, area })
    }

    fn surface(&self) -> Result<cairo::ImageSurface, RenderError> {
        let surface =
            cairo::ImageSurface::create(cairo::Format::ARgb32, self.area.width, self.area.height)?;
        Ok(surface)
    }

    fn translate(&self, ctx: &cairo::Context) {
        ctx.translate(
            self.padded.x as f64 - self.area.x as f64,
            self.padded.y as f64 - self.area.y as f64,
        );
    }

    fn origin(&self) -> (i32, i32) {
        (self.area.x, self.area.y)
    }
}

/// Top-left corner of a `width x height` badge aligned inside the element rectangle.
fn aligned_origin(element: &Element, width: i32, height: i32) -> (i32, i32) {
    let extent_w = element.width.max(0);
    let extent_h = element.height.max(0);

    let x = match element.style.horizontal_alignment {
        HorizontalAlignment::Left => element.x,
        HorizontalAlignment::Center => element.x.saturating_add((extent_w - width) / 2),
        HorizontalAlignment::Right => element.x.saturating_add(extent_w - width),
    };
    let y = match element.style.vertical_alignment {
        VerticalAlignment::Top => element.y,
        VerticalAlignment::Middle => element.y.saturating_add((extent_h - height) / 2),
        VerticalAlignment::Bottom => element.y.saturating_add(extent_h - height),
    };
    (x, y)
}
