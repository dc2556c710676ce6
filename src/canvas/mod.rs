//! The overlay canvas and its fluent style configurator.
//!
//! A [`Canvas`] owns a [`Scene`], a [`Renderer`] and a [`Presenter`]. Adders
//! append an element and hand back a [`StyleConfigurator`] bound to it:
//!
//! ```no_run
//! use screenmark::{Canvas, ScreenLocation, ScreenRegion, backend::HeadlessPresenter};
//! use screenmark::draw::{BLUE, RED};
//!
//! let mut canvas = Canvas::new(HeadlessPresenter::new(1920, 1080));
//! canvas
//!     .add_box(ScreenRegion::new(100, 100, 50, 40))
//!     .with_line_color(RED)
//!     .add_circle(ScreenLocation::new(120, 120))
//!     .with_line_color(BLUE)
//!     .display(1.5)?;
//! # Ok::<(), screenmark::canvas::DisplayError>(())
//! ```

use std::time::Duration;

use log::{debug, info};
use thiserror::Error;

use crate::backend::{PresentError, PresentationSlot, Presenter};
use crate::config::Config;
use crate::draw::{
    Bitmap, Color, Element, HorizontalAlignment, RenderError, Renderer, Scene, Style,
    VerticalAlignment,
};
use crate::util::{ScreenLocation, ScreenRegion};

/// Errors returned by [`Canvas::display`].
#[derive(Debug, Error)]
pub enum DisplayError {
    #[error("Failed to render overlay: {0}")]
    Render(#[from] RenderError),

    #[error("Failed to present overlay: {0}")]
    Present(#[from] PresentError),
}

/// How long an overlay stays on screen.
///
/// Built from whole or fractional seconds; negative, NaN and infinite values
/// become zero, so `3` and `3.0` are the same duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct DisplayDuration(Duration);

impl DisplayDuration {
    pub fn from_secs_f64(seconds: f64) -> Self {
        if !seconds.is_finite() || seconds <= 0.0 {
            return Self(Duration::ZERO);
        }
        Self(Duration::try_from_secs_f64(seconds).unwrap_or(Duration::MAX))
    }

    pub fn as_duration(&self) -> Duration {
        self.0
    }
}

impl From<Duration> for DisplayDuration {
    fn from(duration: Duration) -> Self {
        Self(duration)
    }
}

impl From<f64> for DisplayDuration {
    fn from(seconds: f64) -> Self {
        Self::from_secs_f64(seconds)
    }
}

impl From<f32> for DisplayDuration {
    fn from(seconds: f32) -> Self {
        Self::from_secs_f64(f64::from(seconds))
    }
}

impl From<i32> for DisplayDuration {
    fn from(seconds: i32) -> Self {
        Self(Duration::from_secs(seconds.max(0) as u64))
    }
}

impl From<u32> for DisplayDuration {
    fn from(seconds: u32) -> Self {
        Self(Duration::from_secs(u64::from(seconds)))
    }
}

impl From<u64> for DisplayDuration {
    fn from(seconds: u64) -> Self {
        Self(Duration::from_secs(seconds))
    }
}

/// Screen overlay made of boxes, circles, labels and images.
pub struct Canvas<P: Presenter> {
    scene: Scene,
    renderer: Renderer,
    style: Style,
    presenter: P,
}

impl<P: Presenter> Canvas<P> {
    /// Creates an empty canvas using the built-in style and shadow defaults.
    pub fn new(presenter: P) -> Self {
        Self {
            scene: Scene::new(),
            renderer: Renderer::default(),
            style: Style::default(),
            presenter,
        }
    }

    /// Creates an empty canvas whose defaults come from `config`.
    pub fn with_config(presenter: P, config: &Config) -> Self {
        Self {
            scene: Scene::new(),
            renderer: config.renderer(),
            style: config.default_style(),
            presenter,
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    /// Size of every composite produced by this canvas.
    pub fn screen_size(&self) -> (u32, u32) {
        self.presenter.screen_size()
    }

    fn push(&mut self, element: Element) -> StyleConfigurator<'_, P> {
        debug!(
            "Adding {} at ({}, {}) size {}x{}",
            element.kind_name(),
            element.x,
            element.y,
            element.width,
            element.height
        );
        let index = self.scene.push(element);
        StyleConfigurator {
            canvas: self,
            index,
        }
    }

    /// Adds a 20x20 circle centered on `location`.
    pub fn add_circle(&mut self, location: impl Into<ScreenLocation>) -> StyleConfigurator<'_, P> {
        let location = location.into();
        let element = Element::circle(location.x, location.y, self.style.clone());
        self.push(element)
    }

    /// Adds a rectangle outline covering `region`.
    pub fn add_box(&mut self, region: ScreenRegion) -> StyleConfigurator<'_, P> {
        let (x, y, width, height) = region.bounds();
        let element = Element::rect(x, y, width, height, self.style.clone());
        self.push(element)
    }

    /// Adds a text label anchored at `location`.
    pub fn add_label(
        &mut self,
        location: impl Into<ScreenLocation>,
        text: impl Into<String>,
    ) -> StyleConfigurator<'_, P> {
        let location = location.into();
        let element = Element::label(location.x, location.y, text.into(), self.style.clone());
        self.push(element)
    }

    /// Adds a text label anchored at the center of `region`.
    pub fn add_label_in(
        &mut self,
        region: ScreenRegion,
        text: impl Into<String>,
    ) -> StyleConfigurator<'_, P> {
        self.add_label(region.center(), text)
    }

    /// Adds `bitmap` with its top-left corner at `location`.
    pub fn add_image(
        &mut self,
        location: impl Into<ScreenLocation>,
        bitmap: &Bitmap,
    ) -> StyleConfigurator<'_, P> {
        let location = location.into();
        let element = Element::image(location.x, location.y, bitmap.clone(), self.style.clone());
        self.push(element)
    }

    /// Removes every element.
    pub fn clear(&mut self) -> &mut Self {
        debug!("Clearing {} element(s)", self.scene.len());
        self.scene.clear();
        self
    }

    /// Composites the scene into a screen-sized bitmap without presenting it.
    pub fn create_image(&self) -> Result<Bitmap, RenderError> {
        let (width, height) = self.screen_size();
        self.renderer.composite(&self.scene, width, height)
    }

    /// Shows the composite on screen, blocks for `duration`, then removes it.
    ///
    /// The scene is kept, so calling `display` again re-renders and re-presents
    /// the same elements. Fails with [`PresentError::Busy`] while another
    /// overlay from this process is on screen.
    pub fn display(&mut self, duration: impl Into<DisplayDuration>) -> Result<(), DisplayError> {
        let duration = duration.into().as_duration();
        let frame = self.create_image()?;
        let _slot = PresentationSlot::acquire()?;

        info!(
            "Displaying {} element(s) for {:.3}s",
            self.scene.len(),
            duration.as_secs_f64()
        );
        self.presenter.present(&frame, duration)?;
        Ok(())
    }
}

/// Fluent access to the style of the element that was just added.
///
/// Every `with_*` call returns the configurator again; the adders and
/// [`display`](StyleConfigurator::display) forward to the owning canvas.
pub struct StyleConfigurator<'a, P: Presenter> {
    canvas: &'a mut Canvas<P>,
    index: usize,
}

impl<'a, P: Presenter> StyleConfigurator<'a, P> {
    fn style_mut(&mut self) -> Option<&mut Style> {
        self.canvas
            .scene
            .get_mut(self.index)
            .map(|element| &mut element.style)
    }

    fn update(mut self, apply: impl FnOnce(&mut Style)) -> Self {
        if let Some(style) = self.style_mut() {
            apply(style);
        }
        self
    }

    /// The element being configured.
    pub fn element(&self) -> &Element {
        &self.canvas.scene[self.index]
    }

    pub fn with_line_color(self, color: Color) -> Self {
        self.update(|style| style.line_color = color)
    }

    pub fn with_color(self, color: Color) -> Self {
        self.update(|style| style.color = color)
    }

    pub fn with_background_color(self, color: Color) -> Self {
        self.update(|style| style.background_color = Some(color))
    }

    pub fn with_line_width(self, width: i32) -> Self {
        self.update(|style| style.line_width = width)
    }

    pub fn with_font_size(self, size: f64) -> Self {
        self.update(|style| style.font_size = size)
    }

    pub fn with_vertical_alignment_top(self) -> Self {
        self.update(|style| style.vertical_alignment = VerticalAlignment::Top)
    }

    pub fn with_vertical_alignment_middle(self) -> Self {
        self.update(|style| style.vertical_alignment = VerticalAlignment::Middle)
    }

    pub fn with_vertical_alignment_bottom(self) -> Self {
        self.update(|style| style.vertical_alignment = VerticalAlignment::Bottom)
    }

    pub fn with_horizontal_alignment_left(self) -> Self {
        self.update(|style| style.horizontal_alignment = HorizontalAlignment::Left)
    }

    pub fn with_horizontal_alignment_center(self) -> Self {
        self.update(|style| style.horizontal_alignment = HorizontalAlignment::Center)
    }

    pub fn with_horizontal_alignment_right(self) -> Self {
        self.update(|style| style.horizontal_alignment = HorizontalAlignment::Right)
    }

    pub fn add_circle(self, location: impl Into<ScreenLocation>) -> StyleConfigurator<'a, P> {
        self.canvas.add_circle(location)
    }

    pub fn add_box(self, region: ScreenRegion) -> StyleConfigurator<'a, P> {
        self.canvas.add_box(region)
    }

    pub fn add_label(
        self,
        location: impl Into<ScreenLocation>,
        text: impl Into<String>,
    ) -> StyleConfigurator<'a, P> {
        self.canvas.add_label(location, text)
    }

    pub fn add_label_in(
        self,
        region: ScreenRegion,
        text: impl Into<String>,
    ) -> StyleConfigurator<'a, P> {
        self.canvas.add_label_in(region, text)
    }

    pub fn add_image(
        self,
        location: impl Into<ScreenLocation>,
        bitmap: &Bitmap,
    ) -> StyleConfigurator<'a, P> {
        self.canvas.add_image(location, bitmap)
    }

    /// Composites the whole canvas without presenting it.
    pub fn create_image(&self) -> Result<Bitmap, RenderError> {
        self.canvas.create_image()
    }

    /// Presents the whole canvas; see [`Canvas::display`].
    pub fn display(self, duration: impl Into<DisplayDuration>) -> Result<(), DisplayError> {
        self.canvas.display(duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::HeadlessPresenter;
    use crate::draw::{BLUE, ElementKind, GREEN, RED, WHITE};

    fn canvas() -> Canvas<HeadlessPresenter> {
        Canvas::new(HeadlessPresenter::new(320, 240))
    }

    #[test]
    fn adders_derive_geometry() {
        let mut canvas = canvas();
        canvas.add_circle((200, 200));
        canvas.add_box(ScreenRegion::new(100, 100, 50, 40));
        canvas.add_label((50, 60), "Hi");
        canvas.add_label_in(ScreenRegion::new(10, 20, 30, 40), "centered");
        canvas.add_image((5, 6), &Bitmap::filled(32, 16, [0, 0, 0, 255]));

        let scene = canvas.scene();
        assert_eq!(scene.len(), 5);

        let circle = &scene[0];
        assert_eq!((circle.x, circle.y, circle.width, circle.height), (190, 190, 20, 20));

        let rect = &scene[1];
        assert_eq!((rect.x, rect.y, rect.width, rect.height), (100, 100, 50, 40));

        let label = &scene[2];
        assert_eq!((label.x, label.y), (50, 60));
        assert!(matches!(&label.kind, ElementKind::Label { text } if text == "Hi"));

        let centered = &scene[3];
        assert_eq!((centered.x, centered.y), (25, 40));

        let image = &scene[4];
        assert_eq!((image.x, image.y, image.width, image.height), (5, 6, 32, 16));
    }

    #[test]
    fn new_elements_start_with_default_style() {
        let mut canvas = canvas();
        let configurator = canvas.add_box(ScreenRegion::new(0, 0, 10, 10));
        assert_eq!(configurator.element().style, Style::default());
    }

    #[test]
    fn configurator_only_touches_the_new_element() {
        let mut canvas = canvas();
        canvas
            .add_box(ScreenRegion::new(0, 0, 10, 10))
            .with_line_color(BLUE)
            .add_circle((50, 50))
            .with_line_color(GREEN)
            .with_line_width(4)
            .with_background_color(WHITE)
            .with_font_size(20.0)
            .with_color(RED)
            .with_vertical_alignment_top()
            .with_horizontal_alignment_right();

        let scene = canvas.scene();
        assert_eq!(scene[0].style.line_color, BLUE);
        assert_eq!(scene[0].style.line_width, 2);

        let style = &scene[1].style;
        assert_eq!(style.line_color, GREEN);
        assert_eq!(style.line_width, 4);
        assert_eq!(style.background_color, Some(WHITE));
        assert_eq!(style.font_size, 20.0);
        assert_eq!(style.color, RED);
        assert_eq!(style.vertical_alignment, VerticalAlignment::Top);
        assert_eq!(style.horizontal_alignment, HorizontalAlignment::Right);
    }

    #[test]
    fn repeated_style_calls_keep_last_value() {
        let mut twice = canvas();
        twice
            .add_label((10, 10), "x")
            .with_font_size(10.0)
            .with_font_size(30.0)
            .with_vertical_alignment_bottom()
            .with_vertical_alignment_middle()
            .with_horizontal_alignment_left()
            .with_horizontal_alignment_center();

        let mut once = canvas();
        once.add_label((10, 10), "x").with_font_size(30.0);

        assert_eq!(twice.scene()[0], once.scene()[0]);
    }

    #[test]
    fn clear_empties_scene_and_chains() {
        let mut canvas = canvas();
        canvas.add_circle((10, 10));
        canvas.add_box(ScreenRegion::new(0, 0, 5, 5));

        canvas.clear().add_circle((20, 20));
        assert_eq!(canvas.scene().len(), 1);

        canvas.clear();
        let image = canvas.create_image().unwrap();
        assert_eq!((image.width(), image.height()), (320, 240));
        assert!(image.is_fully_transparent());
    }

    #[test]
    fn config_supplies_default_style() {
        let mut config = Config::default();
        config.style.line_width = 6;
        config.style.line_color = crate::config::ColorSpec::Name("blue".into());

        let mut canvas = Canvas::with_config(HeadlessPresenter::new(100, 100), &config);
        let element = canvas.add_box(ScreenRegion::new(0, 0, 10, 10)).element().clone();
        assert_eq!(element.style.line_width, 6);
        assert_eq!(element.style.line_color, BLUE);
    }

    #[test]
    fn display_duration_conversions() {
        let three = Duration::from_secs(3);
        assert_eq!(DisplayDuration::from(3).as_duration(), three);
        assert_eq!(DisplayDuration::from(3.0).as_duration(), three);
        assert_eq!(DisplayDuration::from(3u64).as_duration(), three);
        assert_eq!(DisplayDuration::from(3.0f32).as_duration(), three);
        assert_eq!(
            DisplayDuration::from(0.25).as_duration(),
            Duration::from_millis(250)
        );
        assert_eq!(DisplayDuration::from(-1).as_duration(), Duration::ZERO);
        assert_eq!(DisplayDuration::from(-0.5).as_duration(), Duration::ZERO);
        assert_eq!(DisplayDuration::from(f64::NAN).as_duration(), Duration::ZERO);
        assert_eq!(
            DisplayDuration::from(f64::INFINITY).as_duration(),
            Duration::ZERO
        );
    }
}
