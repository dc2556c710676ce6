//! Presentation backends.
//!
//! A [`Presenter`] puts a finished screen-sized [`Bitmap`] on top of everything
//! else for a fixed time, then removes it again. Two implementations exist:
//! - [`wayland::WaylandPresenter`]: a click-through wlr-layer-shell overlay
//! - [`HeadlessPresenter`]: records frames (and optionally writes them as PNG)
//!   without touching the display
//!
//! Only one overlay may be on screen per process; [`PresentationSlot`] enforces that.

use std::env;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use log::{debug, info};
use thiserror::Error;

use crate::config::{BackendKind, PresentationConfig};
use crate::draw::Bitmap;

pub mod headless;
pub mod wayland;

pub use headless::HeadlessPresenter;

/// Errors raised while showing an overlay.
#[derive(Debug, Error)]
pub enum PresentError {
    #[error("No display available: {0}")]
    NoDisplay(String),

    #[error("Another overlay is already being displayed")]
    Busy,

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// Something that can show a frame on screen for a while.
pub trait Presenter {
    /// Logical size of the screen the overlay covers.
    fn screen_size(&self) -> (u32, u32);

    /// Shows `frame` anchored at the screen's top-left corner, blocks for
    /// `duration`, then removes it.
    fn present(&mut self, frame: &Bitmap, duration: Duration) -> Result<(), PresentError>;
}

impl<P: Presenter + ?Sized> Presenter for Box<P> {
    fn screen_size(&self) -> (u32, u32) {
        (**self).screen_size()
    }

    fn present(&mut self, frame: &Bitmap, duration: Duration) -> Result<(), PresentError> {
        (**self).present(frame, duration)
    }
}

static PRESENTING: AtomicBool = AtomicBool::new(false);

/// Process-wide exclusive right to have an overlay on screen.
///
/// Released when dropped.
#[derive(Debug)]
pub struct PresentationSlot {
    _private: (),
}

impl PresentationSlot {
    /// Claims the slot, failing with [`PresentError::Busy`] while another
    /// overlay is up.
    pub fn acquire() -> Result<Self, PresentError> {
        PRESENTING
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| PresentError::Busy)?;
        debug!("Presentation slot acquired");
        Ok(Self { _private: () })
    }
}

impl Drop for PresentationSlot {
    fn drop(&mut self) {
        PRESENTING.store(false, Ordering::Release);
        debug!("Presentation slot released");
    }
}

/// Opens the presenter selected by the configuration.
///
/// `auto` picks Wayland when `WAYLAND_DISPLAY` is set and falls back to headless
/// otherwise; an explicit `wayland` backend fails with [`PresentError::NoDisplay`]
/// when no compositor is reachable.
pub fn open(config: &PresentationConfig) -> Result<Box<dyn Presenter>, PresentError> {
    let has_wayland = env::var_os("WAYLAND_DISPLAY").is_some_and(|v| !v.is_empty());

    match config.backend {
        BackendKind::Headless => Ok(Box::new(HeadlessPresenter::from_config(config))),
        BackendKind::Wayland if !has_wayland => Err(PresentError::NoDisplay(
            "WAYLAND_DISPLAY is not set".to_string(),
        )),
        BackendKind::Wayland => Ok(Box::new(wayland::WaylandPresenter::connect(config)?)),
        BackendKind::Auto if has_wayland => {
            info!("Using Wayland overlay backend");
            Ok(Box::new(wayland::WaylandPresenter::connect(config)?))
        }
        BackendKind::Auto => {
            info!("WAYLAND_DISPLAY not set, using headless backend");
            Ok(Box::new(HeadlessPresenter::from_config(config)))
        }
    }
}
