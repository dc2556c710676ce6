//! Display-less presenter used for tests, CI and `--output` rendering.

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use log::{debug, info};

use super::{PresentError, Presenter};
use crate::config::PresentationConfig;
use crate::draw::Bitmap;

/// Presenter that keeps frames in memory instead of showing them.
///
/// It still blocks for the requested duration so callers observe the same
/// timing as with a real overlay.
#[derive(Debug, Clone)]
pub struct HeadlessPresenter {
    width: u32,
    height: u32,
    dump_directory: Option<PathBuf>,
    last_frame: Option<Bitmap>,
    presentations: usize,
}

impl HeadlessPresenter {
    /// Creates a presenter pretending to drive a `width` x `height` screen.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            dump_directory: None,
            last_frame: None,
            presentations: 0,
        }
    }

    pub fn from_config(config: &PresentationConfig) -> Self {
        let presenter = Self::new(config.screen_width, config.screen_height);
        match config.dump_path() {
            Some(dir) => presenter.with_dump_directory(dir),
            None => presenter,
        }
    }

    /// Writes every presented frame as `frame-NNNN.png` into `dir`.
    pub fn with_dump_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dump_directory = Some(dir.into());
        self
    }

    /// The most recently presented frame.
    pub fn last_frame(&self) -> Option<&Bitmap> {
        self.last_frame.as_ref()
    }

    /// Number of completed presentations.
    pub fn presentations(&self) -> usize {
        self.presentations
    }

    fn dump(&self, frame: &Bitmap) -> anyhow::Result<()> {
        let Some(dir) = &self.dump_directory else {
            return Ok(());
        };
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create dump directory {}", dir.display()))?;
        let path = dir.join(format!("frame-{:04}.png", self.presentations + 1));
        frame
            .save_png(&path)
            .with_context(|| format!("Failed to write frame to {}", path.display()))?;
        info!("Wrote frame to {}", path.display());
        Ok(())
    }
}

impl Presenter for HeadlessPresenter {
    fn screen_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn present(&mut self, frame: &Bitmap, duration: Duration) -> Result<(), PresentError> {
        debug!(
            "Headless present: {}x{} frame for {:?}",
            frame.width(),
            frame.height(),
            duration
        );
        self.dump(frame)?;
        self.last_frame = Some(frame.clone());
        if !duration.is_zero() {
            thread::sleep(duration);
        }
        self.presentations += 1;
        Ok(())
    }
}
