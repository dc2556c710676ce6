//! Wayland overlay presenter built on wlr-layer-shell.
//!
//! Each presentation creates a fullscreen overlay-layer surface with an empty
//! input region (so clicks pass through to the windows below), paints the frame
//! on the first configure, keeps it mapped for the requested duration via a
//! calloop timer and then destroys the surface.

mod handlers;
mod state;
mod surface;

use std::time::{Duration, Instant};

use anyhow::{Context, anyhow};
use calloop::{
    EventLoop,
    timer::{TimeoutAction, Timer},
};
use log::{debug, info, warn};
use smithay_client_toolkit::{
    compositor::{CompositorState, Region},
    output::OutputState,
    reexports::calloop_wayland_source::WaylandSource,
    registry::RegistryState,
    shell::{
        WaylandSurface,
        wlr_layer::{Anchor, KeyboardInteractivity, Layer, LayerShell},
    },
    shm::Shm,
};
use wayland_client::{Connection, QueueHandle, globals::registry_queue_init};

use super::{PresentError, Presenter};
use crate::config::PresentationConfig;
use crate::draw::Bitmap;
use state::WaylandState;

/// How long to wait for the compositor's first configure before giving up.
const CONFIGURE_TIMEOUT: Duration = Duration::from_secs(5);

/// Presenter that shows frames as a click-through Wayland overlay.
pub struct WaylandPresenter {
    conn: Connection,
    event_loop: EventLoop<'static, WaylandState>,
    state: WaylandState,
    qh: QueueHandle<WaylandState>,
    screen: (u32, u32),
}

impl WaylandPresenter {
    /// Connects to the compositor named by `WAYLAND_DISPLAY` and binds the
    /// globals an overlay needs.
    pub fn connect(config: &PresentationConfig) -> Result<Self, PresentError> {
        let conn = Connection::connect_to_env()
            .map_err(|e| PresentError::NoDisplay(format!("Failed to connect to Wayland: {}", e)))?;
        debug!("Connected to Wayland display");

        let (globals, mut event_queue) =
            registry_queue_init(&conn).context("Failed to initialize Wayland registry")?;
        let qh = event_queue.handle();

        let compositor_state =
            CompositorState::bind(&globals, &qh).context("wl_compositor not available")?;
        let layer_shell =
            LayerShell::bind(&globals, &qh).context("zwlr_layer_shell_v1 not available")?;
        let shm = Shm::bind(&globals, &qh).context("wl_shm not available")?;
        let output_state = OutputState::new(&globals, &qh);
        let registry_state = RegistryState::new(&globals);
        debug!("Bound compositor, layer shell, shm and outputs");

        let mut state = WaylandState::new(
            registry_state,
            compositor_state,
            layer_shell,
            shm,
            output_state,
        );

        // Output geometry arrives in the events following the initial bind.
        event_queue
            .roundtrip(&mut state)
            .context("Failed to query outputs")?;
        event_queue
            .roundtrip(&mut state)
            .context("Failed to query output details")?;

        let screen = state.output_size().unwrap_or_else(|| {
            warn!(
                "No output size reported, assuming {}x{}",
                config.screen_width, config.screen_height
            );
            (config.screen_width, config.screen_height)
        });
        info!("Wayland screen size: {}x{}", screen.0, screen.1);

        let event_loop: EventLoop<'static, WaylandState> =
            EventLoop::try_new().context("Failed to create event loop")?;
        WaylandSource::new(conn.clone(), event_queue)
            .insert(event_loop.handle())
            .map_err(|e| anyhow!("Failed to insert Wayland event source: {}", e.error))?;

        Ok(Self {
            conn,
            event_loop,
            state,
            qh,
            screen,
        })
    }

    fn map_overlay(&mut self) -> anyhow::Result<()> {
        let wl_surface = self.state.compositor_state.create_surface(&self.qh);
        let layer_surface = self.state.layer_shell.create_layer_surface(
            &self.qh,
            wl_surface,
            Layer::Overlay,
            Some("screenmark"),
            None,
        );

        layer_surface.set_anchor(Anchor::all());
        layer_surface.set_keyboard_interactivity(KeyboardInteractivity::None);
        layer_surface.set_size(0, 0);
        layer_surface.set_exclusive_zone(-1);

        let input_region =
            Region::new(&self.state.compositor_state).context("Failed to create input region")?;
        layer_surface
            .wl_surface()
            .set_input_region(Some(input_region.wl_region()));

        layer_surface.commit();
        self.state.surface.set_layer_surface(layer_surface);
        debug!("Overlay layer surface created");
        Ok(())
    }

    fn run(&mut self, duration: Duration) -> Result<(), PresentError> {
        let started = Instant::now();
        while !self.state.painted && !self.state.finished() {
            let remaining = CONFIGURE_TIMEOUT.saturating_sub(started.elapsed());
            if remaining.is_zero() {
                return Err(anyhow!("Compositor never configured the overlay").into());
            }
            self.event_loop
                .dispatch(remaining, &mut self.state)
                .context("Wayland event loop error")?;
        }

        first_paint_outcome(
            self.state.painted,
            self.state.closed,
            self.state.error.take(),
        )?;
        if self.state.closed {
            info!("Overlay closed by compositor right after mapping");
            return Ok(());
        }

        info!("Overlay mapped for {:?}", duration);
        let token = self
            .event_loop
            .handle()
            .insert_source(
                Timer::from_duration(duration),
                |_deadline, _, state: &mut WaylandState| {
                    state.expired = true;
                    TimeoutAction::Drop
                },
            )
            .map_err(|e| anyhow!("Failed to schedule overlay timeout: {}", e.error))?;

        while !self.state.finished() {
            self.event_loop
                .dispatch(None, &mut self.state)
                .context("Wayland event loop error")?;
        }

        if !self.state.expired {
            self.event_loop.handle().remove(token);
        }
        match self.state.error.take() {
            Some(err) => Err(err.into()),
            None => Ok(()),
        }
    }
}

/// Checks how the wait for the first paint ended.
///
/// A surface closed before anything was painted never reached the screen and
/// is reported as a failure. Closing after the first paint is an early dismissal.
fn first_paint_outcome(
    painted: bool,
    closed: bool,
    error: Option<anyhow::Error>,
) -> Result<(), PresentError> {
    if let Some(err) = error {
        return Err(err.into());
    }
    if closed && !painted {
        return Err(anyhow!("Overlay closed by compositor before it was shown").into());
    }
    Ok(())
}

impl Presenter for WaylandPresenter {
    fn screen_size(&self) -> (u32, u32) {
        self.screen
    }

    fn present(&mut self, frame: &Bitmap, duration: Duration) -> Result<(), PresentError> {
        self.state.begin(frame.clone());
        let result = self
            .map_overlay()
            .map_err(PresentError::from)
            .and_then(|()| self.run(duration));

        self.state.surface.reset();
        self.state.frame = None;
        let flushed = self.conn.flush();
        info!("Overlay dismissed");

        result?;
        flushed.context("Failed to flush Wayland connection")?;
        Ok(())
    }
}
