// Holds the live Wayland protocol state shared by the presenter loop and the handler
// submodules; paints the pending frame into shared memory when the compositor asks.
use anyhow::{Context, Result};
use log::debug;
use smithay_client_toolkit::{
    compositor::CompositorState,
    output::OutputState,
    registry::RegistryState,
    shell::{WaylandSurface, wlr_layer::LayerShell},
    shm::Shm,
};
use wayland_client::protocol::wl_shm;

use super::surface::SurfaceState;
use crate::draw::Bitmap;

/// Internal Wayland state shared across modules.
pub(super) struct WaylandState {
    // Wayland protocol objects
    pub(super) registry_state: RegistryState,
    pub(super) compositor_state: CompositorState,
    pub(super) layer_shell: LayerShell,
    pub(super) shm: Shm,
    pub(super) output_state: OutputState,

    // Surface and buffer management
    pub(super) surface: SurfaceState,

    // Current presentation
    pub(super) frame: Option<Bitmap>,
    pub(super) painted: bool,
    pub(super) expired: bool,
    pub(super) closed: bool,
    pub(super) error: Option<anyhow::Error>,
}

impl WaylandState {
    pub(super) fn new(
        registry_state: RegistryState,
        compositor_state: CompositorState,
        layer_shell: LayerShell,
        shm: Shm,
        output_state: OutputState,
    ) -> Self {
        Self {
            registry_state,
            compositor_state,
            layer_shell,
            shm,
            output_state,
            surface: SurfaceState::new(),
            frame: None,
            painted: false,
            expired: false,
            closed: false,
            error: None,
        }
    }

    /// Resets per-presentation flags and stores the frame to paint on configure.
    pub(super) fn begin(&mut self, frame: Bitmap) {
        self.frame = Some(frame);
        self.painted = false;
        self.expired = false;
        self.closed = false;
        self.error = None;
    }

    /// True once the overlay should come down again.
    pub(super) fn finished(&self) -> bool {
        self.expired || self.closed || self.error.is_some()
    }

    /// Logical size of the first known output.
    pub(super) fn output_size(&self) -> Option<(u32, u32)> {
        self.output_state.outputs().find_map(|output| {
            let info = self.output_state.info(&output)?;
            let (w, h) = info
                .logical_size
                .or_else(|| info.modes.iter().find(|m| m.current).map(|m| m.dimensions))?;
            (w > 0 && h > 0).then_some((w as u32, h as u32))
        })
    }

    /// Copies the pending frame into a fresh shm buffer and commits it.
    pub(super) fn paint(&mut self) -> Result<()> {
        debug!("=== PAINT START ===");
        let width = self.surface.width();
        let height = self.surface.height();
        let frame = self.frame.as_ref().context("No frame to present")?;
        let source = frame.to_surface().context("Failed to convert frame")?;

        let (buffer, canvas) = {
            let pool = self.surface.ensure_pool(&self.shm, 1)?;
            pool.create_buffer(
                width as i32,
                height as i32,
                (width * 4) as i32,
                wl_shm::Format::Argb8888,
            )
            .context("Failed to create buffer")?
        };

        // SAFETY: This unsafe block creates a Cairo surface from raw memory buffer.
        // Safety invariants that must be maintained:
        // 1. `canvas` is a valid mutable slice from SlotPool with exactly (width * height * 4) bytes
        // 2. The buffer format ARgb32 matches the allocation (4 bytes per pixel: alpha, red, green, blue)
        // 3. The stride (width * 4) correctly represents the number of bytes per row
        // 4. `cairo_surface` and `ctx` are explicitly dropped before the buffer is committed to Wayland,
        //    ensuring Cairo doesn't access memory after ownership transfers
        // 5. No other references to this memory exist during Cairo's usage
        let cairo_surface = unsafe {
            cairo::ImageSurface::create_for_data_unsafe(
                canvas.as_mut_ptr(),
                cairo::Format::ARgb32,
                width as i32,
                height as i32,
                (width * 4) as i32,
            )
            .context("Failed to create Cairo surface")?
        };

        let ctx = cairo::Context::new(&cairo_surface).context("Failed to create Cairo context")?;
        ctx.set_operator(cairo::Operator::Source);
        ctx.set_source_rgba(0.0, 0.0, 0.0, 0.0);
        ctx.paint().context("Failed to clear background")?;
        ctx.set_operator(cairo::Operator::Over);
        ctx.set_source_surface(&source, 0.0, 0.0)
            .context("Failed to set frame source")?;
        ctx.paint().context("Failed to paint frame")?;

        cairo_surface.flush();
        drop(ctx);
        drop(cairo_surface);

        let wl_surface = self
            .surface
            .layer_surface()
            .context("Layer surface not created")?
            .wl_surface();
        wl_surface.attach(Some(buffer.wl_buffer()), 0, 0);
        wl_surface.damage_buffer(0, 0, width as i32, height as i32);
        wl_surface.commit();
        self.surface.set_buffer(buffer);

        self.painted = true;
        debug!("=== PAINT COMPLETE ({}x{}) ===", width, height);
        Ok(())
    }
}
