// Responds to layer-shell configure/close events; every configure repaints the frame.
use log::{info, warn};
use smithay_client_toolkit::shell::wlr_layer::{
    LayerShellHandler, LayerSurface, LayerSurfaceConfigure,
};
use wayland_client::{Connection, QueueHandle};

use super::super::state::WaylandState;

impl LayerShellHandler for WaylandState {
    fn closed(&mut self, _conn: &Connection, _qh: &QueueHandle<Self>, _layer: &LayerSurface) {
        info!("Layer surface closed by compositor");
        self.closed = true;
    }

    fn configure(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _layer: &LayerSurface,
        configure: LayerSurfaceConfigure,
        _serial: u32,
    ) {
        info!(
            "Layer surface configured: {}x{}",
            configure.new_size.0, configure.new_size.1
        );

        let (width, height) = match configure.new_size {
            (w, h) if w > 0 && h > 0 => (w, h),
            _ => match &self.frame {
                Some(frame) => (frame.width(), frame.height()),
                None => return,
            },
        };
        if self.surface.update_dimensions(width, height) {
            info!("Surface size changed - recreating SlotPool");
        }
        self.surface.set_configured(true);

        if let Err(err) = self.paint() {
            warn!("Failed to paint overlay: {:#}", err);
            self.error = Some(err);
        }
    }
}
