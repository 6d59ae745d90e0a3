//! Render engine stand-in for headless runs.
//!
//! Every command is logged; the camera and projection are remembered so the
//! final view can be reported on exit.

use std::sync::Mutex;

use tracing::{debug, info};

use viewer_common::{Layer, LayerId, Position, Projection, RenderEngine};

#[derive(Debug, Default)]
pub struct TracingEngine {
    camera: Mutex<Option<Position>>,
    projection: Mutex<Projection>,
}

impl TracingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Where the camera was last sent, if anywhere.
    pub fn camera(&self) -> Option<Position> {
        *self.camera.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn projection(&self) -> Projection {
        *self.projection.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl RenderEngine for TracingEngine {
    fn insert_layer(&self, index: usize, layer: &Layer) {
        debug!(
            index = index,
            id = %layer.id,
            name = %layer.display_name,
            category = %layer.category,
            enabled = layer.enabled,
            "Insert layer"
        );
    }

    fn remove_layer(&self, id: LayerId) {
        debug!(id = %id, "Remove layer");
    }

    fn update_layer(&self, layer: &Layer) {
        debug!(
            id = %layer.id,
            name = %layer.display_name,
            enabled = layer.enabled,
            pending = layer.is_pending(),
            "Update layer"
        );
    }

    fn redraw(&self) {
        debug!("Redraw");
    }

    fn go_to(&self, position: Position) {
        info!(
            lat = position.lat,
            lon = position.lon,
            altitude_m = position.altitude,
            "Camera moved"
        );
        *self.camera.lock().unwrap_or_else(|e| e.into_inner()) = Some(position);
    }

    fn set_projection(&self, projection: Projection) {
        info!(projection = projection.name(), flat = projection.is_flat(), "Projection changed");
        *self.projection.lock().unwrap_or_else(|e| e.into_inner()) = projection;
    }
}
