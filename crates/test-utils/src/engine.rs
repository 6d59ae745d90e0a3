//! A render engine that records every command it receives.

use std::sync::Mutex;

use viewer_common::{Layer, LayerId, Position, Projection, RenderEngine};

/// One command received by [`RecordingEngine`].
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    Insert { index: usize, id: LayerId, name: String },
    Remove(LayerId),
    Update { id: LayerId, enabled: bool },
    Redraw,
    GoTo(Position),
    SetProjection(Projection),
}

/// Engine double for catalog and pipeline tests.
///
/// Mirrors the render order from `insert_layer`/`remove_layer` so tests can
/// compare it against the catalog's own order.
#[derive(Debug, Default)]
pub struct RecordingEngine {
    events: Mutex<Vec<EngineEvent>>,
    order: Mutex<Vec<LayerId>>,
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<EngineEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Render order as the engine sees it, bottom to top.
    pub fn order(&self) -> Vec<LayerId> {
        self.order.lock().unwrap().clone()
    }

    /// Camera moves, in the order they were requested.
    pub fn camera_moves(&self) -> Vec<Position> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                EngineEvent::GoTo(p) => Some(p),
                _ => None,
            })
            .collect()
    }

    pub fn redraw_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, EngineEvent::Redraw))
            .count()
    }

    fn record(&self, event: EngineEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl RenderEngine for RecordingEngine {
    fn insert_layer(&self, index: usize, layer: &Layer) {
        self.order.lock().unwrap().insert(index, layer.id);
        self.record(EngineEvent::Insert {
            index,
            id: layer.id,
            name: layer.display_name.clone(),
        });
    }

    fn remove_layer(&self, id: LayerId) {
        self.order.lock().unwrap().retain(|l| *l != id);
        self.record(EngineEvent::Remove(id));
    }

    fn update_layer(&self, layer: &Layer) {
        self.record(EngineEvent::Update {
            id: layer.id,
            enabled: layer.enabled,
        });
    }

    fn redraw(&self) {
        self.record(EngineEvent::Redraw);
    }

    fn go_to(&self, position: Position) {
        self.record(EngineEvent::GoTo(position));
    }

    fn set_projection(&self, projection: Projection) {
        self.record(EngineEvent::SetProjection(projection));
    }
}
