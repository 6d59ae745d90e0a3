//! The layer catalog.
//!
//! Layers are kept as an ordered list of category blocks. The first layer of
//! a new category opens a block after all existing ones; later layers of the
//! same category go to the end of that block. The flattened blocks are the
//! render order the engine sees, bottom to top.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

use viewer_common::{Category, GeoBox, Layer, LayerConfig, LayerId, LayerSource, NewLayer, RenderEngine};

use crate::framing::FramingOutcome;
use crate::signal::{CategorySignal, CategoryVersion};

/// Catalog shared between the UI and discovery tasks.
///
/// Every mutation completes inside a single lock scope; never hold the guard
/// across an await point.
pub type SharedCatalog = Arc<Mutex<LayerCatalog>>;

#[derive(Debug)]
struct CategoryBlock {
    category: Category,
    layers: Vec<Layer>,
}

/// Result of a layer-panel click.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToggleResult {
    pub enabled: bool,
    /// Set when the layer was switched on and has a bounding box
    pub framing: Option<FramingOutcome>,
}

/// Ordered, categorized collection of layers.
pub struct LayerCatalog {
    engine: Arc<dyn RenderEngine>,
    blocks: Vec<CategoryBlock>,
    next_id: u64,
    signals: HashMap<Category, CategorySignal>,
}

impl std::fmt::Debug for LayerCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayerCatalog")
            .field("blocks", &self.blocks)
            .field("next_id", &self.next_id)
            .finish_non_exhaustive()
    }
}

impl LayerCatalog {
    pub fn new(engine: Arc<dyn RenderEngine>) -> Self {
        Self {
            engine,
            blocks: Vec::new(),
            next_id: 1,
            signals: HashMap::new(),
        }
    }

    /// Wrap in the shared handle used by discovery tasks.
    pub fn into_shared(self) -> SharedCatalog {
        Arc::new(Mutex::new(self))
    }

    pub fn engine(&self) -> &Arc<dyn RenderEngine> {
        &self.engine
    }

    /// Add a layer, applying `options` on top of the layer's own settings.
    ///
    /// Layers without a category become overlays. Returns the new layer's id;
    /// ids are never reused within one catalog.
    pub fn add(&mut self, layer: NewLayer, options: LayerConfig) -> LayerId {
        let mut layer = layer;
        layer.apply(options);

        let id = LayerId(self.next_id);
        self.next_id += 1;
        let layer = layer.place(id);
        let category = layer.category.clone();

        let block_index = match self.blocks.iter().position(|b| b.category == category) {
            Some(i) => i,
            None => {
                self.blocks.push(CategoryBlock {
                    category: category.clone(),
                    layers: Vec::new(),
                });
                self.blocks.len() - 1
            }
        };

        let index = self.blocks[..block_index]
            .iter()
            .map(|b| b.layers.len())
            .sum::<usize>()
            + self.blocks[block_index].layers.len();

        debug!(
            id = %id,
            name = %layer.display_name,
            category = %category,
            index = index,
            "Adding layer"
        );
        self.engine.insert_layer(index, &layer);
        self.blocks[block_index].layers.push(layer);
        self.bump(&category);
        id
    }

    /// Remove a layer.
    ///
    /// Removing the last layer of a category drops its block, so the next
    /// layer of that category opens a new block at the top.
    pub fn remove(&mut self, id: LayerId) -> Option<Layer> {
        let (b, i) = self.locate(id)?;
        let layer = self.blocks[b].layers.remove(i);
        if self.blocks[b].layers.is_empty() {
            self.blocks.remove(b);
        }
        info!(id = %id, name = %layer.display_name, "Removed layer");
        self.engine.remove_layer(id);
        self.engine.redraw();
        self.bump(&layer.category);
        Some(layer)
    }

    /// Snapshot of one category's layers, bottom to top.
    pub fn layers_by_category(&self, category: &Category) -> Vec<Layer> {
        self.blocks
            .iter()
            .find(|b| &b.category == category)
            .map(|b| b.layers.clone())
            .unwrap_or_default()
    }

    /// All layers in render order.
    pub fn layers(&self) -> impl Iterator<Item = &Layer> {
        self.blocks.iter().flat_map(|b| b.layers.iter())
    }

    pub fn render_order(&self) -> Vec<LayerId> {
        self.layers().map(|l| l.id).collect()
    }

    /// Categories in the order their blocks appear.
    pub fn categories(&self) -> Vec<Category> {
        self.blocks.iter().map(|b| b.category.clone()).collect()
    }

    pub fn get(&self, id: LayerId) -> Option<&Layer> {
        self.layers().find(|l| l.id == id)
    }

    pub fn len(&self) -> usize {
        self.blocks.iter().map(|b| b.layers.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// First layer with the given display name, in render order.
    pub fn find_by_name(&self, display_name: &str) -> Option<&Layer> {
        self.layers().find(|l| l.display_name == display_name)
    }

    /// Flip a layer's enabled flag and return the new value.
    ///
    /// Switching any base layer also switches every other base layer off, so
    /// at most one base layer is ever enabled. Unknown ids are ignored.
    pub fn toggle(&mut self, id: LayerId) -> Option<bool> {
        let Some((b, i)) = self.locate(id) else {
            warn!(id = %id, "Toggle requested for unknown layer");
            return None;
        };

        let category = self.blocks[b].category.clone();
        if category == Category::Base {
            for other in self.blocks[b].layers.iter_mut() {
                if other.id != id && other.enabled {
                    other.enabled = false;
                    self.engine.update_layer(other);
                }
            }
        }

        let layer = &mut self.blocks[b].layers[i];
        layer.enabled = !layer.enabled;
        let enabled = layer.enabled;
        debug!(id = %id, name = %layer.display_name, enabled = enabled, "Toggled layer");
        self.engine.update_layer(layer);
        self.engine.redraw();
        self.bump(&category);
        Some(enabled)
    }

    /// Toggle a layer and, if it is now visible, bring it into view.
    pub fn toggle_and_frame(&mut self, id: LayerId) -> Option<ToggleResult> {
        let enabled = self.toggle(id)?;
        let has_bbox = self.get(id).map_or(false, |l| l.bbox.is_some());
        let framing = (enabled && has_bbox).then(|| self.frame_on(id));
        Some(ToggleResult { enabled, framing })
    }

    /// Complete a layer whose render source arrived after it was placed.
    ///
    /// The layer keeps its slot; `bbox` replaces the current box when given.
    pub fn attach_source(&mut self, id: LayerId, source: LayerSource, bbox: Option<GeoBox>) -> bool {
        let Some((b, i)) = self.locate(id) else {
            warn!(id = %id, "Source arrived for a layer no longer in the catalog");
            return false;
        };
        let layer = &mut self.blocks[b].layers[i];
        layer.source = source;
        if bbox.is_some() {
            layer.bbox = bbox;
        }
        debug!(id = %id, name = %layer.display_name, "Attached layer source");
        self.engine.update_layer(layer);
        self.engine.redraw();
        let category = layer.category.clone();
        self.bump(&category);
        true
    }

    /// Move the camera so the layer's bounding box is in view.
    pub fn frame_on(&self, id: LayerId) -> FramingOutcome {
        let Some(layer) = self.get(id) else {
            warn!(id = %id, "Cannot frame unknown layer");
            return FramingOutcome::UnknownLayer;
        };
        let Some(bbox) = layer.bbox else {
            warn!(name = %layer.display_name, "Layer has no bounding box; camera unchanged");
            return FramingOutcome::NoBoundingBox;
        };

        let outcome = FramingOutcome::for_bbox(&bbox);
        match outcome {
            FramingOutcome::Moved(position) => {
                info!(
                    name = %layer.display_name,
                    lat = position.lat,
                    lon = position.lon,
                    range_m = position.altitude,
                    "Framing layer"
                );
                self.engine.go_to(position);
            }
            FramingOutcome::CoversGlobe => {
                info!(name = %layer.display_name, "Layer covers the full globe; camera unchanged");
            }
            _ => {
                info!(name = %layer.display_name, "Layer spans a hemisphere or more; camera unchanged");
            }
        }
        outcome
    }

    /// Change notifications for one category.
    ///
    /// The signal is created on first use; creating it does not count as a change.
    pub fn category_signal(&mut self, category: &Category) -> watch::Receiver<CategoryVersion> {
        self.signal(category).subscribe()
    }

    /// Current version of a category's signal, without subscribing.
    pub fn category_version(&mut self, category: &Category) -> CategoryVersion {
        self.signal(category).current()
    }

    fn signal(&mut self, category: &Category) -> &CategorySignal {
        self.signals.entry(category.clone()).or_default()
    }

    fn bump(&mut self, category: &Category) {
        self.signal(category).bump();
    }

    fn locate(&self, id: LayerId) -> Option<(usize, usize)> {
        self.blocks.iter().enumerate().find_map(|(b, block)| {
            block
                .layers
                .iter()
                .position(|l| l.id == id)
                .map(|i| (b, i))
        })
    }
}
