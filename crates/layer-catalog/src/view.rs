//! Feeding catalog snapshots into layer panels.

use viewer_common::Layer;

/// An ordered list a layer panel renders from.
pub trait LayerListView {
    fn clear(&mut self);
    fn push(&mut self, layer: Layer);
}

impl LayerListView for Vec<Layer> {
    fn clear(&mut self) {
        Vec::clear(self);
    }

    fn push(&mut self, layer: Layer) {
        Vec::push(self, layer);
    }
}

/// Refill `view` with `layers`, top-most layer first.
///
/// `layers` is in catalog order (bottom to top), as returned by
/// `LayerCatalog::layers_by_category`.
pub fn replace_category_view<V>(layers: Vec<Layer>, view: &mut V)
where
    V: LayerListView + ?Sized,
{
    view.clear();
    for layer in layers.into_iter().rev() {
        view.push(layer);
    }
}
