//! Layer catalog for the globe viewer.
//!
//! The catalog keeps layers in contiguous category blocks, mirrors every
//! insertion into the render engine, and publishes a version signal per
//! category so layer panels know when to refresh.

pub mod catalog;
pub mod factory;
pub mod framing;
pub mod signal;
pub mod view;

pub use catalog::{LayerCatalog, SharedCatalog, ToggleResult};
pub use factory::LayerFactory;
pub use framing::{compute_center_and_range, diagonal_degrees, FramingOutcome, EARTH_RADIUS_M};
pub use signal::{CategorySignal, CategoryVersion};
pub use view::{replace_category_view, LayerListView};
