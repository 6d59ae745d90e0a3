//! Common types shared across the globe viewer crates.

pub mod bbox;
pub mod engine;
pub mod error;
pub mod layer;

pub use bbox::{GeoBox, GeoPoint};
pub use engine::{NullEngine, Position, Projection, RenderEngine};
pub use error::{DocumentKind, ViewerError, ViewerResult};
pub use layer::{Category, Layer, LayerConfig, LayerId, LayerSource, NewLayer, WmsSource, WmtsSource};
