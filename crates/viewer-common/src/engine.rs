//! Interface to the external globe rendering engine.

use serde::{Deserialize, Serialize};

use crate::{Layer, LayerId, ViewerError};

/// A camera position: latitude/longitude in degrees, altitude in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub lat: f64,
    pub lon: f64,
    pub altitude: f64,
}

impl Position {
    pub fn new(lat: f64, lon: f64, altitude: f64) -> Self {
        Self { lat, lon, altitude }
    }
}

/// Globe projections the engine can display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Projection {
    Globe3D,
    Equirectangular,
    Mercator,
    NorthPolar,
    SouthPolar,
    NorthUps,
    SouthUps,
    NorthGnomonic,
    SouthGnomonic,
}

impl Projection {
    pub const ALL: [Projection; 9] = [
        Projection::Globe3D,
        Projection::Equirectangular,
        Projection::Mercator,
        Projection::NorthPolar,
        Projection::SouthPolar,
        Projection::NorthUps,
        Projection::SouthUps,
        Projection::NorthGnomonic,
        Projection::SouthGnomonic,
    ];

    /// Display name, as shown in the projection menu.
    pub fn name(&self) -> &'static str {
        match self {
            Projection::Globe3D => "3D",
            Projection::Equirectangular => "Equirectangular",
            Projection::Mercator => "Mercator",
            Projection::NorthPolar => "North Polar",
            Projection::SouthPolar => "South Polar",
            Projection::NorthUps => "North UPS",
            Projection::SouthUps => "South UPS",
            Projection::NorthGnomonic => "North Gnomonic",
            Projection::SouthGnomonic => "South Gnomonic",
        }
    }

    /// Parse a display name (case-insensitive).
    pub fn from_name(name: &str) -> Result<Self, ViewerError> {
        Self::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| ViewerError::UnknownProjection(name.to_string()))
    }

    /// 2D projections are drawn on a flat globe.
    pub fn is_flat(&self) -> bool {
        !matches!(self, Projection::Globe3D)
    }
}

impl Default for Projection {
    fn default() -> Self {
        Projection::Globe3D
    }
}

/// Commands the catalog issues to the rendering engine.
///
/// Implementations use interior mutability; the catalog calls these from
/// inside its own mutations and never holds them across an await point.
pub trait RenderEngine: Send + Sync {
    /// A layer was placed at `index` in the overall render order (bottom to top).
    fn insert_layer(&self, index: usize, layer: &Layer);

    /// A layer left the render order.
    fn remove_layer(&self, id: LayerId);

    /// A layer changed in place (source attached, enabled flag flipped).
    fn update_layer(&self, layer: &Layer);

    /// Request a frame as soon as possible.
    fn redraw(&self);

    /// Move the camera.
    fn go_to(&self, position: Position);

    fn set_projection(&self, projection: Projection);
}

/// Engine that ignores every command. Useful for tooling that only needs
/// the catalog bookkeeping.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullEngine;

impl RenderEngine for NullEngine {
    fn insert_layer(&self, _index: usize, _layer: &Layer) {}
    fn remove_layer(&self, _id: LayerId) {}
    fn update_layer(&self, _layer: &Layer) {}
    fn redraw(&self) {}
    fn go_to(&self, _position: Position) {}
    fn set_projection(&self, _projection: Projection) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projection_from_name() {
        assert_eq!(Projection::from_name("3D").unwrap(), Projection::Globe3D);
        assert_eq!(
            Projection::from_name("north ups").unwrap(),
            Projection::NorthUps
        );
        assert!(Projection::from_name("Robinson").is_err());
    }

    #[test]
    fn test_projection_names_unique() {
        let mut names: Vec<_> = Projection::ALL.iter().map(|p| p.name()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), Projection::ALL.len());
    }
}
