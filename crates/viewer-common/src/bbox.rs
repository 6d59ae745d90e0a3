//! Geographic bounding box types.

use serde::{Deserialize, Serialize};

/// A geographic bounding box in degrees (EPSG:4326).
///
/// Latitude runs south to north, longitude west to east. Boxes that cross
/// the antimeridian are stored as-is (`min_lon > max_lon`); nothing in the
/// viewer normalizes them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoBox {
    /// The whole globe.
    pub const GLOBE: GeoBox = GeoBox {
        min_lat: -90.0,
        max_lat: 90.0,
        min_lon: -180.0,
        max_lon: 180.0,
    };

    pub fn new(min_lat: f64, max_lat: f64, min_lon: f64, max_lon: f64) -> Self {
        Self {
            min_lat,
            max_lat,
            min_lon,
            max_lon,
        }
    }

    /// Build from OGC corner order: west, south, east, north.
    pub fn from_corners(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self::new(south, north, west, east)
    }

    /// Latitude extent in degrees.
    pub fn lat_span(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    /// Longitude extent in degrees.
    pub fn lon_span(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    /// Plain midpoint of both ranges.
    pub fn center(&self) -> GeoPoint {
        GeoPoint {
            lat: (self.max_lat + self.min_lat) / 2.0,
            lon: (self.max_lon + self.min_lon) / 2.0,
        }
    }

    /// True when every edge reaches the globe limits (±90 latitude, ±180 longitude).
    pub fn covers_globe(&self) -> bool {
        self.max_lat >= 90.0
            && self.min_lat <= -90.0
            && self.max_lon >= 180.0
            && self.min_lon <= -180.0
    }
}
