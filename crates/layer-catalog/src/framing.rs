//! Camera framing for a layer's bounding box.

use viewer_common::{GeoBox, GeoPoint, Position};

/// Spherical Earth radius used for the range approximation.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Boxes whose diagonal reaches this many degrees already cover a hemisphere.
pub const MAX_FRAMING_DIAGONAL_DEG: f64 = 180.0;

/// Result of asking the catalog to frame a layer.
///
/// Everything except `Moved` is a deliberate no-op; none of them are errors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FramingOutcome {
    Moved(Position),
    UnknownLayer,
    NoBoundingBox,
    /// Box reaches ±90 latitude and ±180 longitude
    CoversGlobe,
    /// Diagonal of at least a hemisphere
    TooLarge,
}

impl FramingOutcome {
    pub fn moved(&self) -> bool {
        matches!(self, FramingOutcome::Moved(_))
    }

    /// Decide where the camera goes for `bbox`.
    pub fn for_bbox(bbox: &GeoBox) -> Self {
        if bbox.covers_globe() {
            return FramingOutcome::CoversGlobe;
        }
        match compute_center_and_range(bbox) {
            Some((center, range)) => FramingOutcome::Moved(Position::new(center.lat, center.lon, range)),
            None => FramingOutcome::TooLarge,
        }
    }
}

/// Angular length of the box diagonal, treating degrees as planar.
pub fn diagonal_degrees(bbox: &GeoBox) -> f64 {
    bbox.lat_span().hypot(bbox.lon_span())
}

/// Center of `bbox` and a camera range that shows all of it.
///
/// The center is the plain midpoint; boxes crossing the antimeridian are not
/// corrected. The range is the arc length of the diagonal on a sphere of
/// [`EARTH_RADIUS_M`]. Returns `None` when the diagonal is a hemisphere or more.
pub fn compute_center_and_range(bbox: &GeoBox) -> Option<(GeoPoint, f64)> {
    let diagonal = diagonal_degrees(bbox);
    if diagonal >= MAX_FRAMING_DIAGONAL_DEG {
        return None;
    }
    let range = diagonal / 360.0 * (2.0 * std::f64::consts::PI * EARTH_RADIUS_M);
    Some((bbox.center(), range))
}
