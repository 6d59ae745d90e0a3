//! Tests for GeoBox constructors and geometry helpers.

use viewer_common::bbox::{GeoBox, GeoPoint};

// ============================================================================
// Constructor tests
// ============================================================================

#[test]
fn test_from_corners_orders_fields() {
    let bbox = GeoBox::from_corners(-125.0, 24.0, -66.0, 50.0);
    assert_eq!(bbox.min_lon, -125.0);
    assert_eq!(bbox.min_lat, 24.0);
    assert_eq!(bbox.max_lon, -66.0);
    assert_eq!(bbox.max_lat, 50.0);
}

#[test]
fn test_globe_constant() {
    assert_eq!(GeoBox::GLOBE, GeoBox::new(-90.0, 90.0, -180.0, 180.0));
    assert_eq!(GeoBox::GLOBE.lat_span(), 180.0);
    assert_eq!(GeoBox::GLOBE.lon_span(), 360.0);
}

// ============================================================================
// Geometry tests
// ============================================================================

#[test]
fn test_center_of_symmetric_box() {
    let bbox = GeoBox::new(-10.0, 10.0, -10.0, 10.0);
    assert_eq!(bbox.center(), GeoPoint { lat: 0.0, lon: 0.0 });
}

#[test]
fn test_center_does_not_wrap_antimeridian() {
    // Pacific box stored west > east; the midpoint is taken literally.
    let bbox = GeoBox::from_corners(160.0, -50.0, -140.0, 50.0);
    let center = bbox.center();
    assert_eq!(center.lat, 0.0);
    assert_eq!(center.lon, 10.0);
}

#[test]
fn test_covers_globe_requires_all_edges() {
    assert!(GeoBox::new(-90.0, 90.0, -180.0, 180.0).covers_globe());
    assert!(!GeoBox::new(-90.0, 90.0, -179.0, 180.0).covers_globe());
    assert!(!GeoBox::new(-89.0, 90.0, -180.0, 180.0).covers_globe());
}
