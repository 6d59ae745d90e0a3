//! Shared test utilities for the globe-viewer workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Capability documents and bounding boxes used across crates
//! - A recording render engine
//! - Approximate float assertions
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```

pub mod engine;
pub mod fixtures;

pub use engine::{EngineEvent, RecordingEngine};
pub use fixtures::*;

use viewer_common::GeoBox;

/// Build a [`GeoBox`] from one of the `(min_lat, max_lat, min_lon, max_lon)`
/// tuples in [`fixtures::bbox`].
pub fn geo_box(b: (f64, f64, f64, f64)) -> GeoBox {
    GeoBox::new(b.0, b.1, b.2, b.3)
}

/// Assert two floats are within `tolerance` of each other.
///
/// ```ignore
/// assert_approx_eq!(range_m, 3_145_067.5, 1.0);
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($actual:expr, $expected:expr, $tolerance:expr) => {{
        let actual = $actual as f64;
        let expected = $expected as f64;
        let tolerance = $tolerance as f64;
        assert!(
            (actual - expected).abs() <= tolerance,
            "expected {} within {} of {}, off by {}",
            actual,
            tolerance,
            expected,
            (actual - expected).abs()
        );
    }};
}

/// Assert a camera position points at `(lat, lon)`, ignoring altitude.
#[macro_export]
macro_rules! assert_looks_at {
    ($position:expr, ($lat:expr, $lon:expr), $tolerance:expr) => {{
        let position: $crate::__Position = $position;
        $crate::assert_approx_eq!(position.lat, $lat, $tolerance);
        $crate::assert_approx_eq!(position.lon, $lon, $tolerance);
    }};
}

#[doc(hidden)]
pub use viewer_common::Position as __Position;
