//! # Geoprox
//!
//! Nearest point-of-interest annotation over geographic point sets.
//!
//! This library provides:
//! - Great-circle (haversine) distance calculations
//! - Tolerant ingestion of raw POI records into immutable, deduplicated point sets
//! - Nearest and k-nearest queries with deterministic tie-breaking
//! - A category-keyed proximity index with replace-on-write rebuilds
//! - Bounds (viewport) filtering via an R-tree
//! - An explicit TTL cache for rebuilt point sets
//!
//! ## Features
//!
//! - **`parallel`** - Enable parallel query annotation with rayon
//! - **`synthetic`** - Enable the synthetic POI generator for benchmarks
//!
//! ## Quick Start
//!
//! ```rust
//! use geoprox::{GeoPoint, PointSet, RawPoi};
//!
//! let records = vec![
//!     RawPoi {
//!         name: Some("Lincoln High".to_string()),
//!         lat: Some(29.90),
//!         lon: Some(-95.40),
//!     },
//!     RawPoi {
//!         name: Some("Roosevelt Elementary".to_string()),
//!         lat: Some(29.95),
//!         lon: Some(-95.45),
//!     },
//! ];
//!
//! let schools = PointSet::build("school", records);
//!
//! let nearest = schools.nearest(GeoPoint::new(29.901, -95.401)).unwrap();
//! let found = nearest.expect("set is non-empty");
//! assert_eq!(found.poi.name, "Lincoln High");
//! assert!(found.distance_km < 0.2);
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// Unified error handling
pub mod error;
pub use error::{GeoProxError, Result};

// Geographic utilities (haversine distance)
pub mod geo_utils;
pub use geo_utils::{distance, haversine_distance};

// Point-set ingestion and nearest-point queries
pub mod pointset;
pub use pointset::{BuildConfig, PointSet, RawPoi};

// Category-keyed proximity index
pub mod index;
pub use index::ProximityIndex;

// R-tree bounds filtering
pub mod spatial;
pub use spatial::SpatialIndex;

// Explicit TTL cache for rebuilt point sets
pub mod cache;
pub use cache::{CacheKey, PointSetCache};

// Synthetic POI generation for benchmarks and stress tests
#[cfg(feature = "synthetic")]
pub mod synthetic;

// ============================================================================
// Core Types
// ============================================================================

/// A geographic coordinate with latitude and longitude in degrees.
///
/// # Example
/// ```
/// use geoprox::GeoPoint;
/// let point = GeoPoint::new(29.7604, -95.3698); // Houston
/// assert!(point.is_valid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    /// Create a new point.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Check if the point has valid coordinates.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }

    /// Validate the point, returning `InvalidCoordinate` if it is not usable.
    pub fn validate(&self) -> Result<()> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(GeoProxError::InvalidCoordinate {
                latitude: self.latitude,
                longitude: self.longitude,
            })
        }
    }
}

/// A named point of interest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Poi {
    /// Display label (normalized at build time).
    pub name: String,
    /// Location of the POI.
    pub point: GeoPoint,
}

impl Poi {
    /// Create a new POI.
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            name: name.into(),
            point: GeoPoint::new(latitude, longitude),
        }
    }
}

/// Geographic bounding box (south/west/north/east).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl Bounds {
    /// Create bounds from a sequence of points.
    ///
    /// Returns `None` for an empty sequence.
    pub fn from_points(points: &[GeoPoint]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let mut min_lat = f64::MAX;
        let mut max_lat = f64::MIN;
        let mut min_lng = f64::MAX;
        let mut max_lng = f64::MIN;

        for p in points {
            min_lat = min_lat.min(p.latitude);
            max_lat = max_lat.max(p.latitude);
            min_lng = min_lng.min(p.longitude);
            max_lng = max_lng.max(p.longitude);
        }

        Some(Self {
            min_lat,
            max_lat,
            min_lng,
            max_lng,
        })
    }

    /// Get the center point of the bounds.
    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lng + self.max_lng) / 2.0,
        )
    }

    /// Check whether a point lies inside the bounds (edges inclusive).
    pub fn contains(&self, point: &GeoPoint) -> bool {
        point.latitude >= self.min_lat
            && point.latitude <= self.max_lat
            && point.longitude >= self.min_lng
            && point.longitude <= self.max_lng
    }

    /// Return a copy grown by `buffer` degrees on every side.
    ///
    /// Used to widen a fetch area around a set of listings before querying
    /// for POIs, so results at the edge of the viewport still find their
    /// neighbors.
    pub fn expanded(&self, buffer: f64) -> Self {
        Self {
            min_lat: self.min_lat - buffer,
            max_lat: self.max_lat + buffer,
            min_lng: self.min_lng - buffer,
            max_lng: self.max_lng + buffer,
        }
    }
}

/// A matched POI together with its distance from the query point.
///
/// "No match" (empty point set) is expressed as `None` by the query
/// operations, never as a magic distance value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProximityMatch {
    /// The matched POI.
    pub poi: Poi,
    /// Great-circle distance from the query point in kilometers.
    pub distance_km: f64,
}

/// Nearest POI per category for one query point.
///
/// Produced by [`ProximityIndex::annotate`]; categories with no POIs map
/// to `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// The annotated query point (e.g. a rental listing).
    pub query: GeoPoint,
    /// Nearest match per category, keyed by category name.
    pub nearest: BTreeMap<String, Option<ProximityMatch>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_validity() {
        assert!(GeoPoint::new(0.0, 0.0).is_valid());
        assert!(GeoPoint::new(90.0, 180.0).is_valid());
        assert!(GeoPoint::new(-90.0, -180.0).is_valid());

        assert!(!GeoPoint::new(90.01, 0.0).is_valid());
        assert!(!GeoPoint::new(0.0, 180.01).is_valid());
        assert!(!GeoPoint::new(f64::NAN, 0.0).is_valid());
        assert!(!GeoPoint::new(0.0, f64::NEG_INFINITY).is_valid());
    }

    #[test]
    fn test_validate_reports_offending_values() {
        let err = GeoPoint::new(-91.0, 10.0).validate().unwrap_err();
        assert_eq!(
            err,
            GeoProxError::InvalidCoordinate {
                latitude: -91.0,
                longitude: 10.0
            }
        );
    }

    #[test]
    fn test_bounds_from_points() {
        let points = vec![
            GeoPoint::new(29.90, -95.40),
            GeoPoint::new(30.10, -95.60),
            GeoPoint::new(29.95, -95.35),
        ];
        let bounds = Bounds::from_points(&points).unwrap();
        assert_eq!(bounds.min_lat, 29.90);
        assert_eq!(bounds.max_lat, 30.10);
        assert_eq!(bounds.min_lng, -95.60);
        assert_eq!(bounds.max_lng, -95.35);

        let center = bounds.center();
        assert!((center.latitude - 30.0).abs() < 1e-9);
        assert!((center.longitude - (-95.475)).abs() < 1e-9);
    }

    #[test]
    fn test_bounds_empty_input() {
        assert!(Bounds::from_points(&[]).is_none());
    }

    #[test]
    fn test_bounds_contains_and_expanded() {
        let bounds = Bounds {
            min_lat: 29.0,
            max_lat: 30.0,
            min_lng: -96.0,
            max_lng: -95.0,
        };
        assert!(bounds.contains(&GeoPoint::new(29.5, -95.5)));
        assert!(bounds.contains(&GeoPoint::new(29.0, -96.0))); // edge
        assert!(!bounds.contains(&GeoPoint::new(30.01, -95.5)));

        let wider = bounds.expanded(0.05);
        assert!(wider.contains(&GeoPoint::new(30.04, -95.5)));
        assert!(!wider.contains(&GeoPoint::new(30.06, -95.5)));
    }
}
