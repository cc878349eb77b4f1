//! Synthetic POI data generation for stress testing and benchmarking.
//!
//! Generates seeded, reproducible scatters of raw POI records around an
//! origin, so benchmarks exercise realistic set sizes without network
//! fetches.
//!
//! Feature-gated behind `synthetic` — not included in production builds.
//!
//! # Example
//!
//! ```rust
//! use geoprox::synthetic::{scatter_point_set, ScatterConfig};
//! use geoprox::GeoPoint;
//!
//! let config = ScatterConfig {
//!     origin: GeoPoint::new(29.7604, -95.3698),
//!     count: 200,
//!     radius_km: 5.0,
//!     seed: 42,
//! };
//!
//! let set = scatter_point_set("supermarket", &config);
//! assert_eq!(set.len(), 200);
//! ```

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::pointset::{PointSet, RawPoi};
use crate::GeoPoint;

/// Approximate kilometers per degree of latitude.
const KM_PER_DEGREE: f64 = 111.0;

/// Configuration for a synthetic POI scatter.
#[derive(Debug, Clone)]
pub struct ScatterConfig {
    /// Center of the scatter.
    pub origin: GeoPoint,
    /// Number of records to generate.
    pub count: usize,
    /// Maximum offset from the origin along each axis, in kilometers.
    pub radius_km: f64,
    /// RNG seed; the same seed always produces the same records.
    pub seed: u64,
}

impl Default for ScatterConfig {
    fn default() -> Self {
        Self {
            origin: GeoPoint::new(29.7604, -95.3698), // Houston
            count: 100,
            radius_km: 5.0,
            seed: 42,
        }
    }
}

/// Generate raw POI records scattered uniformly around the origin.
///
/// Records are named `"{label_prefix} 1"` onward in generation order.
pub fn scatter_records(label_prefix: &str, config: &ScatterConfig) -> Vec<RawPoi> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let lon_km_per_degree =
        KM_PER_DEGREE * config.origin.latitude.to_radians().cos().max(0.1);

    (0..config.count)
        .map(|i| {
            let lat_offset = rng.gen_range(-config.radius_km..=config.radius_km) / KM_PER_DEGREE;
            let lon_offset =
                rng.gen_range(-config.radius_km..=config.radius_km) / lon_km_per_degree;
            RawPoi {
                name: Some(format!("{} {}", label_prefix, i + 1)),
                lat: Some(config.origin.latitude + lat_offset),
                lon: Some(config.origin.longitude + lon_offset),
            }
        })
        .collect()
}

/// Generate a built point set scattered around the origin.
pub fn scatter_point_set(category: &str, config: &ScatterConfig) -> PointSet {
    PointSet::build(category, scatter_records(category, config))
}
