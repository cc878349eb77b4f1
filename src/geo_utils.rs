//! Geographic distance calculations.
//!
//! Great-circle distances via the haversine formula, used by every
//! nearest-point scan in the crate.

use crate::error::Result;
use crate::GeoPoint;

/// Mean Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Calculate the great-circle distance between two points in kilometers.
///
/// Uses the haversine formula:
/// `a = sin²(Δlat/2) + cos(lat1)·cos(lat2)·sin²(Δlon/2)`,
/// `d = 2·R·atan2(√a, √(1−a))`.
///
/// Precondition: both points hold valid coordinates. Callers taking
/// arbitrary input should go through [`distance`] instead, which
/// validates both endpoints.
#[inline]
pub fn haversine_distance(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let delta_lat = (b.latitude - a.latitude).to_radians();
    let delta_lon = (b.longitude - a.longitude).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Calculate the great-circle distance between two points in kilometers,
/// validating both endpoints.
///
/// Returns [`GeoProxError::InvalidCoordinate`](crate::GeoProxError::InvalidCoordinate)
/// if either point has a non-finite or out-of-range coordinate.
///
/// # Example
/// ```
/// use geoprox::{distance, GeoPoint};
///
/// let london = GeoPoint::new(51.5074, -0.1278);
/// let paris = GeoPoint::new(48.8566, 2.3522);
/// let km = distance(&london, &paris).unwrap();
/// assert!((km - 343.5).abs() < 1.0);
/// ```
pub fn distance(a: &GeoPoint, b: &GeoPoint) -> Result<f64> {
    a.validate()?;
    b.validate()?;
    Ok(haversine_distance(a, b))
}
