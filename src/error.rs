//! Unified error handling for the geoprox library.

use thiserror::Error;

/// Errors returned by geoprox operations.
///
/// All failures are local validation errors raised synchronously at the
/// point of use; the library performs no I/O and never retries.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeoProxError {
    /// A coordinate is non-finite or outside the valid latitude/longitude
    /// range ([-90, 90] / [-180, 180] degrees).
    #[error("invalid coordinate: latitude {latitude}, longitude {longitude}")]
    InvalidCoordinate { latitude: f64, longitude: f64 },

    /// A structural precondition was violated (e.g. `k == 0`).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GeoProxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = GeoProxError::InvalidCoordinate {
            latitude: 91.0,
            longitude: 0.0,
        };
        assert_eq!(err.to_string(), "invalid coordinate: latitude 91, longitude 0");

        let err = GeoProxError::InvalidArgument("k must be at least 1".to_string());
        assert_eq!(err.to_string(), "invalid argument: k must be at least 1");
    }
}
