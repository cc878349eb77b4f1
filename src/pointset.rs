//! Point-set ingestion and nearest-point queries.
//!
//! This module provides the core query surface of the crate:
//! - Tolerant ingestion of raw POI records (`RawPoi` -> `PointSet`)
//! - Label normalization and exact deduplication
//! - Nearest and k-nearest scans with deterministic tie-breaking

use std::collections::HashSet;
use std::fmt;

use log::{debug, warn};
use serde::de::{self, Deserializer};
use serde::Deserialize;

use crate::error::Result;
use crate::geo_utils::haversine_distance;
use crate::{Bounds, GeoPoint, GeoProxError, Poi, ProximityMatch};

/// A raw point-of-interest record as delivered by upstream feeds.
///
/// Upstream geographic data routinely contains partial records: missing
/// names, null coordinates, and coordinates encoded as strings.
/// Deserialization is lenient — a numeric string parses, anything else
/// becomes an absent coordinate rather than failing the whole feed.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawPoi {
    /// Display label; may be missing or empty.
    #[serde(default)]
    pub name: Option<String>,
    /// Latitude in degrees; tolerates numbers, numeric strings, and null.
    #[serde(default, deserialize_with = "lenient_coord")]
    pub lat: Option<f64>,
    /// Longitude in degrees; tolerates numbers, numeric strings, and null.
    #[serde(default, deserialize_with = "lenient_coord")]
    pub lon: Option<f64>,
}

fn lenient_coord<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    struct CoordVisitor;

    impl<'de> de::Visitor<'de> for CoordVisitor {
        type Value = Option<f64>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a number, a numeric string, or null")
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<Self::Value, E> {
            Ok(Some(v))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Self::Value, E> {
            Ok(Some(v as f64))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Self::Value, E> {
            Ok(Some(v as f64))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Self::Value, E> {
            Ok(v.trim().parse().ok())
        }

        fn visit_bool<E: de::Error>(self, _: bool) -> std::result::Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E: de::Error>(self) -> std::result::Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_none<E: de::Error>(self) -> std::result::Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D2: Deserializer<'de>>(
            self,
            deserializer: D2,
        ) -> std::result::Result<Self::Value, D2::Error> {
            deserializer.deserialize_any(CoordVisitor)
        }
    }

    deserializer.deserialize_any(CoordVisitor)
}

/// Configuration for building a point set.
#[derive(Debug, Clone, Default)]
pub struct BuildConfig {
    /// Placeholder label for unnamed records.
    /// Defaults to the title-cased category name.
    pub default_label: Option<String>,

    /// Case-insensitive substrings; records whose normalized label contains
    /// any of them are excluded (e.g. dropping universities and daycares
    /// from a "school" feed).
    pub exclude_name_terms: Vec<String>,
}

/// Title-case a label: the first letter of every alphabetic run is
/// uppercased, the rest lowercased. Non-alphabetic characters pass through
/// and act as word boundaries.
fn title_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut prev_alpha = false;
    for ch in input.chars() {
        if ch.is_alphabetic() {
            if prev_alpha {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(ch);
            prev_alpha = false;
        }
    }
    out
}

fn normalize_label(raw: Option<&str>, placeholder: &str) -> String {
    let trimmed = raw.map(str::trim).unwrap_or("");
    if trimmed.is_empty() {
        placeholder.to_string()
    } else {
        title_case(trimmed)
    }
}

/// An immutable, deduplicated, named collection of POIs.
///
/// Iteration order is the insertion order of the first occurrence of each
/// deduplicated point and is fixed at build time; query tie-breaking
/// depends on it.
#[derive(Debug, Clone)]
pub struct PointSet {
    category: String,
    points: Vec<Poi>,
}

impl PointSet {
    /// Build a point set from raw records with the default configuration.
    ///
    /// Never fails: records with missing, non-finite, or out-of-range
    /// coordinates are dropped, and exact (label, lat, lon) duplicates are
    /// collapsed to their first occurrence. Worst case the result is empty.
    pub fn build(category: &str, records: impl IntoIterator<Item = RawPoi>) -> Self {
        Self::build_with(category, records, &BuildConfig::default())
    }

    /// Build a point set from raw records.
    ///
    /// Labels are trimmed and title-cased; empty or missing labels get the
    /// placeholder from `config` (or the title-cased category name).
    /// Records matching `config.exclude_name_terms` are skipped.
    pub fn build_with(
        category: &str,
        records: impl IntoIterator<Item = RawPoi>,
        config: &BuildConfig,
    ) -> Self {
        let placeholder = match &config.default_label {
            Some(label) => label.clone(),
            None => title_case(category),
        };
        let exclude: Vec<String> = config
            .exclude_name_terms
            .iter()
            .map(|term| term.to_lowercase())
            .collect();

        let mut seen: HashSet<(String, u64, u64)> = HashSet::new();
        let mut points = Vec::new();
        let mut total = 0usize;
        let mut dropped = 0usize;
        let mut excluded = 0usize;

        for record in records {
            total += 1;

            let (Some(lat), Some(lon)) = (record.lat, record.lon) else {
                dropped += 1;
                continue;
            };
            let point = GeoPoint::new(lat, lon);
            if !point.is_valid() {
                dropped += 1;
                continue;
            }

            let name = normalize_label(record.name.as_deref(), &placeholder);
            if !exclude.is_empty() {
                let lowered = name.to_lowercase();
                if exclude.iter().any(|term| lowered.contains(term)) {
                    excluded += 1;
                    continue;
                }
            }

            if seen.insert((name.clone(), lat.to_bits(), lon.to_bits())) {
                points.push(Poi { name, point });
            }
        }

        if dropped > 0 {
            debug!(
                "{}: dropped {} of {} records with unusable coordinates",
                category, dropped, total
            );
        }
        if excluded > 0 {
            debug!("{}: excluded {} records by name filter", category, excluded);
        }
        if total > 0 && points.is_empty() {
            warn!("{}: no usable records out of {}, point set is empty", category, total);
        }

        Self {
            category: category.to_string(),
            points,
        }
    }

    /// The category name this set was built for.
    pub fn category(&self) -> &str {
        &self.category
    }

    /// The deduplicated POIs in fixed iteration order.
    pub fn points(&self) -> &[Poi] {
        &self.points
    }

    /// Iterate over the POIs in fixed iteration order.
    pub fn iter(&self) -> impl Iterator<Item = &Poi> {
        self.points.iter()
    }

    /// Get the number of POIs in the set.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Bounding box of all POIs in the set, or `None` if the set is empty.
    pub fn bounds(&self) -> Option<Bounds> {
        let coords: Vec<GeoPoint> = self.points.iter().map(|p| p.point).collect();
        Bounds::from_points(&coords)
    }

    /// Find the nearest POI to `query`.
    ///
    /// Scans every point, returning the one with the minimum haversine
    /// distance. Ties resolve to the first point in the set's fixed
    /// iteration order, so repeated calls on an unchanged set return an
    /// identical result. An empty set yields `Ok(None)` — "no POI
    /// available" is not an error and never a distance of zero.
    ///
    /// Fails with `InvalidCoordinate` if `query` is out of range or
    /// non-finite.
    pub fn nearest(&self, query: GeoPoint) -> Result<Option<ProximityMatch>> {
        query.validate()?;
        Ok(self.nearest_valid(&query))
    }

    /// Nearest scan for a query already known to be valid.
    pub(crate) fn nearest_valid(&self, query: &GeoPoint) -> Option<ProximityMatch> {
        let mut best: Option<(&Poi, f64)> = None;
        for poi in &self.points {
            let d = haversine_distance(&poi.point, query);
            match best {
                // Strict improvement only: the first point wins ties.
                Some((_, best_d)) if d >= best_d => {}
                _ => best = Some((poi, d)),
            }
        }
        best.map(|(poi, distance_km)| ProximityMatch {
            poi: poi.clone(),
            distance_km,
        })
    }

    /// Find up to `k` nearest POIs to `query`, ascending by distance.
    ///
    /// Ties are broken by the set's fixed iteration order. If the set has
    /// fewer than `k` points, all of them are returned.
    ///
    /// Fails with `InvalidArgument` if `k == 0` and `InvalidCoordinate`
    /// if `query` is out of range or non-finite.
    pub fn k_nearest(&self, query: GeoPoint, k: usize) -> Result<Vec<ProximityMatch>> {
        if k == 0 {
            return Err(GeoProxError::InvalidArgument(
                "k must be at least 1".to_string(),
            ));
        }
        query.validate()?;
        Ok(self.k_nearest_valid(&query, k))
    }

    /// K-nearest scan for a query already known to be valid.
    pub(crate) fn k_nearest_valid(&self, query: &GeoPoint, k: usize) -> Vec<ProximityMatch> {
        let mut ranked: Vec<(usize, f64)> = self
            .points
            .iter()
            .enumerate()
            .map(|(i, poi)| (i, haversine_distance(&poi.point, query)))
            .collect();
        // Stable sort preserves iteration order among equal distances.
        ranked.sort_by(|a, b| a.1.total_cmp(&b.1));
        ranked.truncate(k);
        ranked
            .into_iter()
            .map(|(i, distance_km)| ProximityMatch {
                poi: self.points[i].clone(),
                distance_km,
            })
            .collect()
    }
}
