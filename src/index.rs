//! Category-keyed proximity index.
//!
//! Owns one immutable [`PointSet`] per category (e.g. "supermarket",
//! "school", "park") behind an `Arc`. Rebuilding a category after a data
//! refresh is a full replace-on-write: the new set is published by swapping
//! the reference, so in-flight readers holding the old `Arc` are unaffected
//! and subsequent queries see the new set.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::error::Result;
use crate::pointset::{BuildConfig, PointSet, RawPoi};
use crate::{Annotation, GeoPoint, GeoProxError, ProximityMatch};

/// Nearest-POI queries across named categories.
///
/// Queries never mutate state; a category that has never been loaded
/// behaves exactly like an empty point set ("no POI available").
///
/// # Example
/// ```
/// use geoprox::{GeoPoint, ProximityIndex, RawPoi};
///
/// let mut index = ProximityIndex::new();
/// index.load(
///     "supermarket",
///     vec![RawPoi {
///         name: Some("Kroger".to_string()),
///         lat: Some(29.91),
///         lon: Some(-95.41),
///     }],
/// );
///
/// let found = index.nearest("supermarket", GeoPoint::new(29.90, -95.40)).unwrap();
/// assert_eq!(found.unwrap().poi.name, "Kroger");
///
/// // Never-loaded categories are empty, not an error.
/// assert_eq!(index.nearest("park", GeoPoint::new(29.90, -95.40)).unwrap(), None);
/// ```
#[derive(Debug, Default)]
pub struct ProximityIndex {
    sets: HashMap<String, Arc<PointSet>>,
}

impl ProximityIndex {
    /// Create a new empty index.
    pub fn new() -> Self {
        Self {
            sets: HashMap::new(),
        }
    }

    /// Build a point set from raw records and publish it under its category.
    ///
    /// Returns the previously published set for the category, if any.
    pub fn load(
        &mut self,
        category: &str,
        records: impl IntoIterator<Item = RawPoi>,
    ) -> Option<Arc<PointSet>> {
        self.insert(PointSet::build(category, records))
    }

    /// Like [`load`](Self::load) with an explicit build configuration.
    pub fn load_with(
        &mut self,
        category: &str,
        records: impl IntoIterator<Item = RawPoi>,
        config: &BuildConfig,
    ) -> Option<Arc<PointSet>> {
        self.insert(PointSet::build_with(category, records, config))
    }

    /// Publish a point set under its category, replacing any previous set.
    ///
    /// The replacement swaps the `Arc`; readers that cloned the old
    /// reference keep a consistent view of the old set.
    pub fn insert(&mut self, set: PointSet) -> Option<Arc<PointSet>> {
        self.sets
            .insert(set.category().to_string(), Arc::new(set))
    }

    /// Remove a category, returning its set if it was present.
    pub fn remove(&mut self, category: &str) -> Option<Arc<PointSet>> {
        self.sets.remove(category)
    }

    /// Get the published set for a category.
    pub fn get(&self, category: &str) -> Option<&Arc<PointSet>> {
        self.sets.get(category)
    }

    /// Check if a category has been loaded.
    pub fn contains(&self, category: &str) -> bool {
        self.sets.contains_key(category)
    }

    /// All loaded category names, sorted.
    pub fn categories(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.sets.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Get the number of loaded categories.
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    /// Check if no categories are loaded.
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Drop all categories.
    pub fn clear(&mut self) {
        self.sets.clear();
    }

    /// Find the nearest POI of `category` to `query`.
    ///
    /// `Ok(None)` when the category is empty or was never loaded.
    /// Fails with `InvalidCoordinate` for an invalid query.
    pub fn nearest(&self, category: &str, query: GeoPoint) -> Result<Option<ProximityMatch>> {
        query.validate()?;
        Ok(self
            .sets
            .get(category)
            .and_then(|set| set.nearest_valid(&query)))
    }

    /// Find up to `k` nearest POIs of `category` to `query`, ascending by
    /// distance.
    ///
    /// Fails with `InvalidArgument` if `k == 0` and `InvalidCoordinate`
    /// for an invalid query; an empty or unknown category yields an empty
    /// vector.
    pub fn k_nearest(
        &self,
        category: &str,
        query: GeoPoint,
        k: usize,
    ) -> Result<Vec<ProximityMatch>> {
        if k == 0 {
            return Err(GeoProxError::InvalidArgument(
                "k must be at least 1".to_string(),
            ));
        }
        query.validate()?;
        Ok(self
            .sets
            .get(category)
            .map(|set| set.k_nearest_valid(&query, k))
            .unwrap_or_default())
    }

    /// Annotate each query point with the nearest POI of every loaded
    /// category.
    ///
    /// Queries are validated up front; the first invalid coordinate fails
    /// the whole call. Results are in query order, one [`Annotation`] per
    /// query point.
    pub fn annotate(&self, queries: &[GeoPoint]) -> Result<Vec<Annotation>> {
        for query in queries {
            query.validate()?;
        }
        Ok(queries.iter().map(|q| self.annotate_valid(q)).collect())
    }

    /// Parallel variant of [`annotate`](Self::annotate).
    ///
    /// Each query is an independent, side-effect-free scan over immutable
    /// sets, so they fan out across the rayon thread pool with no ordering
    /// dependency. Results are still in query order.
    #[cfg(feature = "parallel")]
    pub fn annotate_parallel(&self, queries: &[GeoPoint]) -> Result<Vec<Annotation>> {
        use rayon::prelude::*;

        for query in queries {
            query.validate()?;
        }
        Ok(queries.par_iter().map(|q| self.annotate_valid(q)).collect())
    }

    fn annotate_valid(&self, query: &GeoPoint) -> Annotation {
        let nearest: BTreeMap<String, Option<ProximityMatch>> = self
            .sets
            .iter()
            .map(|(category, set)| (category.clone(), set.nearest_valid(query)))
            .collect();
        Annotation {
            query: *query,
            nearest,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(name: &str, lat: f64, lon: f64) -> RawPoi {
        RawPoi {
            name: Some(name.to_string()),
            lat: Some(lat),
            lon: Some(lon),
        }
    }

    fn sample_index() -> ProximityIndex {
        let mut index = ProximityIndex::new();
        index.load(
            "supermarket",
            vec![
                raw("Kroger", 29.91, -95.41),
                raw("Aldi", 29.95, -95.45),
            ],
        );
        index.load(
            "school",
            vec![
                raw("Lincoln High", 29.90, -95.40),
                raw("Roosevelt Elementary", 29.95, -95.45),
            ],
        );
        index.load("park", Vec::new());
        index
    }

    #[test]
    fn test_categories_sorted() {
        let index = sample_index();
        assert_eq!(index.categories(), vec!["park", "school", "supermarket"]);
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn test_nearest_per_category() {
        let index = sample_index();
        let query = GeoPoint::new(29.901, -95.401);

        let school = index.nearest("school", query).unwrap().unwrap();
        assert_eq!(school.poi.name, "Lincoln High");

        let market = index.nearest("supermarket", query).unwrap().unwrap();
        assert_eq!(market.poi.name, "Kroger");
    }

    #[test]
    fn test_empty_and_unknown_categories() {
        let index = sample_index();
        let query = GeoPoint::new(29.9, -95.4);

        assert_eq!(index.nearest("park", query).unwrap(), None);
        assert_eq!(index.nearest("hospital", query).unwrap(), None);
        assert!(index.k_nearest("hospital", query, 3).unwrap().is_empty());
    }

    #[test]
    fn test_k_nearest_zero_fails_even_for_unknown_category() {
        let index = sample_index();
        let err = index
            .k_nearest("hospital", GeoPoint::new(29.9, -95.4), 0)
            .unwrap_err();
        assert!(matches!(err, GeoProxError::InvalidArgument(_)));
    }

    #[test]
    fn test_replace_on_write_keeps_old_readers_consistent() {
        let mut index = ProximityIndex::new();
        index.load("school", vec![raw("Old School", 29.90, -95.40)]);

        let old = Arc::clone(index.get("school").unwrap());

        index.load("school", vec![raw("New School", 30.00, -95.50)]);

        // The retained reference still sees the old data.
        assert_eq!(old.points()[0].name, "Old School");
        // New queries see the replacement.
        let found = index
            .nearest("school", GeoPoint::new(29.95, -95.45))
            .unwrap()
            .unwrap();
        assert_eq!(found.poi.name, "New School");
    }

    #[test]
    fn test_annotate_covers_all_categories() {
        let index = sample_index();
        let queries = vec![GeoPoint::new(29.901, -95.401), GeoPoint::new(29.95, -95.45)];

        let annotations = index.annotate(&queries).unwrap();
        assert_eq!(annotations.len(), 2);

        let first = &annotations[0];
        assert_eq!(first.query, queries[0]);
        assert_eq!(
            first.nearest.keys().collect::<Vec<_>>(),
            vec!["park", "school", "supermarket"]
        );
        assert_eq!(
            first.nearest["school"].as_ref().unwrap().poi.name,
            "Lincoln High"
        );
        assert_eq!(first.nearest["park"], None);
    }

    #[test]
    fn test_annotate_rejects_invalid_query() {
        let index = sample_index();
        let queries = vec![GeoPoint::new(29.9, -95.4), GeoPoint::new(999.0, 0.0)];
        assert!(index.annotate(&queries).is_err());
    }

    #[test]
    fn test_annotate_empty_queries() {
        let index = sample_index();
        assert!(index.annotate(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_remove_category() {
        let mut index = sample_index();
        assert!(index.remove("park").is_some());
        assert!(!index.contains("park"));
        assert_eq!(index.len(), 2);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_annotate_parallel_matches_serial() {
        let index = sample_index();
        let queries: Vec<GeoPoint> = (0..50)
            .map(|i| GeoPoint::new(29.85 + i as f64 * 0.004, -95.50 + i as f64 * 0.003))
            .collect();

        let serial = index.annotate(&queries).unwrap();
        let parallel = index.annotate_parallel(&queries).unwrap();
        assert_eq!(serial, parallel);
    }
}
