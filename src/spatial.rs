//! Spatial indexing for viewport queries.
//!
//! Uses an R-tree to efficiently find the POIs of a category inside a
//! bounding box (e.g. the map viewport currently on screen). The
//! nearest-point contract stays a linear haversine scan in
//! [`PointSet`](crate::PointSet); the R-tree serves only bounds filtering.

use rstar::{RTree, RTreeObject, AABB};

use crate::{Bounds, Poi, PointSet};

/// POI wrapper for R-tree indexing. Envelopes are [lng, lat] points.
#[derive(Debug, Clone)]
struct IndexedPoi {
    poi: Poi,
}

impl RTreeObject for IndexedPoi {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.poi.point.longitude, self.poi.point.latitude])
    }
}

/// R-tree over one category's POIs for bounds queries.
///
/// Built from an immutable [`PointSet`]; like the set itself it is
/// replaced wholesale when the category is rebuilt, never mutated.
#[derive(Debug)]
pub struct SpatialIndex {
    category: String,
    tree: RTree<IndexedPoi>,
}

impl SpatialIndex {
    /// Build a spatial index over all POIs of a point set.
    pub fn from_point_set(set: &PointSet) -> Self {
        let entries: Vec<IndexedPoi> = set
            .iter()
            .cloned()
            .map(|poi| IndexedPoi { poi })
            .collect();
        Self {
            category: set.category().to_string(),
            tree: RTree::bulk_load(entries),
        }
    }

    /// The category this index was built for.
    pub fn category(&self) -> &str {
        &self.category
    }

    /// All POIs inside the given bounds (edges inclusive).
    ///
    /// Result order is unspecified.
    pub fn within_bounds(&self, bounds: &Bounds) -> Vec<&Poi> {
        let envelope = AABB::from_corners(
            [bounds.min_lng, bounds.min_lat],
            [bounds.max_lng, bounds.max_lat],
        );
        self.tree
            .locate_in_envelope_intersecting(&envelope)
            .map(|entry| &entry.poi)
            .collect()
    }

    /// Get the number of indexed POIs.
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Check if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RawPoi;

    fn raw(name: &str, lat: f64, lon: f64) -> RawPoi {
        RawPoi {
            name: Some(name.to_string()),
            lat: Some(lat),
            lon: Some(lon),
        }
    }

    fn sample_set() -> PointSet {
        PointSet::build(
            "supermarket",
            vec![
                raw("Inside A", 29.90, -95.40),
                raw("Inside B", 29.95, -95.45),
                raw("North Of Box", 30.50, -95.40),
                raw("West Of Box", 29.90, -96.50),
            ],
        )
    }

    #[test]
    fn test_within_bounds() {
        let index = SpatialIndex::from_point_set(&sample_set());
        assert_eq!(index.len(), 4);

        let viewport = Bounds {
            min_lat: 29.80,
            max_lat: 30.00,
            min_lng: -95.50,
            max_lng: -95.30,
        };

        let mut names: Vec<&str> = index
            .within_bounds(&viewport)
            .into_iter()
            .map(|p| p.name.as_str())
            .collect();
        names.sort_unstable();
        assert_eq!(names, vec!["Inside A", "Inside B"]);
    }

    #[test]
    fn test_within_bounds_edge_inclusive() {
        let index = SpatialIndex::from_point_set(&sample_set());
        let edge = Bounds {
            min_lat: 29.90,
            max_lat: 29.90,
            min_lng: -95.40,
            max_lng: -95.40,
        };
        let found = index.within_bounds(&edge);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Inside A");
    }

    #[test]
    fn test_empty_set() {
        let index = SpatialIndex::from_point_set(&PointSet::build("park", Vec::new()));
        assert!(index.is_empty());
        assert_eq!(index.category(), "park");

        let anywhere = Bounds {
            min_lat: -90.0,
            max_lat: 90.0,
            min_lng: -180.0,
            max_lng: 180.0,
        };
        assert!(index.within_bounds(&anywhere).is_empty());
    }

    #[test]
    fn test_matches_linear_filter() {
        let set = sample_set();
        let index = SpatialIndex::from_point_set(&set);
        let viewport = Bounds {
            min_lat: 29.0,
            max_lat: 30.0,
            min_lng: -96.0,
            max_lng: -95.0,
        };

        let mut from_tree: Vec<&str> = index
            .within_bounds(&viewport)
            .into_iter()
            .map(|p| p.name.as_str())
            .collect();
        from_tree.sort_unstable();

        let mut from_scan: Vec<&str> = set
            .iter()
            .filter(|p| viewport.contains(&p.point))
            .map(|p| p.name.as_str())
            .collect();
        from_scan.sort_unstable();

        assert_eq!(from_tree, from_scan);
    }
}
