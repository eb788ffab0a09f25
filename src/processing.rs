use crate::config::QuadrantConfig;
use crate::types::{
    AssignedPoint, Centroid, CentroidGroup, CentroidId, ClusterError, Quadrant, ViolationRecord,
};
use geo::Point;
use rayon::prelude::*;
use std::collections::HashMap;

/// Result of running nearest-centroid assignment over a batch of records.
///
/// Records whose coordinates produced no valid minimum distance (NaN
/// longitude or latitude) are collected in `unassignable` rather than
/// silently dropped; callers decide whether to proceed without them.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub assigned: Vec<AssignedPoint>,
    pub unassignable: Vec<ViolationRecord>,
}

/// Planar Euclidean distance in longitude/latitude space. Deliberately not
/// geodesic: at Goa's scale the nearest-centroid winner is the same and
/// the original data was partitioned this way.
fn distance(point: &Point<f64>, centroid: &Centroid) -> f64 {
    let dx = point.x() - centroid.longitude;
    let dy = point.y() - centroid.latitude;
    (dx * dx + dy * dy).sqrt()
}

/// Index of the nearest centroid, or `None` when every distance is NaN.
///
/// The running minimum starts at infinity and is replaced only on strict
/// `<`, so the first centroid at the minimum distance wins ties and NaN
/// distances (which compare false to everything) never win at all.
pub fn nearest_centroid(point: &Point<f64>, centroids: &[Centroid]) -> Option<CentroidId> {
    let mut min_distance = f64::INFINITY;
    let mut nearest = None;
    for (idx, centroid) in centroids.iter().enumerate() {
        let d = distance(point, centroid);
        if d < min_distance {
            min_distance = d;
            nearest = Some(CentroidId(idx));
        }
    }
    nearest
}

/// Assigns every record to its nearest centroid.
///
/// Pure: inputs are not mutated and repeated calls on the same inputs
/// yield identical results. Each record is independent, so the scan runs
/// in parallel; `par_iter` + `collect` preserves input order.
pub fn assign(
    records: Vec<ViolationRecord>,
    centroids: &[Centroid],
) -> Result<Assignment, ClusterError> {
    if centroids.is_empty() {
        return Err(ClusterError::EmptyCentroidSet);
    }

    let nearest: Vec<Option<CentroidId>> = records
        .par_iter()
        .map(|record| nearest_centroid(&record.point, centroids))
        .collect();

    let mut assigned = Vec::with_capacity(records.len());
    let mut unassignable = Vec::new();
    for (record, centroid) in records.into_iter().zip(nearest) {
        match centroid {
            Some(centroid) => assigned.push(AssignedPoint { record, centroid }),
            None => unassignable.push(record),
        }
    }

    Ok(Assignment {
        assigned,
        unassignable,
    })
}

/// Maps a coordinate to its compass quadrant relative to the configured
/// midpoint. Rules are evaluated in order and the first match wins, so
/// boundary longitudes route East and boundary latitudes route South.
pub fn classify(longitude: f64, latitude: f64, center: &QuadrantConfig) -> Quadrant {
    if longitude < center.center_longitude && latitude > center.center_latitude {
        Quadrant::NorthWest
    } else if longitude >= center.center_longitude && latitude > center.center_latitude {
        Quadrant::NorthEast
    } else if longitude < center.center_longitude && latitude <= center.center_latitude {
        Quadrant::SouthWest
    } else {
        Quadrant::SouthEast
    }
}

/// Groups assigned points by centroid, in first-seen order, preserving
/// each point's input order within its group.
///
/// A group's quadrant is classified from its FIRST point's coordinates,
/// not from the centroid's own position. That matches the upstream data
/// pipeline this tool replaces; see DESIGN.md before changing it.
pub fn group_by_centroid(
    assigned: Vec<AssignedPoint>,
    centroids: &[Centroid],
    center: &QuadrantConfig,
) -> Result<Vec<CentroidGroup>, ClusterError> {
    let mut order: Vec<CentroidId> = Vec::new();
    let mut buckets: HashMap<CentroidId, Vec<ViolationRecord>> = HashMap::new();

    for point in assigned {
        if point.centroid.0 >= centroids.len() {
            return Err(ClusterError::MissingCentroidForGroup(point.centroid.0));
        }
        if !buckets.contains_key(&point.centroid) {
            order.push(point.centroid);
        }
        buckets.entry(point.centroid).or_default().push(point.record);
    }

    let mut groups = Vec::with_capacity(order.len());
    for id in order {
        // Groups with zero points never get a bucket and are skipped.
        let Some(points) = buckets.remove(&id) else {
            continue;
        };
        let quadrant = match points.first() {
            Some(first) => classify(first.point.x(), first.point.y(), center),
            None => continue,
        };
        groups.push(CentroidGroup {
            centroid: id,
            quadrant,
            points,
        });
    }

    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn record(lon: f64, lat: f64) -> ViolationRecord {
        ViolationRecord {
            point: Point::new(lon, lat),
            fields: HashMap::new(),
        }
    }

    fn centroid(name: &str, lon: f64, lat: f64) -> Centroid {
        Centroid {
            name: name.to_string(),
            longitude: lon,
            latitude: lat,
        }
    }

    fn two_centroids() -> Vec<Centroid> {
        vec![centroid("A", 0.0, 0.0), centroid("B", 10.0, 0.0)]
    }

    fn default_center() -> QuadrantConfig {
        QuadrantConfig::default()
    }

    #[test]
    fn test_assign_picks_strictly_nearest_centroid() {
        let result = assign(vec![record(1.0, 0.0)], &two_centroids()).unwrap();
        assert_eq!(result.assigned.len(), 1);
        assert_eq!(result.assigned[0].centroid, CentroidId(0), "distance 1 beats distance 9");
        assert!(result.unassignable.is_empty());
    }

    #[test]
    fn test_assign_breaks_ties_toward_earlier_centroid() {
        // (5, 0) is exactly distance 5 from both A and B; strict `<`
        // against the running minimum means B never replaces A.
        let result = assign(vec![record(5.0, 0.0)], &two_centroids()).unwrap();
        assert_eq!(result.assigned[0].centroid, CentroidId(0));
    }

    #[test]
    fn test_assign_returns_one_output_per_well_formed_input() {
        let records: Vec<_> = (0..50).map(|i| record(f64::from(i) * 0.3, 1.0)).collect();
        let centroids = two_centroids();
        let result = assign(records.clone(), &centroids).unwrap();
        assert_eq!(result.assigned.len(), records.len());
        assert!(result.unassignable.is_empty());
        for point in &result.assigned {
            assert!(point.centroid.0 < centroids.len());
        }
    }

    #[test]
    fn test_assign_is_idempotent() {
        let records = vec![record(1.0, 2.0), record(8.0, -3.0), record(4.9, 0.1)];
        let centroids = two_centroids();
        let first = assign(records.clone(), &centroids).unwrap();
        let second = assign(records, &centroids).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_assign_preserves_input_order() {
        let records = vec![record(9.0, 0.0), record(1.0, 0.0), record(8.0, 0.0)];
        let result = assign(records.clone(), &two_centroids()).unwrap();
        let expected: Vec<_> = records.iter().map(|r| r.point).collect();
        let actual: Vec<_> = result.assigned.iter().map(|a| a.record.point).collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_assign_with_empty_centroid_set_fails() {
        let err = assign(vec![record(1.0, 1.0)], &[]).unwrap_err();
        assert_eq!(err, ClusterError::EmptyCentroidSet);
    }

    #[test]
    fn test_nan_coordinates_land_in_unassignable() {
        let bad = record(f64::NAN, 0.0);
        let result = assign(vec![record(1.0, 0.0), bad.clone()], &two_centroids()).unwrap();
        assert_eq!(result.assigned.len(), 1);
        assert_eq!(result.unassignable, vec![bad]);
    }

    #[test]
    fn test_classify_covers_all_four_quadrants() {
        let center = default_center();
        assert_eq!(classify(73.0, 16.0, &center), Quadrant::NorthWest);
        assert_eq!(classify(74.5, 16.0, &center), Quadrant::NorthEast);
        assert_eq!(classify(73.0, 14.0, &center), Quadrant::SouthWest);
        assert_eq!(classify(74.5, 14.0, &center), Quadrant::SouthEast);
    }

    #[test]
    fn test_classify_boundary_longitude_routes_east() {
        let center = default_center();
        assert_eq!(classify(73.99, 16.0, &center), Quadrant::NorthEast);
        assert_eq!(classify(73.99, 14.0, &center), Quadrant::SouthEast);
    }

    #[test]
    fn test_classify_boundary_latitude_routes_south() {
        let center = default_center();
        assert_eq!(classify(73.0, 15.35, &center), Quadrant::SouthWest);
        assert_eq!(classify(74.5, 15.35, &center), Quadrant::SouthEast);
    }

    #[test]
    fn test_classify_respects_configured_center() {
        let center = QuadrantConfig {
            center_longitude: 0.0,
            center_latitude: 0.0,
        };
        assert_eq!(classify(-1.0, 1.0, &center), Quadrant::NorthWest);
        assert_eq!(classify(1.0, -1.0, &center), Quadrant::SouthEast);
    }

    #[test]
    fn test_grouping_preserves_first_seen_and_input_order() {
        let centroids = two_centroids();
        let records = vec![
            record(9.0, 0.0), // B first
            record(1.0, 0.0), // then A
            record(8.0, 0.0), // B again
        ];
        let assignment = assign(records, &centroids).unwrap();
        let groups =
            group_by_centroid(assignment.assigned, &centroids, &default_center()).unwrap();

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].centroid, CentroidId(1), "B was seen first");
        assert_eq!(groups[1].centroid, CentroidId(0));
        let b_lons: Vec<f64> = groups[0].points.iter().map(|p| p.point.x()).collect();
        assert_eq!(b_lons, vec![9.0, 8.0], "within-group input order kept");
    }

    #[test]
    fn test_group_quadrant_comes_from_first_point_not_centroid() {
        // Centroid sits north-east of the midpoint, but the group's first
        // point is south-west of it; the group must classify South West.
        let centroids = vec![centroid("C", 74.5, 16.0)];
        let records = vec![record(73.0, 14.0), record(74.5, 16.0)];
        let assignment = assign(records, &centroids).unwrap();
        let groups =
            group_by_centroid(assignment.assigned, &centroids, &default_center()).unwrap();
        assert_eq!(groups[0].quadrant, Quadrant::SouthWest);
    }

    #[test]
    fn test_centroid_with_no_points_produces_no_group() {
        let centroids = two_centroids();
        let assignment = assign(vec![record(1.0, 0.0)], &centroids).unwrap();
        let groups =
            group_by_centroid(assignment.assigned, &centroids, &default_center()).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].centroid, CentroidId(0));
    }

    #[test]
    fn test_out_of_range_group_key_is_fatal() {
        let centroids = two_centroids();
        let assigned = vec![AssignedPoint {
            record: record(1.0, 0.0),
            centroid: CentroidId(5),
        }];
        let err = group_by_centroid(assigned, &centroids, &default_center()).unwrap_err();
        assert_eq!(err, ClusterError::MissingCentroidForGroup(5));
    }
}
