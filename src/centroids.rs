use crate::types::{Centroid, ClusterError};
use std::collections::HashSet;

/// Built-in centroid registry: the ten Goa taluka towns used as
/// nearest-neighbor anchors when the config file does not list its own
/// centroids. Coordinates are WGS84 town centers.
static DEFAULT_REGISTRY: &[(&str, f64, f64)] = &[
    ("Vasco da Gama", 73.8113, 15.3927),
    ("Ponda", 73.9668, 15.4027),
    ("Bicholim", 73.9087, 15.5857),
    ("Curchorem", 74.1109, 15.2644),
    ("Valpoi", 74.1367, 15.5321),
    ("Canacona", 74.0593, 14.9959),
    ("Pernem", 73.7951, 15.7217),
    ("Sanguem", 74.1510, 15.2292),
    ("Quepem", 74.0777, 15.2126),
    ("Dharbandora", 74.2070, 15.4226),
];

/// Returns the built-in centroid list, in registry order. Order matters:
/// ties during assignment resolve to the earlier entry.
pub fn default_centroids() -> Vec<Centroid> {
    DEFAULT_REGISTRY
        .iter()
        .map(|&(name, longitude, latitude)| Centroid {
            name: name.to_string(),
            longitude,
            latitude,
        })
        .collect()
}

/// Validates a centroid list before it is used for assignment: it must be
/// non-empty, names must be unique (they are the display keys downstream),
/// and every coordinate must be finite.
pub fn validate(centroids: &[Centroid]) -> Result<(), ClusterError> {
    if centroids.is_empty() {
        return Err(ClusterError::EmptyCentroidSet);
    }
    let mut seen = HashSet::new();
    for c in centroids {
        if !seen.insert(c.name.as_str()) {
            return Err(ClusterError::DuplicateCentroidName(c.name.clone()));
        }
        if !c.longitude.is_finite() || !c.latitude.is_finite() {
            return Err(ClusterError::NonFiniteCentroid(c.name.clone()));
        }
    }
    Ok(())
}
