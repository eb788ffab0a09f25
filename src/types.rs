use geo::Point;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single traffic-violation record read from the input CSV.
///
/// `longitude`/`latitude` live in `point`; every other CSV column is an
/// opaque passenger field carried through untouched for popup rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct ViolationRecord {
    pub point: Point<f64>,
    pub fields: HashMap<String, String>,
}

/// A named fixed reference location. The centroid set is static
/// configuration, never derived from the input data.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Centroid {
    pub name: String,
    pub longitude: f64,
    pub latitude: f64,
}

/// Index of a centroid in the configured centroid list.
///
/// Groups are keyed by this rather than by display name, so two centroids
/// with colliding names can never be conflated downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CentroidId(pub usize);

/// A record paired with its nearest centroid. Derived by assignment;
/// the input record is never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignedPoint {
    pub record: ViolationRecord,
    pub centroid: CentroidId,
}

/// Compass quadrant relative to the configured geographic midpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Quadrant {
    NorthWest,
    NorthEast,
    SouthWest,
    SouthEast,
}

impl Quadrant {
    pub const ALL: [Quadrant; 4] = [
        Quadrant::NorthWest,
        Quadrant::NorthEast,
        Quadrant::SouthWest,
        Quadrant::SouthEast,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Quadrant::NorthWest => "North West",
            Quadrant::NorthEast => "North East",
            Quadrant::SouthWest => "South West",
            Quadrant::SouthEast => "South East",
        }
    }

    /// Fixed marker/legend palette.
    pub fn color(&self) -> &'static str {
        match self {
            Quadrant::NorthWest => "#ff6b6b",
            Quadrant::NorthEast => "#4ecdc4",
            Quadrant::SouthWest => "#45aaf2",
            Quadrant::SouthEast => "#fed330",
        }
    }
}

/// All points that share the same nearest centroid, in first-seen input
/// order. The quadrant is derived from the group's first point.
#[derive(Debug, Clone, PartialEq)]
pub struct CentroidGroup {
    pub centroid: CentroidId,
    pub quadrant: Quadrant,
    pub points: Vec<ViolationRecord>,
}

/// Errors from centroid configuration and the assignment/grouping core.
#[derive(Debug, PartialEq)]
pub enum ClusterError {
    /// No centroids configured; assignment cannot produce any result.
    EmptyCentroidSet,
    /// Two configured centroids share a display name.
    DuplicateCentroidName(String),
    /// A configured centroid has a NaN or infinite coordinate.
    NonFiniteCentroid(String),
    /// A group references a centroid index outside the configured list.
    /// Internal-consistency violation, treated as fatal.
    MissingCentroidForGroup(usize),
}

impl std::fmt::Display for ClusterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClusterError::EmptyCentroidSet => {
                write!(f, "centroid set is empty; nothing to assign points to")
            }
            ClusterError::DuplicateCentroidName(name) => {
                write!(f, "duplicate centroid name: {}", name)
            }
            ClusterError::NonFiniteCentroid(name) => {
                write!(f, "centroid '{}' has a non-finite coordinate", name)
            }
            ClusterError::MissingCentroidForGroup(idx) => {
                write!(f, "group references unknown centroid index {}", idx)
            }
        }
    }
}

impl std::error::Error for ClusterError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quadrant_labels_match_legend_strings() {
        assert_eq!(Quadrant::NorthWest.label(), "North West");
        assert_eq!(Quadrant::NorthEast.label(), "North East");
        assert_eq!(Quadrant::SouthWest.label(), "South West");
        assert_eq!(Quadrant::SouthEast.label(), "South East");
    }

    #[test]
    fn test_quadrant_colors_are_distinct_hex() {
        let mut seen = std::collections::HashSet::new();
        for q in Quadrant::ALL {
            let c = q.color();
            assert!(c.starts_with('#') && c.len() == 7, "bad hex color {}", c);
            assert!(seen.insert(c), "palette color {} reused", c);
        }
    }

    #[test]
    fn test_cluster_error_messages_name_the_offender() {
        let err = ClusterError::DuplicateCentroidName("Ponda".into());
        assert!(err.to_string().contains("Ponda"));
        let err = ClusterError::MissingCentroidForGroup(7);
        assert!(err.to_string().contains('7'));
    }
}
