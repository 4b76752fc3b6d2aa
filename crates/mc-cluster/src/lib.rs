//! Nearest-region clustering of target centroids.
//!
//! Each target is assigned to the region whose boundary contains the point
//! nearest to it, provided that distance does not exceed a caller-supplied
//! threshold; targets with no region within the threshold are dropped. The
//! output always carries every input region identifier as a key, with an
//! empty list for regions that attracted no targets.
//!
//! Regions iterate in ascending identifier order, and the first region
//! achieving the minimum distance wins, so ties deterministically go to the
//! lowest region identifier.

use std::collections::BTreeMap;
use std::fmt::Display;

use mc_core::{Error, Point2f};

/// Assigns each target centroid to its nearest region boundary.
///
/// `targets` maps target identifiers to centroid coordinates; `regions` maps
/// region identifiers to non-empty boundary point sequences. A target is
/// assigned only if the minimum Euclidean distance from its centroid to any
/// boundary point of the winning region is at most `distance_threshold`.
///
/// Validation runs before any assignment work: a negative or non-finite
/// threshold and non-finite coordinates fail with
/// [`Error::InvalidArgument`], an empty boundary with
/// [`Error::EmptyRegionBoundary`]. An empty `targets` map is valid and
/// yields an all-empty output.
pub fn assign_targets_to_regions<T, K>(
    targets: &BTreeMap<T, Point2f>,
    regions: &BTreeMap<K, Vec<Point2f>>,
    distance_threshold: f32,
) -> Result<BTreeMap<K, Vec<Point2f>>, Error>
where
    T: Ord,
    K: Ord + Clone + Display,
{
    validate(targets, regions, distance_threshold)?;

    let mut clusters: BTreeMap<K, Vec<Point2f>> =
        regions.keys().map(|id| (id.clone(), Vec::new())).collect();

    for &centroid in targets.values() {
        if let Some(region_id) = nearest_region(centroid, regions, distance_threshold) {
            clusters
                .get_mut(region_id)
                .expect("cluster keys mirror region keys")
                .push(centroid);
        }
    }

    Ok(clusters)
}

// Region whose boundary comes closest to `target`, or None when even the
// closest region is farther than the threshold. Strict `<` keeps the first
// (lowest) identifier on ties.
fn nearest_region<'a, K: Ord>(
    target: Point2f,
    regions: &'a BTreeMap<K, Vec<Point2f>>,
    distance_threshold: f32,
) -> Option<&'a K> {
    let mut closest = None;
    let mut min_dist = f32::INFINITY;

    for (region_id, boundary) in regions {
        let mut dist = f32::INFINITY;
        for &p in boundary {
            dist = dist.min(target.distance_to(p));
        }

        if dist < min_dist {
            min_dist = dist;
            closest = Some(region_id);
        }
    }

    if min_dist > distance_threshold {
        None
    } else {
        closest
    }
}

fn validate<T, K>(
    targets: &BTreeMap<T, Point2f>,
    regions: &BTreeMap<K, Vec<Point2f>>,
    distance_threshold: f32,
) -> Result<(), Error>
where
    T: Ord,
    K: Ord + Display,
{
    if !distance_threshold.is_finite() {
        return Err(Error::InvalidArgument {
            name: "distance_threshold",
            reason: "must be a finite number",
        });
    }
    if distance_threshold < 0.0 {
        return Err(Error::InvalidArgument {
            name: "distance_threshold",
            reason: "must be non-negative",
        });
    }

    for (region_id, boundary) in regions {
        if boundary.is_empty() {
            return Err(Error::EmptyRegionBoundary {
                region: region_id.to_string(),
            });
        }
        if boundary.iter().any(|p| !p.is_finite()) {
            return Err(Error::InvalidArgument {
                name: "regions",
                reason: "boundary coordinates must be finite",
            });
        }
    }

    if targets.values().any(|p| !p.is_finite()) {
        return Err(Error::InvalidArgument {
            name: "targets",
            reason: "centroid coordinates must be finite",
        });
    }

    Ok(())
}
