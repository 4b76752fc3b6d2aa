//! Connected-component labeling and shape-based region filtering.
//!
//! [`label_components`] numbers the foreground blobs of a binary mask,
//! [`region_props`] measures them (area, centroid, bounding box, solidity,
//! eccentricity), [`region_boundaries`] extracts their boundary pixels, and
//! [`filter_regions`] keeps only the blobs whose descriptors fall inside an
//! explicit [`RegionConstraints`] window.

mod filter;
mod label;
mod props;

pub use filter::{filter_regions, select_regions, RegionConstraints};
pub use label::{label_components, Connectivity};
pub use props::{region_boundaries, region_props, RegionProps};
