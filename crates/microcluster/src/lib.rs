//! Umbrella crate for the `microcluster` workspace.
//!
//! Re-exports the foundational crates so applications can depend on a single
//! name: image container and geometry (`mc-core`), global thresholding
//! (`mc-threshold`), component labeling and shape filtering (`mc-regions`),
//! binary segmentation combinators (`mc-segment`), and nearest-region
//! clustering (`mc-cluster`).

pub use mc_cluster::*;
pub use mc_core::*;
pub use mc_regions::*;
pub use mc_segment::*;
pub use mc_threshold::*;
