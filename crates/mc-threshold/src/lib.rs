//! Global thresholding of grayscale images into binary masks.
//!
//! Three selectable algorithms:
//! - [`ThresholdAlgorithm::Otsu`]: between-class variance maximization over
//!   the gray histogram.
//! - [`ThresholdAlgorithm::Li`]: iterative minimum cross entropy.
//! - [`ThresholdAlgorithm::Yen`]: maximum-correlation criterion.
//!
//! [`binarize`] applies the strictly-greater rule, writing `foreground` for
//! pixels above the threshold and `0` otherwise.

mod histogram;
mod select;

pub use histogram::GrayHistogram;
pub use select::{binarize, threshold, ThresholdAlgorithm, DEFAULT_NBINS};
