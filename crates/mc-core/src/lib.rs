//! Foundational primitives for the `microcluster` workspace.
//!
//! ## Images
//! [`Image`] is an owned, contiguous, row-major buffer. Every pipeline stage
//! consumes and produces owned images; there is no view or stride machinery.
//! Binary masks are `Image<u8>` with foreground `255` and the pixel rule
//! "set iff value > 0". Label maps are `Image<u32>` with `0` as background.
//!
//! ## Coordinates
//! Pixel centers sit at integer coordinates, `x` along columns and `y` along
//! rows. [`Point2f`] and [`Vec2f`] carry the small amount of 2D geometry the
//! centroid and clustering code needs.

mod error;
mod geom;
mod image;

pub use error::Error;
pub use geom::{Point2f, Vec2f};
pub use image::{gray_from_channels, Image};
