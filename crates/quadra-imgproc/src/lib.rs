#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// filter catalog module.
pub mod catalog;

/// color transformations module.
pub mod color;

/// image cropping module.
pub mod crop;

/// noise reduction module.
pub mod denoise;

/// boundary detection module.
pub mod edges;

/// image enhancement module.
pub mod enhance;

/// error types of the filters.
pub mod error;

/// image filtering module.
pub mod filter;

/// quadrant tile dispatcher module.
pub mod parallel;
