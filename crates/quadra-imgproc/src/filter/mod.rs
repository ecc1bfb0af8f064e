//! Filter operations
//!
//! This module provides the kernels, the convolution primitive and the blur filters.

use quadra_image::{Image, Rect};

/// Filter kernels
pub mod kernels;

/// Single pixel convolution
mod convolution;
pub use convolution::{color_channels, convolve_at};
pub(crate) use convolution::saturate_u8;

/// Blur filters
mod ops;
pub use ops::*;

/// The part of `rect` where a kernel of half-size `half` fits entirely inside `src`.
///
/// Spatial filters only write these pixels; the rest of the tile keeps whatever the
/// destination was initialized with.
///
/// # Examples
///
/// ```
/// use quadra_image::{Image, Rect};
/// use quadra_imgproc::filter::interior_region;
///
/// let image = Image::<u8, 1>::from_size_val([10, 10].into(), 0).unwrap();
/// let region = interior_region(&image, Rect::new(0, 0, 5, 5), 1);
/// assert_eq!(region, Rect::new(1, 1, 5, 5));
/// ```
pub fn interior_region<T, const C: usize>(src: &Image<T, C>, rect: Rect, half: usize) -> Rect {
    rect.intersect(&src.bounds().shrink(half))
}
