//! Boundary detection filters.
//!
//! Both filters produce a negated grayscale edge map: flat areas come out white and strong
//! boundaries dark. The `power` divisor trades detail for contrast, higher powers keep only
//! the strongest boundaries.

use quadra_image::{Image, Rect};

use crate::color::gray_from_rgb_u8;
use crate::crop::check_tile;
use crate::error::FilterError;
use crate::filter::{convolve_at, interior_region, kernels::Kernel, saturate_u8};

fn check_power(power: u32) -> Result<(), FilterError> {
    if power == 0 {
        return Err(FilterError::InvalidPower(power));
    }
    Ok(())
}

/// Detect boundaries in the region `rect` with the laplacian kernel.
///
/// Each interior pixel is convolved with the laplacian using `power` as divisor, the result is
/// converted to gray and negated.
///
/// # Arguments
///
/// * `src` - The source RGBA image.
/// * `dst` - The destination grayscale tile, with the size of `rect`.
/// * `rect` - The region of `src` to process.
/// * `power` - The normalization divisor, at least 1.
///
/// # Examples
///
/// ```
/// use quadra_image::Image;
/// use quadra_imgproc::edges::laplacian_boundaries;
///
/// let image = Image::<u8, 4>::from_size_pixel([4, 4].into(), [90, 90, 90, 255]).unwrap();
/// let mut edges = Image::<u8, 1>::from_size_val(image.size(), 0).unwrap();
///
/// laplacian_boundaries(&image, &mut edges, image.bounds(), 8).unwrap();
/// assert_eq!(edges.pixel(1, 1), &[255]);
/// ```
pub fn laplacian_boundaries(
    src: &Image<u8, 4>,
    dst: &mut Image<u8, 1>,
    rect: Rect,
    power: u32,
) -> Result<(), FilterError> {
    check_power(power)?;
    check_tile(src, dst, rect)?;

    let kernel = Kernel::laplacian();
    let divisor = power as f32;

    for (x, y) in interior_region(src, rect, kernel.half_size()).pixels() {
        let [r, g, b, _] = convolve_at(src, x, y, &kernel, divisor);
        let gray = gray_from_rgb_u8(r, g, b);
        dst.put_pixel(x - rect.min_x, y - rect.min_y, [u8::MAX - gray]);
    }

    Ok(())
}

/// Detect boundaries in the region `rect` with the pair of Prewitt kernels.
///
/// Each interior pixel is convolved with [`Kernel::prewitt_0`] and [`Kernel::prewitt_90`], both
/// divided by `power`. The red channels of the two responses are combined into the gradient
/// magnitude `sqrt(gx² + gy²)`, truncated to 255 and negated.
///
/// # Arguments
///
/// * `src` - The source RGBA image.
/// * `dst` - The destination grayscale tile, with the size of `rect`.
/// * `rect` - The region of `src` to process.
/// * `power` - The normalization divisor, at least 1.
pub fn prewitt_boundaries(
    src: &Image<u8, 4>,
    dst: &mut Image<u8, 1>,
    rect: Rect,
    power: u32,
) -> Result<(), FilterError> {
    check_power(power)?;
    check_tile(src, dst, rect)?;

    let kernel_0 = Kernel::prewitt_0();
    let kernel_90 = Kernel::prewitt_90();
    let divisor = power as f32;

    for (x, y) in interior_region(src, rect, kernel_0.half_size()).pixels() {
        let gx = convolve_at(src, x, y, &kernel_0, divisor)[0] as f64;
        let gy = convolve_at(src, x, y, &kernel_90, divisor)[0] as f64;
        let magnitude = saturate_u8((gx * gx + gy * gy).sqrt());
        dst.put_pixel(x - rect.min_x, y - rect.min_y, [u8::MAX - magnitude]);
    }

    Ok(())
}
