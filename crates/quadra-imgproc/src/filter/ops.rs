use quadra_image::{Image, Rect};

use super::{convolve_at, interior_region, kernels};
use crate::crop::check_tile;
use crate::error::FilterError;

/// Convolve every interior pixel of `rect` with `kernel` into the matching pixel of `dst`.
fn convolve_region(
    src: &Image<u8, 4>,
    dst: &mut Image<u8, 4>,
    rect: Rect,
    kernel: &kernels::Kernel,
    divisor: f32,
) {
    let region = interior_region(src, rect, kernel.half_size());
    for (x, y) in region.pixels() {
        let pixel = convolve_at(src, x, y, kernel, divisor);
        dst.put_pixel(x - rect.min_x, y - rect.min_y, pixel);
    }
}

/// Blur the region `rect` with a 3x3 box filter.
///
/// Pixels of `rect` closer than one pixel to the image edge are left untouched in `dst`.
///
/// # Arguments
///
/// * `src` - The source RGBA image.
/// * `dst` - The destination tile, with the size of `rect`.
/// * `rect` - The region of `src` to process.
///
/// # Examples
///
/// ```
/// use quadra_image::Image;
/// use quadra_imgproc::filter::uniform_blur;
///
/// let image = Image::<u8, 4>::from_size_pixel([5, 5].into(), [9, 18, 27, 255]).unwrap();
/// let mut blurred = Image::<u8, 4>::from_size_val(image.size(), 0).unwrap();
///
/// uniform_blur(&image, &mut blurred, image.bounds()).unwrap();
///
/// assert_eq!(blurred.pixel(2, 2), &[9, 18, 27, 255]);
/// assert_eq!(blurred.pixel(0, 0), &[0, 0, 0, 0]);
/// ```
pub fn uniform_blur(
    src: &Image<u8, 4>,
    dst: &mut Image<u8, 4>,
    rect: Rect,
) -> Result<(), FilterError> {
    check_tile(src, dst, rect)?;

    let kernel = kernels::Kernel::fixed(kernels::FixedKernel::Box);
    convolve_region(src, dst, rect, &kernel, 9.0);

    Ok(())
}

/// Blur the region `rect` with a gaussian kernel of size `kernel_size`.
///
/// The kernel is rebuilt on every call. Pixels of `rect` closer than `kernel_size / 2`
/// pixels to the image edge are left untouched in `dst`.
///
/// # Arguments
///
/// * `src` - The source RGBA image.
/// * `dst` - The destination tile, with the size of `rect`.
/// * `rect` - The region of `src` to process.
/// * `kernel_size` - The size of the kernel, odd and at least 3.
pub fn gaussian_blur(
    src: &Image<u8, 4>,
    dst: &mut Image<u8, 4>,
    rect: Rect,
    kernel_size: usize,
) -> Result<(), FilterError> {
    let (kernel, divisor) = kernels::gaussian_kernel(kernel_size)?;
    check_tile(src, dst, rect)?;

    convolve_region(src, dst, rect, &kernel, divisor);

    Ok(())
}

#[cfg(test)]
mod tests {
    use quadra_image::{Image, Rect};

    use crate::error::FilterError;

    fn ramp() -> Result<Image<u8, 4>, FilterError> {
        Ok(Image::<u8, 4>::from_fn([12, 10].into(), |x, y| {
            [(x * 20) as u8, (y * 25) as u8, ((x + y) * 10) as u8, 255]
        })?)
    }

    #[test]
    fn test_uniform_blur_flat() -> Result<(), FilterError> {
        let image = Image::<u8, 4>::from_size_pixel([8, 6].into(), [13, 200, 77, 255])?;
        let mut blurred = Image::<u8, 4>::from_size_val(image.size(), 0)?;
        super::uniform_blur(&image, &mut blurred, image.bounds())?;

        for (x, y) in image.bounds().shrink(1).pixels() {
            assert_eq!(blurred.pixel(x, y), image.pixel(x, y));
        }
        // the border band keeps its initial value
        assert_eq!(blurred.pixel(7, 3), &[0, 0, 0, 0]);
        Ok(())
    }

    #[test]
    fn test_uniform_blur_linear_ramp() -> Result<(), FilterError> {
        // the mean of a linear ramp over a symmetric window is the center value
        let image = ramp()?;
        let mut blurred = Image::<u8, 4>::from_size_val(image.size(), 0)?;
        super::uniform_blur(&image, &mut blurred, image.bounds())?;
        assert_eq!(blurred.pixel(4, 5), image.pixel(4, 5));
        Ok(())
    }

    #[test]
    fn test_gaussian_blur_spreads_impulse() -> Result<(), FilterError> {
        let mut image = Image::<u8, 4>::from_size_pixel([7, 7].into(), [0, 0, 0, 255])?;
        image.put_pixel(3, 3, [255, 255, 255, 255]);

        let mut blurred = Image::<u8, 4>::from_size_val(image.size(), 0)?;
        super::gaussian_blur(&image, &mut blurred, image.bounds(), 3)?;

        let center = blurred.pixel(3, 3)[0];
        let side = blurred.pixel(3, 2)[0];
        let corner = blurred.pixel(2, 2)[0];
        assert!(center < 255 && center > side && side > corner);
        assert_eq!(blurred.pixel(3, 4)[0], side);
        assert_eq!(blurred.pixel(5, 5), &[0, 0, 0, 255]);
        Ok(())
    }

    #[test]
    fn test_gaussian_blur_tile_matches_whole() -> Result<(), FilterError> {
        let image = ramp()?;
        let mut whole = Image::<u8, 4>::from_size_val(image.size(), 0)?;
        super::gaussian_blur(&image, &mut whole, image.bounds(), 5)?;

        let rect = Rect::new(6, 5, 12, 10);
        let mut tile = Image::<u8, 4>::from_size_val(rect.size(), 0)?;
        super::gaussian_blur(&image, &mut tile, rect, 5)?;

        for (x, y) in rect.pixels() {
            assert_eq!(tile.pixel(x - 6, y - 5), whole.pixel(x, y));
        }
        Ok(())
    }

    #[test]
    fn test_gaussian_blur_rejects_even_kernel() -> Result<(), FilterError> {
        let image = Image::<u8, 4>::from_size_val([8, 8].into(), 0)?;
        let mut blurred = image.clone();
        assert_eq!(
            super::gaussian_blur(&image, &mut blurred, image.bounds(), 4),
            Err(FilterError::InvalidKernelSize(4))
        );
        Ok(())
    }
}
