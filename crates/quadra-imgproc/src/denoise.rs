//! Statistical despeckling.
//!
//! A pixel is a speckle when it lies outside `mean ± stdev` of its neighborhood (center
//! excluded). Speckles are replaced by a 3x3 gaussian average, everything else is kept.

use quadra_image::{Image, Rect};

use crate::crop::{check_tile, crop_image};
use crate::error::FilterError;
use crate::filter::{color_channels, convolve_at, kernels};

/// Check the despeckle parameters.
pub fn check_despeckle_params(kernel_size: usize, iterations: usize) -> Result<(), FilterError> {
    if kernel_size < 3 || kernel_size % 2 == 0 {
        return Err(FilterError::InvalidKernelSize(kernel_size));
    }
    if iterations == 0 {
        return Err(FilterError::InvalidIterations(iterations));
    }
    Ok(())
}

/// Despeckle a single pixel of `img`.
///
/// PRECONDITION: `(x, y)` is at least `half` pixels away from every edge of `img`.
fn despeckle_at<const C: usize>(
    img: &Image<u8, C>,
    x: usize,
    y: usize,
    half: usize,
    gauss: &kernels::Kernel,
    gauss_sum: f32,
) -> [u8; C] {
    let size = 2 * half + 1;
    let count = (size * size - 1) as f64;
    let channels = color_channels::<C>();

    let neighbors = || {
        (0..size)
            .flat_map(move |dy| (0..size).map(move |dx| (dx, dy)))
            .filter(move |&(dx, dy)| dx != half || dy != half)
            .map(move |(dx, dy)| img.pixel(x + dx - half, y + dy - half))
    };

    let mut mean = [0f64; C];
    for neighbor in neighbors() {
        for ch in 0..channels {
            mean[ch] += neighbor[ch] as f64;
        }
    }
    mean.iter_mut().for_each(|m| *m /= count);

    let mut stdev = [0f64; C];
    for neighbor in neighbors() {
        for ch in 0..channels {
            let diff = neighbor[ch] as f64 - mean[ch];
            stdev[ch] += diff * diff;
        }
    }
    stdev.iter_mut().for_each(|s| *s = (*s / count).sqrt());

    let mut pixel = [0u8; C];
    pixel.copy_from_slice(img.pixel(x, y));

    let mut smoothed = None;
    for ch in 0..channels {
        let value = pixel[ch] as f64;
        if value < mean[ch] - stdev[ch] || value > mean[ch] + stdev[ch] {
            let average = smoothed.get_or_insert_with(|| convolve_at(img, x, y, gauss, gauss_sum));
            pixel[ch] = average[ch];
        }
    }

    if C == 4 {
        pixel[C - 1] = u8::MAX;
    }
    pixel
}

/// Run `iterations` despeckle passes over a workspace and write the interior of `rect` to `dst`.
///
/// `workspace` holds the first pass input for the region `work`, which must cover
/// `rect.expand(iterations * half)` clipped to the image. Pass `p` only updates the pixels a
/// later pass still reads, so the tile sees exactly the values a whole-image run would.
/// The passes stop at the first one that changes nothing.
fn despeckle_region<const C: usize>(
    mut workspace: Image<u8, C>,
    work: Rect,
    interior: Rect,
    dst: &mut Image<u8, C>,
    rect: Rect,
    kernel_size: usize,
    iterations: usize,
) -> Result<(), FilterError> {
    let half = kernel_size / 2;
    let (gauss, gauss_sum) = kernels::gaussian_kernel(3)?;

    for pass in 0..iterations {
        let region = rect
            .expand((iterations - 1 - pass).saturating_mul(half))
            .intersect(&interior);

        let mut next = workspace.clone();
        let mut changed = false;
        for (x, y) in region.pixels() {
            let (lx, ly) = (x - work.min_x, y - work.min_y);
            let pixel = despeckle_at(&workspace, lx, ly, half, &gauss, gauss_sum);
            changed |= workspace.pixel(lx, ly) != pixel.as_slice();
            next.put_pixel(lx, ly, pixel);
        }
        workspace = next;
        log::trace!("despeckle pass {}/{} over {}", pass + 1, iterations, region);

        // a pass that keeps every pixel is a fixed point, later passes keep them too
        if !changed {
            log::debug!("despeckle converged after {} passes", pass + 1);
            break;
        }
    }

    for (x, y) in rect.intersect(&interior).pixels() {
        let pixel = workspace.pixel(x - work.min_x, y - work.min_y);
        dst.pixel_mut(x - rect.min_x, y - rect.min_y)
            .copy_from_slice(pixel);
    }

    Ok(())
}

/// Reduce the noise of the region `rect` in grayscale.
///
/// The first channel of `src` is despeckled `iterations` times with a `kernel_size` window.
/// Each pass reads the output of the previous one. Pixels closer than `kernel_size / 2` to
/// the image edge are left untouched in `dst`.
///
/// # Arguments
///
/// * `src` - The source RGBA image.
/// * `dst` - The destination grayscale tile, with the size of `rect`.
/// * `rect` - The region of `src` to process.
/// * `kernel_size` - The neighborhood size, odd and at least 3.
/// * `iterations` - The number of passes, at least 1.
///
/// # Examples
///
/// ```
/// use quadra_image::Image;
/// use quadra_imgproc::denoise::despeckle;
///
/// let mut image = Image::<u8, 4>::from_size_pixel([7, 7].into(), [50, 50, 50, 255]).unwrap();
/// image.put_pixel(3, 3, [250, 250, 250, 255]);
///
/// let mut clean = Image::<u8, 1>::from_size_val(image.size(), 0).unwrap();
/// despeckle(&image, &mut clean, image.bounds(), 3, 1).unwrap();
///
/// assert!(clean.pixel(3, 3)[0] < 250);
/// assert_eq!(clean.pixel(2, 3), &[50]);
/// ```
pub fn despeckle(
    src: &Image<u8, 4>,
    dst: &mut Image<u8, 1>,
    rect: Rect,
    kernel_size: usize,
    iterations: usize,
) -> Result<(), FilterError> {
    check_despeckle_params(kernel_size, iterations)?;
    check_tile(src, dst, rect)?;

    let half = kernel_size / 2;
    let work = rect.expand(iterations.saturating_mul(half)).intersect(&src.bounds());
    let workspace = Image::<u8, 1>::from_fn(work.size(), |x, y| {
        [src.pixel(x + work.min_x, y + work.min_y)[0]]
    })?;

    despeckle_region(
        workspace,
        work,
        src.bounds().shrink(half),
        dst,
        rect,
        kernel_size,
        iterations,
    )
}

/// Reduce the noise of the region `rect` channel by channel.
///
/// Every color channel is tested against its own neighborhood mean and deviation. The output
/// is fully opaque.
///
/// # Arguments
///
/// * `src` - The source RGBA image.
/// * `dst` - The destination RGBA tile, with the size of `rect`.
/// * `rect` - The region of `src` to process.
/// * `kernel_size` - The neighborhood size, odd and at least 3.
/// * `iterations` - The number of passes, at least 1.
pub fn despeckle_rgb(
    src: &Image<u8, 4>,
    dst: &mut Image<u8, 4>,
    rect: Rect,
    kernel_size: usize,
    iterations: usize,
) -> Result<(), FilterError> {
    check_despeckle_params(kernel_size, iterations)?;
    check_tile(src, dst, rect)?;

    let half = kernel_size / 2;
    let work = rect.expand(iterations.saturating_mul(half)).intersect(&src.bounds());
    let mut workspace = Image::<u8, 4>::from_size_val(work.size(), 0)?;
    crop_image(src, &mut workspace, work.min_x, work.min_y)?;

    despeckle_region(
        workspace,
        work,
        src.bounds().shrink(half),
        dst,
        rect,
        kernel_size,
        iterations,
    )
}

#[cfg(test)]
mod tests {
    use quadra_image::{Image, Rect};
    use rand::{rngs::StdRng, Rng, SeedableRng};

    use crate::error::FilterError;

    fn speckled(value: u8, speck: u8) -> Result<Image<u8, 4>, FilterError> {
        let mut image = Image::<u8, 4>::from_size_pixel([9, 9].into(), [value, value, value, 255])?;
        image.put_pixel(4, 4, [speck, speck, speck, 255]);
        Ok(image)
    }

    #[test]
    fn test_despeckle_flat_unchanged() -> Result<(), FilterError> {
        let image = Image::<u8, 4>::from_size_pixel([12, 12].into(), [100, 100, 100, 255])?;
        let mut clean = Image::<u8, 1>::from_size_val(image.size(), 0)?;
        super::despeckle(&image, &mut clean, image.bounds(), 5, 2)?;

        for (x, y) in image.bounds().pixels() {
            let expected = if image.bounds().shrink(2).contains(x, y) {
                100
            } else {
                0
            };
            assert_eq!(clean.pixel(x, y), &[expected]);
        }
        Ok(())
    }

    #[test]
    fn test_despeckle_keeps_smooth_ramp() -> Result<(), FilterError> {
        // every center equals its neighborhood mean
        let image = Image::<u8, 4>::from_fn([10, 6].into(), |x, _| {
            let v = (10 * x) as u8;
            [v, v, v, 255]
        })?;
        let mut clean = Image::<u8, 1>::from_size_val(image.size(), 0)?;
        super::despeckle(&image, &mut clean, image.bounds(), 3, 3)?;

        for (x, y) in image.bounds().shrink(1).pixels() {
            assert_eq!(clean.pixel(x, y), &[(10 * x) as u8]);
        }
        Ok(())
    }

    #[test]
    fn test_despeckle_replaces_speck() -> Result<(), FilterError> {
        let image = speckled(50, 250)?;

        let mut once = Image::<u8, 1>::from_size_val(image.size(), 0)?;
        super::despeckle(&image, &mut once, image.bounds(), 3, 1)?;
        // 50 + 200 * w_center / sum(w)
        assert_eq!(once.pixel(4, 4), &[110]);
        assert_eq!(once.pixel(5, 4), &[50]);
        assert_eq!(once.pixel(3, 3), &[50]);

        let mut twice = Image::<u8, 1>::from_size_val(image.size(), 0)?;
        super::despeckle(&image, &mut twice, image.bounds(), 3, 2)?;
        assert_eq!(twice.pixel(4, 4), &[68]);
        assert_eq!(twice.pixel(5, 5), &[50]);

        Ok(())
    }

    #[test]
    fn test_despeckle_stops_at_fixed_point() -> Result<(), FilterError> {
        let image = speckled(50, 250)?;

        let mut few = Image::<u8, 1>::from_size_val(image.size(), 0)?;
        super::despeckle(&image, &mut few, image.bounds(), 3, 10)?;
        assert_eq!(few.pixel(4, 4), &[50]);

        let rect = Rect::new(0, 0, 5, 5);
        let mut many = Image::<u8, 1>::from_size_val(rect.size(), 0)?;
        super::despeckle(&image, &mut many, rect, 3, usize::MAX)?;
        for (x, y) in Rect::new(1, 1, 5, 5).pixels() {
            assert_eq!(many.pixel(x, y), few.pixel(x, y));
        }
        Ok(())
    }

    #[test]
    fn test_despeckle_tiles_match_whole_image() -> Result<(), FilterError> {
        let mut rng = StdRng::seed_from_u64(7);
        let image = Image::<u8, 4>::from_fn([24, 20].into(), |_, _| {
            let v = rng.random::<u8>();
            [v, v, v, 255]
        })?;

        let mut whole = Image::<u8, 1>::from_size_val(image.size(), 0)?;
        super::despeckle(&image, &mut whole, image.bounds(), 5, 3)?;

        for rect in [
            Rect::new(0, 0, 12, 10),
            Rect::new(12, 0, 24, 10),
            Rect::new(0, 10, 12, 20),
            Rect::new(12, 10, 24, 20),
        ] {
            let mut tile = Image::<u8, 1>::from_size_val(rect.size(), 0)?;
            super::despeckle(&image, &mut tile, rect, 5, 3)?;
            for (x, y) in rect.pixels() {
                assert_eq!(
                    tile.pixel(x - rect.min_x, y - rect.min_y),
                    whole.pixel(x, y),
                    "mismatch at ({x}, {y}) in tile {rect}"
                );
            }
        }
        Ok(())
    }

    #[test]
    fn test_despeckle_rgb_checks_each_channel() -> Result<(), FilterError> {
        let mut image = Image::<u8, 4>::from_size_pixel([5, 5].into(), [200, 50, 10, 255])?;
        image.put_pixel(2, 2, [200, 50, 100, 255]);

        let mut clean = Image::<u8, 4>::from_size_val(image.size(), 0)?;
        super::despeckle_rgb(&image, &mut clean, image.bounds(), 3, 1)?;

        // only the blue channel is an outlier
        assert_eq!(clean.pixel(2, 2), &[200, 50, 37, 255]);
        assert_eq!(clean.pixel(1, 1), &[200, 50, 10, 255]);
        Ok(())
    }

    #[test]
    fn test_despeckle_rejects_bad_params() -> Result<(), FilterError> {
        let image = speckled(0, 255)?;
        let mut clean = Image::<u8, 1>::from_size_val(image.size(), 0)?;
        assert_eq!(
            super::despeckle(&image, &mut clean, image.bounds(), 4, 1),
            Err(FilterError::InvalidKernelSize(4))
        );
        assert_eq!(
            super::despeckle(&image, &mut clean, image.bounds(), 3, 0),
            Err(FilterError::InvalidIterations(0))
        );
        Ok(())
    }
}
