use quadra_image::Image;

use super::kernels::Kernel;

/// Sums this close below an integer are treated as that integer before truncation.
const ROUNDING_SLACK: f64 = 1e-4;

/// Number of channels that carry color, the alpha channel of RGBA images excluded.
#[inline]
pub const fn color_channels<const C: usize>() -> usize {
    if C == 4 {
        3
    } else {
        C
    }
}

/// Truncate a normalized channel value into the u8 range.
#[inline]
pub(crate) fn saturate_u8(value: f64) -> u8 {
    (value + ROUNDING_SLACK).clamp(0.0, 255.0) as u8
}

/// Convolve the neighborhood of a single pixel with a kernel.
///
/// Every color channel accumulates `weight * value` over the `n x n` neighborhood centered at
/// `(x, y)`, is divided by `divisor` and truncated into `[0, 255]`. The alpha channel of an RGBA
/// image is not convolved: the result is always fully opaque.
///
/// # Arguments
///
/// * `src` - The source image.
/// * `x` - The column of the output pixel.
/// * `y` - The row of the output pixel.
/// * `kernel` - The convolution kernel.
/// * `divisor` - The normalization divisor, usually the kernel sum or a contrast power.
///
/// PRECONDITION: `(x, y)` is at least `kernel.half_size()` pixels away from every image edge.
///
/// # Examples
///
/// ```
/// use quadra_image::Image;
/// use quadra_imgproc::filter::{convolve_at, kernels::Kernel};
///
/// let image = Image::<u8, 1>::from_fn([3, 3].into(), |x, y| [(10 * (x + 3 * y)) as u8]).unwrap();
/// let pixel = convolve_at(&image, 1, 1, &Kernel::box3(), 9.0);
/// assert_eq!(pixel, [40]);
/// ```
pub fn convolve_at<const C: usize>(
    src: &Image<u8, C>,
    x: usize,
    y: usize,
    kernel: &Kernel,
    divisor: f32,
) -> [u8; C] {
    let half = kernel.half_size();
    debug_assert!(
        x >= half && y >= half && x + half < src.width() && y + half < src.height(),
        "convolution at ({x}, {y}) with a {0}x{0} kernel leaves the {1}x{2} image",
        kernel.size(),
        src.width(),
        src.height(),
    );

    let channels = color_channels::<C>();
    let mut acc = [0f64; C];

    for dy in 0..kernel.size() {
        let row = y + dy - half;
        for dx in 0..kernel.size() {
            let weight = kernel.at(dx, dy) as f64;
            let neighbor = src.pixel(x + dx - half, row);
            for ch in 0..channels {
                acc[ch] += weight * neighbor[ch] as f64;
            }
        }
    }

    let mut pixel = [u8::MAX; C];
    let divisor = divisor as f64;
    for ch in 0..channels {
        pixel[ch] = saturate_u8(acc[ch] / divisor);
    }
    pixel
}
