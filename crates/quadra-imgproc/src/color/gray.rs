use quadra_image::{Image, ImageError, Rect};

use crate::crop::check_tile;
use crate::error::FilterError;

/// Fixed point weights of the RGB to gray model, scaled by 2^16.
const RW: u32 = 19595;
const GW: u32 = 38470;
const BW: u32 = 7471;

/// Convert one RGB8 pixel to gray using the formula:
///
/// Y = (19595 * R + 38470 * G + 7471 * B + 2^15) >> 24
///
/// where the channels are first expanded to 16 bits (`v * 257`). Neutral pixels keep their
/// value: `gray_from_rgb_u8(v, v, v) == v`.
///
/// # Examples
///
/// ```
/// use quadra_imgproc::color::gray_from_rgb_u8;
///
/// assert_eq!(gray_from_rgb_u8(128, 128, 128), 128);
/// assert_eq!(gray_from_rgb_u8(255, 0, 0), 76);
/// ```
#[inline]
pub fn gray_from_rgb_u8(r: u8, g: u8, b: u8) -> u8 {
    let r = r as u32 * 257;
    let g = g as u32 * 257;
    let b = b as u32 * 257;
    ((RW * r + GW * g + BW * b + (1 << 15)) >> 24) as u8
}

/// Convert the region `rect` of an RGBA8 image to grayscale.
///
/// # Arguments
///
/// * `src` - The input RGBA image.
/// * `dst` - The output grayscale tile, with the size of `rect`.
/// * `rect` - The region of `src` to convert.
///
/// Precondition: `rect` must lie inside `src`.
///
/// # Example
///
/// ```
/// use quadra_image::{Image, Rect};
/// use quadra_imgproc::color::grayscale;
///
/// let image = Image::<u8, 4>::from_size_pixel([4, 5].into(), [50, 50, 50, 255]).unwrap();
/// let rect = Rect::new(2, 0, 4, 5);
///
/// let mut gray = Image::<u8, 1>::from_size_val(rect.size(), 0).unwrap();
///
/// grayscale(&image, &mut gray, rect).unwrap();
/// assert_eq!(gray.num_channels(), 1);
/// assert!(gray.as_slice().iter().all(|&v| v == 50));
/// ```
pub fn grayscale(src: &Image<u8, 4>, dst: &mut Image<u8, 1>, rect: Rect) -> Result<(), FilterError> {
    check_tile(src, dst, rect)?;

    for (x, y) in rect.pixels() {
        let pixel = src.pixel(x, y);
        dst.put_pixel(
            x - rect.min_x,
            y - rect.min_y,
            [gray_from_rgb_u8(pixel[0], pixel[1], pixel[2])],
        );
    }

    Ok(())
}

/// Convert a grayscale image to an opaque RGBA image by replicating the gray value.
///
/// # Arguments
///
/// * `src` - The input grayscale image.
/// * `dst` - The output RGBA image.
///
/// Precondition: the input and output images must have the same size.
pub fn rgba_from_gray(src: &Image<u8, 1>, dst: &mut Image<u8, 4>) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    dst.as_slice_mut()
        .chunks_exact_mut(4)
        .zip(src.as_slice())
        .for_each(|(dst_pixel, &v)| {
            dst_pixel.copy_from_slice(&[v, v, v, u8::MAX]);
        });

    Ok(())
}
