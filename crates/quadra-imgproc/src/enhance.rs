use quadra_image::{Image, Rect};

use crate::color::gray_from_rgb_u8;
use crate::crop::check_tile;
use crate::error::FilterError;

/// Grayscale negative of the region `rect`:
///
/// dst(x,y) = 255 - gray(src(x,y))
///
/// # Arguments
///
/// * `src` - The input RGBA image.
/// * `dst` - The output grayscale tile, with the size of `rect`.
/// * `rect` - The region of `src` to process.
///
/// # Examples
///
/// ```
/// use quadra_image::Image;
/// use quadra_imgproc::enhance::negative_gray;
///
/// let image = Image::<u8, 4>::from_size_pixel([4, 4].into(), [128, 128, 128, 255]).unwrap();
/// let mut negative = Image::<u8, 1>::from_size_val(image.size(), 0).unwrap();
///
/// negative_gray(&image, &mut negative, image.bounds()).unwrap();
/// assert!(negative.as_slice().iter().all(|&v| v == 127));
/// ```
pub fn negative_gray(
    src: &Image<u8, 4>,
    dst: &mut Image<u8, 1>,
    rect: Rect,
) -> Result<(), FilterError> {
    check_tile(src, dst, rect)?;

    for (x, y) in rect.pixels() {
        let pixel = src.pixel(x, y);
        let gray = gray_from_rgb_u8(pixel[0], pixel[1], pixel[2]);
        dst.put_pixel(x - rect.min_x, y - rect.min_y, [u8::MAX - gray]);
    }

    Ok(())
}

/// Color negative of the region `rect`, channel by channel:
///
/// dst(x,y,c) = 255 - src(x,y,c)
///
/// The alpha channel of the output is always 255.
///
/// # Arguments
///
/// * `src` - The input RGBA image.
/// * `dst` - The output RGBA tile, with the size of `rect`.
/// * `rect` - The region of `src` to process.
pub fn negative_rgb(
    src: &Image<u8, 4>,
    dst: &mut Image<u8, 4>,
    rect: Rect,
) -> Result<(), FilterError> {
    check_tile(src, dst, rect)?;

    for (x, y) in rect.pixels() {
        let pixel = src.pixel(x, y);
        dst.put_pixel(
            x - rect.min_x,
            y - rect.min_y,
            [
                u8::MAX - pixel[0],
                u8::MAX - pixel[1],
                u8::MAX - pixel[2],
                u8::MAX,
            ],
        );
    }

    Ok(())
}
