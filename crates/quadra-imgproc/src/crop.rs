use quadra_image::{Image, ImageError, Rect};
use rayon::{
    iter::{IndexedParallelIterator, ParallelIterator},
    slice::ParallelSliceMut,
};

/// Check that `rect` lies inside `src` and that `dst` has exactly the size of `rect`.
pub(crate) fn check_tile<T1, const C1: usize, T2, const C2: usize>(
    src: &Image<T1, C1>,
    dst: &Image<T2, C2>,
    rect: Rect,
) -> Result<(), ImageError> {
    if !src.bounds().contains_rect(&rect) {
        return Err(ImageError::RegionOutOfBounds(
            rect,
            src.width(),
            src.height(),
        ));
    }

    if dst.size() != rect.size() {
        return Err(ImageError::InvalidImageSize(
            rect.width(),
            rect.height(),
            dst.width(),
            dst.height(),
        ));
    }

    Ok(())
}

/// Crop an image to a specified region.
///
/// # Arguments
///
/// * `src` - The source image to crop.
/// * `dst` - The destination image to store the cropped image.
/// * `x` - The x-coordinate of the top-left corner of the region to crop.
/// * `y` - The y-coordinate of the top-left corner of the region to crop.
///
/// # Examples
///
/// ```rust
/// use quadra_image::{Image, ImageSize};
/// use quadra_imgproc::crop::crop_image;
///
/// let image = Image::<_, 1>::new(ImageSize { width: 4, height: 4 }, vec![
///     0u8, 1, 2, 3,
///     4u8, 5, 6, 7,
///     8u8, 9, 10, 11,
///     12u8, 13, 14, 15
/// ]).unwrap();
///
/// let mut cropped = Image::<_, 1>::from_size_val(ImageSize { width: 2, height: 2 }, 0u8).unwrap();
///
/// crop_image(&image, &mut cropped, 1, 1).unwrap();
///
/// assert_eq!(cropped.as_slice(), &[5u8, 6, 9, 10]);
/// ```
pub fn crop_image<T, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    x: usize,
    y: usize,
) -> Result<(), ImageError>
where
    T: Copy + Send + Sync,
{
    let region = Rect::new(x, y, x + dst.width(), y + dst.height());
    check_tile(src, dst, region)?;

    let dst_cols = dst.cols();
    if dst_cols == 0 {
        return Ok(());
    }

    dst.as_slice_mut()
        .par_chunks_exact_mut(dst_cols * C)
        .enumerate()
        .for_each(|(i, dst_row)| {
            // get the slice at the top left corner
            let offset = (y + i) * src.cols() * C + x * C;
            let src_slice = &src.as_slice()[offset..offset + dst_cols * C];

            // copy the slice to the destination
            dst_row.copy_from_slice(src_slice);
        });

    Ok(())
}

/// Copy `src` into `dst` with its top-left corner at `(x, y)`.
///
/// The copy overwrites the destination pixels, alpha included; there is no blending.
///
/// # Examples
///
/// ```rust
/// use quadra_image::Image;
/// use quadra_imgproc::crop::paste_image;
///
/// let tile = Image::<u8, 1>::from_size_val([2, 1].into(), 7).unwrap();
/// let mut canvas = Image::<u8, 1>::from_size_val([3, 2].into(), 0).unwrap();
///
/// paste_image(&tile, &mut canvas, 1, 1).unwrap();
///
/// assert_eq!(canvas.as_slice(), &[0, 0, 0, 0, 7, 7]);
/// ```
pub fn paste_image<T, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    x: usize,
    y: usize,
) -> Result<(), ImageError>
where
    T: Copy + Send + Sync,
{
    let region = Rect::new(x, y, x + src.width(), y + src.height());
    check_tile(dst, src, region)?;

    let src_cols = src.cols();
    if src_cols == 0 {
        return Ok(());
    }

    let dst_cols = dst.cols();
    dst.as_slice_mut()
        .par_chunks_exact_mut(dst_cols * C)
        .skip(y)
        .take(src.rows())
        .enumerate()
        .for_each(|(i, dst_row)| {
            let src_row = &src.as_slice()[i * src_cols * C..(i + 1) * src_cols * C];
            dst_row[x * C..(x + src_cols) * C].copy_from_slice(src_row);
        });

    Ok(())
}
