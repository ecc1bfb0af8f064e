use std::{fs::File, io::BufWriter, path::Path};

use image::{codecs::png::PngEncoder, ExtendedColorType, ImageEncoder};
use quadra_image::Image;

use crate::error::IoError;

/// Write an RGBA image to a PNG file.
///
/// # Arguments
///
/// * `file_path` - The path of the PNG file, with a `png` extension.
/// * `image` - The image to encode.
pub fn write_image_png_rgba8(
    file_path: impl AsRef<Path>,
    image: &Image<u8, 4>,
) -> Result<(), IoError> {
    encode_png(file_path.as_ref(), image, ExtendedColorType::Rgba8)
}

/// Write a grayscale image to a PNG file.
///
/// # Arguments
///
/// * `file_path` - The path of the PNG file, with a `png` extension.
/// * `image` - The image to encode.
pub fn write_image_png_gray8(
    file_path: impl AsRef<Path>,
    image: &Image<u8, 1>,
) -> Result<(), IoError> {
    encode_png(file_path.as_ref(), image, ExtendedColorType::L8)
}

fn encode_png<const C: usize>(
    file_path: &Path,
    image: &Image<u8, C>,
    color: ExtendedColorType,
) -> Result<(), IoError> {
    if !file_path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("png"))
    {
        return Err(IoError::InvalidFileExtension(file_path.to_path_buf()));
    }

    let writer = BufWriter::new(File::create(file_path)?);
    PngEncoder::new(writer).write_image(
        image.as_slice(),
        image.width() as u32,
        image.height() as u32,
        color,
    )?;

    log::debug!(
        "encoded {} as {:?} ({}x{})",
        file_path.display(),
        color,
        image.width(),
        image.height()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use quadra_image::Image;

    use crate::error::IoError;
    use crate::functional::read_image_rgba8;

    #[test]
    fn write_png_rgba8_reads_back() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;
        let file_path = tmp_dir.path().join("tiles.png");

        let image = Image::<u8, 4>::from_fn([5, 3].into(), |x, y| {
            [(x * 40) as u8, (y * 80) as u8, 200, (255 - x) as u8]
        })?;
        super::write_image_png_rgba8(&file_path, &image)?;

        let image_back = read_image_rgba8(&file_path)?;
        assert_eq!(image_back, image);
        Ok(())
    }

    #[test]
    fn write_png_gray8_reads_back_opaque() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;
        let file_path = tmp_dir.path().join("edges.PNG");

        let image = Image::<u8, 1>::from_fn([4, 2].into(), |x, y| [(x * 60 + y) as u8])?;
        super::write_image_png_gray8(&file_path, &image)?;

        let image_back = read_image_rgba8(&file_path)?;
        assert_eq!(image_back.size(), image.size());
        for (x, y) in image.bounds().pixels() {
            let v = image.pixel(x, y)[0];
            assert_eq!(image_back.pixel(x, y), &[v, v, v, 255]);
        }
        Ok(())
    }

    #[test]
    fn write_png_wrong_extension() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;
        let file_path = tmp_dir.path().join("edges.jpg");

        let image = Image::<u8, 1>::from_size_val([2, 2].into(), 9)?;
        let res = super::write_image_png_gray8(&file_path, &image);

        assert!(matches!(res, Err(IoError::InvalidFileExtension(_))));
        assert!(!file_path.exists());
        Ok(())
    }
}
