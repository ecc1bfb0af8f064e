use std::path::Path;

use quadra_image::{Image, ImageSize};

use crate::error::IoError;

/// Reads an image from the given file path as RGBA8.
///
/// The method tries to read from any image format supported by the image crate; the format is
/// guessed from the file content, not from its extension. Images without alpha come back fully
/// opaque, 16-bit and float images are converted to 8 bits.
///
/// # Arguments
///
/// * `file_path` - The path to a valid image file.
///
/// # Returns
///
/// An RGBA image with four channels (rgba8).
pub fn read_image_rgba8(file_path: impl AsRef<Path>) -> Result<Image<u8, 4>, IoError> {
    let file_path = file_path.as_ref();

    // verify the file exists
    if !file_path.exists() {
        return Err(IoError::FileDoesNotExist(file_path.to_path_buf()));
    }

    let bytes = std::fs::read(file_path)?;

    let img = image::ImageReader::new(std::io::Cursor::new(&bytes))
        .with_guessed_format()?
        .decode()?;

    log::debug!(
        "decoded {} as {:?} ({}x{})",
        file_path.display(),
        img.color(),
        img.width(),
        img.height()
    );

    let size = ImageSize {
        width: img.width() as usize,
        height: img.height() as usize,
    };

    Ok(Image::new(size, img.into_rgba8().into_raw())?)
}
