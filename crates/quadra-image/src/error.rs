/// An error type for the image module.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ImageError {
    /// Error when channel and shape are not valid.
    #[error("Data length ({0}) does not match the image size ({1})")]
    InvalidChannelShape(usize, usize),

    /// Error when the image sizes do not match.
    #[error("Image size mismatch: {0}x{1} vs {2}x{3}")]
    InvalidImageSize(usize, usize, usize, usize),

    /// Error when the pixel coordinates are out of bounds.
    #[error("Pixel ({0}, {1}) is out of bounds for an image of size {2}x{3}")]
    PixelIndexOutOfBounds(usize, usize, usize, usize),

    /// Error when the channel index is out of bounds.
    #[error("Channel index {0} is out of bounds for an image with {1} channels")]
    ChannelIndexOutOfBounds(usize, usize),

    /// Error when a region does not fit inside the image.
    #[error("Region {0} does not fit inside an image of size {1}x{2}")]
    RegionOutOfBounds(crate::Rect, usize, usize),

    /// Error when casting the pixel data fails.
    #[error("Failed to cast the pixel data to {0}")]
    CastError(String),
}
