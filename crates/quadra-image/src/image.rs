use crate::error::ImageError;
use crate::rect::Rect;

/// Image size in pixels
///
/// A struct to represent the size of an image in pixels.
///
/// # Examples
///
/// ```
/// use quadra_image::ImageSize;
///
/// let image_size = ImageSize {
///   width: 10,
///   height: 20,
/// };
///
/// assert_eq!(image_size.width, 10);
/// assert_eq!(image_size.height, 20);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct ImageSize {
    /// Width of the image in pixels
    pub width: usize,
    /// Height of the image in pixels
    pub height: usize,
}

impl ImageSize {
    /// Number of pixels covered by the size.
    pub fn area(&self) -> usize {
        self.width * self.height
    }
}

impl std::fmt::Display for ImageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "ImageSize {{ width: {}, height: {} }}",
            self.width, self.height
        )
    }
}

impl From<[usize; 2]> for ImageSize {
    fn from(size: [usize; 2]) -> Self {
        ImageSize {
            width: size[0],
            height: size[1],
        }
    }
}

impl From<ImageSize> for [u32; 2] {
    fn from(size: ImageSize) -> Self {
        [size.width as u32, size.height as u32]
    }
}

/// Represents an image with pixel data.
///
/// The pixels are stored row-major with `CHANNELS` interleaved values per pixel,
/// so the value of channel `c` at `(x, y)` lives at `(y * width + x) * CHANNELS + c`.
#[derive(Clone, Debug, PartialEq)]
pub struct Image<T, const CHANNELS: usize> {
    size: ImageSize,
    data: Vec<T>,
}

impl<T, const CHANNELS: usize> Image<T, CHANNELS> {
    /// Create a new image from pixel data.
    ///
    /// # Arguments
    ///
    /// * `size` - The size of the image in pixels.
    /// * `data` - The pixel data of the image.
    ///
    /// # Returns
    ///
    /// A new image with the given pixel data.
    ///
    /// # Errors
    ///
    /// If the length of the pixel data does not match the image size, an error is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use quadra_image::{Image, ImageSize};
    ///
    /// let image = Image::<u8, 3>::new(
    ///    ImageSize {
    ///       width: 10,
    ///      height: 20,
    ///  },
    /// vec![0u8; 10 * 20 * 3],
    /// ).unwrap();
    ///
    /// assert_eq!(image.size().width, 10);
    /// assert_eq!(image.size().height, 20);
    /// assert_eq!(image.num_channels(), 3);
    /// ```
    pub fn new(size: ImageSize, data: Vec<T>) -> Result<Self, ImageError> {
        // check if the data length matches the image size
        if data.len() != size.area() * CHANNELS {
            return Err(ImageError::InvalidChannelShape(
                data.len(),
                size.area() * CHANNELS,
            ));
        }

        Ok(Self { size, data })
    }

    /// Create a new image with the given size and default pixel data.
    ///
    /// # Arguments
    ///
    /// * `size` - The size of the image in pixels.
    /// * `val` - The default value of the pixel data.
    ///
    /// # Examples
    ///
    /// ```
    /// use quadra_image::{Image, ImageSize};
    ///
    /// let image = Image::<u8, 3>::from_size_val(
    ///   ImageSize {
    ///     width: 10,
    ///    height: 20,
    /// }, 0u8).unwrap();
    ///
    /// assert_eq!(image.size().width, 10);
    /// assert_eq!(image.size().height, 20);
    /// assert_eq!(image.num_channels(), 3);
    /// ```
    pub fn from_size_val(size: ImageSize, val: T) -> Result<Self, ImageError>
    where
        T: Clone,
    {
        let data = vec![val; size.area() * CHANNELS];
        Image::new(size, data)
    }

    /// Create a new image whose pixels are all equal to `pixel`.
    ///
    /// # Examples
    ///
    /// ```
    /// use quadra_image::{Image, ImageSize};
    ///
    /// let image = Image::<u8, 4>::from_size_pixel([2, 2].into(), [10, 20, 30, 255]).unwrap();
    /// assert_eq!(image.pixel(1, 1), &[10, 20, 30, 255]);
    /// ```
    pub fn from_size_pixel(size: ImageSize, pixel: [T; CHANNELS]) -> Result<Self, ImageError>
    where
        T: Copy,
    {
        let data = pixel
            .iter()
            .copied()
            .cycle()
            .take(size.area() * CHANNELS)
            .collect();
        Image::new(size, data)
    }

    /// Create a new image by evaluating `f(x, y)` for every pixel.
    pub fn from_fn(
        size: ImageSize,
        mut f: impl FnMut(usize, usize) -> [T; CHANNELS],
    ) -> Result<Self, ImageError> {
        let mut data = Vec::with_capacity(size.area() * CHANNELS);
        for y in 0..size.height {
            for x in 0..size.width {
                data.extend(f(x, y));
            }
        }
        Image::new(size, data)
    }

    /// Get the size of the image in pixels.
    pub fn size(&self) -> ImageSize {
        self.size
    }

    /// Get the bounds of the image as a rectangle anchored at the origin.
    pub fn bounds(&self) -> Rect {
        Rect::from_size(self.size)
    }

    /// Get the number of columns of the image.
    pub fn cols(&self) -> usize {
        self.width()
    }

    /// Get the number of rows of the image.
    pub fn rows(&self) -> usize {
        self.height()
    }

    /// Get the width of the image in pixels.
    pub fn width(&self) -> usize {
        self.size.width
    }

    /// Get the height of the image in pixels.
    pub fn height(&self) -> usize {
        self.size.height
    }

    /// Get the number of channels in the image.
    pub fn num_channels(&self) -> usize {
        CHANNELS
    }

    /// Get the raw pixel data.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Get the raw pixel data mutably.
    pub fn as_slice_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Consume the image and return its raw pixel data.
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    #[inline]
    fn offset(&self, x: usize, y: usize) -> usize {
        (y * self.size.width + x) * CHANNELS
    }

    /// Get the channels of the pixel at `(x, y)`.
    ///
    /// PRECONDITION: `(x, y)` must lie inside the image, otherwise this panics.
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> &[T] {
        debug_assert!(
            x < self.size.width && y < self.size.height,
            "pixel ({x}, {y}) out of bounds for {}",
            self.size
        );
        let offset = self.offset(x, y);
        &self.data[offset..offset + CHANNELS]
    }

    /// Get the channels of the pixel at `(x, y)` mutably.
    ///
    /// PRECONDITION: `(x, y)` must lie inside the image, otherwise this panics.
    #[inline]
    pub fn pixel_mut(&mut self, x: usize, y: usize) -> &mut [T] {
        debug_assert!(
            x < self.size.width && y < self.size.height,
            "pixel ({x}, {y}) out of bounds for {}",
            self.size
        );
        let offset = self.offset(x, y);
        &mut self.data[offset..offset + CHANNELS]
    }

    /// Overwrite the pixel at `(x, y)`.
    #[inline]
    pub fn put_pixel(&mut self, x: usize, y: usize, pixel: [T; CHANNELS])
    where
        T: Copy,
    {
        self.pixel_mut(x, y).copy_from_slice(&pixel);
    }

    /// Get the pixel data of the image.
    ///
    /// # Arguments
    ///
    /// * `x` - The x-coordinate of the pixel.
    /// * `y` - The y-coordinate of the pixel.
    /// * `ch` - The channel index of the pixel.
    ///
    /// # Returns
    ///
    /// The pixel value at the given coordinates.
    pub fn get_pixel(&self, x: usize, y: usize, ch: usize) -> Result<T, ImageError>
    where
        T: Copy,
    {
        if x >= self.width() || y >= self.height() {
            return Err(ImageError::PixelIndexOutOfBounds(
                x,
                y,
                self.width(),
                self.height(),
            ));
        }

        if ch >= CHANNELS {
            return Err(ImageError::ChannelIndexOutOfBounds(ch, CHANNELS));
        }

        Ok(self.data[self.offset(x, y) + ch])
    }

    /// Get a channel of the image.
    ///
    /// # Errors
    ///
    /// If the channel index is out of bounds, an error is returned.
    pub fn channel(&self, channel: usize) -> Result<Image<T, 1>, ImageError>
    where
        T: Copy,
    {
        if channel >= CHANNELS {
            return Err(ImageError::ChannelIndexOutOfBounds(channel, CHANNELS));
        }

        let channel_data = self
            .data
            .chunks_exact(CHANNELS)
            .map(|pixel| pixel[channel])
            .collect();

        Image::new(self.size, channel_data)
    }

    /// Cast the pixel data of the image to a different type.
    ///
    /// # Errors
    ///
    /// If a value cannot be represented in the target type, an error is returned.
    pub fn cast<U>(&self) -> Result<Image<U, CHANNELS>, ImageError>
    where
        U: num_traits::NumCast,
        T: num_traits::NumCast + Copy,
    {
        let casted_data = self
            .data
            .iter()
            .map(|&x| {
                U::from(x).ok_or_else(|| ImageError::CastError(std::any::type_name::<U>().to_string()))
            })
            .collect::<Result<Vec<U>, ImageError>>()?;

        Image::new(self.size, casted_data)
    }
}

#[cfg(test)]
mod tests {
    use crate::image::{Image, ImageError, ImageSize};

    #[test]
    fn image_size() {
        let image_size = ImageSize {
            width: 10,
            height: 20,
        };
        assert_eq!(image_size.width, 10);
        assert_eq!(image_size.height, 20);
        assert_eq!(image_size.area(), 200);
    }

    #[test]
    fn image_smoke() -> Result<(), ImageError> {
        let image = Image::<u8, 4>::new(
            ImageSize {
                width: 10,
                height: 20,
            },
            vec![0u8; 10 * 20 * 4],
        )?;
        assert_eq!(image.size().width, 10);
        assert_eq!(image.size().height, 20);
        assert_eq!(image.num_channels(), 4);

        Ok(())
    }

    #[test]
    fn image_wrong_data_length() {
        let res = Image::<u8, 1>::new([2, 2].into(), vec![0u8; 3]);
        assert_eq!(res, Err(ImageError::InvalidChannelShape(3, 4)));
    }

    #[test]
    fn image_pixel_access() -> Result<(), ImageError> {
        #[rustfmt::skip]
        let mut image = Image::<u8, 2>::new(
            ImageSize {
                width: 2,
                height: 2,
            },
            vec![
                0, 1, 2, 3,
                4, 5, 6, 7,
            ],
        )?;
        assert_eq!(image.pixel(1, 0), &[2, 3]);
        assert_eq!(image.pixel(0, 1), &[4, 5]);

        image.put_pixel(1, 1, [9, 9]);
        assert_eq!(image.get_pixel(1, 1, 1)?, 9);

        Ok(())
    }

    #[test]
    fn image_get_pixel_out_of_bounds() -> Result<(), ImageError> {
        let image = Image::<u8, 1>::from_size_val([3, 2].into(), 0)?;
        assert_eq!(
            image.get_pixel(3, 0, 0),
            Err(ImageError::PixelIndexOutOfBounds(3, 0, 3, 2))
        );
        assert_eq!(
            image.get_pixel(0, 0, 1),
            Err(ImageError::ChannelIndexOutOfBounds(1, 1))
        );
        Ok(())
    }

    #[test]
    fn image_from_fn() -> Result<(), ImageError> {
        let image = Image::<u8, 1>::from_fn([3, 2].into(), |x, y| [(x + 10 * y) as u8])?;
        assert_eq!(image.as_slice(), &[0, 1, 2, 10, 11, 12]);
        Ok(())
    }

    #[test]
    fn image_channel() -> Result<(), ImageError> {
        let image = Image::<u8, 3>::new(
            ImageSize {
                height: 2,
                width: 1,
            },
            vec![0, 1, 2, 3, 4, 5],
        )?;

        let channel = image.channel(2)?;
        assert_eq!(channel.as_slice(), &[2, 5]);
        assert!(image.channel(3).is_err());

        Ok(())
    }

    #[test]
    fn image_cast() -> Result<(), ImageError> {
        let image_u8 = Image::<u8, 1>::new([2, 1].into(), vec![0, 255])?;
        let image_f32: Image<f32, 1> = image_u8.cast()?;
        assert_eq!(image_f32.as_slice(), &[0.0, 255.0]);

        let back: Result<Image<u8, 1>, _> = Image::<f32, 1>::new([1, 1].into(), vec![-1.0])?.cast();
        assert!(back.is_err());
        Ok(())
    }
}
