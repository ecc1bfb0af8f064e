use crate::image::ImageSize;

/// An axis aligned rectangle of pixels.
///
/// The rectangle is half-open: it covers `min_x <= x < max_x` and `min_y <= y < max_y`.
///
/// # Examples
///
/// ```
/// use quadra_image::Rect;
///
/// let rect = Rect::new(2, 3, 6, 5);
/// assert_eq!(rect.width(), 4);
/// assert_eq!(rect.height(), 2);
/// assert!(rect.contains(2, 3));
/// assert!(!rect.contains(6, 3));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    /// Left edge, inclusive.
    pub min_x: usize,
    /// Top edge, inclusive.
    pub min_y: usize,
    /// Right edge, exclusive.
    pub max_x: usize,
    /// Bottom edge, exclusive.
    pub max_y: usize,
}

impl Rect {
    /// Create a new rectangle from its corners.
    ///
    /// Inverted corners produce an empty rectangle.
    pub fn new(min_x: usize, min_y: usize, max_x: usize, max_y: usize) -> Self {
        Self {
            min_x,
            min_y,
            max_x: max_x.max(min_x),
            max_y: max_y.max(min_y),
        }
    }

    /// The rectangle covering a whole image of the given size.
    pub fn from_size(size: ImageSize) -> Self {
        Self::new(0, 0, size.width, size.height)
    }

    /// Width of the rectangle in pixels.
    pub fn width(&self) -> usize {
        self.max_x - self.min_x
    }

    /// Height of the rectangle in pixels.
    pub fn height(&self) -> usize {
        self.max_y - self.min_y
    }

    /// Size of the rectangle in pixels.
    pub fn size(&self) -> ImageSize {
        ImageSize {
            width: self.width(),
            height: self.height(),
        }
    }

    /// Whether the rectangle covers no pixel.
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Whether the pixel `(x, y)` is inside the rectangle.
    pub fn contains(&self, x: usize, y: usize) -> bool {
        x >= self.min_x && x < self.max_x && y >= self.min_y && y < self.max_y
    }

    /// Whether `other` lies completely inside the rectangle.
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.is_empty()
            || (other.min_x >= self.min_x
                && other.max_x <= self.max_x
                && other.min_y >= self.min_y
                && other.max_y <= self.max_y)
    }

    /// Shrink the rectangle by `margin` pixels on every side.
    ///
    /// ```
    /// use quadra_image::Rect;
    ///
    /// assert_eq!(Rect::new(0, 0, 10, 8).shrink(2), Rect::new(2, 2, 8, 6));
    /// assert!(Rect::new(0, 0, 3, 3).shrink(2).is_empty());
    /// ```
    pub fn shrink(&self, margin: usize) -> Self {
        Self::new(
            self.min_x + margin,
            self.min_y + margin,
            self.max_x.saturating_sub(margin),
            self.max_y.saturating_sub(margin),
        )
    }

    /// Grow the rectangle by `margin` pixels on every side, saturating at the `usize` range.
    pub fn expand(&self, margin: usize) -> Self {
        Self::new(
            self.min_x.saturating_sub(margin),
            self.min_y.saturating_sub(margin),
            self.max_x.saturating_add(margin),
            self.max_y.saturating_add(margin),
        )
    }

    /// The overlap of two rectangles, possibly empty.
    pub fn intersect(&self, other: &Rect) -> Self {
        Self::new(
            self.min_x.max(other.min_x),
            self.min_y.max(other.min_y),
            self.max_x.min(other.max_x),
            self.max_y.min(other.max_y),
        )
    }

    /// Iterate the pixel coordinates of the rectangle in row-major order.
    pub fn pixels(&self) -> impl Iterator<Item = (usize, usize)> {
        let (min_x, max_x) = (self.min_x, self.max_x);
        (self.min_y..self.max_y).flat_map(move |y| (min_x..max_x).map(move |x| (x, y)))
    }
}

impl std::fmt::Display for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "[{}, {}) x [{}, {})",
            self.min_x, self.max_x, self.min_y, self.max_y
        )
    }
}
