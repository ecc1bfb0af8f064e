//! The filter catalog.
//!
//! [`FilterKind`] names the eight user-selectable filters, [`Filter`] carries a kind together
//! with its validated parameters and [`CATALOG`] maps every kind to its tile function.

use std::fmt;
use std::str::FromStr;

use quadra_image::{Image, ImageError, Rect};

use crate::color::{grayscale, rgba_from_gray};
use crate::crop::crop_image;
use crate::denoise::{check_despeckle_params, despeckle};
use crate::edges::{laplacian_boundaries, prewitt_boundaries};
use crate::enhance::{negative_gray, negative_rgb};
use crate::error::FilterError;
use crate::filter::{gaussian_blur, uniform_blur};
use crate::parallel::BorderMode;

/// Default gaussian blur kernel size.
pub const DEFAULT_GAUSSIAN_SIZE: usize = 7;
/// Default despeckle neighborhood size.
pub const DEFAULT_DESPECKLE_SIZE: usize = 5;
/// Default number of despeckle passes.
pub const DEFAULT_DESPECKLE_ITERATIONS: usize = 2;
/// Default laplacian normalization power.
pub const DEFAULT_LAPLACIAN_POWER: u32 = 8;
/// Default Prewitt normalization power.
pub const DEFAULT_PREWITT_POWER: u32 = 32;

/// The filters offered by the catalog, in menu order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKind {
    /// Grayscale negative.
    NegativeGray,
    /// Color negative.
    NegativeRgb,
    /// Grayscale conversion.
    Grayscale,
    /// 3x3 box blur.
    UniformBlur,
    /// Gaussian blur.
    GaussianBlur,
    /// Statistical noise reduction.
    Despeckle,
    /// Laplacian boundary detection.
    Laplacian,
    /// Prewitt boundary detection.
    Prewitt,
}

/// The pixel format of the tiles a filter produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// One intensity channel.
    Gray,
    /// Red, green, blue and alpha.
    Rgba,
}

impl FilterKind {
    /// Every filter kind, in menu order.
    pub const ALL: [FilterKind; 8] = [
        FilterKind::NegativeGray,
        FilterKind::NegativeRgb,
        FilterKind::Grayscale,
        FilterKind::UniformBlur,
        FilterKind::GaussianBlur,
        FilterKind::Despeckle,
        FilterKind::Laplacian,
        FilterKind::Prewitt,
    ];

    /// The display name of the filter.
    pub fn name(&self) -> &'static str {
        self.entry().name
    }

    /// The short kebab-case identifier of the filter.
    pub fn id(&self) -> &'static str {
        self.entry().id
    }

    /// The filter at the 1-based menu position `index`.
    ///
    /// # Examples
    ///
    /// ```
    /// use quadra_imgproc::catalog::FilterKind;
    ///
    /// assert_eq!(FilterKind::from_index(1), Some(FilterKind::NegativeGray));
    /// assert_eq!(FilterKind::from_index(9), None);
    /// ```
    pub fn from_index(index: usize) -> Option<Self> {
        index
            .checked_sub(1)
            .and_then(|i| Self::ALL.get(i))
            .copied()
    }

    /// The format of the tiles produced by the filter.
    pub fn output(&self) -> OutputFormat {
        match self.entry().run {
            TileFn::Gray(_) => OutputFormat::Gray,
            TileFn::Rgba(_) => OutputFormat::Rgba,
        }
    }

    /// The catalog entry registered for this kind.
    pub fn entry(&self) -> &'static CatalogEntry {
        &CATALOG[*self as usize]
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FilterKind {
    type Err = FilterError;

    /// Parse a filter from its display name (case-insensitive) or its identifier.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        CATALOG
            .iter()
            .find(|entry| entry.id == s || entry.name.eq_ignore_ascii_case(s))
            .map(|entry| entry.kind)
            .ok_or_else(|| FilterError::UnknownFilter(s.to_string()))
    }
}

/// Numeric parameters handed to a tile function.
///
/// Filters that ignore a parameter get its neutral value: a single pass, a power of 1 and the
/// size of the neighborhood the filter actually reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterParams {
    /// Size of the square neighborhood read per output pixel.
    pub kernel_size: usize,
    /// Number of passes.
    pub iterations: usize,
    /// Normalization divisor of contrast filters.
    pub power: u32,
}

/// A catalog filter with its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    /// Grayscale negative.
    NegativeGray,
    /// Color negative.
    NegativeRgb,
    /// Grayscale conversion.
    Grayscale,
    /// 3x3 box blur.
    UniformBlur,
    /// Gaussian blur with an odd kernel size.
    GaussianBlur {
        /// The kernel size.
        kernel_size: usize,
    },
    /// Despeckle with an odd neighborhood size.
    Despeckle {
        /// The neighborhood size.
        kernel_size: usize,
        /// The number of passes.
        iterations: usize,
    },
    /// Laplacian boundaries.
    Laplacian {
        /// The normalization divisor.
        power: u32,
    },
    /// Prewitt boundaries.
    Prewitt {
        /// The normalization divisor.
        power: u32,
    },
}

impl Filter {
    /// Build a filter from a catalog kind and an optional integer parameter.
    ///
    /// The parameter is the kernel size of the gaussian blur, the number of despeckle passes
    /// and the power of the boundary filters. It is ignored by the other filters; missing
    /// values take the catalog defaults. The result is not validated, see [`Filter::validate`].
    ///
    /// # Examples
    ///
    /// ```
    /// use quadra_imgproc::catalog::{Filter, FilterKind};
    ///
    /// let filter = Filter::from_kind(FilterKind::Despeckle, Some(4));
    /// assert_eq!(filter, Filter::Despeckle { kernel_size: 5, iterations: 4 });
    ///
    /// let filter = Filter::from_kind(FilterKind::Laplacian, None);
    /// assert_eq!(filter, Filter::Laplacian { power: 8 });
    /// ```
    pub fn from_kind(kind: FilterKind, param: Option<usize>) -> Self {
        let power = |default| param.map_or(default, |p| u32::try_from(p).unwrap_or(u32::MAX));
        match kind {
            FilterKind::NegativeGray => Filter::NegativeGray,
            FilterKind::NegativeRgb => Filter::NegativeRgb,
            FilterKind::Grayscale => Filter::Grayscale,
            FilterKind::UniformBlur => Filter::UniformBlur,
            FilterKind::GaussianBlur => Filter::GaussianBlur {
                kernel_size: param.unwrap_or(DEFAULT_GAUSSIAN_SIZE),
            },
            FilterKind::Despeckle => Filter::Despeckle {
                kernel_size: DEFAULT_DESPECKLE_SIZE,
                iterations: param.unwrap_or(DEFAULT_DESPECKLE_ITERATIONS),
            },
            FilterKind::Laplacian => Filter::Laplacian {
                power: power(DEFAULT_LAPLACIAN_POWER),
            },
            FilterKind::Prewitt => Filter::Prewitt {
                power: power(DEFAULT_PREWITT_POWER),
            },
        }
    }

    /// The catalog kind of the filter.
    pub fn kind(&self) -> FilterKind {
        match self {
            Filter::NegativeGray => FilterKind::NegativeGray,
            Filter::NegativeRgb => FilterKind::NegativeRgb,
            Filter::Grayscale => FilterKind::Grayscale,
            Filter::UniformBlur => FilterKind::UniformBlur,
            Filter::GaussianBlur { .. } => FilterKind::GaussianBlur,
            Filter::Despeckle { .. } => FilterKind::Despeckle,
            Filter::Laplacian { .. } => FilterKind::Laplacian,
            Filter::Prewitt { .. } => FilterKind::Prewitt,
        }
    }

    /// The parameters passed to the tile function.
    pub fn params(&self) -> FilterParams {
        let (kernel_size, iterations, power) = match *self {
            Filter::NegativeGray | Filter::NegativeRgb | Filter::Grayscale => (1, 1, 1),
            Filter::UniformBlur => (3, 1, 1),
            Filter::GaussianBlur { kernel_size } => (kernel_size, 1, 1),
            Filter::Despeckle {
                kernel_size,
                iterations,
            } => (kernel_size, iterations, 1),
            Filter::Laplacian { power } | Filter::Prewitt { power } => (3, 1, power),
        };
        FilterParams {
            kernel_size,
            iterations,
            power,
        }
    }

    /// Half the size of the neighborhood read per output pixel.
    ///
    /// This is also the width of the border band the filter leaves unprocessed.
    pub fn half_width(&self) -> usize {
        self.params().kernel_size / 2
    }

    /// The format of the tiles produced by the filter.
    pub fn output(&self) -> OutputFormat {
        self.kind().output()
    }

    /// Check the parameters of the filter.
    ///
    /// # Errors
    ///
    /// * [`FilterError::InvalidKernelSize`] for an even kernel or one smaller than 3.
    /// * [`FilterError::InvalidIterations`] for zero despeckle passes.
    /// * [`FilterError::InvalidPower`] for a zero power.
    pub fn validate(&self) -> Result<(), FilterError> {
        match *self {
            Filter::GaussianBlur { kernel_size } => {
                if kernel_size < 3 || kernel_size % 2 == 0 {
                    return Err(FilterError::InvalidKernelSize(kernel_size));
                }
            }
            Filter::Despeckle {
                kernel_size,
                iterations,
            } => check_despeckle_params(kernel_size, iterations)?,
            Filter::Laplacian { power } | Filter::Prewitt { power } => {
                if power == 0 {
                    return Err(FilterError::InvalidPower(power));
                }
            }
            Filter::NegativeGray
            | Filter::NegativeRgb
            | Filter::Grayscale
            | Filter::UniformBlur => {}
        }
        Ok(())
    }

    /// Run the filter over the region `rect` of `src` and return the filtered tile.
    ///
    /// With [`BorderMode::Passthrough`] the tile starts as the source region, converted to gray
    /// for gray filters, so the border band the filter skips shows the unfiltered image.
    /// Otherwise it starts zeroed.
    ///
    /// # Examples
    ///
    /// ```
    /// use quadra_image::{Image, Rect};
    /// use quadra_imgproc::catalog::{Filter, TileImage};
    /// use quadra_imgproc::parallel::BorderMode;
    ///
    /// let image = Image::<u8, 4>::from_size_pixel([4, 4].into(), [128, 128, 128, 255]).unwrap();
    /// let tile = Filter::NegativeGray
    ///     .apply(&image, Rect::new(0, 0, 2, 2), BorderMode::Unprocessed)
    ///     .unwrap();
    ///
    /// match tile {
    ///     TileImage::Gray(gray) => assert_eq!(gray.as_slice(), &[127; 4]),
    ///     TileImage::Rgba(_) => unreachable!(),
    /// }
    /// ```
    pub fn apply(
        &self,
        src: &Image<u8, 4>,
        rect: Rect,
        border: BorderMode,
    ) -> Result<TileImage, FilterError> {
        let params = self.params();
        let tile = match self.kind().entry().run {
            TileFn::Gray(run) => {
                let mut dst = gray_tile(src, rect, border)?;
                run(src, &mut dst, rect, &params)?;
                TileImage::Gray(dst)
            }
            TileFn::Rgba(run) => {
                let mut dst = rgba_tile(src, rect, border)?;
                run(src, &mut dst, rect, &params)?;
                TileImage::Rgba(dst)
            }
        };
        Ok(tile)
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::GaussianBlur { kernel_size } => {
                write!(f, "{} ({kernel_size}x{kernel_size})", self.kind())
            }
            Filter::Despeckle {
                kernel_size,
                iterations,
            } => write!(
                f,
                "{} ({kernel_size}x{kernel_size}, {iterations} passes)",
                self.kind()
            ),
            Filter::Laplacian { power } | Filter::Prewitt { power } => {
                write!(f, "{} (power {power})", self.kind())
            }
            _ => write!(f, "{}", self.kind()),
        }
    }
}

/// A filtered tile.
#[derive(Debug, Clone, PartialEq)]
pub enum TileImage {
    /// A grayscale tile.
    Gray(Image<u8, 1>),
    /// An RGBA tile.
    Rgba(Image<u8, 4>),
}

impl TileImage {
    /// The size of the tile.
    pub fn size(&self) -> quadra_image::ImageSize {
        match self {
            TileImage::Gray(image) => image.size(),
            TileImage::Rgba(image) => image.size(),
        }
    }

    /// Convert the tile to RGBA, gray values expand to opaque `(v, v, v, 255)`.
    pub fn into_rgba(self) -> Result<Image<u8, 4>, ImageError> {
        match self {
            TileImage::Gray(gray) => {
                let mut rgba = Image::from_size_val(gray.size(), 0)?;
                rgba_from_gray(&gray, &mut rgba)?;
                Ok(rgba)
            }
            TileImage::Rgba(rgba) => Ok(rgba),
        }
    }
}

/// Allocate a grayscale tile for `rect`, seeded with the gray source in passthrough mode.
fn gray_tile(
    src: &Image<u8, 4>,
    rect: Rect,
    border: BorderMode,
) -> Result<Image<u8, 1>, FilterError> {
    let mut tile = Image::from_size_val(rect.size(), 0)?;
    if border == BorderMode::Passthrough {
        grayscale(src, &mut tile, rect)?;
    }
    Ok(tile)
}

/// Allocate an RGBA tile for `rect`, seeded with the source in passthrough mode.
fn rgba_tile(
    src: &Image<u8, 4>,
    rect: Rect,
    border: BorderMode,
) -> Result<Image<u8, 4>, FilterError> {
    let mut tile = Image::from_size_val(rect.size(), 0)?;
    if border == BorderMode::Passthrough {
        crop_image(src, &mut tile, rect.min_x, rect.min_y)?;
    }
    Ok(tile)
}

/// Tile function producing a grayscale tile.
pub type GrayTileFn =
    fn(&Image<u8, 4>, &mut Image<u8, 1>, Rect, &FilterParams) -> Result<(), FilterError>;

/// Tile function producing an RGBA tile.
pub type RgbaTileFn =
    fn(&Image<u8, 4>, &mut Image<u8, 4>, Rect, &FilterParams) -> Result<(), FilterError>;

/// A registered tile function, tagged with its output format.
#[derive(Clone, Copy)]
pub enum TileFn {
    /// Writes a grayscale tile.
    Gray(GrayTileFn),
    /// Writes an RGBA tile.
    Rgba(RgbaTileFn),
}

impl fmt::Debug for TileFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TileFn::Gray(_) => f.write_str("TileFn::Gray"),
            TileFn::Rgba(_) => f.write_str("TileFn::Rgba"),
        }
    }
}

/// One row of the filter catalog.
#[derive(Debug, Clone, Copy)]
pub struct CatalogEntry {
    /// The filter kind.
    pub kind: FilterKind,
    /// The display name.
    pub name: &'static str,
    /// The short identifier.
    pub id: &'static str,
    /// The tile function.
    pub run: TileFn,
}

fn run_negative_gray(
    src: &Image<u8, 4>,
    dst: &mut Image<u8, 1>,
    rect: Rect,
    _: &FilterParams,
) -> Result<(), FilterError> {
    negative_gray(src, dst, rect)
}

fn run_negative_rgb(
    src: &Image<u8, 4>,
    dst: &mut Image<u8, 4>,
    rect: Rect,
    _: &FilterParams,
) -> Result<(), FilterError> {
    negative_rgb(src, dst, rect)
}

fn run_grayscale(
    src: &Image<u8, 4>,
    dst: &mut Image<u8, 1>,
    rect: Rect,
    _: &FilterParams,
) -> Result<(), FilterError> {
    grayscale(src, dst, rect)
}

fn run_uniform_blur(
    src: &Image<u8, 4>,
    dst: &mut Image<u8, 4>,
    rect: Rect,
    _: &FilterParams,
) -> Result<(), FilterError> {
    uniform_blur(src, dst, rect)
}

fn run_gaussian_blur(
    src: &Image<u8, 4>,
    dst: &mut Image<u8, 4>,
    rect: Rect,
    params: &FilterParams,
) -> Result<(), FilterError> {
    gaussian_blur(src, dst, rect, params.kernel_size)
}

fn run_despeckle(
    src: &Image<u8, 4>,
    dst: &mut Image<u8, 1>,
    rect: Rect,
    params: &FilterParams,
) -> Result<(), FilterError> {
    despeckle(src, dst, rect, params.kernel_size, params.iterations)
}

fn run_laplacian(
    src: &Image<u8, 4>,
    dst: &mut Image<u8, 1>,
    rect: Rect,
    params: &FilterParams,
) -> Result<(), FilterError> {
    laplacian_boundaries(src, dst, rect, params.power)
}

fn run_prewitt(
    src: &Image<u8, 4>,
    dst: &mut Image<u8, 1>,
    rect: Rect,
    params: &FilterParams,
) -> Result<(), FilterError> {
    prewitt_boundaries(src, dst, rect, params.power)
}

/// The filter catalog, indexed by `FilterKind as usize`.
pub static CATALOG: [CatalogEntry; 8] = [
    CatalogEntry {
        kind: FilterKind::NegativeGray,
        name: "Negative Black & white",
        id: "negative-gray",
        run: TileFn::Gray(run_negative_gray),
    },
    CatalogEntry {
        kind: FilterKind::NegativeRgb,
        name: "Negative RGB",
        id: "negative-rgb",
        run: TileFn::Rgba(run_negative_rgb),
    },
    CatalogEntry {
        kind: FilterKind::Grayscale,
        name: "Grey scale",
        id: "grayscale",
        run: TileFn::Gray(run_grayscale),
    },
    CatalogEntry {
        kind: FilterKind::UniformBlur,
        name: "Uniform Blur",
        id: "uniform-blur",
        run: TileFn::Rgba(run_uniform_blur),
    },
    CatalogEntry {
        kind: FilterKind::GaussianBlur,
        name: "Gauss Blur",
        id: "gaussian-blur",
        run: TileFn::Rgba(run_gaussian_blur),
    },
    CatalogEntry {
        kind: FilterKind::Despeckle,
        name: "Noise reduction",
        id: "despeckle",
        run: TileFn::Gray(run_despeckle),
    },
    CatalogEntry {
        kind: FilterKind::Laplacian,
        name: "Boundary detection",
        id: "laplacian",
        run: TileFn::Gray(run_laplacian),
    },
    CatalogEntry {
        kind: FilterKind::Prewitt,
        name: "Boundaries with Prewitt",
        id: "prewitt",
        run: TileFn::Gray(run_prewitt),
    },
];

#[cfg(test)]
mod tests {
    use quadra_image::{Image, Rect};

    use super::{Filter, FilterKind, OutputFormat, TileImage, CATALOG};
    use crate::error::FilterError;
    use crate::parallel::BorderMode;

    #[test]
    fn test_catalog_order_matches_kinds() {
        for (i, kind) in FilterKind::ALL.iter().enumerate() {
            assert_eq!(CATALOG[i].kind, *kind);
            assert_eq!(FilterKind::from_index(i + 1), Some(*kind));
        }
        assert_eq!(FilterKind::from_index(0), None);
    }

    #[test]
    fn test_parse_names_and_ids() -> Result<(), FilterError> {
        assert_eq!("Grey scale".parse::<FilterKind>()?, FilterKind::Grayscale);
        assert_eq!(
            "boundaries with prewitt".parse::<FilterKind>()?,
            FilterKind::Prewitt
        );
        assert_eq!("despeckle".parse::<FilterKind>()?, FilterKind::Despeckle);
        assert_eq!(
            "sharpen".parse::<FilterKind>(),
            Err(FilterError::UnknownFilter("sharpen".to_string()))
        );
        for kind in FilterKind::ALL {
            assert_eq!(kind.to_string().parse::<FilterKind>()?, kind);
            assert_eq!(kind.id().parse::<FilterKind>()?, kind);
        }
        Ok(())
    }

    #[test]
    fn test_from_kind_defaults() {
        assert_eq!(
            Filter::from_kind(FilterKind::GaussianBlur, None),
            Filter::GaussianBlur { kernel_size: 7 }
        );
        assert_eq!(
            Filter::from_kind(FilterKind::GaussianBlur, Some(3)),
            Filter::GaussianBlur { kernel_size: 3 }
        );
        assert_eq!(
            Filter::from_kind(FilterKind::Despeckle, None),
            Filter::Despeckle {
                kernel_size: 5,
                iterations: 2
            }
        );
        assert_eq!(
            Filter::from_kind(FilterKind::Prewitt, None),
            Filter::Prewitt { power: 32 }
        );
        assert_eq!(
            Filter::from_kind(FilterKind::UniformBlur, Some(11)),
            Filter::UniformBlur
        );
    }

    #[test]
    fn test_validate() {
        assert_eq!(
            Filter::GaussianBlur { kernel_size: 6 }.validate(),
            Err(FilterError::InvalidKernelSize(6))
        );
        assert_eq!(
            Filter::GaussianBlur { kernel_size: 1 }.validate(),
            Err(FilterError::InvalidKernelSize(1))
        );
        assert_eq!(
            Filter::Despeckle {
                kernel_size: 5,
                iterations: 0
            }
            .validate(),
            Err(FilterError::InvalidIterations(0))
        );
        assert_eq!(
            Filter::Laplacian { power: 0 }.validate(),
            Err(FilterError::InvalidPower(0))
        );
        for kind in FilterKind::ALL {
            assert_eq!(Filter::from_kind(kind, None).validate(), Ok(()));
        }
    }

    #[test]
    fn test_half_width_and_output() {
        assert_eq!(Filter::Grayscale.half_width(), 0);
        assert_eq!(Filter::UniformBlur.half_width(), 1);
        assert_eq!(Filter::GaussianBlur { kernel_size: 7 }.half_width(), 3);
        assert_eq!(Filter::Prewitt { power: 32 }.half_width(), 1);
        assert_eq!(Filter::NegativeRgb.output(), OutputFormat::Rgba);
        assert_eq!(Filter::Laplacian { power: 8 }.output(), OutputFormat::Gray);
    }

    #[test]
    fn test_apply_passthrough_keeps_border() -> Result<(), FilterError> {
        let image = Image::<u8, 4>::from_fn([6, 6].into(), |x, y| {
            [(x * 40) as u8, (y * 40) as u8, 90, 255]
        })?;
        let rect = Rect::new(0, 0, 3, 3);

        let TileImage::Rgba(tile) = Filter::UniformBlur.apply(&image, rect, BorderMode::Passthrough)?
        else {
            panic!("uniform blur produces RGBA tiles");
        };
        assert_eq!(tile.pixel(0, 0), image.pixel(0, 0));
        assert_eq!(tile.pixel(2, 0), image.pixel(2, 0));
        assert_eq!(tile.pixel(1, 1), image.pixel(1, 1));

        let TileImage::Rgba(tile) = Filter::UniformBlur.apply(&image, rect, BorderMode::Unprocessed)?
        else {
            panic!("uniform blur produces RGBA tiles");
        };
        assert_eq!(tile.pixel(0, 0), &[0, 0, 0, 0]);
        Ok(())
    }

    #[test]
    fn test_gray_tile_into_rgba() -> Result<(), FilterError> {
        let image = Image::<u8, 4>::from_size_pixel([2, 2].into(), [10, 10, 10, 0])?;
        let tile = Filter::Grayscale.apply(&image, image.bounds(), BorderMode::Unprocessed)?;
        let rgba = tile.into_rgba()?;
        assert_eq!(rgba.pixel(1, 1), &[10, 10, 10, 255]);
        Ok(())
    }
}
