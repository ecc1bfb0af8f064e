//! Quadrant tile dispatcher.
//!
//! A dispatch splits the source image into four quadrants, filters each quadrant as an
//! independent unit of work and composites the tiles into an RGBA image of the source size.
//!
//! ```
//! use quadra_image::Image;
//! use quadra_imgproc::catalog::{Filter, FilterKind};
//! use quadra_imgproc::parallel::dispatch;
//!
//! let image = Image::<u8, 4>::from_size_pixel([4, 4].into(), [128, 128, 128, 255]).unwrap();
//! let filter = Filter::from_kind(FilterKind::NegativeGray, None);
//!
//! let negative = dispatch(&image, &filter).unwrap();
//! assert_eq!(negative.pixel(3, 0), &[127, 127, 127, 255]);
//! ```

use std::fmt;
use std::time::Instant;

use rayon::prelude::*;
use thiserror::Error;

use quadra_image::{Image, ImageError, ImageSize, Rect};

use crate::catalog::{Filter, TileImage};
use crate::crop::paste_image;
use crate::error::FilterError;

/// Errors that can occur while dispatching a filter over the tiles of an image.
#[derive(Error, Debug, PartialEq)]
pub enum DispatchError {
    /// The source image has no pixels.
    #[error("cannot dispatch a filter over an empty image")]
    EmptyImage,

    /// The filter parameters are invalid or a tile failed.
    #[error(transparent)]
    Filter(#[from] FilterError),

    /// A quadrant is smaller than the neighborhood of the filter.
    #[error("tile {tile} is smaller than the required {required} pixels per side")]
    TileTooSmall {
        /// The offending quadrant.
        tile: Rect,
        /// The minimum width and height of a quadrant.
        required: usize,
    },

    /// The requested thread count is invalid.
    #[error("thread count must be > 0, got {0}")]
    InvalidThreadCount(usize),

    /// The thread pool failed to build.
    #[error("failed to build thread pool: {0}")]
    ThreadPool(String),

    /// Compositing failed.
    #[error(transparent)]
    Image(#[from] ImageError),
}

/// Controls how the four tiles of a dispatch are executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionStrategy {
    /// Use the global Rayon thread pool, one task per tile.
    #[default]
    Parallel,

    /// Run the tiles one after the other on the current thread.
    ///
    /// Useful for debugging and as the reference result of a dispatch.
    Serial,

    /// Run on a local thread pool with `n` threads.
    ///
    /// # Warning
    /// Creates a new thread pool on every dispatch.
    Fixed(usize),
}

/// What the pixels a filter does not reach look like in the output.
///
/// Spatial filters skip the band of pixels closer than half their kernel size to the image
/// edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BorderMode {
    /// The band stays zeroed: black for gray filters, transparent black for RGBA filters.
    #[default]
    Unprocessed,

    /// The band shows the source image, converted to gray for gray filters.
    Passthrough,
}

/// Configuration of a [`TileDispatcher`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DispatchConfig {
    /// How the tiles are executed.
    pub strategy: ExecutionStrategy,
    /// How the unfiltered border band is filled.
    pub border_mode: BorderMode,
}

impl DispatchConfig {
    /// Create the default configuration: global pool, unprocessed border.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the execution strategy.
    pub fn with_strategy(mut self, strategy: ExecutionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set the border mode.
    pub fn with_border_mode(mut self, border_mode: BorderMode) -> Self {
        self.border_mode = border_mode;
        self
    }
}

/// Progress of a dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatchState {
    /// No dispatch in flight.
    #[default]
    Idle,
    /// The filter and the tiles are being validated.
    Dispatched,
    /// The four tiles are being filtered.
    AwaitingTiles,
    /// The tiles have been copied into the output image.
    Composited,
    /// The output image has been handed back.
    Done,
}

impl fmt::Display for DispatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DispatchState::Idle => "idle",
            DispatchState::Dispatched => "dispatched",
            DispatchState::AwaitingTiles => "awaiting tiles",
            DispatchState::Composited => "composited",
            DispatchState::Done => "done",
        };
        f.write_str(name)
    }
}

/// Split an image into its four quadrants.
///
/// The split point is `(width / 2, height / 2)`; the quadrants are returned as top-left,
/// top-right, bottom-left and bottom-right and cover the image exactly once.
///
/// # Examples
///
/// ```
/// use quadra_image::Rect;
/// use quadra_imgproc::parallel::quadrants;
///
/// let [tl, tr, bl, br] = quadrants([5, 3].into());
///
/// assert_eq!(tl, Rect::new(0, 0, 2, 1));
/// assert_eq!(tr, Rect::new(2, 0, 5, 1));
/// assert_eq!(bl, Rect::new(0, 1, 2, 3));
/// assert_eq!(br, Rect::new(2, 1, 5, 3));
/// ```
pub fn quadrants(size: ImageSize) -> [Rect; 4] {
    let (w, h) = (size.width, size.height);
    let (cx, cy) = (w / 2, h / 2);
    [
        Rect::new(0, 0, cx, cy),
        Rect::new(cx, 0, w, cy),
        Rect::new(0, cy, cx, h),
        Rect::new(cx, cy, w, h),
    ]
}

/// Runs catalog filters over the four quadrants of an image.
#[derive(Debug, Default)]
pub struct TileDispatcher {
    config: DispatchConfig,
    state: DispatchState,
}

impl TileDispatcher {
    /// Create an idle dispatcher.
    pub fn new(config: DispatchConfig) -> Self {
        Self {
            config,
            state: DispatchState::Idle,
        }
    }

    /// The state reached by the last dispatch.
    pub fn state(&self) -> DispatchState {
        self.state
    }

    /// The dispatcher configuration.
    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Filter `src` tile by tile and return the composited RGBA image.
    ///
    /// The filter parameters and the quadrant sizes are checked before any work starts. Gray
    /// tiles are expanded to opaque `(v, v, v, 255)` pixels, RGBA tiles are copied as is.
    ///
    /// # Errors
    ///
    /// On error no output is produced and the dispatcher goes back to [`DispatchState::Idle`].
    ///
    /// * [`DispatchError::EmptyImage`] if `src` has no pixels.
    /// * [`DispatchError::Filter`] for invalid filter parameters or a failing tile.
    /// * [`DispatchError::TileTooSmall`] if a quadrant is smaller than the filter half width
    ///   (and at least 1 pixel) in either dimension.
    /// * [`DispatchError::InvalidThreadCount`] and [`DispatchError::ThreadPool`] for a fixed
    ///   pool that cannot be built.
    pub fn dispatch(
        &mut self,
        src: &Image<u8, 4>,
        filter: &Filter,
    ) -> Result<Image<u8, 4>, DispatchError> {
        let result = self.run(src, filter);
        if let Err(err) = &result {
            log::debug!("dispatch of {filter} failed: {err}");
            self.transition(DispatchState::Idle);
        }
        result
    }

    fn transition(&mut self, state: DispatchState) {
        log::debug!("dispatcher: {} -> {}", self.state, state);
        self.state = state;
    }

    fn run(&mut self, src: &Image<u8, 4>, filter: &Filter) -> Result<Image<u8, 4>, DispatchError> {
        self.transition(DispatchState::Dispatched);
        let tiles = self.validate(src.size(), filter)?;

        self.transition(DispatchState::AwaitingTiles);
        let start = Instant::now();
        let filtered = self.run_tiles(src, filter, &tiles)?;
        log::debug!(
            "{filter}: 4 tiles of {}x{} filtered in {:?}",
            src.width(),
            src.height(),
            start.elapsed()
        );

        let mut dst = Image::<u8, 4>::from_size_val(src.size(), 0)?;
        for (rect, tile) in tiles.iter().zip(filtered) {
            paste_image(&tile.into_rgba()?, &mut dst, rect.min_x, rect.min_y)?;
        }
        self.transition(DispatchState::Composited);

        self.transition(DispatchState::Done);
        Ok(dst)
    }

    fn validate(&self, size: ImageSize, filter: &Filter) -> Result<[Rect; 4], DispatchError> {
        if size.area() == 0 {
            return Err(DispatchError::EmptyImage);
        }

        filter.validate()?;

        if let ExecutionStrategy::Fixed(0) = self.config.strategy {
            return Err(DispatchError::InvalidThreadCount(0));
        }

        let tiles = quadrants(size);
        let required = filter.half_width().max(1);
        if let Some(tile) = tiles
            .iter()
            .find(|tile| tile.width() < required || tile.height() < required)
        {
            return Err(DispatchError::TileTooSmall {
                tile: *tile,
                required,
            });
        }

        Ok(tiles)
    }

    fn run_tiles(
        &self,
        src: &Image<u8, 4>,
        filter: &Filter,
        tiles: &[Rect; 4],
    ) -> Result<Vec<TileImage>, DispatchError> {
        let border_mode = self.config.border_mode;
        let work = |rect: &Rect| {
            log::trace!("{filter}: filtering tile {rect}");
            filter.apply(src, *rect, border_mode)
        };

        let filtered = match self.config.strategy {
            ExecutionStrategy::Serial => tiles.iter().map(work).collect::<Result<Vec<_>, _>>()?,
            ExecutionStrategy::Parallel => {
                tiles.par_iter().map(work).collect::<Result<Vec<_>, _>>()?
            }
            ExecutionStrategy::Fixed(n) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .build()
                    .map_err(|e| DispatchError::ThreadPool(e.to_string()))?;

                pool.install(|| tiles.par_iter().map(work).collect::<Result<Vec<_>, _>>())?
            }
        };

        Ok(filtered)
    }
}

/// Filter `src` with the default [`DispatchConfig`].
///
/// See [`TileDispatcher::dispatch`].
pub fn dispatch(src: &Image<u8, 4>, filter: &Filter) -> Result<Image<u8, 4>, DispatchError> {
    TileDispatcher::new(DispatchConfig::default()).dispatch(src, filter)
}
