use quadra_image::ImageError;

/// Errors raised while building kernels or running a filter.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum FilterError {
    /// The kernel size is even or smaller than 3.
    #[error("kernel size must be odd and >= 3, got {0}")]
    InvalidKernelSize(usize),

    /// The kernel data does not describe a square matrix.
    #[error("kernel data length ({0}) does not match a {1}x{1} kernel")]
    InvalidKernelData(usize, usize),

    /// The despeckle iteration count is zero.
    #[error("iteration count must be >= 1, got {0}")]
    InvalidIterations(usize),

    /// The normalization power of a contrast filter is zero.
    #[error("power must be >= 1, got {0}")]
    InvalidPower(u32),

    /// The filter name or index does not match any catalog entry.
    #[error("unknown filter: {0}")]
    UnknownFilter(String),

    /// An image or region precondition failed.
    #[error(transparent)]
    Image(#[from] ImageError),
}
