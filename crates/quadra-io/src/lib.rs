#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Error types for I/O operations.
///
/// Defines [`error::IoError`] variants for file access and encoding/decoding failures.
pub mod error;

/// High-level image reading functions.
///
/// See [`functional::read_image_rgba8`] for automatic format detection.
pub mod functional;

/// PNG image encoding.
///
/// Write 8-bit grayscale and RGBA PNG images.
pub mod png;

pub use crate::error::IoError;
pub use crate::functional::read_image_rgba8;
pub use crate::png::{write_image_png_gray8, write_image_png_rgba8};
