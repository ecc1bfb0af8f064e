#![doc = env!("CARGO_PKG_DESCRIPTION")]

#[doc(inline)]
pub use quadra_image as image;

#[doc(inline)]
pub use quadra_imgproc as imgproc;

#[doc(inline)]
pub use quadra_io as io;
