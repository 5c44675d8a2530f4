pub mod decode;
pub mod mask;

pub use decode::{DecodedImage, decode_image, read_image_file};
pub use mask::{MaskBuffer, MaskBufferCache};
