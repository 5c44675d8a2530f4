pub mod pixelate;
pub mod synth;

pub use pixelate::{block_upscale, pixelated_dimensions};
pub use synth::{BodyPart, Primitive, Shape, SilhouetteSynthesizer, SynthesisParams};
