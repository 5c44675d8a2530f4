pub mod composite;
pub mod compositor;
pub mod cpu;
pub mod cutout;
pub mod dimensions;
pub mod surface;

pub use compositor::{FrameInput, LayerCompositor};
pub use cutout::{FeatherParams, cutout_on_white, feather_alpha, render_cutout};
pub use dimensions::{DimensionSynchronizer, SyncOutcome};
pub use surface::{Layer, RenderSurfaces, Surface};
