pub mod keypoint;
pub mod letterbox;

pub use keypoint::{
    FACE_CONNECTIONS, Keypoint, KeypointName, LimbChain, Pose, SKELETON_CONNECTIONS, TORSO_CORNERS,
};
pub use letterbox::LetterboxTransform;
