use crate::{
    foundation::core::Point,
    foundation::error::{SkeletorError, SkeletorResult},
    pose::letterbox::LetterboxTransform,
};

/// Anatomical landmark vocabulary, in model output order.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum KeypointName {
    Nose,
    LeftEye,
    RightEye,
    LeftEar,
    RightEar,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
}

impl KeypointName {
    pub const ALL: [KeypointName; 17] = [
        Self::Nose,
        Self::LeftEye,
        Self::RightEye,
        Self::LeftEar,
        Self::RightEar,
        Self::LeftShoulder,
        Self::RightShoulder,
        Self::LeftElbow,
        Self::RightElbow,
        Self::LeftWrist,
        Self::RightWrist,
        Self::LeftHip,
        Self::RightHip,
        Self::LeftKnee,
        Self::RightKnee,
        Self::LeftAnkle,
        Self::RightAnkle,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(i: usize) -> Option<Self> {
        Self::ALL.get(i).copied()
    }
}

/// Body edges drawn by the skeleton layer.
pub const SKELETON_CONNECTIONS: [(KeypointName, KeypointName); 12] = {
    use KeypointName::*;
    [
        (LeftShoulder, RightShoulder),
        (LeftShoulder, LeftElbow),
        (RightShoulder, RightElbow),
        (LeftElbow, LeftWrist),
        (RightElbow, RightWrist),
        (LeftShoulder, LeftHip),
        (RightShoulder, RightHip),
        (LeftHip, RightHip),
        (LeftHip, LeftKnee),
        (RightHip, RightKnee),
        (LeftKnee, LeftAnkle),
        (RightKnee, RightAnkle),
    ]
};

pub const FACE_CONNECTIONS: [(KeypointName, KeypointName); 4] = {
    use KeypointName::*;
    [
        (Nose, LeftEye),
        (Nose, RightEye),
        (LeftEye, LeftEar),
        (RightEye, RightEar),
    ]
};

/// Torso polygon winding: shoulders left to right, then hips right to left.
pub const TORSO_CORNERS: [KeypointName; 4] = [
    KeypointName::LeftShoulder,
    KeypointName::RightShoulder,
    KeypointName::RightHip,
    KeypointName::LeftHip,
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LimbChain {
    LeftArm,
    RightArm,
    LeftLeg,
    RightLeg,
}

impl LimbChain {
    pub const ALL: [LimbChain; 4] = [
        Self::LeftArm,
        Self::RightArm,
        Self::LeftLeg,
        Self::RightLeg,
    ];

    /// Joints from the body outward.
    pub fn joints(self) -> [KeypointName; 3] {
        use KeypointName::*;
        match self {
            Self::LeftArm => [LeftShoulder, LeftElbow, LeftWrist],
            Self::RightArm => [RightShoulder, RightElbow, RightWrist],
            Self::LeftLeg => [LeftHip, LeftKnee, LeftAnkle],
            Self::RightLeg => [RightHip, RightKnee, RightAnkle],
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Keypoint {
    pub name: KeypointName,
    /// Pixel coordinates in the source video frame.
    pub x: f64,
    pub y: f64,
    pub score: f32,
}

impl Keypoint {
    pub fn new(name: KeypointName, x: f64, y: f64, score: f32) -> Self {
        Self { name, x, y, score }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn is_valid(&self, threshold: f32) -> bool {
        self.score > threshold && self.x.is_finite() && self.y.is_finite()
    }
}

/// Keypoints of the single tracked subject for one frame.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Pose {
    pub keypoints: Vec<Keypoint>,
}

impl Pose {
    pub fn new(keypoints: Vec<Keypoint>) -> Self {
        Self { keypoints }
    }

    pub fn get(&self, name: KeypointName) -> Option<&Keypoint> {
        self.keypoints.iter().find(|k| k.name == name)
    }

    /// Position of `name` if it was detected above `threshold`.
    pub fn valid_point(&self, name: KeypointName, threshold: f32) -> Option<Point> {
        self.get(name)
            .filter(|k| k.is_valid(threshold))
            .map(Keypoint::position)
    }

    pub fn valid_keypoints(&self, threshold: f32) -> impl Iterator<Item = &Keypoint> + '_ {
        self.keypoints.iter().filter(move |k| k.is_valid(threshold))
    }

    /// Builds a pose from raw single-pose model rows of `[y, x, score]`
    /// normalized to the square model input.
    ///
    /// Returns `None` when no row scores above `threshold`, which the model
    /// reports as "no subject".
    pub fn from_model_output(
        rows: &[[f32; 3]],
        transform: &LetterboxTransform,
        threshold: f32,
    ) -> SkeletorResult<Option<Self>> {
        if rows.len() != KeypointName::ALL.len() {
            return Err(SkeletorError::estimation(format!(
                "expected {} keypoint rows, got {}",
                KeypointName::ALL.len(),
                rows.len()
            )));
        }
        let max_score = rows.iter().map(|r| r[2]).fold(f32::NEG_INFINITY, f32::max);
        if max_score <= threshold {
            return Ok(None);
        }

        let keypoints = KeypointName::ALL
            .iter()
            .zip(rows)
            .map(|(&name, &[y, x, score])| {
                let p = transform.to_frame(f64::from(x), f64::from(y));
                Keypoint::new(name, p.x, p.y, score)
            })
            .collect();
        Ok(Some(Self { keypoints }))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pose/keypoint.rs"]
mod tests;
