use super::*;
use crate::pose::{Keypoint, KeypointName};

fn frame() -> VideoFrame {
    VideoFrame::new(2, 2, vec![0; 16]).unwrap()
}

#[test]
fn sequence_replays_in_order_then_runs_dry() {
    let json = r#"[
        {"keypoints": [{"name": "nose", "x": 1.0, "y": 2.0, "score": 0.9}]},
        null
    ]"#;
    let mut seq = PoseSequence::from_json(json).unwrap();
    assert_eq!(seq.len(), 2);
    let first = seq.estimate(&frame()).unwrap().unwrap();
    assert_eq!(first.keypoints, vec![Keypoint::new(KeypointName::Nose, 1.0, 2.0, 0.9)]);
    assert!(seq.estimate(&frame()).unwrap().is_none());
    assert!(seq.estimate(&frame()).unwrap().is_none());
}

#[test]
fn sequence_rejects_non_array_json() {
    assert!(PoseSequence::from_json(r#"{"keypoints": []}"#).is_err());
}

#[test]
fn closures_are_estimators() {
    let mut calls = 0;
    let mut est = |_: &VideoFrame| -> anyhow::Result<Option<Pose>> {
        calls += 1;
        Ok(None)
    };
    assert!(est.estimate(&frame()).unwrap().is_none());
    drop(est);
    assert_eq!(calls, 1);
}
