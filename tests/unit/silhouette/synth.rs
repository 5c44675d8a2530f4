use super::*;
use crate::pose::Keypoint;

fn full_pose() -> Pose {
    use KeypointName::*;
    let at = |name, x, y| Keypoint::new(name, x, y, 1.0);
    Pose::new(vec![
        at(Nose, 100.0, 40.0),
        at(LeftEye, 95.0, 35.0),
        at(RightEye, 105.0, 35.0),
        at(LeftEar, 90.0, 38.0),
        at(RightEar, 110.0, 38.0),
        at(LeftShoulder, 80.0, 80.0),
        at(RightShoulder, 120.0, 80.0),
        at(LeftElbow, 70.0, 120.0),
        at(RightElbow, 130.0, 120.0),
        at(LeftWrist, 65.0, 160.0),
        at(RightWrist, 135.0, 160.0),
        at(LeftHip, 85.0, 160.0),
        at(RightHip, 115.0, 160.0),
        at(LeftKnee, 85.0, 210.0),
        at(RightKnee, 115.0, 210.0),
        at(LeftAnkle, 85.0, 260.0),
        at(RightAnkle, 115.0, 260.0),
    ])
}

fn with_score(mut pose: Pose, name: KeypointName, score: f32) -> Pose {
    for k in &mut pose.keypoints {
        if k.name == name {
            k.score = score;
        }
    }
    pose
}

fn parts(prims: &[Primitive], part: BodyPart) -> Vec<&Primitive> {
    prims.iter().filter(|p| p.part == part).collect()
}

#[test]
fn full_pose_emits_every_part() {
    let prims = SilhouetteSynthesizer::synthesize(
        &full_pose(),
        &Settings::default(),
        SynthesisParams::unscaled(10.0),
    );
    // quad + 4 edge quads + 4 corner discs
    assert_eq!(parts(&prims, BodyPart::Torso).len(), 9);
    assert_eq!(parts(&prims, BodyPart::Head).len(), 1);
    for chain in LimbChain::ALL {
        // 3 joint discs + 2 segment quads
        assert_eq!(parts(&prims, BodyPart::Limb(chain)).len(), 5, "{chain:?}");
    }
}

#[test]
fn torso_stays_within_hull_expanded_by_half_thickness() {
    let thickness = 12.0;
    let params = SynthesisParams {
        scale_x: 2.0,
        scale_y: 1.5,
        thickness,
    };
    let prims = SilhouetteSynthesizer::synthesize(&full_pose(), &Settings::default(), params);
    let hull = Rect::new(80.0 * 2.0, 80.0 * 1.5, 120.0 * 2.0, 160.0 * 1.5)
        .inflate(thickness / 2.0, thickness / 2.0);
    for p in parts(&prims, BodyPart::Torso) {
        let bb = p.shape.bounding_box();
        assert!(
            bb.x0 >= hull.x0 - 1e-9
                && bb.y0 >= hull.y0 - 1e-9
                && bb.x1 <= hull.x1 + 1e-9
                && bb.y1 <= hull.y1 + 1e-9,
            "{bb:?} escapes {hull:?}"
        );
    }
}

#[test]
fn missing_knee_drops_the_whole_leg_only() {
    let pose = with_score(full_pose(), KeypointName::LeftKnee, 0.1);
    let prims =
        SilhouetteSynthesizer::synthesize(&pose, &Settings::default(), SynthesisParams::unscaled(10.0));
    assert!(parts(&prims, BodyPart::Limb(LimbChain::LeftLeg)).is_empty());
    assert_eq!(parts(&prims, BodyPart::Limb(LimbChain::RightLeg)).len(), 5);
    assert_eq!(parts(&prims, BodyPart::Torso).len(), 9);
}

#[test]
fn missing_hip_drops_torso_and_leg() {
    let pose = with_score(full_pose(), KeypointName::RightHip, 0.0);
    let prims =
        SilhouetteSynthesizer::synthesize(&pose, &Settings::default(), SynthesisParams::unscaled(10.0));
    assert!(parts(&prims, BodyPart::Torso).is_empty());
    assert!(parts(&prims, BodyPart::Limb(LimbChain::RightLeg)).is_empty());
    assert_eq!(parts(&prims, BodyPart::Limb(LimbChain::LeftLeg)).len(), 5);
}

fn head_radius(prims: &[Primitive]) -> f64 {
    match &parts(prims, BodyPart::Head)[0].shape {
        Shape::Disc { radius, .. } => *radius,
        other => panic!("head is not a disc: {other:?}"),
    }
}

#[test]
fn head_radius_uses_larger_of_eye_span_and_thickness() {
    let settings = Settings::default();
    // eyes 10 apart => 20; thickness 4 => 8
    let prims = SilhouetteSynthesizer::synthesize(&full_pose(), &settings, SynthesisParams::unscaled(4.0));
    assert!((head_radius(&prims) - 20.0).abs() < 1e-9);
    // thickness 15 => 30
    let prims = SilhouetteSynthesizer::synthesize(&full_pose(), &settings, SynthesisParams::unscaled(15.0));
    assert!((head_radius(&prims) - 30.0).abs() < 1e-9);

    let settings = Settings {
        head_size: 1.5,
        ..Settings::default()
    };
    let prims = SilhouetteSynthesizer::synthesize(&full_pose(), &settings, SynthesisParams::unscaled(4.0));
    assert!((head_radius(&prims) - 30.0).abs() < 1e-9);
}

#[test]
fn head_with_one_eye_uses_thickness_only() {
    let pose = with_score(full_pose(), KeypointName::RightEye, 0.0);
    let prims =
        SilhouetteSynthesizer::synthesize(&pose, &Settings::default(), SynthesisParams::unscaled(4.0));
    assert!((head_radius(&prims) - 8.0).abs() < 1e-9);
}

#[test]
fn head_needs_nose_and_an_eye() {
    let pose = with_score(
        with_score(full_pose(), KeypointName::RightEye, 0.0),
        KeypointName::LeftEye,
        0.0,
    );
    let prims =
        SilhouetteSynthesizer::synthesize(&pose, &Settings::default(), SynthesisParams::unscaled(4.0));
    assert!(parts(&prims, BodyPart::Head).is_empty());

    let pose = with_score(full_pose(), KeypointName::Nose, 0.0);
    let prims =
        SilhouetteSynthesizer::synthesize(&pose, &Settings::default(), SynthesisParams::unscaled(4.0));
    assert!(parts(&prims, BodyPart::Head).is_empty());
}

#[test]
fn limb_segment_quads_have_uniform_width() {
    let prims = SilhouetteSynthesizer::synthesize(
        &full_pose(),
        &Settings::default(),
        SynthesisParams::unscaled(10.0),
    );
    for p in parts(&prims, BodyPart::Limb(LimbChain::LeftLeg)) {
        match &p.shape {
            // Vertical leg: quad spans exactly thickness horizontally.
            Shape::Polygon(pts) => {
                let bb = p.shape.bounding_box();
                assert_eq!(pts.len(), 4);
                assert!((bb.width() - 10.0).abs() < 1e-9);
            }
            Shape::Disc { radius, .. } => assert!((radius - 5.0).abs() < 1e-9),
        }
    }
}

#[test]
fn disc_path_is_closed_and_bounded() {
    let shape = Shape::Disc {
        center: Point::new(10.0, 10.0),
        radius: 4.0,
    };
    let path = shape.to_path();
    let bb = kurbo::Shape::bounding_box(&path);
    assert!((bb.x0 - 6.0).abs() < 0.2 && (bb.x1 - 14.0).abs() < 0.2);
    assert!(Shape::Polygon(vec![]).to_path().elements().is_empty());
}
