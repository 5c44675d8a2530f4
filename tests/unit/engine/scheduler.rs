use std::sync::Arc;

use super::*;
use crate::{
    assets::DecodedImage,
    engine::{capture::CaptureError, estimator::FixedPose},
    pose::{Keypoint, KeypointName},
};

struct FakeSource {
    dims: Dimensions,
    /// Frames delivered at a size other than the reported one.
    frame_dims: Option<Dimensions>,
    state: PlaybackState,
    open: bool,
    plays: u32,
}

impl FakeSource {
    fn new(w: u32, h: u32) -> Self {
        Self {
            dims: Dimensions::new(w, h),
            frame_dims: None,
            state: PlaybackState::Playing,
            open: false,
            plays: 0,
        }
    }
}

impl FrameSource for FakeSource {
    fn dimensions(&self) -> Dimensions {
        if self.open { self.dims } else { Dimensions::default() }
    }

    fn playback(&self) -> PlaybackState {
        self.state
    }

    fn play(&mut self) -> Result<(), CaptureError> {
        self.plays += 1;
        self.state = PlaybackState::Playing;
        Ok(())
    }

    fn latest_frame(&mut self) -> Option<VideoFrame> {
        if !self.open || self.dims.is_empty() {
            return None;
        }
        let d = self.frame_dims.unwrap_or(self.dims);
        VideoFrame::new(d.width, d.height, vec![0; d.rgba_len()]).ok()
    }

    fn open_stream(&mut self, _constraints: &StreamConstraints) -> Result<(), CaptureError> {
        self.open = true;
        Ok(())
    }

    fn release_stream(&mut self) {
        self.open = false;
    }
}

fn box_pose() -> Pose {
    use KeypointName::*;
    Pose::new(vec![
        Keypoint::new(LeftShoulder, 16.0, 16.0, 1.0),
        Keypoint::new(RightShoulder, 48.0, 16.0, 1.0),
        Keypoint::new(RightHip, 48.0, 48.0, 1.0),
        Keypoint::new(LeftHip, 16.0, 48.0, 1.0),
    ])
}

fn box_mask(engine: &mut Engine<FakeSource, FixedPose>) {
    let mut rgba8 = Vec::with_capacity(64 * 64 * 4);
    for y in 0..64u32 {
        for x in 0..64u32 {
            let v = if (16..48).contains(&x) && (16..48).contains(&y) { 255 } else { 0 };
            rgba8.extend_from_slice(&[v, v, v, 255]);
        }
    }
    engine.mask.set_source(DecodedImage {
        width: 64,
        height: 64,
        rgba8: Arc::new(rgba8),
    });
}

fn thin_settings() -> Settings {
    Settings {
        silhouette_thickness: 0.5,
        ..Settings::default()
    }
}

fn engine(pose: Option<Pose>) -> Engine<FakeSource, FixedPose> {
    Engine::new(FakeSource::new(64, 64), FixedPose(pose), thin_settings()).unwrap()
}

#[test]
fn idle_engine_does_not_cycle() {
    let mut e = engine(None);
    assert_eq!(e.state(), LoopState::Idle);
    assert_eq!(e.tick(), CycleOutcome::Skipped(SkipReason::NotRunning));
    assert!(e.surfaces().is_none());
}

#[test]
fn start_acquires_stream_and_schedules() {
    let mut e = engine(None);
    e.start().unwrap();
    e.start().unwrap();
    assert_eq!(e.state(), LoopState::Running);
    assert!(e.is_cycle_scheduled());
    assert!(e.source().open);
}

#[test]
fn matching_pose_scores_hundred() {
    let mut e = engine(Some(box_pose()));
    box_mask(&mut e);
    e.start().unwrap();
    let out = e.tick();
    assert_eq!(
        out,
        CycleOutcome::Rendered {
            sequence: 1,
            pose_detected: true,
            score: Some(100)
        }
    );
    assert_eq!(e.latest_score(), Some(100));
    assert_eq!(e.mask_buffer().unwrap().dimensions(), Dimensions::new(64, 64));
    assert!(e.is_cycle_scheduled());
}

#[test]
fn missing_mask_renders_without_score() {
    let mut e = engine(Some(box_pose()));
    e.start().unwrap();
    let out = e.tick();
    assert!(matches!(
        out,
        CycleOutcome::Rendered {
            pose_detected: true,
            score: None,
            ..
        }
    ));
    let s = e.surfaces().unwrap();
    assert_eq!(s.silhouette.pixel(32, 32).map(|p| p[3] > 0), Some(true));
}

#[test]
fn zero_dimensions_skip_but_keep_loop_alive() {
    let mut e = Engine::new(FakeSource::new(0, 0), FixedPose(None), Settings::default()).unwrap();
    e.start().unwrap();
    assert_eq!(e.tick(), CycleOutcome::Skipped(SkipReason::NotReady));
    assert!(e.is_cycle_scheduled());
    assert_eq!(e.frame_sequence(), 0);
}

#[test]
fn paused_source_is_resumed() {
    let mut e = engine(None);
    e.start().unwrap();
    e.source_mut().state = PlaybackState::Paused;
    e.tick();
    assert_eq!(e.source().plays, 1);
    assert_eq!(e.source().playback(), PlaybackState::Playing);
}

#[test]
fn ended_source_skips_cycle() {
    let mut e = engine(None);
    e.start().unwrap();
    e.source_mut().state = PlaybackState::Ended;
    assert_eq!(e.tick(), CycleOutcome::Skipped(SkipReason::SourceEnded));
    assert!(e.is_cycle_scheduled());
}

#[test]
fn estimation_failure_is_a_missed_frame() {
    let mut e = engine(Some(box_pose()));
    box_mask(&mut e);
    e.start().unwrap();
    e.tick();
    assert_eq!(e.latest_score(), Some(100));

    let CycleStart::Ready(pending) = e.begin_cycle() else {
        panic!("cycle should start");
    };
    let out = e.finish_cycle(pending, Err(anyhow::anyhow!("model crashed")));
    assert!(matches!(
        out,
        CycleOutcome::Rendered {
            pose_detected: false,
            score: Some(100),
            ..
        }
    ));
    assert!(e.is_cycle_scheduled());
}

#[test]
fn reset_policy_zeroes_score_on_miss() {
    let mut e = engine(Some(box_pose()));
    box_mask(&mut e);
    e.update_settings(&crate::config::SettingsPatch {
        missed_detection: Some(crate::scoring::MissedDetectionPolicy::Reset),
        ..Default::default()
    })
    .unwrap();
    e.start().unwrap();
    e.tick();
    let CycleStart::Ready(pending) = e.begin_cycle() else {
        panic!("cycle should start");
    };
    e.finish_cycle(pending, Ok(None));
    assert_eq!(e.latest_score(), Some(0));
}

#[test]
fn stop_discards_in_flight_result() {
    let mut e = engine(Some(box_pose()));
    box_mask(&mut e);
    e.start().unwrap();
    let CycleStart::Ready(pending) = e.begin_cycle() else {
        panic!("cycle should start");
    };
    e.stop();
    assert!(!e.is_cycle_scheduled());
    assert_eq!(e.finish_cycle(pending, Ok(Some(box_pose()))), CycleOutcome::Discarded);
    assert_eq!(e.latest_score(), None);
}

#[test]
fn restarted_loop_discards_cycles_from_previous_run() {
    let mut e = engine(Some(box_pose()));
    e.start().unwrap();
    let CycleStart::Ready(old) = e.begin_cycle() else {
        panic!("cycle should start");
    };
    e.stop();
    e.start().unwrap();
    assert_eq!(e.finish_cycle(old, Ok(None)), CycleOutcome::Discarded);
}

#[test]
fn frame_sequence_is_monotonic() {
    let mut e = engine(None);
    e.start().unwrap();
    let outs = e.pump(5);
    let seqs: Vec<u64> = outs
        .iter()
        .filter_map(|o| match o {
            CycleOutcome::Rendered { sequence, .. } => Some(*sequence),
            _ => None,
        })
        .collect();
    assert_eq!(seqs, vec![1, 2, 3, 4, 5]);
    e.stop();
    assert!(e.pump(5).is_empty());
    e.start().unwrap();
    e.tick();
    assert_eq!(e.frame_sequence(), 6);
}

#[test]
fn initialize_with_missing_mask_still_allows_start() {
    let mut e = engine(Some(box_pose()));
    let err = e
        .initialize(Path::new("/no/such/mask.png"), thin_settings())
        .unwrap_err();
    assert!(matches!(err, SkeletorError::AssetLoad(_)));
    e.start().unwrap();
    assert!(matches!(e.tick(), CycleOutcome::Rendered { score: None, .. }));
}

#[test]
fn frame_lagging_reported_size_skips_cycle() {
    let mut e = engine(Some(box_pose()));
    e.start().unwrap();
    e.source_mut().frame_dims = Some(Dimensions::new(32, 32));
    assert_eq!(e.tick(), CycleOutcome::Skipped(SkipReason::NotReady));
    assert_eq!(e.frame_sequence(), 0);
    assert!(e.is_cycle_scheduled());
}

#[test]
fn render_failure_clears_stale_layers_and_keeps_score() {
    let mut e = engine(Some(box_pose()));
    box_mask(&mut e);
    e.start().unwrap();
    e.tick();
    assert_eq!(e.latest_score(), Some(100));
    let painted = |e: &Engine<FakeSource, FixedPose>| {
        e.surfaces()
            .unwrap()
            .silhouette
            .data()
            .chunks_exact(4)
            .filter(|p| p[3] > 0)
            .count()
    };
    assert!(painted(&e) > 0);

    let pending = PendingCycle {
        generation: e.generation,
        sequence: 99,
        frame: VideoFrame::new(32, 32, vec![0; 32 * 32 * 4]).unwrap(),
    };
    let out = e.finish_cycle(pending, Ok(None));
    assert_eq!(
        out,
        CycleOutcome::RenderFailed {
            sequence: 99,
            pose_detected: false
        }
    );
    assert_eq!(painted(&e), 0);
    assert_eq!(e.latest_score(), Some(100));
    assert!(e.is_cycle_scheduled());
}
