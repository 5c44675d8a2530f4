use std::path::Path;

use crate::{
    assets::{MaskBuffer, MaskBufferCache},
    config::{Settings, SettingsObserver, SettingsStore},
    engine::{
        capture::{FrameSource, PlaybackState, StreamConstraints},
        estimator::PoseEstimator,
    },
    foundation::{
        core::{Dimensions, VideoFrame},
        error::{SkeletorError, SkeletorResult},
    },
    pose::Pose,
    render::{DimensionSynchronizer, FrameInput, LayerCompositor, RenderSurfaces, SyncOutcome},
    scoring::{OverlapScorer, ScoreTracker},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Running,
    Reconfiguring,
}

/// Why a cycle did not reach pose estimation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    NotRunning,
    SourceEnded,
    /// Source reported zero dimensions, surfaces could not be synced, or the
    /// frame does not match the synced size yet.
    NotReady,
    NoFrame,
}

/// A cycle waiting on the pose provider.
#[derive(Clone, Debug)]
pub struct PendingCycle {
    generation: u64,
    sequence: u64,
    frame: VideoFrame,
}

impl PendingCycle {
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn frame(&self) -> &VideoFrame {
        &self.frame
    }
}

#[derive(Debug)]
pub enum CycleStart {
    Ready(PendingCycle),
    Skipped(SkipReason),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CycleOutcome {
    Skipped(SkipReason),
    /// The engine was stopped or reconfigured while the pose was in flight.
    Discarded,
    Rendered {
        sequence: u64,
        pose_detected: bool,
        score: Option<u8>,
    },
    /// At least one layer failed to render; the score was left untouched.
    RenderFailed { sequence: u64, pose_detected: bool },
}

/// Pose-driven silhouette engine: owns the surfaces, mask cache and score,
/// and drives one detect/render/score cycle per [`Engine::tick`].
pub struct Engine<S, E> {
    pub(crate) source: S,
    estimator: E,
    pub(crate) settings: SettingsStore,
    pub(crate) mask: MaskBufferCache,
    pub(crate) compositor: LayerCompositor,
    pub(crate) sync: DimensionSynchronizer,
    scores: ScoreTracker,
    pub(crate) state: LoopState,
    pub(crate) generation: u64,
    sequence: u64,
    pub(crate) scheduled: bool,
    pub(crate) stream_open: bool,
}

impl<S: FrameSource, E: PoseEstimator> Engine<S, E> {
    /// Validates `settings`. The stream is not opened until [`Engine::initialize`]
    /// or [`Engine::start`].
    pub fn new(source: S, estimator: E, settings: Settings) -> SkeletorResult<Self> {
        Ok(Self {
            source,
            estimator,
            settings: SettingsStore::new(settings)?,
            mask: MaskBufferCache::new(),
            compositor: LayerCompositor::new(),
            sync: DimensionSynchronizer::new(),
            scores: ScoreTracker::default(),
            state: LoopState::Idle,
            generation: 0,
            sequence: 0,
            scheduled: false,
            stream_open: false,
        })
    }

    /// Applies `settings`, acquires the capture stream and loads the mask.
    ///
    /// A mask failure is returned after the stream is acquired, so the engine
    /// can still be started; the score stays unset until a mask loads.
    #[tracing::instrument(skip(self, mask_path, settings), fields(mask = %mask_path.display()))]
    pub fn initialize(&mut self, mask_path: &Path, settings: Settings) -> SkeletorResult<()> {
        let delta = self.settings.replace(settings)?;
        if !self.stream_open {
            self.acquire_stream()?;
        } else if delta.requires_reconfigure {
            self.swap_source()?;
        }

        self.scores.clear();
        self.mask.load(mask_path)?;
        if let Some(dims) = self.compositor.dimensions() {
            self.mask.resample(dims)?;
        }
        tracing::info!("engine initialized");
        Ok(())
    }

    /// Starts the loop. No-op when already running.
    pub fn start(&mut self) -> SkeletorResult<()> {
        match self.state {
            LoopState::Running => return Ok(()),
            LoopState::Reconfiguring => {
                return Err(SkeletorError::validation(
                    "cannot start while reconfiguring",
                ));
            }
            LoopState::Idle => {}
        }
        if !self.stream_open {
            self.acquire_stream()?;
        }
        self.state = LoopState::Running;
        self.scheduled = true;
        tracing::info!(generation = self.generation, "detection loop started");
        Ok(())
    }

    /// Stops the loop and cancels the scheduled cycle. In-flight results are discarded.
    pub fn stop(&mut self) {
        self.cancel_loop();
        if self.state != LoopState::Idle {
            self.state = LoopState::Idle;
            tracing::info!(generation = self.generation, "detection loop stopped");
        }
    }

    pub(crate) fn cancel_loop(&mut self) {
        self.scheduled = false;
        self.generation += 1;
    }

    /// Current loop state; `Reconfiguring` only while a resolution swap is underway.
    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Whether the next [`Engine::tick`] will run a cycle.
    pub fn is_cycle_scheduled(&self) -> bool {
        self.scheduled
    }

    /// Sequence number of the last frame pulled from the source.
    pub fn frame_sequence(&self) -> u64 {
        self.sequence
    }

    pub fn settings(&self) -> &Settings {
        self.settings.get()
    }

    /// Registers an observer notified after every accepted settings change.
    pub fn subscribe(&mut self, observer: Box<dyn SettingsObserver>) {
        self.settings.subscribe(observer);
    }

    /// Rendered layers, once the source has reported a usable size.
    pub fn surfaces(&self) -> Option<&RenderSurfaces> {
        self.compositor.surfaces()
    }

    /// Reference mask resampled to the current output size.
    pub fn mask_buffer(&self) -> Option<&MaskBuffer> {
        self.mask.buffer()
    }

    /// Most recent overlap score in `0..=100`; `None` until a pose is scored.
    pub fn latest_score(&self) -> Option<u8> {
        self.scores.latest()
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub(crate) fn acquire_stream(&mut self) -> SkeletorResult<()> {
        let settings = self.settings.get();
        let exact = StreamConstraints::exact(settings.device_id.clone(), settings.resolution);
        match self.source.open_stream(&exact) {
            Ok(()) => {}
            Err(crate::engine::capture::CaptureError::ConstraintRejected(reason)) => {
                tracing::warn!(%reason, "exact capture constraints rejected, using defaults");
                self.source
                    .open_stream(&StreamConstraints::default())
                    .map_err(|e| SkeletorError::source_acquisition(e.to_string()))?;
            }
            Err(e) => return Err(SkeletorError::source_acquisition(e.to_string())),
        }
        self.stream_open = true;
        tracing::info!(dims = %self.source.dimensions(), "capture stream acquired");
        Ok(())
    }

    /// First half of a cycle: source checks, dimension resync, frame pull.
    pub fn begin_cycle(&mut self) -> CycleStart {
        if self.state != LoopState::Running {
            return CycleStart::Skipped(SkipReason::NotRunning);
        }
        // Reschedule up front so every early exit keeps the loop alive.
        self.scheduled = true;

        match self.source.playback() {
            PlaybackState::Ended => {
                tracing::warn!("capture source ended");
                return CycleStart::Skipped(SkipReason::SourceEnded);
            }
            PlaybackState::Paused => {
                if let Err(e) = self.source.play() {
                    tracing::warn!(error = %e, "failed to resume paused source");
                }
            }
            PlaybackState::Playing => {}
        }

        match self
            .sync
            .sync(self.source.dimensions(), &mut self.compositor, &mut self.mask)
        {
            Ok(SyncOutcome::NotReady) => {
                tracing::debug!("source dimensions not ready");
                return CycleStart::Skipped(SkipReason::NotReady);
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(error = %e, "dimension resync failed");
                return CycleStart::Skipped(SkipReason::NotReady);
            }
        }

        let Some(frame) = self.source.latest_frame() else {
            return CycleStart::Skipped(SkipReason::NoFrame);
        };
        if Some(frame.dimensions()) != self.compositor.dimensions() {
            tracing::debug!(frame = %frame.dimensions(), "frame size lags the reported source size");
            return CycleStart::Skipped(SkipReason::NotReady);
        }
        self.sequence += 1;
        CycleStart::Ready(PendingCycle {
            generation: self.generation,
            sequence: self.sequence,
            frame,
        })
    }

    /// Second half of a cycle: render all layers, then score.
    ///
    /// Never fails; per-frame errors are logged and the loop continues.
    pub fn finish_cycle(
        &mut self,
        pending: PendingCycle,
        estimate: anyhow::Result<Option<Pose>>,
    ) -> CycleOutcome {
        if self.state != LoopState::Running || pending.generation != self.generation {
            tracing::debug!(sequence = pending.sequence, "discarding stale cycle");
            return CycleOutcome::Discarded;
        }

        let pose = match estimate {
            Ok(pose) => pose,
            Err(e) => {
                let err = SkeletorError::estimation(format!("{e:#}"));
                tracing::warn!(sequence = pending.sequence, error = %err, "treating frame as no pose");
                None
            }
        };

        let settings = self.settings.get();
        let dims = self.compositor.dimensions().unwrap_or_default();
        let mask = self.mask.buffer_for(dims);
        let input = FrameInput {
            frame: Some(&pending.frame),
            pose: pose.as_ref(),
            mask,
            source: pending.frame.dimensions(),
        };
        let rendered = self.compositor.render_all(&input, settings);
        self.scheduled = true;

        if let Err(e) = rendered {
            if e.is_transient() {
                tracing::warn!(sequence = pending.sequence, error = %e, "layer rendering failed");
            } else {
                tracing::error!(sequence = pending.sequence, error = %e, "layer rendering failed");
            }
            return CycleOutcome::RenderFailed {
                sequence: pending.sequence,
                pose_detected: pose.is_some(),
            };
        }

        match &pose {
            Some(_) => {
                if let (Some(mask), Some(surfaces)) = (mask, self.compositor.surfaces()) {
                    match OverlapScorer::score(&mask.rgba8, surfaces.body.data()) {
                        Ok(score) => self.scores.record(score),
                        Err(e) => tracing::warn!(error = %e, "scoring skipped"),
                    }
                }
            }
            None => self.scores.record_miss(settings.missed_detection),
        }

        CycleOutcome::Rendered {
            sequence: pending.sequence,
            pose_detected: pose.is_some(),
            score: self.scores.latest(),
        }
    }

    /// Runs one full cycle with the engine's own pose estimator.
    pub fn tick(&mut self) -> CycleOutcome {
        if !self.scheduled {
            return CycleOutcome::Skipped(SkipReason::NotRunning);
        }
        self.scheduled = false;
        match self.begin_cycle() {
            CycleStart::Skipped(reason) => CycleOutcome::Skipped(reason),
            CycleStart::Ready(pending) => {
                let estimate = self.estimator.estimate(&pending.frame);
                self.finish_cycle(pending, estimate)
            }
        }
    }

    /// Ticks while a cycle is scheduled, at most `max_cycles` times.
    pub fn pump(&mut self, max_cycles: usize) -> Vec<CycleOutcome> {
        let mut out = Vec::new();
        while out.len() < max_cycles && self.scheduled {
            out.push(self.tick());
        }
        out
    }

    /// Surface size the next cycle will render at, if known.
    pub fn output_dimensions(&self) -> Option<Dimensions> {
        self.compositor.dimensions()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/scheduler.rs"]
mod tests;
