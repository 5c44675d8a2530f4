use crate::{
    config::{SettingsDelta, SettingsPatch},
    engine::{
        capture::FrameSource,
        estimator::PoseEstimator,
        scheduler::{Engine, LoopState},
    },
    foundation::{core::Resolution, error::SkeletorResult},
};

impl<S: FrameSource, E: PoseEstimator> Engine<S, E> {
    /// Applies a partial settings update. Device or resolution changes swap
    /// the capture stream before returning.
    pub fn update_settings(&mut self, patch: &SettingsPatch) -> SkeletorResult<SettingsDelta> {
        let delta = self.settings.apply(patch)?;
        if delta.requires_reconfigure {
            self.swap_source()?;
        }
        Ok(delta)
    }

    /// Switches to another capture device and/or resolution.
    ///
    /// `None` for `device_id` selects the collaborator's default device.
    #[tracing::instrument(skip(self, resolution), fields(resolution = %resolution))]
    pub fn reconfigure_source(
        &mut self,
        device_id: Option<String>,
        resolution: Resolution,
    ) -> SkeletorResult<()> {
        let patch = SettingsPatch {
            device_id: Some(device_id.unwrap_or_default()),
            resolution: Some(resolution),
            ..SettingsPatch::default()
        };
        self.settings.apply(&patch)?;
        self.swap_source()
    }

    /// Stop, release, reacquire, resync, then resume if the loop was running.
    ///
    /// On acquisition failure the engine is left idle with no stream.
    pub(crate) fn swap_source(&mut self) -> SkeletorResult<()> {
        let resume = self.state == LoopState::Running;
        self.cancel_loop();
        self.state = LoopState::Reconfiguring;

        self.source.release_stream();
        self.stream_open = false;

        if let Err(e) = self.acquire_stream() {
            self.state = LoopState::Idle;
            tracing::warn!(error = %e, "reconfiguration failed, loop left idle");
            return Err(e);
        }

        let synced = self
            .sync
            .sync(self.source.dimensions(), &mut self.compositor, &mut self.mask);
        self.state = LoopState::Idle;
        match synced {
            Ok(outcome) => tracing::debug!(?outcome, "resynced after source swap"),
            Err(e) => tracing::warn!(error = %e, "resync after source swap failed, retrying next cycle"),
        }

        if resume {
            self.start()?;
        }
        tracing::info!(resumed = resume, "capture source reconfigured");
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/reconfigure.rs"]
mod tests;
