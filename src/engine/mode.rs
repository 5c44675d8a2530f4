use crate::{
    engine::{capture::FrameSource, estimator::PoseEstimator, scheduler::Engine},
    foundation::error::{SkeletorError, SkeletorResult},
};

/// A rendering mode the host application can switch to.
pub trait RenderingMode {
    fn name(&self) -> &'static str;

    fn activate(&mut self) -> SkeletorResult<()>;

    fn deactivate(&mut self);
}

impl<S: FrameSource, E: PoseEstimator> RenderingMode for Engine<S, E> {
    fn name(&self) -> &'static str {
        "silhouette"
    }

    fn activate(&mut self) -> SkeletorResult<()> {
        self.start()
    }

    fn deactivate(&mut self) {
        self.stop();
    }
}

/// Registry of modes fixed at composition time; at most one is active.
#[derive(Default)]
pub struct ModeSelector {
    modes: Vec<Box<dyn RenderingMode>>,
    active: Option<usize>,
}

impl ModeSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, mode: Box<dyn RenderingMode>) -> SkeletorResult<()> {
        if self.modes.iter().any(|m| m.name() == mode.name()) {
            return Err(SkeletorError::validation(format!(
                "rendering mode '{}' already registered",
                mode.name()
            )));
        }
        self.modes.push(mode);
        Ok(())
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.modes.iter().map(|m| m.name()).collect()
    }

    pub fn active(&self) -> Option<&'static str> {
        self.active.map(|i| self.modes[i].name())
    }

    /// Deactivates the current mode, then activates `name`.
    ///
    /// If activation fails no mode is left active.
    pub fn select(&mut self, name: &str) -> SkeletorResult<()> {
        let idx = self
            .modes
            .iter()
            .position(|m| m.name() == name)
            .ok_or_else(|| SkeletorError::validation(format!("unknown rendering mode '{name}'")))?;
        if self.active == Some(idx) {
            return Ok(());
        }
        self.deactivate();
        self.modes[idx].activate()?;
        self.active = Some(idx);
        tracing::info!(mode = name, "rendering mode activated");
        Ok(())
    }

    pub fn deactivate(&mut self) {
        if let Some(i) = self.active.take() {
            self.modes[i].deactivate();
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/mode.rs"]
mod tests;
