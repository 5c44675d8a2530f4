pub type SkeletorResult<T> = Result<T, SkeletorError>;

#[derive(thiserror::Error, Debug)]
pub enum SkeletorError {
    /// The reference mask could not be read or decoded.
    #[error("asset load error: {0}")]
    AssetLoad(String),

    /// No capture stream could be opened, even with fallback constraints.
    #[error("source acquisition error: {0}")]
    SourceAcquisition(String),

    /// The pose provider failed for one frame.
    #[error("estimation error: {0}")]
    Estimation(String),

    /// Reported or supplied raster dimensions are zero or inconsistent.
    #[error("dimension error: {0}")]
    Dimension(String),

    /// `ffmpeg` or `ffprobe` could not be run or reported a failure.
    #[error("media error: {0}")]
    Media(String),

    /// Settings or arguments outside their accepted range.
    #[error("validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SkeletorError {
    /// Shorthand constructors, one per variant.
    pub fn asset_load(msg: impl Into<String>) -> Self {
        Self::AssetLoad(msg.into())
    }

    pub fn source_acquisition(msg: impl Into<String>) -> Self {
        Self::SourceAcquisition(msg.into())
    }

    pub fn estimation(msg: impl Into<String>) -> Self {
        Self::Estimation(msg.into())
    }

    pub fn dimension(msg: impl Into<String>) -> Self {
        Self::Dimension(msg.into())
    }

    pub fn media(msg: impl Into<String>) -> Self {
        Self::Media(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Failures confined to a single frame. The detection loop logs these at
    /// `warn` and anything else at `error`; neither stops the loop.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Estimation(_) | Self::Dimension(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
