/// Result alias used across the crate.
pub type FanfareResult<T> = Result<T, FanfareError>;

/// Error type for configuration, layout, rendering and encoding failures.
///
/// The animation core itself never fails; errors come from the collaborators around it
/// (surfaces, sinks, config files).
#[derive(thiserror::Error, Debug)]
pub enum FanfareError {
    /// Invalid options or arguments.
    #[error("validation error: {0}")]
    Validation(String),

    /// Text measurement or placement failure.
    #[error("layout error: {0}")]
    Layout(String),

    /// Drawing or readback failure on a surface.
    #[error("render error: {0}")]
    Render(String),

    /// Frame sink failure (PNG writes, ffmpeg).
    #[error("encode error: {0}")]
    Encode(String),

    /// Config (de)serialization failure.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Anything else, with its source chain preserved.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FanfareError {
    /// Build a [`FanfareError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`FanfareError::Layout`].
    pub fn layout(msg: impl Into<String>) -> Self {
        Self::Layout(msg.into())
    }

    /// Build a [`FanfareError::Render`].
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`FanfareError::Encode`].
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`FanfareError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}
