/// Result alias that carries the custom [`MotionError`] type.
pub type Result<T> = std::result::Result<T, MotionError>;

/// Common error type for the core crate.
///
/// Gesture operations on [`crate::AnimationEngine`] never return this type;
/// it is surfaced only by configuration loading and the audio capability.
#[derive(Debug, thiserror::Error)]
pub enum MotionError {
    /// Free-form message for failures without a dedicated variant.
    #[error("{0}")]
    Message(String),
    /// A configuration value failed validation.
    #[error("invalid configuration: {field} {reason}")]
    InvalidConfig {
        field: &'static str,
        reason: &'static str,
    },
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// Wrapper around JSON (de)serialisation errors.
    #[error("{0}")]
    Json(#[from] serde_json::Error),
}

impl MotionError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }
}
