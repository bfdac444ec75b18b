use thiserror::Error;

/// Construction-time violations of the player capsule invariants.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CapsuleError {
    #[error("capsule radius must be positive, got {0}")]
    NonPositiveRadius(f32),
    #[error("capsule must be upright at construction (start.y = {start_y}, end.y = {end_y})")]
    NotUpright { start_y: f32, end_y: f32 },
}

/// Failures reported by a hand-pose source.
///
/// `CameraUnavailable` and `ModelLoad` happen at initialization and make the
/// experience fall back to keyboard control. `Estimation` is a per-sample
/// failure and degrades like a frame with no detected hand.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DetectorError {
    #[error("camera unavailable: {0}")]
    CameraUnavailable(String),
    #[error("hand pose model failed to load: {0}")]
    ModelLoad(String),
    #[error("hand pose estimation failed: {0}")]
    Estimation(String),
    #[error("hand pose source was released")]
    Released,
}

impl DetectorError {
    /// True for errors that mean hand tracking cannot be used at all.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, DetectorError::Estimation(_))
    }
}
