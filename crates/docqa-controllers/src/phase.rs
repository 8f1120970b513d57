use thiserror::Error;

use docqa_core::{ApiError, ValidationError};

/// Lifecycle shared by every controller: `Idle -> Pending -> (Succeeded | Failed)`,
/// back to `Idle` on reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    Pending,
    Succeeded,
    Failed,
}

/// What a controller shows inline after a failed or rejected trigger.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControllerError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("{}", .0.message)]
    Api(#[from] ApiError),
}

impl ControllerError {
    /// Store a transport failure, substituting `fallback` when the backend gave no message.
    pub(crate) fn from_api(mut err: ApiError, fallback: &str) -> Self {
        if err.message.trim().is_empty() {
            err.message = fallback.to_string();
        }
        ControllerError::Api(err)
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ControllerError::Invalid(_))
    }
}

/// The part of a controller the view needs regardless of feature: where it is in its
/// lifecycle, the current inline error, and a way back to `Idle`.
pub trait Interaction {
    fn phase(&self) -> Phase;

    fn error(&self) -> Option<&ControllerError>;

    fn reset(&mut self);

    fn is_pending(&self) -> bool {
        self.phase() == Phase::Pending
    }
}
