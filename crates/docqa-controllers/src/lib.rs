//! Per-feature interaction state machines.
//!
//! Each controller owns its own phase, result and error. None of them gates
//! re-entry: a caller that lets two requests overlap sees them applied in
//! completion order.
pub mod answer;
pub mod follow_up;
pub mod phase;
pub mod progress;
pub mod search;
pub mod upload;

pub use answer::{AnswerController, ConfidenceBand};
pub use follow_up::{FollowUpController, FollowUpTicket};
pub use phase::{ControllerError, Interaction, Phase};
pub use progress::SyntheticProgress;
pub use search::SearchController;
pub use upload::UploadController;
