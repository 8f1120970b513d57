//! docqa-view
//!
//! Mode switch, result selection and the panels derived from controller state.
pub mod error;
pub mod mode;
pub mod orchestrator;
pub mod panels;

pub use error::ViewError;
pub use mode::{Mode, SearchStatus};
pub use orchestrator::Orchestrator;
pub use panels::{AnswerPanel, ProvenancePanel, SourcePanel, SourceRow, NO_PAGE};
