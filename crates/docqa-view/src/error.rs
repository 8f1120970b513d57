use thiserror::Error;

use docqa_core::ApiError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViewError {
    #[error("{0} is still in progress")]
    Busy(&'static str),

    #[error("No result with id '{0}'")]
    UnknownResult(String),

    #[error("No result with citation [{0}]")]
    UnknownCitation(u32),

    #[error("No result is selected")]
    NoSelection,

    #[error("{}", .0.message)]
    Backend(#[from] ApiError),
}
