//! Shared contracts for the document QA client: request/response types, the
//! normalized error shapes, configuration and the [`traits::Backend`] seam.

pub mod config;
pub mod error;
pub mod traits;
pub mod types;
pub mod validate;

pub use error::{ApiError, ValidationError};
pub use traits::Backend;
