//! Error types for DotCi.

use thiserror::Error;

use crate::BuildNumber;

#[derive(Debug, Error)]
pub enum Error {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("corrupt credential: {0}")]
    CorruptCredential(String),

    #[error("could not resolve branch '{branch}': {message}")]
    ResolutionFailure { branch: String, message: String },

    /// Cascading deletion stopped part way. `deleted` lists what is already gone;
    /// everything after `failed` is untouched.
    #[error("deletion of build #{number} stopped at {failed} (already deleted: {deleted:?}): {source}")]
    PartialDeletion {
        number: BuildNumber,
        deleted: Vec<String>,
        failed: String,
        #[source]
        source: Box<Error>,
    },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;
