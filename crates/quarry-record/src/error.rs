//! Error types for the Active Record layer.

use quarry_core::{BuildError, ValueError};
use quarry_db::DbError;

/// Active Record errors.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    /// The record has no database handle.
    #[error("no database injected into the record, call set_db() first")]
    Configuration,

    /// The executor failed.
    #[error(transparent)]
    Db(#[from] DbError),

    /// SQL could not be built.
    #[error(transparent)]
    Build(#[from] BuildError),

    /// A column value did not fit its field.
    #[error(transparent)]
    Value(#[from] ValueError),
}

/// Result type alias for Active Record operations.
pub type Result<T> = std::result::Result<T, RecordError>;
