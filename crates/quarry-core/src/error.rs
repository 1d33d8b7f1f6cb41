//! Error types for query building.

use thiserror::Error;

use crate::dialect::Dialect;

/// Errors raised while assembling a statement.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// The resolved column and value lists have different lengths.
    #[error("columns does not match values, {columns} columns and {values} values")]
    ColumnCountMismatch {
        /// Number of columns.
        columns: usize,
        /// Number of values.
        values: usize,
    },

    /// The dialect has no support for the requested construct.
    #[error("{dialect} does not support {feature}")]
    Unsupported {
        /// The active dialect.
        dialect: Dialect,
        /// The construct that was requested.
        feature: &'static str,
    },
}

/// Result type alias for builder operations.
pub type Result<T> = std::result::Result<T, BuildError>;
