//! Error types for the statement executor.

use std::path::PathBuf;

use quarry_core::{BuildError, ValueError};

/// Errors raised while connecting, executing or fetching.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// No DSN configured.
    #[error("you can not connect, missing dsn")]
    MissingDsn,

    /// Connection failed; details are hidden unless `debug_connect` is set.
    #[error("could not connect to database, hiding connection details")]
    Connection,

    /// Connection failed with `debug_connect` set.
    #[error("could not connect to database: {0}")]
    Native(#[source] sqlx::Error),

    /// Executed or fetched before `connect()`.
    #[error("not connected, call connect() first")]
    NotConnected,

    /// Fetched before any statement was executed.
    #[error("no statement has been executed")]
    NotExecuted,

    /// Preparing or executing a statement failed.
    #[error("{message}\n\nSQL:\n{sql}\n\nPARAMS ({param_count}):\n{params}{}", .warning.as_deref().map(|w| format!("\n\n{w}")).unwrap_or_default())]
    Statement {
        /// The driver message.
        message: String,
        /// The SQL as sent to the driver, after list expansion.
        sql: String,
        /// Number of bound parameters, after list expansion.
        param_count: usize,
        /// The bound parameters, one per line.
        params: String,
        /// Set when placeholders and parameters disagree in number.
        warning: Option<String>,
        /// The driver error.
        #[source]
        source: sqlx::Error,
    },

    /// SQL could not be built.
    #[error(transparent)]
    Build(#[from] BuildError),

    /// A column value did not convert into its field type.
    #[error(transparent)]
    Value(#[from] ValueError),

    /// A configuration or history file could not be read or written.
    #[error("failed to access '{path}': {source}")]
    Io {
        /// The file path.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A configuration or history document is not valid JSON.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for executor operations.
pub type Result<T> = std::result::Result<T, DbError>;
