//! # quarry-db
//!
//! Statement execution for the quarry database toolkit.
//!
//! [`Database`] wraps one SQLite connection (through `sqlx`) configured by
//! [`DatabaseOptions`]. It expands list parameters, executes statements,
//! buffers their rows and reports the last insert id and change count.
//! Every statement can be observed; [`QueryHistory`] records them for
//! debugging and persists across connections through a [`HistoryStore`].
//!
//! ```rust,no_run
//! use quarry_core::{params, Param};
//! use quarry_db::{Database, DatabaseOptions};
//!
//! # async fn run() -> quarry_db::Result<()> {
//! let mut db = Database::new(DatabaseOptions::new("sqlite::memory:"));
//! db.connect().await?;
//!
//! let sql = db.builder().select("*").from("user").where_clause("id IN (?)");
//! let users = db.execute_fetch_all(sql, params![Param::list([1, 2, 3])]).await?;
//! # Ok(())
//! # }
//! ```

pub mod database;
pub mod error;
pub mod history;
pub mod options;

pub use database::Database;
pub use error::{DbError, Result};
pub use history::{
    HistoryEntry, HistorySnapshot, HistoryStore, JsonFileStore, MemoryStore, QueryHistory,
    QueryObserver,
};
pub use options::{DatabaseOptions, FetchMode};
