//! # quarry-record
//!
//! Active Record mapping for the quarry database toolkit.
//!
//! A record is a plain struct implementing [`ActiveRecord`]: it knows its
//! table and columns through [`Entity`](quarry_core::Entity) and carries a
//! [`Db`] handle to the shared [`Database`](quarry_db::Database). Records
//! find, save and delete themselves by building SQL with the database's
//! builder and executing it with positional parameters.
//!
//! ```rust,no_run
//! use quarry_core::SqlValue;
//! use quarry_db::{Database, DatabaseOptions};
//! use quarry_derive::Record;
//! use quarry_record::{ActiveRecord, Db};
//!
//! #[derive(Debug, Default, Clone, PartialEq, Record)]
//! struct User {
//!     id: Option<i64>,
//!     acronym: Option<String>,
//!     #[record(db)]
//!     db: Option<Db>,
//! }
//!
//! # async fn run() -> quarry_record::Result<()> {
//! let db = Db::new(Database::new(DatabaseOptions::new("sqlite::memory:")));
//!
//! let mut user = User::default();
//! user.set_db(db.clone());
//! user.acronym = Some(String::from("doe"));
//! user.save().await?;
//!
//! let mut found = User::default();
//! found.set_db(db);
//! found.find_by_id(Some(SqlValue::Int(1))).await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod handle;
pub mod record;

pub use error::{RecordError, Result};
pub use handle::Db;
pub use record::ActiveRecord;
