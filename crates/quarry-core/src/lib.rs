//! # quarry-core
//!
//! SQL assembly and parameter handling for the quarry database toolkit.
//!
//! This crate provides:
//! - A fluent [`QueryBuilder`] that renders SELECT, INSERT, UPDATE, DELETE,
//!   CREATE TABLE and DROP TABLE statements from fragments
//! - Positional parameter expansion, turning list parameters into
//!   placeholder runs for `IN (?)`
//! - Dialect flags for the few constructs that differ between engines
//! - Entity schema descriptors used by the Active Record layer
//!
//! It performs no I/O. `quarry-db` executes the SQL and parameters built
//! here.
//!
//! ## Building queries
//!
//! ```rust
//! use quarry_core::{QueryBuilder, ToSqlValue};
//!
//! let sql = QueryBuilder::new()
//!     .insert(
//!         "user",
//!         [("age", 3_i64.to_sql_value()), ("name", "three".to_sql_value())],
//!         None,
//!     )
//!     .unwrap()
//!     .get_sql();
//!
//! assert_eq!(sql, "INSERT INTO user\n\t(age, name)\n\tVALUES\n\t(3, 'three');\n");
//! ```
//!
//! ## Expanding list parameters
//!
//! ```rust
//! use quarry_core::params::{expand_params, Param};
//!
//! let (sql, params) = expand_params("id IN (?)", vec![Param::list([1, 2, 3])]);
//! assert_eq!(sql, "id IN (?,?,?)");
//! assert_eq!(params.len(), 3);
//! ```

pub mod builder;
pub mod dialect;
pub mod error;
pub mod params;
pub mod row;
pub mod schema;
pub mod value;

pub use builder::{AsSql, Columns, QueryBuilder};
pub use dialect::Dialect;
pub use error::BuildError;
pub use params::{expand_params, Param};
pub use row::Row;
pub use schema::{Entity, Field};
pub use value::{FromSqlValue, SqlValue, ToSqlValue, ValueError};
