//! Fluent SQL builder.
//!
//! [`QueryBuilder`] assembles SELECT, INSERT, UPDATE, DELETE, CREATE TABLE
//! and DROP TABLE statements from fragments. Conditions, join constraints
//! and column expressions are raw SQL supplied by the caller; values belong
//! in `?` placeholders bound at execution time.
//!
//! # Example
//!
//! ```rust
//! use quarry_core::builder::QueryBuilder;
//! use quarry_core::Dialect;
//!
//! let query = QueryBuilder::new()
//!     .set_dialect(Dialect::Sqlite)
//!     .set_table_prefix("mos_")
//!     .select("t1.*, t2.id AS id2")
//!     .from("test AS t1")
//!     .left_join("test AS t2", "t1.id = t2.id")
//!     .where_clause("t1.id = ?");
//!
//! assert_eq!(
//!     query.get_sql(),
//!     "SELECT\n\tt1.*, t2.id AS id2\nFROM mos_test AS t1\n\
//!      LEFT OUTER JOIN mos_test AS t2\n\tON t1.id = t2.id\n\
//!      WHERE\n\t(t1.id = ?)\n;"
//! );
//! ```

mod coerce;
mod columns;
mod query;

pub use coerce::ToInteger;
pub use columns::Columns;
pub use query::QueryBuilder;

/// Anything that renders to SQL text.
///
/// Lets executors accept raw SQL strings and builders alike.
pub trait AsSql {
    /// Returns the SQL text.
    fn as_sql(&self) -> String;
}

impl AsSql for str {
    fn as_sql(&self) -> String {
        self.to_string()
    }
}

impl AsSql for String {
    fn as_sql(&self) -> String {
        self.clone()
    }
}

impl AsSql for QueryBuilder {
    fn as_sql(&self) -> String {
        self.get_sql()
    }
}

impl<T: AsSql + ?Sized> AsSql for &T {
    fn as_sql(&self) -> String {
        (**self).as_sql()
    }
}
