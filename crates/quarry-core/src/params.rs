//! Positional parameters and list expansion.
//!
//! Drivers bind exactly one scalar per `?`. To support `IN (?)` with a
//! variable number of items, a [`Param::List`] is expanded before the
//! statement is prepared: its single `?` becomes one `?` per item and the
//! items are spliced into the flat parameter list.
//!
//! ```rust
//! use quarry_core::params::{expand_params, Param};
//! use quarry_core::SqlValue;
//!
//! let (sql, params) = expand_params("id IN (?)", vec![Param::list([1, 2, 3])]);
//! assert_eq!(sql, "id IN (?,?,?)");
//! assert_eq!(params, vec![SqlValue::Int(1), SqlValue::Int(2), SqlValue::Int(3)]);
//! ```
//!
//! # Limitations
//!
//! The query is scanned naively for the `?` character. A literal `?` inside
//! a quoted string will be taken for a placeholder and shift every following
//! parameter. Bind such text as a parameter instead of writing it inline.

use crate::value::{SqlValue, ToSqlValue, PLACEHOLDER};

/// A positional parameter: one scalar or a list of scalars.
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    /// Binds to exactly one `?`.
    Scalar(SqlValue),
    /// Expands one `?` into as many placeholders as items.
    List(Vec<SqlValue>),
}

impl Param {
    /// Creates a list parameter from any iterator of values.
    pub fn list<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: ToSqlValue,
    {
        Self::List(items.into_iter().map(ToSqlValue::to_sql_value).collect())
    }

    /// Number of scalars this parameter contributes after expansion.
    #[must_use]
    pub fn expanded_len(&self) -> usize {
        match self {
            Self::Scalar(_) => 1,
            Self::List(items) => items.len().max(1),
        }
    }
}

impl<T: ToSqlValue> From<T> for Param {
    fn from(value: T) -> Self {
        Self::Scalar(value.to_sql_value())
    }
}

/// Builds a `Vec<Param>` from scalar expressions.
///
/// ```rust
/// use quarry_core::params;
/// use quarry_core::params::Param;
///
/// let p = params![1, "two", Param::list(["a", "b"])];
/// assert_eq!(p.len(), 3);
/// ```
#[macro_export]
macro_rules! params {
    () => {
        ::std::vec::Vec::<$crate::params::Param>::new()
    };
    ($($value:expr),+ $(,)?) => {
        vec![$($crate::params::Param::from($value)),+]
    };
}

/// Expands list parameters into placeholder runs.
///
/// Parameters are matched left to right with the `?` occurrences of
/// `query`. A list of N items replaces its `?` with N comma-joined
/// placeholders; an empty list keeps its `?` and binds NULL so the SQL
/// never degenerates into `IN ()`.
///
/// Surplus parameters (more than placeholders) are passed through
/// unchanged; the driver reports the mismatch at execution time.
#[must_use]
pub fn expand_params(query: &str, params: Vec<Param>) -> (String, Vec<SqlValue>) {
    let mut sql = String::with_capacity(query.len());
    let mut flat = Vec::with_capacity(params.iter().map(Param::expanded_len).sum());
    let mut rest = query;

    for param in params {
        let at = rest.find(PLACEHOLDER);

        match param {
            Param::Scalar(value) => {
                if let Some(at) = at {
                    sql.push_str(&rest[..=at]);
                    rest = &rest[at + 1..];
                }
                flat.push(value);
            }
            Param::List(items) if items.is_empty() => {
                if let Some(at) = at {
                    sql.push_str(&rest[..=at]);
                    rest = &rest[at + 1..];
                }
                flat.push(SqlValue::Null);
            }
            Param::List(items) => {
                if let Some(at) = at {
                    sql.push_str(&rest[..at]);
                    sql.push_str(&vec![PLACEHOLDER; items.len()].join(","));
                    rest = &rest[at + 1..];
                }
                flat.extend(items);
            }
        }
    }

    sql.push_str(rest);
    (sql, flat)
}

/// Counts `?` placeholders using the same naive scan as [`expand_params`].
#[must_use]
pub fn count_placeholders(query: &str) -> usize {
    query.matches(PLACEHOLDER).count()
}
