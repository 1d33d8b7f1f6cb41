//! Entity schema descriptors.
//!
//! An [`Entity`] describes how a struct maps onto a table: the table name,
//! the id column and an ordered list of [`Field`]s, each pairing a column
//! name with a getter and a setter. The list is a `'static` slice built
//! once per type, usually by `#[derive(Record)]` from `quarry-derive`.
//!
//! ```rust
//! use quarry_core::schema::{Entity, Field};
//! use quarry_core::{FromSqlValue, SqlValue, ToSqlValue};
//!
//! #[derive(Debug, Default)]
//! struct Book {
//!     id: Option<i64>,
//!     title: String,
//! }
//!
//! impl Entity for Book {
//!     const TABLE: &'static str = "Book";
//!
//!     fn fields() -> &'static [Field<Self>] {
//!         const FIELDS: &[Field<Book>] = &[
//!             Field::new(
//!                 "id",
//!                 |b: &Book| b.id.to_sql_value(),
//!                 |b: &mut Book, v| {
//!                     b.id = FromSqlValue::from_sql_value(v)?;
//!                     Ok(())
//!                 },
//!             ),
//!             Field::new(
//!                 "title",
//!                 |b: &Book| b.title.clone().to_sql_value(),
//!                 |b: &mut Book, v| {
//!                     b.title = FromSqlValue::from_sql_value(v)?;
//!                     Ok(())
//!                 },
//!             ),
//!         ];
//!         FIELDS
//!     }
//! }
//!
//! let book = Book { id: Some(3), title: String::from("Moomin") };
//! assert_eq!(book.id_value(), SqlValue::Int(3));
//! assert_eq!(Book::columns(), vec!["id", "title"]);
//! ```

use std::fmt;

use crate::row::Row;
use crate::value::{SqlValue, ValueError};

/// Reads a column value from an entity.
pub type Getter<T> = fn(&T) -> SqlValue;

/// Writes a column value into an entity.
pub type Setter<T> = fn(&mut T, SqlValue) -> Result<(), ValueError>;

/// One column of an entity: name, getter and setter.
pub struct Field<T: 'static> {
    /// The SQL column name.
    pub column: &'static str,
    /// Reads the value from an entity.
    pub get: Getter<T>,
    /// Writes the value into an entity.
    pub set: Setter<T>,
}

impl<T: 'static> Field<T> {
    /// Creates a field descriptor.
    #[must_use]
    pub const fn new(column: &'static str, get: Getter<T>, set: Setter<T>) -> Self {
        Self { column, get, set }
    }
}

impl<T: 'static> fmt::Debug for Field<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field").field("column", &self.column).finish()
    }
}

/// A struct mapped onto one table row.
pub trait Entity: Sized + 'static {
    /// The table name, without prefix.
    const TABLE: &'static str;

    /// The id column, used by `find_by_id`, `save` and `delete`.
    const ID_COLUMN: &'static str = "id";

    /// All mapped fields, in column order.
    fn fields() -> &'static [Field<Self>];

    /// Looks up a field by column name.
    fn field(column: &str) -> Option<&'static Field<Self>> {
        Self::fields().iter().find(|f| f.column == column)
    }

    /// Returns all column names.
    fn columns() -> Vec<&'static str> {
        Self::fields().iter().map(|f| f.column).collect()
    }

    /// Returns the id value, or NULL when the entity has no id field.
    fn id_value(&self) -> SqlValue {
        Self::field(Self::ID_COLUMN).map_or(SqlValue::Null, |f| (f.get)(self))
    }

    /// Writes the id value.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError`] when the value does not fit the id field.
    fn set_id_value(&mut self, value: SqlValue) -> Result<(), ValueError> {
        match Self::field(Self::ID_COLUMN) {
            Some(field) => (field.set)(self, value),
            None => Ok(()),
        }
    }

    /// Returns column/value pairs for every field except the id.
    fn data_values(&self) -> Vec<(&'static str, SqlValue)> {
        Self::fields()
            .iter()
            .filter(|f| f.column != Self::ID_COLUMN)
            .map(|f| (f.column, (f.get)(self)))
            .collect()
    }

    /// Copies matching columns from a row into this entity.
    ///
    /// Row columns with no matching field are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError`] when a value does not fit its field.
    fn hydrate(&mut self, row: &Row) -> Result<(), ValueError> {
        for (column, value) in row.iter() {
            if let Some(field) = Self::field(column) {
                (field.set)(self, value.clone())?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{FromSqlValue, ToSqlValue};

    #[derive(Debug, Default, PartialEq)]
    struct User {
        id: Option<i64>,
        acronym: Option<String>,
    }

    impl Entity for User {
        const TABLE: &'static str = "User";

        fn fields() -> &'static [Field<Self>] {
            const FIELDS: &[Field<User>] = &[
                Field::new(
                    "id",
                    |u: &User| u.id.to_sql_value(),
                    |u: &mut User, v| {
                        u.id = FromSqlValue::from_sql_value(v)?;
                        Ok(())
                    },
                ),
                Field::new(
                    "acronym",
                    |u: &User| u.acronym.clone().to_sql_value(),
                    |u: &mut User, v| {
                        u.acronym = FromSqlValue::from_sql_value(v)?;
                        Ok(())
                    },
                ),
            ];
            FIELDS
        }
    }

    #[test]
    fn test_columns_and_lookup() {
        assert_eq!(User::columns(), vec!["id", "acronym"]);
        assert!(User::field("acronym").is_some());
        assert!(User::field("password").is_none());
    }

    #[test]
    fn test_id_round_trip() {
        let mut user = User::default();
        assert_eq!(user.id_value(), SqlValue::Null);
        user.set_id_value(SqlValue::Int(4)).unwrap();
        assert_eq!(user.id, Some(4));
        user.set_id_value(SqlValue::Null).unwrap();
        assert_eq!(user.id, None);
    }

    #[test]
    fn test_data_values_skip_id() {
        let user = User {
            id: Some(1),
            acronym: Some(String::from("doe")),
        };
        assert_eq!(
            user.data_values(),
            vec![("acronym", SqlValue::Text(String::from("doe")))]
        );
    }

    #[test]
    fn test_hydrate_ignores_unknown_columns() {
        let row = Row::from_pairs([
            ("id", SqlValue::Int(9)),
            ("acronym", SqlValue::Text(String::from("doe"))),
            ("extra", SqlValue::Int(0)),
        ]);
        let mut user = User::default();
        user.hydrate(&row).unwrap();
        assert_eq!(
            user,
            User {
                id: Some(9),
                acronym: Some(String::from("doe")),
            }
        );
    }

    #[test]
    fn test_hydrate_reports_type_errors() {
        let row = Row::from_pairs([("id", SqlValue::Blob(vec![1]))]);
        let mut user = User::default();
        assert!(user.hydrate(&row).is_err());
    }
}
