//! Result rows.

use crate::value::{FromSqlValue, SqlValue, ValueError};

/// One fetched row: column names and values in select order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: Vec<String>,
    values: Vec<SqlValue>,
}

impl Row {
    /// Creates a row from `(column, value)` pairs in select order.
    #[must_use]
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, SqlValue)>,
        S: Into<String>,
    {
        pairs.into_iter().collect()
    }

    /// Number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns whether the row has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Column names in order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Values in order.
    #[must_use]
    pub fn values(&self) -> &[SqlValue] {
        &self.values
    }

    /// Returns the value of a named column.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|idx| &self.values[idx])
    }

    /// Returns the value at a column position.
    #[must_use]
    pub fn get_index(&self, idx: usize) -> Option<&SqlValue> {
        self.values.get(idx)
    }

    /// Reads a named column as a Rust type.
    ///
    /// A missing column reads as NULL.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError`] when the value does not convert.
    pub fn try_get<T: FromSqlValue>(&self, column: &str) -> Result<T, ValueError> {
        T::from_sql_value(self.get(column).cloned().unwrap_or(SqlValue::Null))
    }

    /// Iterates over `(column, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }

    /// Replaces column names by their positions (`"0"`, `"1"`, ...).
    #[must_use]
    pub fn into_indexed(self) -> Self {
        let columns = (0..self.values.len()).map(|i| i.to_string()).collect();
        Self {
            columns,
            values: self.values,
        }
    }

    /// Consumes the row into `(column, value)` pairs.
    #[must_use]
    pub fn into_pairs(self) -> Vec<(String, SqlValue)> {
        self.columns.into_iter().zip(self.values).collect()
    }
}

impl<S: Into<String>> FromIterator<(S, SqlValue)> for Row {
    fn from_iter<I: IntoIterator<Item = (S, SqlValue)>>(iter: I) -> Self {
        let (columns, values) = iter
            .into_iter()
            .map(|(column, value)| (column.into(), value))
            .unzip();
        Self { columns, values }
    }
}
