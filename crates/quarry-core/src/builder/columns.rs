//! Column/value resolution for INSERT and UPDATE.

use crate::value::{SqlValue, ToSqlValue};

/// The column argument of [`QueryBuilder::insert`] and
/// [`QueryBuilder::update`].
///
/// Either plain column names, with values supplied separately, or ordered
/// column/value pairs.
///
/// [`QueryBuilder::insert`]: super::QueryBuilder::insert
/// [`QueryBuilder::update`]: super::QueryBuilder::update
#[derive(Debug, Clone, PartialEq)]
pub enum Columns {
    /// Column names only.
    Names(Vec<String>),
    /// Column name to value pairs, in order.
    Pairs(Vec<(String, SqlValue)>),
}

impl Columns {
    /// Resolves the final column and value lists.
    ///
    /// - Pairs with no explicit values are split into names and values.
    /// - Names with no explicit values get one `?` per column.
    /// - Explicit values are used as given; pairs then only contribute
    ///   their names.
    ///
    /// The two lists are not required to have the same length; callers
    /// check that.
    #[must_use]
    pub fn resolve(self, values: Option<Vec<SqlValue>>) -> (Vec<String>, Vec<SqlValue>) {
        match (self, values) {
            (Self::Pairs(pairs), None) => pairs.into_iter().unzip(),
            (Self::Names(names), None) => {
                let values = vec![SqlValue::placeholder(); names.len()];
                (names, values)
            }
            (Self::Names(names), Some(values)) => (names, values),
            (Self::Pairs(pairs), Some(values)) => {
                (pairs.into_iter().map(|(name, _)| name).collect(), values)
            }
        }
    }

    /// Number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Names(names) => names.len(),
            Self::Pairs(pairs) => pairs.len(),
        }
    }

    /// Returns whether there are no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Vec<String>> for Columns {
    fn from(names: Vec<String>) -> Self {
        Self::Names(names)
    }
}

impl From<Vec<&str>> for Columns {
    fn from(names: Vec<&str>) -> Self {
        Self::Names(names.into_iter().map(String::from).collect())
    }
}

impl From<&[&str]> for Columns {
    fn from(names: &[&str]) -> Self {
        Self::Names(names.iter().map(|s| String::from(*s)).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Columns {
    fn from(names: [&str; N]) -> Self {
        Self::Names(names.into_iter().map(String::from).collect())
    }
}

impl<V: ToSqlValue> From<Vec<(String, V)>> for Columns {
    fn from(pairs: Vec<(String, V)>) -> Self {
        Self::Pairs(
            pairs
                .into_iter()
                .map(|(name, value)| (name, value.to_sql_value()))
                .collect(),
        )
    }
}

impl<V: ToSqlValue> From<Vec<(&str, V)>> for Columns {
    fn from(pairs: Vec<(&str, V)>) -> Self {
        Self::Pairs(
            pairs
                .into_iter()
                .map(|(name, value)| (String::from(name), value.to_sql_value()))
                .collect(),
        )
    }
}

impl<V: ToSqlValue, const N: usize> From<[(&str, V); N]> for Columns {
    fn from(pairs: [(&str, V); N]) -> Self {
        Self::Pairs(
            pairs
                .into_iter()
                .map(|(name, value)| (String::from(name), value.to_sql_value()))
                .collect(),
        )
    }
}

/// Renders values for inlining into INSERT/UPDATE text.
pub(crate) fn inline_values(values: &[SqlValue]) -> Vec<String> {
    values.iter().map(SqlValue::to_sql_inline).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pairs_split_into_names_and_values() {
        let columns = Columns::from([("age", 3_i64.to_sql_value()), ("name", "three".to_sql_value())]);
        let (names, values) = columns.resolve(None);
        assert_eq!(names, vec!["age", "name"]);
        assert_eq!(
            values,
            vec![SqlValue::Int(3), SqlValue::Text(String::from("three"))]
        );
    }

    #[test]
    fn test_names_without_values_get_placeholders() {
        let (names, values) = Columns::from(["id", "text"]).resolve(None);
        assert_eq!(names.len(), 2);
        assert!(values.iter().all(SqlValue::is_placeholder));
    }

    #[test]
    fn test_explicit_values_are_kept_even_when_lengths_differ() {
        let (names, values) =
            Columns::from(["id", "text"]).resolve(Some(vec![SqlValue::Int(1)]));
        assert_eq!(names.len(), 2);
        assert_eq!(values.len(), 1);
    }

    #[test]
    fn test_pairs_with_explicit_values_use_names_only() {
        let (names, values) = Columns::from(vec![("a", 1), ("b", 2)])
            .resolve(Some(vec![SqlValue::placeholder(), SqlValue::placeholder()]));
        assert_eq!(names, vec!["a", "b"]);
        assert!(values.iter().all(SqlValue::is_placeholder));
    }
}
