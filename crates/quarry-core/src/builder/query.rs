//! The fluent query builder.

use super::coerce::ToInteger;
use super::columns::{inline_values, Columns};
use crate::dialect::Dialect;
use crate::error::{BuildError, Result};
use crate::value::SqlValue;

/// Keyword stripped from CREATE TABLE on dialects without it.
const AUTO_INCREMENT: &str = "auto_increment";

/// Statement kind selected by the last builder-starting call.
#[derive(Debug, Clone, Default, PartialEq)]
enum Statement {
    /// Rendered from clause fragments (SELECT, UPDATE, DELETE).
    #[default]
    Clauses,
    /// `CREATE TABLE` with rendered column definitions.
    CreateTable {
        table: String,
        columns: Vec<String>,
        strip_auto_increment: bool,
    },
    /// `DROP TABLE [IF EXISTS]`.
    DropTable { table: String, if_exists: bool },
    /// Single-row `INSERT` with inlined values.
    Insert {
        table: String,
        columns: Vec<String>,
        values: Vec<String>,
    },
}

/// Clause fragments, each already rendered.
#[derive(Debug, Clone, Default, PartialEq)]
struct Fragments {
    start: Option<String>,
    from: Option<String>,
    joins: Vec<String>,
    set: Option<String>,
    where_clause: Option<String>,
    group_by: Option<String>,
    order_by: Option<String>,
    limit: Option<String>,
    offset: Option<String>,
}

/// A fluent SQL builder that assembles statements from named fragments.
///
/// Every method consumes the builder and returns it, so one value carries
/// one logical statement. Builder-starting methods ([`select`],
/// [`update`], [`delete_from`], [`insert`], [`create_table`],
/// [`drop_table`]) clear all previously set fragments; dialect and table
/// prefix survive.
///
/// [`get_sql`] renders the current state and can be called any number of
/// times.
///
/// # Example
///
/// ```rust
/// use quarry_core::builder::QueryBuilder;
///
/// let sql = QueryBuilder::new()
///     .select("*")
///     .from("user")
///     .where_clause("id = 1")
///     .get_sql();
///
/// assert_eq!(sql, "SELECT\n\t*\nFROM user\nWHERE\n\t(id = 1)\n;");
/// ```
///
/// [`select`]: QueryBuilder::select
/// [`update`]: QueryBuilder::update
/// [`delete_from`]: QueryBuilder::delete_from
/// [`insert`]: QueryBuilder::insert
/// [`create_table`]: QueryBuilder::create_table
/// [`drop_table`]: QueryBuilder::drop_table
/// [`get_sql`]: QueryBuilder::get_sql
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryBuilder {
    dialect: Dialect,
    prefix: String,
    statement: Statement,
    parts: Fragments,
}

impl QueryBuilder {
    /// Creates an empty builder for the generic dialect with no prefix.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the dialect to consider when generating SQL.
    #[must_use]
    pub fn set_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Sets a prefix used in front of every table name.
    #[must_use]
    pub fn set_table_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Returns the active dialect.
    #[must_use]
    pub const fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Returns the table prefix.
    #[must_use]
    pub fn table_prefix(&self) -> &str {
        &self.prefix
    }

    /// Clears every fragment, keeping dialect and prefix.
    fn clear(&mut self) {
        self.statement = Statement::Clauses;
        self.parts = Fragments::default();
    }

    fn table(&self, name: &str) -> String {
        format!("{}{name}", self.prefix)
    }

    // ---------------------------------------------------------------------
    // Schema statements
    // ---------------------------------------------------------------------

    /// Builds `CREATE TABLE` from ordered column definitions.
    ///
    /// Each definition is a column name and its type/constraint tokens,
    /// joined by spaces. With the SQLite dialect every `auto_increment`
    /// is removed from the rendered statement.
    #[must_use]
    pub fn create_table<I, C, T, S>(mut self, name: &str, columns: I) -> Self
    where
        I: IntoIterator<Item = (C, T)>,
        C: AsRef<str>,
        T: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.clear();
        let columns = columns
            .into_iter()
            .map(|(column, options)| {
                let options: Vec<String> = options
                    .into_iter()
                    .map(|o| o.as_ref().to_string())
                    .collect();
                format!("\t{} {}", column.as_ref(), options.join(" "))
            })
            .collect();
        self.statement = Statement::CreateTable {
            table: self.table(name),
            columns,
            strip_auto_increment: !self.dialect.supports_auto_increment(),
        };
        self
    }

    /// Builds `DROP TABLE`.
    #[must_use]
    pub fn drop_table(mut self, name: &str) -> Self {
        self.clear();
        self.statement = Statement::DropTable {
            table: self.table(name),
            if_exists: false,
        };
        self
    }

    /// Builds `DROP TABLE IF EXISTS`.
    #[must_use]
    pub fn drop_table_if_exists(mut self, name: &str) -> Self {
        self.clear();
        self.statement = Statement::DropTable {
            table: self.table(name),
            if_exists: true,
        };
        self
    }

    // ---------------------------------------------------------------------
    // Data statements
    // ---------------------------------------------------------------------

    /// Builds a single-row `INSERT`.
    ///
    /// `columns` is either column/value pairs with `values` set to `None`,
    /// or column names with a parallel `values` list. Names without values
    /// insert one `?` per column. Values other than `?` are inlined as SQL
    /// literals.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::ColumnCountMismatch`] when the number of
    /// columns and values differ.
    pub fn insert(
        mut self,
        table: &str,
        columns: impl Into<Columns>,
        values: Option<Vec<SqlValue>>,
    ) -> Result<Self> {
        let (columns, values) = checked_columns(columns.into(), values)?;
        self.clear();
        self.statement = Statement::Insert {
            table: self.table(table),
            columns,
            values: inline_values(&values),
        };
        Ok(self)
    }

    /// Builds `UPDATE ... SET`.
    ///
    /// Column/value resolution follows [`insert`](Self::insert). Chain
    /// [`where_clause`](Self::where_clause) afterwards, or every row is
    /// updated.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::ColumnCountMismatch`] when the number of
    /// columns and values differ.
    pub fn update(
        mut self,
        table: &str,
        columns: impl Into<Columns>,
        values: Option<Vec<SqlValue>>,
    ) -> Result<Self> {
        let (columns, values) = checked_columns(columns.into(), values)?;
        self.clear();

        let assignments: Vec<String> = columns
            .iter()
            .zip(inline_values(&values))
            .map(|(column, value)| format!("\t{column} = {value}"))
            .collect();

        self.parts.start = Some(format!("UPDATE {}", self.table(table)));
        self.parts.set = Some(format!("SET\n{}", assignments.join(",\n")));
        Ok(self)
    }

    /// Builds `DELETE FROM`, optionally restricted by a condition.
    #[must_use]
    pub fn delete_from(mut self, table: &str, condition: Option<&str>) -> Self {
        self.clear();
        self.parts.start = Some(String::from("DELETE"));
        let builder = self.from(table);
        match condition {
            Some(condition) => builder.where_clause(condition),
            None => builder,
        }
    }

    /// Starts a `SELECT` of the given column expression.
    #[must_use]
    pub fn select(mut self, columns: &str) -> Self {
        self.clear();
        self.parts.start = Some(format!("SELECT\n\t{columns}"));
        self
    }

    /// Starts a `SELECT *`.
    #[must_use]
    pub fn select_all(self) -> Self {
        self.select("*")
    }

    // ---------------------------------------------------------------------
    // Clauses
    // ---------------------------------------------------------------------

    /// Sets the FROM table, replacing any previous one.
    #[must_use]
    pub fn from(mut self, table: &str) -> Self {
        self.parts.from = Some(format!("FROM {}", self.table(table)));
        self
    }

    /// Appends an `INNER JOIN`.
    #[must_use]
    pub fn join(self, table: &str, condition: &str) -> Self {
        self.push_join("INNER", table, condition)
    }

    /// Appends a `LEFT OUTER JOIN`.
    #[must_use]
    pub fn left_join(self, table: &str, condition: &str) -> Self {
        self.push_join("LEFT OUTER", table, condition)
    }

    /// Appends a `RIGHT OUTER JOIN`.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Unsupported`] when the dialect has no RIGHT
    /// JOIN (SQLite).
    pub fn right_join(self, table: &str, condition: &str) -> Result<Self> {
        if !self.dialect.supports_right_join() {
            return Err(BuildError::Unsupported {
                dialect: self.dialect,
                feature: "RIGHT JOIN",
            });
        }
        Ok(self.push_join("RIGHT OUTER", table, condition))
    }

    fn push_join(mut self, kind: &str, table: &str, condition: &str) -> Self {
        let join = format!("{kind} JOIN {}\n\tON {condition}", self.table(table));
        self.parts.joins.push(join);
        self
    }

    /// Sets the WHERE condition, replacing any previous one.
    #[must_use]
    pub fn where_clause(mut self, condition: &str) -> Self {
        self.parts.where_clause = Some(format!("WHERE\n\t({condition})"));
        self
    }

    /// Adds a condition to the WHERE clause with `AND`.
    ///
    /// Without a prior [`where_clause`](Self::where_clause) this starts the
    /// WHERE clause instead.
    #[must_use]
    pub fn and_where(mut self, condition: &str) -> Self {
        if self.parts.where_clause.is_none() {
            return self.where_clause(condition);
        }
        if let Some(existing) = self.parts.where_clause.as_mut() {
            existing.push_str(&format!("\n\tAND ({condition})"));
        }
        self
    }

    /// Sets the GROUP BY expression.
    #[must_use]
    pub fn group_by(mut self, expression: &str) -> Self {
        self.parts.group_by = Some(format!("GROUP BY {expression}"));
        self
    }

    /// Sets the ORDER BY expression.
    #[must_use]
    pub fn order_by(mut self, expression: &str) -> Self {
        self.parts.order_by = Some(format!("ORDER BY {expression}"));
        self
    }

    /// Sets LIMIT. Text that is not a number counts as 0.
    #[must_use]
    pub fn limit(mut self, count: impl ToInteger) -> Self {
        self.parts.limit = Some(format!("LIMIT \n\t{}", count.to_integer()));
        self
    }

    /// Sets OFFSET. Text that is not a number counts as 0.
    #[must_use]
    pub fn offset(mut self, count: impl ToInteger) -> Self {
        self.parts.offset = Some(format!("OFFSET \n\t{}", count.to_integer()));
        self
    }

    // ---------------------------------------------------------------------
    // Rendering
    // ---------------------------------------------------------------------

    /// Renders the statement.
    #[must_use]
    pub fn get_sql(&self) -> String {
        match &self.statement {
            Statement::Clauses => self.render_clauses(),
            Statement::CreateTable {
                table,
                columns,
                strip_auto_increment,
            } => {
                let sql = format!("CREATE TABLE {table}\n(\n{}\n);\n", columns.join(",\n"));
                if *strip_auto_increment {
                    sql.replace(AUTO_INCREMENT, "")
                } else {
                    sql
                }
            }
            Statement::DropTable { table, if_exists } => {
                if *if_exists {
                    format!("DROP TABLE IF EXISTS {table};\n")
                } else {
                    format!("DROP TABLE {table};\n")
                }
            }
            Statement::Insert {
                table,
                columns,
                values,
            } => format!(
                "INSERT INTO {table}\n\t({})\n\tVALUES\n\t({});\n",
                columns.join(", "),
                values.join(", ")
            ),
        }
    }

    fn render_clauses(&self) -> String {
        let parts = &self.parts;
        let mut sql = String::new();

        sql.push_str(parts.start.as_deref().unwrap_or_default());
        sql.push('\n');

        let clauses = [&parts.from]
            .into_iter()
            .flatten()
            .chain(parts.joins.iter())
            .chain(
                [
                    &parts.set,
                    &parts.where_clause,
                    &parts.group_by,
                    &parts.order_by,
                    &parts.limit,
                    &parts.offset,
                ]
                .into_iter()
                .flatten(),
            );

        for clause in clauses {
            sql.push_str(clause);
            sql.push('\n');
        }

        sql.push(';');
        sql
    }
}

fn checked_columns(
    columns: Columns,
    values: Option<Vec<SqlValue>>,
) -> Result<(Vec<String>, Vec<SqlValue>)> {
    let (columns, values) = columns.resolve(values);
    if columns.len() != values.len() {
        return Err(BuildError::ColumnCountMismatch {
            columns: columns.len(),
            values: values.len(),
        });
    }
    Ok((columns, values))
}
