//! The statement executor.

use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use futures::TryStreamExt;
use quarry_core::params::{count_placeholders, expand_params};
use quarry_core::{AsSql, Dialect, Entity, Param, QueryBuilder, Row, SqlValue};
use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqliteConnectOptions, SqliteConnection, SqliteRow};
use sqlx::{Column, Connection, Either, Executor, Row as _, Sqlite, TypeInfo, ValueRef};
use tracing::{debug, info, warn};

use crate::error::{DbError, Result};
use crate::history::{describe_param, HistoryStore, QueryHistory, QueryObserver};
use crate::options::{DatabaseOptions, FetchMode};

/// Leading keywords of statements that return rows instead of changing them.
const QUERY_KEYWORDS: &[&str] = &["SELECT", "WITH", "PRAGMA", "EXPLAIN", "VALUES"];

/// Rows and counters of the last executed statement.
#[derive(Debug, Default)]
struct StatementResult {
    rows: VecDeque<Row>,
    rows_affected: u64,
}

/// A database connection that executes SQL with positional parameters.
///
/// The database connects lazily through [`connect`](Self::connect).
/// [`execute`](Self::execute) expands list parameters, runs the statement
/// and buffers its rows; the `fetch_*` methods then consume those rows in
/// order, like a cursor.
///
/// # Example
///
/// ```rust,no_run
/// use quarry_core::params;
/// use quarry_db::{Database, DatabaseOptions};
///
/// # async fn run() -> quarry_db::Result<()> {
/// let mut db = Database::new(DatabaseOptions::new("sqlite::memory:"));
/// db.connect().await?;
///
/// db.execute("CREATE TABLE user (id INTEGER PRIMARY KEY, name TEXT)", vec![])
///     .await?;
/// db.execute("INSERT INTO user (name) VALUES (?)", params!["moomin"])
///     .await?;
///
/// let rows = db
///     .execute_fetch_all("SELECT * FROM user WHERE id IN (?)", params![quarry_core::Param::list([1, 2])])
///     .await?;
/// assert_eq!(rows.len(), 1);
/// # Ok(())
/// # }
/// ```
pub struct Database {
    options: DatabaseOptions,
    conn: Option<SqliteConnection>,
    result: Option<StatementResult>,
    last_insert_id: Option<i64>,
    observers: Vec<Arc<dyn QueryObserver>>,
    history: Option<Arc<QueryHistory>>,
    history_store: Option<Arc<dyn HistoryStore>>,
    num_queries: usize,
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("options", &self.options)
            .field("connected", &self.conn.is_some())
            .field("last_insert_id", &self.last_insert_id)
            .field("observers", &self.observers.len())
            .field("num_queries", &self.num_queries)
            .finish_non_exhaustive()
    }
}

impl Database {
    /// Creates an unconnected database.
    #[must_use]
    pub fn new(options: DatabaseOptions) -> Self {
        Self {
            options,
            conn: None,
            result: None,
            last_insert_id: None,
            observers: Vec::new(),
            history: None,
            history_store: None,
            num_queries: 0,
        }
    }

    /// Returns the options.
    #[must_use]
    pub const fn options(&self) -> &DatabaseOptions {
        &self.options
    }

    /// Replaces the options. Takes effect on the next connect.
    pub fn set_options(&mut self, options: DatabaseOptions) {
        self.options = options;
    }

    /// Returns whether a connection is open.
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    /// Opens the connection. Does nothing when already connected.
    ///
    /// When a history store is attached, the saved history is loaded first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::MissingDsn`] without a DSN. A failed connection
    /// returns [`DbError::Connection`], or [`DbError::Native`] carrying the
    /// driver error when `debug_connect` is set.
    pub async fn connect(&mut self) -> Result<&mut Self> {
        if self.conn.is_some() {
            return Ok(self);
        }
        let dsn = self.options.dsn.clone().ok_or(DbError::MissingDsn)?;

        if self.options.verbose {
            info!(dsn = %dsn, "Connecting to dsn");
        } else {
            debug!(dialect = %self.options.dialect(), "Connecting");
        }

        self.load_history()?;

        match self.open(&dsn).await {
            Ok(conn) => {
                self.conn = Some(conn);
                Ok(self)
            }
            Err(e) if self.options.debug_connect => Err(DbError::Native(e)),
            Err(e) => {
                debug!(error = %e, "Connection failed");
                Err(DbError::Connection)
            }
        }
    }

    async fn open(&self, dsn: &str) -> std::result::Result<SqliteConnection, sqlx::Error> {
        let dialect = Dialect::from_dsn(dsn);
        if dialect != Dialect::Sqlite {
            return Err(sqlx::Error::Configuration(
                format!("no driver available for the '{dialect}' dsn scheme").into(),
            ));
        }
        let mut options = SqliteConnectOptions::from_str(dsn)?.create_if_missing(true);
        for (key, value) in &self.options.driver_options {
            options = options.pragma(key.clone(), value.clone());
        }
        SqliteConnection::connect_with(&options).await
    }

    /// Returns a builder using the connection's dialect and table prefix.
    #[must_use]
    pub fn builder(&self) -> QueryBuilder {
        QueryBuilder::new()
            .set_dialect(self.options.dialect())
            .set_table_prefix(self.options.table_prefix.clone())
    }

    /// Registers an observer notified of every executed statement.
    pub fn add_observer(&mut self, observer: Arc<dyn QueryObserver>) {
        self.observers.push(observer);
    }

    /// Starts recording query history and returns it.
    ///
    /// Calling this again returns the same history.
    pub fn enable_history(&mut self) -> Arc<QueryHistory> {
        if let Some(history) = &self.history {
            return Arc::clone(history);
        }
        let history = Arc::new(QueryHistory::new());
        self.observers.push(history.clone());
        self.history = Some(Arc::clone(&history));
        history
    }

    /// Returns the query history, if enabled.
    #[must_use]
    pub const fn history(&self) -> Option<&Arc<QueryHistory>> {
        self.history.as_ref()
    }

    /// Attaches the store used by [`save_history`](Self::save_history) and
    /// [`load_history`](Self::load_history).
    pub fn set_history_store(&mut self, store: Arc<dyn HistoryStore>) {
        self.history_store = Some(store);
    }

    /// Saves the query history under the configured session key, after
    /// appending `extra` as a note. Returns whether anything was saved,
    /// which requires both a history and a store.
    ///
    /// # Errors
    ///
    /// Returns the store's error when the snapshot cannot be written.
    pub fn save_history(&self, extra: Option<&str>) -> Result<bool> {
        match (&self.history, &self.history_store) {
            (Some(history), Some(store)) => {
                history.save(store.as_ref(), &self.options.session_key, extra)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Loads the query history saved under the configured session key.
    /// Returns whether a snapshot was found.
    ///
    /// # Errors
    ///
    /// Returns the store's error when the snapshot cannot be read.
    pub fn load_history(&self) -> Result<bool> {
        match (&self.history, &self.history_store) {
            (Some(history), Some(store)) => history.load(store.as_ref(), &self.options.session_key),
            _ => Ok(false),
        }
    }

    /// Executes a statement.
    ///
    /// `query` is SQL text or anything rendering to it, such as a
    /// [`QueryBuilder`]. List parameters are expanded first. Rows are
    /// buffered for the `fetch_*` methods, replacing those of the previous
    /// statement. After a failed statement nothing is left to fetch.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::NotConnected`] before `connect()` and
    /// [`DbError::Statement`] when the driver rejects the statement.
    pub async fn execute(&mut self, query: impl AsSql, params: Vec<Param>) -> Result<&mut Self> {
        let query = query.as_sql();
        let Some(conn) = self.conn.as_mut() else {
            return Err(DbError::NotConnected);
        };

        for observer in &self.observers {
            observer.on_statement(&query, &params);
        }
        self.num_queries += 1;

        if self.options.verbose {
            let described: Vec<String> = params.iter().map(describe_param).collect();
            info!(num_query = self.num_queries, sql = %query, params = ?described, "Executing statement");
        } else {
            debug!(sql = %query, params = params.len(), "Executing statement");
        }

        let (sql, values) = expand_params(&query, params);
        self.result = None;

        let mut rows = VecDeque::new();
        let mut rows_affected = 0;
        let mut last_insert_id = None;

        let outcome: std::result::Result<(), sqlx::Error> = async {
            let mut statement = sqlx::query(&sql);
            for value in &values {
                statement = bind_param(statement, value.clone());
            }

            let mut stream = conn.fetch_many(statement);
            while let Some(step) = stream.try_next().await? {
                match step {
                    Either::Left(done) => {
                        rows_affected += done.rows_affected();
                        last_insert_id = Some(done.last_insert_rowid());
                    }
                    Either::Right(row) => rows.push_back(decode_row(&row)?),
                }
            }
            Ok(())
        }
        .await;

        if let Err(source) = outcome {
            let warning = placeholder_warning(&sql, values.len());
            warn!(sql = %sql, error = %source, "Statement failed");
            return Err(DbError::Statement {
                message: source.to_string(),
                param_count: values.len(),
                params: values
                    .iter()
                    .map(SqlValue::to_sql_inline)
                    .collect::<Vec<_>>()
                    .join("\n"),
                sql,
                warning,
                source,
            });
        }

        // SQLite reports the change count of the last modifying statement
        // even for queries.
        if !rows.is_empty() || is_query(&sql) {
            rows_affected = 0;
        }
        if last_insert_id.is_some() {
            self.last_insert_id = last_insert_id;
        }
        self.result = Some(StatementResult {
            rows,
            rows_affected,
        });
        Ok(self)
    }

    /// Executes a statement and fetches all its rows.
    ///
    /// # Errors
    ///
    /// See [`execute`](Self::execute).
    pub async fn execute_fetch_all(
        &mut self,
        query: impl AsSql,
        params: Vec<Param>,
    ) -> Result<Vec<Row>> {
        self.execute(query, params).await?;
        self.fetch_all()
    }

    fn result_mut(&mut self) -> Result<&mut StatementResult> {
        self.result.as_mut().ok_or(DbError::NotExecuted)
    }

    fn shape(&self, row: Row) -> Row {
        match self.options.fetch_mode {
            FetchMode::Named => row,
            FetchMode::Indexed => row.into_indexed(),
        }
    }

    /// Fetches the next row, or `None` when all rows are consumed.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::NotExecuted`] before any statement.
    pub fn fetch_one(&mut self) -> Result<Option<Row>> {
        let row = self.result_mut()?.rows.pop_front();
        Ok(row.map(|row| self.shape(row)))
    }

    /// Fetches every remaining row.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::NotExecuted`] before any statement.
    pub fn fetch_all(&mut self) -> Result<Vec<Row>> {
        let rows: Vec<Row> = self.result_mut()?.rows.drain(..).collect();
        Ok(rows.into_iter().map(|row| self.shape(row)).collect())
    }

    /// Copies the next row into `target`. Returns `false` when all rows are
    /// consumed, leaving `target` untouched.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::NotExecuted`] before any statement and
    /// [`DbError::Value`] when a column does not fit its field.
    pub fn fetch_into<T: Entity>(&mut self, target: &mut T) -> Result<bool> {
        match self.result_mut()?.rows.pop_front() {
            Some(row) => {
                target.hydrate(&row)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Fetches the next row as a new `T`.
    ///
    /// # Errors
    ///
    /// See [`fetch_into`](Self::fetch_into).
    pub fn fetch_object<T: Entity + Default>(&mut self) -> Result<Option<T>> {
        let mut object = T::default();
        if self.fetch_into(&mut object)? {
            Ok(Some(object))
        } else {
            Ok(None)
        }
    }

    /// Fetches every remaining row as a `T`.
    ///
    /// # Errors
    ///
    /// See [`fetch_into`](Self::fetch_into).
    pub fn fetch_all_as<T: Entity + Default>(&mut self) -> Result<Vec<T>> {
        let mut objects = Vec::new();
        while let Some(object) = self.fetch_object()? {
            objects.push(object);
        }
        Ok(objects)
    }

    /// Returns the rowid of the last inserted row on this connection.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::NotExecuted`] before any statement.
    pub fn last_insert_id(&self) -> Result<i64> {
        self.last_insert_id.ok_or(DbError::NotExecuted)
    }

    /// Returns the number of rows changed by the last statement; 0 for
    /// queries.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::NotExecuted`] before any statement.
    pub fn row_count(&self) -> Result<u64> {
        self.result
            .as_ref()
            .map(|r| r.rows_affected)
            .ok_or(DbError::NotExecuted)
    }

    /// Number of statements executed through this database.
    #[must_use]
    pub const fn num_queries(&self) -> usize {
        self.num_queries
    }
}

/// Binds a `SqlValue` to a query.
fn bind_param<'q>(
    query: Query<'q, Sqlite, SqliteArguments<'q>>,
    value: SqlValue,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    match value {
        SqlValue::Null => query.bind(Option::<i64>::None),
        SqlValue::Bool(b) => query.bind(b),
        SqlValue::Int(i) => query.bind(i),
        SqlValue::Float(f) => query.bind(f),
        SqlValue::Text(s) => query.bind(s),
        SqlValue::Blob(b) => query.bind(b),
    }
}

/// Converts a driver row by the storage class of each value.
fn decode_row(row: &SqliteRow) -> std::result::Result<Row, sqlx::Error> {
    let mut pairs = Vec::with_capacity(row.len());

    for (idx, column) in row.columns().iter().enumerate() {
        let raw = row.try_get_raw(idx)?;
        let value = if raw.is_null() {
            SqlValue::Null
        } else {
            match raw.type_info().name() {
                "INTEGER" | "BOOLEAN" => SqlValue::Int(row.try_get_unchecked(idx)?),
                "REAL" => SqlValue::Float(row.try_get_unchecked(idx)?),
                "BLOB" => SqlValue::Blob(row.try_get_unchecked(idx)?),
                _ => SqlValue::Text(row.try_get_unchecked(idx)?),
            }
        };
        pairs.push((column.name(), value));
    }

    Ok(Row::from_pairs(pairs))
}

fn is_query(sql: &str) -> bool {
    let keyword: String = sql
        .trim_start()
        .chars()
        .take_while(char::is_ascii_alphabetic)
        .collect();
    QUERY_KEYWORDS
        .iter()
        .any(|k| k.eq_ignore_ascii_case(&keyword))
}

fn placeholder_warning(sql: &str, params: usize) -> Option<String> {
    let placeholders = count_placeholders(sql);
    (placeholders != params).then(|| {
        format!("WARNING: the statement has {placeholders} placeholders but {params} parameters were given")
    })
}
