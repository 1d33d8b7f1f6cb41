//! Connection configuration.
//!
//! [`DatabaseOptions`] holds every connection setting. Each key has a
//! default, so a JSON document only needs the keys it changes:
//!
//! ```rust
//! use quarry_db::{DatabaseOptions, FetchMode};
//!
//! let options = DatabaseOptions::from_json_str(
//!     r#"{ "dsn": "sqlite::memory:", "table_prefix": "mos_" }"#,
//! )
//! .unwrap();
//!
//! assert_eq!(options.table_prefix, "mos_");
//! assert_eq!(options.fetch_mode, FetchMode::Named);
//! assert_eq!(options.session_key, "quarry.database");
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use quarry_core::Dialect;
use serde::{Deserialize, Serialize};

use crate::error::{DbError, Result};

/// Default key for saved query history.
pub const DEFAULT_SESSION_KEY: &str = "quarry.database";

/// Shape of fetched rows.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchMode {
    /// Columns are addressed by name.
    #[default]
    Named,
    /// Column names are replaced by their positions.
    Indexed,
}

/// Connection settings.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseOptions {
    /// Data source name, e.g. `sqlite::memory:` or `sqlite:data.db`.
    pub dsn: Option<String>,
    /// Login name, for drivers that take one.
    pub username: Option<String>,
    /// Password, for drivers that take one.
    pub password: Option<String>,
    /// Driver settings; applied as pragmas on SQLite.
    pub driver_options: BTreeMap<String, String>,
    /// Prefix for every table name in builders obtained from the database.
    pub table_prefix: String,
    /// Shape of fetched rows.
    pub fetch_mode: FetchMode,
    /// Key under which query history is saved.
    pub session_key: String,
    /// Log connects and statements at info level.
    pub verbose: bool,
    /// Propagate the native error on connection failure.
    pub debug_connect: bool,
}

impl Default for DatabaseOptions {
    fn default() -> Self {
        Self {
            dsn: None,
            username: None,
            password: None,
            driver_options: BTreeMap::new(),
            table_prefix: String::new(),
            fetch_mode: FetchMode::Named,
            session_key: String::from(DEFAULT_SESSION_KEY),
            verbose: false,
            debug_connect: false,
        }
    }
}

impl fmt::Debug for DatabaseOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseOptions")
            .field("dsn", &self.dsn)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<hidden>"))
            .field("driver_options", &self.driver_options)
            .field("table_prefix", &self.table_prefix)
            .field("fetch_mode", &self.fetch_mode)
            .field("session_key", &self.session_key)
            .field("verbose", &self.verbose)
            .field("debug_connect", &self.debug_connect)
            .finish()
    }
}

impl DatabaseOptions {
    /// Creates options for a DSN, everything else defaulted.
    #[must_use]
    pub fn new(dsn: impl Into<String>) -> Self {
        Self {
            dsn: Some(dsn.into()),
            ..Self::default()
        }
    }

    /// Parses options from a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Json`] when the document is malformed.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads options from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Io`] when the file cannot be read and
    /// [`DbError::Json`] when it is malformed.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| DbError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Sets the DSN.
    #[must_use]
    pub fn dsn(mut self, dsn: impl Into<String>) -> Self {
        self.dsn = Some(dsn.into());
        self
    }

    /// Sets the table prefix.
    #[must_use]
    pub fn table_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.table_prefix = prefix.into();
        self
    }

    /// Sets the fetch mode.
    #[must_use]
    pub const fn fetch_mode(mut self, mode: FetchMode) -> Self {
        self.fetch_mode = mode;
        self
    }

    /// Sets the history key.
    #[must_use]
    pub fn session_key(mut self, key: impl Into<String>) -> Self {
        self.session_key = key.into();
        self
    }

    /// Enables info-level logging of connects and statements.
    #[must_use]
    pub const fn verbose(mut self, enabled: bool) -> Self {
        self.verbose = enabled;
        self
    }

    /// Lets the native connection error through.
    #[must_use]
    pub const fn debug_connect(mut self, enabled: bool) -> Self {
        self.debug_connect = enabled;
        self
    }

    /// Adds a driver option.
    #[must_use]
    pub fn driver_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.driver_options.insert(key.into(), value.into());
        self
    }

    /// Returns the dialect named by the DSN scheme.
    #[must_use]
    pub fn dialect(&self) -> Dialect {
        self.dsn.as_deref().map(Dialect::from_dsn).unwrap_or_default()
    }
}
