//! SQL dialect support.
//!
//! Different databases have slightly different SQL syntax. The builder
//! consults the dialect for the few features that differ between the
//! supported engines.

use std::fmt;
use std::str::FromStr;

/// The target SQL engine.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// ANSI SQL with no engine-specific behavior.
    #[default]
    Generic,
    /// MySQL / MariaDB.
    MySql,
    /// SQLite.
    Sqlite,
    /// PostgreSQL.
    Postgres,
}

impl Dialect {
    /// Returns the name of the dialect, as it appears in a DSN scheme.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Generic => "generic",
            Self::MySql => "mysql",
            Self::Sqlite => "sqlite",
            Self::Postgres => "pgsql",
        }
    }

    /// Derives the dialect from a DSN such as `sqlite::memory:` or
    /// `mysql:host=localhost;dbname=test`.
    ///
    /// The scheme is the text before the first `:`. Unknown schemes map to
    /// [`Dialect::Generic`].
    #[must_use]
    pub fn from_dsn(dsn: &str) -> Self {
        let scheme = dsn.split(':').next().unwrap_or_default();
        scheme.parse().unwrap_or_default()
    }

    /// Returns whether the dialect supports `RIGHT [OUTER] JOIN`.
    ///
    /// SQLite only gained RIGHT JOIN in 3.39 and the builder treats it as
    /// unsupported.
    #[must_use]
    pub const fn supports_right_join(self) -> bool {
        !matches!(self, Self::Sqlite)
    }

    /// Returns whether the dialect understands the `auto_increment` column
    /// keyword.
    ///
    /// In SQLite an `INTEGER PRIMARY KEY` column is implicitly
    /// auto-incrementing and the keyword is a syntax error.
    #[must_use]
    pub const fn supports_auto_increment(self) -> bool {
        !matches!(self, Self::Sqlite)
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a dialect name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown SQL dialect: {0}")]
pub struct UnknownDialect(pub String);

impl FromStr for Dialect {
    type Err = UnknownDialect;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "generic" => Ok(Self::Generic),
            "mysql" | "mariadb" => Ok(Self::MySql),
            "sqlite" | "sqlite3" => Ok(Self::Sqlite),
            "pgsql" | "postgres" | "postgresql" => Ok(Self::Postgres),
            other => Err(UnknownDialect(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialect_from_dsn() {
        assert_eq!(Dialect::from_dsn("sqlite::memory:"), Dialect::Sqlite);
        assert_eq!(
            Dialect::from_dsn("mysql:host=127.0.0.1;dbname=test"),
            Dialect::MySql
        );
        assert_eq!(Dialect::from_dsn("pgsql:dbname=test"), Dialect::Postgres);
        assert_eq!(Dialect::from_dsn("odbc:whatever"), Dialect::Generic);
        assert_eq!(Dialect::from_dsn(""), Dialect::Generic);
    }

    #[test]
    fn test_sqlite_capabilities() {
        assert!(!Dialect::Sqlite.supports_right_join());
        assert!(!Dialect::Sqlite.supports_auto_increment());
        assert!(Dialect::MySql.supports_right_join());
        assert!(Dialect::MySql.supports_auto_increment());
    }

    #[test]
    fn test_dialect_names_round_trip() {
        for dialect in [
            Dialect::Generic,
            Dialect::MySql,
            Dialect::Sqlite,
            Dialect::Postgres,
        ] {
            assert_eq!(dialect.name().parse::<Dialect>(), Ok(dialect));
        }
    }

    #[test]
    fn test_unknown_dialect() {
        let err = "oracle".parse::<Dialect>().unwrap_err();
        assert_eq!(err.to_string(), "unknown SQL dialect: oracle");
    }
}
