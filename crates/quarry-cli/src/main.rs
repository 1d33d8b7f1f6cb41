//! quarry CLI
//!
//! Runs SQL statements and builder queries against a database.

mod values;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use quarry_core::QueryBuilder;
use quarry_db::{Database, DatabaseOptions};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use crate::values::{parse_param, row_to_json};

/// Run SQL against a database with positional and list parameters.
#[derive(Parser)]
#[command(name = "quarry")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Data source name, e.g. `sqlite:data.db` or `sqlite::memory:`.
    #[arg(short, long, env = "QUARRY_DSN")]
    dsn: Option<String>,

    /// JSON configuration file; command-line flags override its keys.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Table prefix for builder queries.
    #[arg(long)]
    prefix: Option<String>,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    /// Show the driver error when the connection fails.
    #[arg(long)]
    debug_connect: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a statement and print its rows as JSON.
    Exec {
        /// The SQL, with `?` placeholders.
        sql: String,

        /// Positional parameters; `[a,b]` binds a list to one `?`.
        #[arg(short, long = "param")]
        params: Vec<String>,
    },

    /// Build a SELECT, execute it and print its rows as JSON.
    Select {
        /// Table to select from (prefixed).
        #[arg(short, long)]
        table: String,

        /// Column expression.
        #[arg(long, default_value = "*")]
        columns: String,

        /// WHERE condition, with `?` placeholders.
        #[arg(short, long = "where")]
        condition: Option<String>,

        /// ORDER BY expression.
        #[arg(long)]
        order_by: Option<String>,

        /// LIMIT.
        #[arg(long)]
        limit: Option<i64>,

        /// OFFSET.
        #[arg(long)]
        offset: Option<i64>,

        /// Positional parameters for the condition.
        #[arg(short, long = "param")]
        params: Vec<String>,

        /// Print the SQL without executing it.
        #[arg(long)]
        dry_run: bool,
    },
}

fn load_options(cli: &Cli) -> anyhow::Result<DatabaseOptions> {
    let mut options = match &cli.config {
        Some(path) => DatabaseOptions::from_json_file(path)?,
        None => DatabaseOptions::default(),
    };

    if let Some(dsn) = &cli.dsn {
        options.dsn = Some(dsn.clone());
    }
    if let Some(prefix) = &cli.prefix {
        options.table_prefix.clone_from(prefix);
    }
    options.verbose |= cli.verbose;
    options.debug_connect |= cli.debug_connect;
    Ok(options)
}

fn build_select(
    builder: QueryBuilder,
    table: &str,
    columns: &str,
    condition: Option<&str>,
    order_by: Option<&str>,
    limit: Option<i64>,
    offset: Option<i64>,
) -> QueryBuilder {
    let mut query = builder.select(columns).from(table);
    if let Some(condition) = condition {
        query = query.where_clause(condition);
    }
    if let Some(order_by) = order_by {
        query = query.order_by(order_by);
    }
    if let Some(limit) = limit {
        query = query.limit(limit);
    }
    if let Some(offset) = offset {
        query = query.offset(offset);
    }
    query
}

async fn run(db: &mut Database, sql: String, params: &[String]) -> anyhow::Result<()> {
    let params = params.iter().map(|p| parse_param(p)).collect();
    db.execute(sql, params).await?;

    let rows: Vec<_> = db.fetch_all()?.iter().map(row_to_json).collect();
    if rows.is_empty() {
        let rows_affected = db.row_count()?;
        match db.last_insert_id() {
            Ok(id) if rows_affected > 0 => {
                info!(rows_affected, last_insert_id = id, "Statement executed");
            }
            _ => info!(rows_affected, "Statement executed"),
        }
    } else {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let options = load_options(&cli)?;
    let mut db = Database::new(options);

    match cli.command {
        Commands::Exec { sql, params } => {
            db.connect().await?;
            run(&mut db, sql, &params).await?;
        }

        Commands::Select {
            table,
            columns,
            condition,
            order_by,
            limit,
            offset,
            params,
            dry_run,
        } => {
            let query = build_select(
                db.builder(),
                &table,
                &columns,
                condition.as_deref(),
                order_by.as_deref(),
                limit,
                offset,
            );

            if dry_run {
                println!("{}", query.get_sql());
            } else {
                db.connect().await?;
                run(&mut db, query.get_sql(), &params).await?;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_exec() {
        let cli = Cli::parse_from([
            "quarry",
            "--dsn",
            "sqlite::memory:",
            "exec",
            "SELECT * FROM t WHERE id IN (?)",
            "-p",
            "[1,2]",
        ]);
        assert_eq!(cli.dsn.as_deref(), Some("sqlite::memory:"));
        match cli.command {
            Commands::Exec { sql, params } => {
                assert_eq!(sql, "SELECT * FROM t WHERE id IN (?)");
                assert_eq!(params, vec![String::from("[1,2]")]);
            }
            Commands::Select { .. } => panic!("expected exec"),
        }
    }

    #[test]
    fn test_flags_override_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quarry.json");
        std::fs::write(&path, r#"{ "dsn": "sqlite:a.db", "table_prefix": "a_" }"#).unwrap();

        let cli = Cli::parse_from([
            "quarry",
            "--config",
            path.to_str().unwrap(),
            "--prefix",
            "b_",
            "--verbose",
            "exec",
            "SELECT 1",
        ]);
        let options = load_options(&cli).unwrap();
        assert_eq!(options.dsn.as_deref(), Some("sqlite:a.db"));
        assert_eq!(options.table_prefix, "b_");
        assert!(options.verbose);
    }

    #[test]
    fn test_build_select() {
        let query = build_select(
            QueryBuilder::new().set_table_prefix("mos_"),
            "test",
            "*",
            Some("id > ?"),
            Some("id"),
            Some(2),
            None,
        );
        assert_eq!(
            query.get_sql(),
            "SELECT\n\t*\nFROM mos_test\nWHERE\n\t(id > ?)\nORDER BY id\nLIMIT \n\t2\n;"
        );
    }
}
