//! oxide-dml CLI
//!
//! Command-line tool for rendering and running typed merges against SQLite.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use oxide_dml_cli::{execute, plan, ColumnAssignment, MergeRequest};

/// Typed SQL merges from the command line.
#[derive(Parser)]
#[command(name = "oxide-dml")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path of the SQLite database.
    #[arg(short, long, env = "OXIDE_DML_DATABASE", default_value = "db.sqlite3")]
    database: PathBuf,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Insert a row, or update it when its key already exists.
    Merge {
        /// Target table.
        #[arg(short, long)]
        table: String,

        /// Schema qualifying the table.
        #[arg(long)]
        schema: Option<String>,

        /// Key column (repeatable); each key must also be assigned.
        #[arg(short, long = "key", required = true)]
        keys: Vec<String>,

        /// Column assignment as column=kind:value, kind one of int, real,
        /// text, bool, url; or column=null (repeatable).
        #[arg(short = 's', long = "set", required = true)]
        assignments: Vec<ColumnAssignment>,

        /// Probe then UPDATE or INSERT instead of a single upsert statement.
        #[arg(long)]
        composite: bool,

        /// Show SQL without executing (dry run).
        #[arg(long)]
        dry_run: bool,

        /// Print the dry-run plan as JSON.
        #[arg(long, requires = "dry_run")]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
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
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Merge {
            table,
            schema,
            keys,
            assignments,
            composite,
            dry_run,
            json,
        } => {
            let request = MergeRequest {
                table,
                schema,
                keys,
                assignments,
                composite,
            };

            if dry_run {
                let plan = plan(&request)?;
                if json {
                    println!("{}", serde_json::to_string_pretty(&plan)?);
                } else {
                    info!("Dry run mode - SQL will be printed but not executed.");
                    println!("-- strategy: {}", plan.strategy);
                    println!("{};", plan.sql);
                    for (i, value) in plan.parameters.iter().enumerate() {
                        println!("--   ?{} = {}", i + 1, value.to_sql_inline());
                    }
                }
                return Ok(());
            }

            let db = rusqlite::Connection::open(&cli.database)?;
            let rows = execute(&db, &request)?;
            println!("{rows} row(s) affected");
        }
    }

    Ok(())
}
