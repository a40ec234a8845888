//! migrator - apply versioned schema migrations to the catalog database
//!
//! Usage:
//!   migrator --migrations-path ./migrations
//!   migrator --print-schema

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use musiclib_common::config::{load_dotenv, DatabaseConfig};
use musiclib_common::db::{run_migrations, Artist, Entity, Song, SongDetail, Storage};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "migrator")]
#[command(about = "Apply musiclib database migrations")]
#[command(version)]
struct Args {
    /// Directory holding <version>_<name>.up.sql / .down.sql files
    #[arg(long, env = "MIGRATIONS_PATH", required_unless_present = "print_schema")]
    migrations_path: Option<PathBuf>,

    /// Print the DDL derived from the model metadata and exit
    #[arg(long)]
    print_schema: bool,

    #[command(flatten)]
    database: DatabaseConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    load_dotenv();
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    if args.print_schema {
        print_schema::<Artist>();
        print_schema::<Song>();
        print_schema::<SongDetail>();
        return Ok(());
    }

    let Some(dir) = args.migrations_path else {
        anyhow::bail!("--migrations-path is required");
    };

    args.database.validate()?;
    info!(
        "Starting migrator v{} [{}] built {}",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP")
    );

    let storage = Storage::connect(&args.database)
        .await
        .context("Failed to connect to database")?;

    let report = run_migrations(storage.pool(), &dir)
        .await
        .with_context(|| format!("Migration from {} failed", dir.display()))?;

    if report.is_noop() {
        println!("No migrations to apply");
    } else {
        println!(
            "Migrations ran successfully ({} of {} applied)",
            report.applied.len(),
            report.available
        );
    }

    storage.close().await;
    Ok(())
}

fn print_schema<T: Entity>() {
    println!("{};", T::create_table_sql());
    for index in T::create_index_sql() {
        println!("{};", index);
    }
    println!();
}
