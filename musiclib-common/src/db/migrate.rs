//! Versioned schema migrations
//!
//! Migration files live in a directory as `<version>_<name>.up.sql` /
//! `<version>_<name>.down.sql` pairs and are applied in version order.

use std::path::Path;

use sqlx::migrate::Migrator;
use sqlx::PgPool;
use tracing::info;

use crate::{Error, Result};

/// Outcome of a migration run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    /// Versions applied by this run, in order
    pub applied: Vec<i64>,
    /// Versions found in the directory
    pub available: usize,
}

impl MigrationReport {
    /// True when the database was already up to date
    pub fn is_noop(&self) -> bool {
        self.applied.is_empty()
    }
}

/// Apply every pending migration found in `dir`
pub async fn run_migrations(pool: &PgPool, dir: &Path) -> Result<MigrationReport> {
    if !dir.is_dir() {
        return Err(Error::Config(format!(
            "Migrations directory not found: {}",
            dir.display()
        )));
    }

    let migrator = Migrator::new(dir).await?;

    let before: Vec<i64> = applied_versions(pool).await?;
    migrator.run(pool).await?;
    let after: Vec<i64> = applied_versions(pool).await?;

    let applied: Vec<i64> = after
        .into_iter()
        .filter(|v| !before.contains(v))
        .collect();

    for version in &applied {
        info!(version, "Applied migration");
    }

    Ok(MigrationReport {
        applied,
        available: migrator.iter().filter(|m| m.migration_type.is_up_migration()).count(),
    })
}

/// Versions recorded in `_sqlx_migrations` (empty before the first run)
async fn applied_versions(pool: &PgPool) -> Result<Vec<i64>> {
    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM information_schema.tables \
         WHERE table_schema = current_schema() AND table_name = '_sqlx_migrations')",
    )
    .fetch_one(pool)
    .await?;

    if !exists {
        return Ok(Vec::new());
    }

    let versions = sqlx::query_scalar("SELECT version FROM _sqlx_migrations ORDER BY version")
        .fetch_all(pool)
        .await?;
    Ok(versions)
}
