//! PostgreSQL implementation of [`Store`]

use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Postgres, QueryBuilder};
use tracing::{debug, info};

use super::schema::{Entity, SqlValue};
use super::Store;
use crate::config::DatabaseConfig;
use crate::{Error, Result};

/// Upper bound on waiting for a pooled connection
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Pooled PostgreSQL connection shared by all request handlers
#[derive(Clone, Debug)]
pub struct Storage {
    pool: PgPool,
}

/// Difference between an entity's declared columns and the live table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaDrift {
    /// Table does not exist (migrations not applied)
    MissingTable { table: &'static str },
    /// Declared column missing from the table
    MissingColumn { table: &'static str, column: &'static str },
    /// NOT NULL declared but column is nullable, or the reverse
    NullabilityMismatch {
        table: &'static str,
        column: &'static str,
        expected_not_null: bool,
    },
}

impl std::fmt::Display for SchemaDrift {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaDrift::MissingTable { table } => write!(f, "table {} is missing", table),
            SchemaDrift::MissingColumn { table, column } => {
                write!(f, "column {}.{} is missing", table, column)
            }
            SchemaDrift::NullabilityMismatch {
                table,
                column,
                expected_not_null,
            } => write!(
                f,
                "column {}.{} should be {}",
                table,
                column,
                if *expected_not_null { "NOT NULL" } else { "nullable" }
            ),
        }
    }
}

impl Storage {
    /// Open the pool and ping the server
    ///
    /// Fails if the server is unreachable or rejects the credentials; callers
    /// treat that as fatal.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let options = config.connect_options()?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect_with(options)
            .await?;

        sqlx::query("SELECT 1").execute(&pool).await?;

        info!(
            host = %config.host,
            port = config.port,
            database = %config.name,
            "Connected to PostgreSQL"
        );

        Ok(Self { pool })
    }

    /// Wrap an existing pool
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Underlying pool (for migrations)
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Release every pooled connection. Call once at shutdown.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Database connections closed");
    }

    /// Compare `T`'s declared columns with information_schema
    pub async fn check_schema<T: Entity>(&self) -> Result<Vec<SchemaDrift>> {
        let rows: Vec<(String, String)> = sqlx::query_as(
            r#"
            SELECT column_name::text, is_nullable::text
            FROM information_schema.columns
            WHERE table_schema = current_schema() AND table_name = $1
            "#,
        )
        .bind(T::TABLE)
        .fetch_all(&self.pool)
        .await?;

        if rows.is_empty() {
            return Ok(vec![SchemaDrift::MissingTable { table: T::TABLE }]);
        }

        let mut drift = Vec::new();
        for column in T::columns() {
            match rows.iter().find(|(name, _)| name == column.name) {
                None => drift.push(SchemaDrift::MissingColumn {
                    table: T::TABLE,
                    column: column.name,
                }),
                Some((_, is_nullable)) => {
                    let actual_not_null = is_nullable == "NO";
                    if actual_not_null != column.not_null {
                        drift.push(SchemaDrift::NullabilityMismatch {
                            table: T::TABLE,
                            column: column.name,
                            expected_not_null: column.not_null,
                        });
                    }
                }
            }
        }
        Ok(drift)
    }
}

fn push_value(builder: &mut QueryBuilder<'_, Postgres>, value: SqlValue) {
    match value {
        SqlValue::BigInt(v) => builder.push_bind(v),
        SqlValue::Bool(v) => builder.push_bind(v),
        SqlValue::Text(v) => builder.push_bind(v),
        SqlValue::NullableText(v) => builder.push_bind(v),
        SqlValue::Date(v) => builder.push_bind(v),
    };
}

/// Unique and foreign-key violations become [`Error::Constraint`]
fn write_error<T: Entity>(err: sqlx::Error) -> Error {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() || db.is_foreign_key_violation() {
            return Error::Constraint {
                table: T::TABLE,
                constraint: db.constraint().unwrap_or("unknown").to_string(),
            };
        }
    }
    Error::Database(err)
}

fn ensure_column<T: Entity>(column: &str) -> Result<()> {
    if T::columns().iter().any(|c| c.name == column) {
        Ok(())
    } else {
        Err(Error::Database(sqlx::Error::ColumnNotFound(format!(
            "{}.{}",
            T::TABLE,
            column
        ))))
    }
}

#[async_trait]
impl Store for Storage {
    async fn find_all<T: Entity>(&self) -> Result<Vec<T>> {
        let sql = format!("SELECT {} FROM {} ORDER BY id", T::select_list(), T::TABLE);
        let rows = sqlx::query_as::<Postgres, T>(&sql)
            .fetch_all(&self.pool)
            .await?;
        debug!(table = T::TABLE, count = rows.len(), "Loaded rows");
        Ok(rows)
    }

    async fn first_by_id<T: Entity>(&self, id: i64) -> Result<T> {
        let sql = format!("SELECT {} FROM {} WHERE id = $1", T::select_list(), T::TABLE);
        sqlx::query_as::<Postgres, T>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(Error::NotFound { entity: T::NAME, id })
    }

    async fn first_by<T: Entity>(&self, column: &'static str, value: i64) -> Result<T> {
        ensure_column::<T>(column)?;
        let sql = format!(
            "SELECT {} FROM {} WHERE {} = $1 ORDER BY id LIMIT 1",
            T::select_list(),
            T::TABLE,
            column
        );
        sqlx::query_as::<Postgres, T>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(Error::NotFound {
                entity: T::NAME,
                id: value,
            })
    }

    async fn create<T: Entity>(&self, record: T) -> Result<T> {
        let values = record.values();

        let mut builder = QueryBuilder::<Postgres>::new("INSERT INTO ");
        builder.push(T::TABLE).push(" (");
        for (i, (column, _)) in values.iter().enumerate() {
            if i > 0 {
                builder.push(", ");
            }
            builder.push(*column);
        }
        builder.push(") VALUES (");
        for (i, (_, value)) in values.into_iter().enumerate() {
            if i > 0 {
                builder.push(", ");
            }
            push_value(&mut builder, value);
        }
        builder.push(") RETURNING ").push(T::select_list());

        let created = builder
            .build_query_as::<T>()
            .fetch_one(&self.pool)
            .await
            .map_err(write_error::<T>)?;
        debug!(table = T::TABLE, id = created.id(), "Inserted row");
        Ok(created)
    }

    async fn save<T: Entity>(&self, record: T) -> Result<T> {
        let id = record.id();

        let mut builder = QueryBuilder::<Postgres>::new("UPDATE ");
        builder.push(T::TABLE).push(" SET ");
        for (i, (column, value)) in record.values().into_iter().enumerate() {
            if i > 0 {
                builder.push(", ");
            }
            builder.push(column).push(" = ");
            push_value(&mut builder, value);
        }
        if T::tracks_updates() {
            builder.push(", updated_at = now()");
        }
        builder.push(" WHERE id = ");
        builder.push_bind(id);
        builder.push(" RETURNING ").push(T::select_list());

        builder
            .build_query_as::<T>()
            .fetch_optional(&self.pool)
            .await
            .map_err(write_error::<T>)?
            .ok_or(Error::NotFound { entity: T::NAME, id })
    }

    async fn delete_by_id<T: Entity>(&self, id: i64) -> Result<u64> {
        let sql = format!("DELETE FROM {} WHERE id = $1", T::TABLE);
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        debug!(table = T::TABLE, id, rows = result.rows_affected(), "Deleted");
        Ok(result.rows_affected())
    }
}
