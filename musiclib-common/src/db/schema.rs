//! Declarative table schemas
//!
//! Each entity declares its table once: column names, SQL types and constraints.
//! The storage adapter builds every SELECT / INSERT / UPDATE from this metadata,
//! and `migrations/` creates the same tables.
//!
//! # Usage
//!
//! ```rust,ignore
//! impl Entity for Artist {
//!     const TABLE: &'static str = "artists";
//!     const NAME: &'static str = "artist";
//!
//!     fn columns() -> Vec<ColumnDefinition> {
//!         vec![
//!             ColumnDefinition::new("id", "BIGSERIAL").primary_key(),
//!             ColumnDefinition::new("name", "TEXT").not_null().unique(),
//!             ColumnDefinition::new("is_group", "BOOLEAN").not_null().default("FALSE"),
//!         ]
//!     }
//!     // ...
//! }
//! ```

use chrono::NaiveDate;
use serde::{de::DeserializeOwned, Serialize};
use sqlx::postgres::PgRow;
use sqlx::FromRow;

/// Referential action for a foreign key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnAction {
    Cascade,
    Restrict,
}

impl OnAction {
    pub fn as_sql(self) -> &'static str {
        match self {
            OnAction::Cascade => "CASCADE",
            OnAction::Restrict => "RESTRICT",
        }
    }
}

/// Foreign key from a column to another table's primary key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    pub table: &'static str,
    pub column: &'static str,
    pub on_update: OnAction,
    pub on_delete: OnAction,
}

/// Column definition with SQL constraints
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDefinition {
    /// Column name
    pub name: &'static str,
    /// SQL type (e.g. "BIGSERIAL", "TEXT", "DATE", "TIMESTAMPTZ")
    pub sql_type: &'static str,
    /// NOT NULL constraint
    pub not_null: bool,
    /// PRIMARY KEY constraint
    pub primary_key: bool,
    /// UNIQUE constraint
    pub unique: bool,
    /// Column has a secondary index
    pub indexed: bool,
    /// Value is produced by the store (serial ids, timestamps)
    pub store_managed: bool,
    /// DEFAULT value
    pub default_value: Option<&'static str>,
    /// REFERENCES clause
    pub references: Option<ForeignKey>,
}

impl ColumnDefinition {
    /// Create new column definition
    pub fn new(name: &'static str, sql_type: &'static str) -> Self {
        Self {
            name,
            sql_type,
            not_null: false,
            primary_key: false,
            unique: false,
            indexed: false,
            store_managed: false,
            default_value: None,
            references: None,
        }
    }

    /// Mark column as PRIMARY KEY (implies store-managed)
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.not_null = true;
        self.store_managed = true;
        self
    }

    /// Mark column as NOT NULL
    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    /// Mark column as UNIQUE
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Mark column as indexed
    pub fn indexed(mut self) -> Self {
        self.indexed = true;
        self
    }

    /// Set DEFAULT value
    pub fn default(mut self, value: &'static str) -> Self {
        self.default_value = Some(value);
        self
    }

    /// Store-managed timestamp column (`TIMESTAMPTZ NOT NULL DEFAULT now()`)
    pub fn timestamp(name: &'static str) -> Self {
        let mut column = Self::new(name, "TIMESTAMPTZ").not_null().default("now()");
        column.store_managed = true;
        column
    }

    /// Add a foreign key to `table.id` with cascading update and delete
    pub fn references_cascade(mut self, table: &'static str) -> Self {
        self.references = Some(ForeignKey {
            table,
            column: "id",
            on_update: OnAction::Cascade,
            on_delete: OnAction::Cascade,
        });
        self
    }

    /// Column definition as it appears inside CREATE TABLE
    pub fn to_sql(&self) -> String {
        let mut sql = format!("{} {}", self.name, self.sql_type);
        if self.primary_key {
            sql.push_str(" PRIMARY KEY");
        } else if self.not_null {
            sql.push_str(" NOT NULL");
        }
        if self.unique {
            sql.push_str(" UNIQUE");
        }
        if let Some(default) = self.default_value {
            sql.push_str(&format!(" DEFAULT {}", default));
        }
        if let Some(fk) = &self.references {
            sql.push_str(&format!(
                " REFERENCES {}({}) ON UPDATE {} ON DELETE {}",
                fk.table,
                fk.column,
                fk.on_update.as_sql(),
                fk.on_delete.as_sql()
            ));
        }
        sql
    }
}

/// A value bound to a writable column
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    BigInt(i64),
    Bool(bool),
    Text(String),
    NullableText(Option<String>),
    Date(NaiveDate),
}

/// A record type stored in one table
///
/// Implementors declare their table layout once; the generic [`Store`](super::Store)
/// operations are driven entirely by this metadata.
pub trait Entity:
    for<'r> FromRow<'r, PgRow> + Serialize + DeserializeOwned + Clone + Send + Sync + Unpin + 'static
{
    /// Table name in database
    const TABLE: &'static str;

    /// Singular name used in messages and JSON envelopes
    const NAME: &'static str;

    /// Column definitions in table order
    fn columns() -> Vec<ColumnDefinition>;

    /// Primary key of this record
    fn id(&self) -> i64;

    /// Values of the writable (non store-managed) columns, in column order
    fn values(&self) -> Vec<(&'static str, SqlValue)>;

    /// Comma-separated column list for SELECT / RETURNING
    fn select_list() -> String {
        Self::columns()
            .iter()
            .map(|c| c.name)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// True when the table carries a store-managed `updated_at`
    fn tracks_updates() -> bool {
        Self::columns().iter().any(|c| c.name == "updated_at")
    }

    /// CREATE TABLE statement for this entity
    fn create_table_sql() -> String {
        let columns = Self::columns()
            .iter()
            .map(|c| format!("    {}", c.to_sql()))
            .collect::<Vec<_>>()
            .join(",\n");
        format!("CREATE TABLE IF NOT EXISTS {} (\n{}\n)", Self::TABLE, columns)
    }

    /// CREATE INDEX statements for indexed, non-unique columns
    fn create_index_sql() -> Vec<String> {
        Self::columns()
            .iter()
            .filter(|c| c.indexed && !c.unique)
            .map(|c| {
                format!(
                    "CREATE INDEX IF NOT EXISTS idx_{table}_{col} ON {table}({col})",
                    table = Self::TABLE,
                    col = c.name
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_key_is_store_managed() {
        let id = ColumnDefinition::new("id", "BIGSERIAL").primary_key();
        assert!(id.store_managed);
        assert_eq!(id.to_sql(), "id BIGSERIAL PRIMARY KEY");
    }

    #[test]
    fn test_foreign_key_sql() {
        let col = ColumnDefinition::new("artist_id", "BIGINT")
            .not_null()
            .references_cascade("artists");
        assert_eq!(
            col.to_sql(),
            "artist_id BIGINT NOT NULL REFERENCES artists(id) ON UPDATE CASCADE ON DELETE CASCADE"
        );
    }

    #[test]
    fn test_timestamp_column() {
        let col = ColumnDefinition::timestamp("created_at");
        assert!(col.store_managed);
        assert_eq!(col.to_sql(), "created_at TIMESTAMPTZ NOT NULL DEFAULT now()");
    }
}
