//! In-memory [`Store`] used by the router tests
//!
//! Rows are kept as JSON objects keyed by table and id. Unique columns,
//! foreign keys and cascading deletes follow the entity column metadata, so
//! handlers see the same failures they would get from PostgreSQL.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use musiclib_common::db::{catalog_tables, Entity, Store};
use musiclib_common::{Error, Result};
use serde_json::{json, Value};

type Table = BTreeMap<i64, Value>;

#[derive(Default)]
struct Inner {
    tables: HashMap<&'static str, Table>,
    next_id: HashMap<&'static str, i64>,
}

/// Shared handle; clones see the same data
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
    unavailable: Arc<AtomicBool>,
    calls: Arc<AtomicUsize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail like an exhausted connection pool
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of store calls made so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of rows currently in `table`
    pub fn count(&self, table: &str) -> usize {
        let inner = self.inner.lock().unwrap();
        inner.tables.get(table).map(|t| t.len()).unwrap_or(0)
    }

    fn enter(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(Error::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

fn decode<T: Entity>(row: &Value) -> T {
    serde_json::from_value(row.clone()).expect("stored row matches entity")
}

/// Reject writes that break unique columns or dangling foreign keys
fn check_constraints<T: Entity>(inner: &Inner, row: &Value, own_id: Option<i64>) -> Result<()> {
    for column in T::columns() {
        if column.primary_key {
            continue;
        }
        let value = &row[column.name];

        if column.unique {
            let taken = inner
                .tables
                .get(T::TABLE)
                .map(|table| {
                    table
                        .iter()
                        .any(|(id, other)| Some(*id) != own_id && &other[column.name] == value)
                })
                .unwrap_or(false);
            if taken {
                return Err(Error::Constraint {
                    table: T::TABLE,
                    constraint: format!("{}_{}_key", T::TABLE, column.name),
                });
            }
        }

        if let Some(fk) = &column.references {
            let exists = value
                .as_i64()
                .and_then(|id| inner.tables.get(fk.table).map(|t| t.contains_key(&id)))
                .unwrap_or(false);
            if !exists {
                return Err(Error::Constraint {
                    table: T::TABLE,
                    constraint: format!("{}_{}_fkey", T::TABLE, column.name),
                });
            }
        }
    }
    Ok(())
}

/// Remove a row and everything that references it
fn delete_cascade(inner: &mut Inner, table: &str, id: i64) -> bool {
    let removed = inner
        .tables
        .get_mut(table)
        .map(|t| t.remove(&id).is_some())
        .unwrap_or(false);
    if !removed {
        return false;
    }

    for (child, columns) in catalog_tables() {
        for column in columns {
            let Some(fk) = &column.references else {
                continue;
            };
            if fk.table != table {
                continue;
            }
            let orphans: Vec<i64> = inner
                .tables
                .get(child)
                .map(|rows| {
                    rows.iter()
                        .filter(|(_, row)| row[column.name].as_i64() == Some(id))
                        .map(|(child_id, _)| *child_id)
                        .collect()
                })
                .unwrap_or_default();
            for orphan in orphans {
                delete_cascade(inner, child, orphan);
            }
        }
    }
    true
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_all<T: Entity>(&self) -> Result<Vec<T>> {
        self.enter()?;
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .tables
            .get(T::TABLE)
            .map(|t| t.values().map(decode::<T>).collect())
            .unwrap_or_default())
    }

    async fn first_by_id<T: Entity>(&self, id: i64) -> Result<T> {
        self.enter()?;
        let inner = self.inner.lock().unwrap();
        inner
            .tables
            .get(T::TABLE)
            .and_then(|t| t.get(&id))
            .map(decode::<T>)
            .ok_or(Error::NotFound {
                entity: T::NAME,
                id,
            })
    }

    async fn first_by<T: Entity>(&self, column: &'static str, value: i64) -> Result<T> {
        self.enter()?;
        let inner = self.inner.lock().unwrap();
        inner
            .tables
            .get(T::TABLE)
            .and_then(|t| t.values().find(|row| row[column].as_i64() == Some(value)))
            .map(decode::<T>)
            .ok_or(Error::NotFound {
                entity: T::NAME,
                id: value,
            })
    }

    async fn create<T: Entity>(&self, record: T) -> Result<T> {
        self.enter()?;
        let mut inner = self.inner.lock().unwrap();

        let mut row = serde_json::to_value(&record).expect("entity serializes");
        check_constraints::<T>(&inner, &row, None)?;

        let next = inner.next_id.entry(T::TABLE).or_insert(0);
        *next += 1;
        let id = *next;

        row["id"] = json!(id);
        let now = json!(Utc::now());
        for column in T::columns() {
            if column.name == "created_at" || column.name == "updated_at" {
                row[column.name] = now.clone();
            }
        }

        inner.tables.entry(T::TABLE).or_default().insert(id, row.clone());
        Ok(decode(&row))
    }

    async fn save<T: Entity>(&self, record: T) -> Result<T> {
        self.enter()?;
        let mut inner = self.inner.lock().unwrap();

        let id = record.id();
        let existing = inner
            .tables
            .get(T::TABLE)
            .and_then(|t| t.get(&id))
            .cloned()
            .ok_or(Error::NotFound {
                entity: T::NAME,
                id,
            })?;

        let mut row = serde_json::to_value(&record).expect("entity serializes");
        check_constraints::<T>(&inner, &row, Some(id))?;

        for column in T::columns() {
            if column.name == "created_at" {
                row["created_at"] = existing["created_at"].clone();
            }
            if column.name == "updated_at" {
                row["updated_at"] = json!(Utc::now());
            }
        }

        inner.tables.entry(T::TABLE).or_default().insert(id, row.clone());
        Ok(decode(&row))
    }

    async fn delete_by_id<T: Entity>(&self, id: i64) -> Result<u64> {
        self.enter()?;
        let mut inner = self.inner.lock().unwrap();
        Ok(u64::from(delete_cascade(&mut inner, T::TABLE, id)))
    }
}
