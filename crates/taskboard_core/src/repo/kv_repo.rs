//! Key-value store contract and implementations.
//!
//! # Responsibility
//! - Provide string get/set/remove over the local store.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - `set` replaces any previous value for the key.
//! - `write_batch` applies every write or none of them.
//! - `keys` returns keys in ascending order.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence adapter error.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    /// Connection was not bootstrapped through `open_db*`.
    SchemaNotReady {
        db_version: u32,
        required: u32,
    },
    Encode {
        key: String,
        source: serde_json::Error,
    },
    Decode {
        key: String,
        source: serde_json::Error,
    },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::SchemaNotReady {
                db_version,
                required,
            } => write!(
                f,
                "store schema version {db_version} is older than required {required}"
            ),
            Self::Encode { key, source } => write!(f, "failed to encode `{key}`: {source}"),
            Self::Decode { key, source } => write!(f, "malformed payload in `{key}`: {source}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::SchemaNotReady { .. } => None,
            Self::Encode { source, .. } | Self::Decode { source, .. } => Some(source),
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// One write inside an atomic batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KvWrite {
    Set { key: String, value: String },
    Remove { key: String },
}

/// String key-value store backing board collections.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;
    /// Returns whether an entry was removed.
    fn remove(&self, key: &str) -> StoreResult<bool>;
    fn keys(&self) -> StoreResult<Vec<String>>;
    /// Applies `writes` in order as one unit; on error the store is left
    /// as it was before the call.
    fn write_batch(&self, writes: &[KvWrite]) -> StoreResult<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> StoreResult<bool> {
        (**self).remove(key)
    }

    fn keys(&self) -> StoreResult<Vec<String>> {
        (**self).keys()
    }

    fn write_batch(&self, writes: &[KvWrite]) -> StoreResult<()> {
        (**self).write_batch(writes)
    }
}

/// SQLite-backed store over the `kv_entries` table.
pub struct SqliteKeyValueStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteKeyValueStore<'conn> {
    /// Wraps a connection whose migrations are already applied.
    ///
    /// # Errors
    /// - `SchemaNotReady` when `PRAGMA user_version` is behind this binary.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        let db_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
        let required = latest_version();
        if db_version < required {
            return Err(StoreError::SchemaNotReady {
                db_version,
                required,
            });
        }
        Ok(Self { conn })
    }
}

impl KeyValueStore for SqliteKeyValueStore<'_> {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        upsert_entry(self.conn, key, value)
    }

    fn remove(&self, key: &str) -> StoreResult<bool> {
        delete_entry(self.conn, key)
    }

    fn keys(&self) -> StoreResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT key FROM kv_entries ORDER BY key ASC;")?;
        let mut rows = stmt.query([])?;
        let mut keys = Vec::new();
        while let Some(row) = rows.next()? {
            keys.push(row.get(0)?);
        }
        Ok(keys)
    }

    fn write_batch(&self, writes: &[KvWrite]) -> StoreResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        for write in writes {
            match write {
                KvWrite::Set { key, value } => upsert_entry(&tx, key, value)?,
                KvWrite::Remove { key } => {
                    delete_entry(&tx, key)?;
                }
            }
        }
        tx.commit()?;
        Ok(())
    }
}

fn upsert_entry(conn: &Connection, key: &str, value: &str) -> StoreResult<()> {
    conn.execute(
        "INSERT INTO kv_entries (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET
            value = excluded.value,
            updated_at = (strftime('%s', 'now') * 1000);",
        params![key, value],
    )?;
    Ok(())
}

fn delete_entry(conn: &Connection, key: &str) -> StoreResult<bool> {
    let changed = conn.execute("DELETE FROM kv_entries WHERE key = ?1;", [key])?;
    Ok(changed > 0)
}

/// Process-local store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    entries: RefCell<BTreeMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<bool> {
        Ok(self.entries.borrow_mut().remove(key).is_some())
    }

    fn keys(&self) -> StoreResult<Vec<String>> {
        Ok(self.entries.borrow().keys().cloned().collect())
    }

    fn write_batch(&self, writes: &[KvWrite]) -> StoreResult<()> {
        let mut entries = self.entries.borrow_mut();
        for write in writes {
            match write {
                KvWrite::Set { key, value } => {
                    entries.insert(key.clone(), value.clone());
                }
                KvWrite::Remove { key } => {
                    entries.remove(key);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{KeyValueStore, KvWrite, MemoryKeyValueStore, SqliteKeyValueStore, StoreError};
    use crate::db::open_db_in_memory;
    use rusqlite::Connection;

    fn exercise(store: &dyn KeyValueStore) {
        assert_eq!(store.get("missing").unwrap(), None);
        store.set("b", "1").unwrap();
        store.set("a", "2").unwrap();
        store.set("b", "3").unwrap();
        assert_eq!(store.get("b").unwrap().as_deref(), Some("3"));
        assert_eq!(store.keys().unwrap(), vec!["a".to_string(), "b".to_string()]);
        assert!(store.remove("a").unwrap());
        assert!(!store.remove("a").unwrap());

        store
            .write_batch(&[
                KvWrite::Set {
                    key: "c".to_string(),
                    value: "4".to_string(),
                },
                KvWrite::Remove {
                    key: "b".to_string(),
                },
            ])
            .unwrap();
        assert_eq!(store.keys().unwrap(), vec!["c".to_string()]);
    }

    #[test]
    fn memory_store_overwrites_and_removes() {
        exercise(&MemoryKeyValueStore::new());
    }

    #[test]
    fn sqlite_store_overwrites_and_removes() {
        let conn = open_db_in_memory().unwrap();
        let store = SqliteKeyValueStore::try_new(&conn).unwrap();
        exercise(&store);
    }

    #[test]
    fn sqlite_store_rejects_unmigrated_connection() {
        let conn = Connection::open_in_memory().unwrap();
        let err = SqliteKeyValueStore::try_new(&conn).err().unwrap();
        assert!(matches!(
            err,
            StoreError::SchemaNotReady { db_version: 0, .. }
        ));
    }

    #[test]
    fn sqlite_batch_rolls_back_when_any_write_fails() {
        let conn = open_db_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TRIGGER reject_locked BEFORE INSERT ON kv_entries
             WHEN NEW.key = 'locked'
             BEGIN SELECT RAISE(ABORT, 'locked key'); END;",
        )
        .unwrap();
        let store = SqliteKeyValueStore::try_new(&conn).unwrap();
        store.set("kept", "old").unwrap();

        let err = store
            .write_batch(&[
                KvWrite::Set {
                    key: "kept".to_string(),
                    value: "new".to_string(),
                },
                KvWrite::Set {
                    key: "locked".to_string(),
                    value: "x".to_string(),
                },
            ])
            .unwrap_err();
        assert!(matches!(err, StoreError::Db(_)));
        assert_eq!(store.get("kept").unwrap().as_deref(), Some("old"));
        assert_eq!(store.get("locked").unwrap(), None);
    }
}
