//! State store layer for sigledger

use crate::error::LedgerError;
use parking_lot::RwLock;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::sync::Mutex;

/// Key-value access to ledger state. Implementations should make
/// `put_states` atomic: either every entry is written or none is.
pub trait StateStore: Send + Sync {
    /// Returns `Ok(None)` when the key has never been written.
    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, LedgerError>;
    fn put_state(&self, key: &str, value: &[u8]) -> Result<(), LedgerError>;

    /// Writes entries in order. The default is not atomic; backends override it.
    fn put_states(&self, entries: &[(String, Vec<u8>)]) -> Result<(), LedgerError> {
        for (key, value) in entries {
            self.put_state(key, value)?;
        }
        Ok(())
    }
}

impl<T: StateStore + ?Sized> StateStore for std::sync::Arc<T> {
    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, LedgerError> {
        (**self).get_state(key)
    }

    fn put_state(&self, key: &str, value: &[u8]) -> Result<(), LedgerError> {
        (**self).put_state(key, value)
    }

    fn put_states(&self, entries: &[(String, Vec<u8>)]) -> Result<(), LedgerError> {
        (**self).put_states(entries)
    }
}

/// SQLite-backed store: one `state` table of key/value rows.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: &str) -> Result<Self, LedgerError> {
        let conn = Connection::open(path)
            .map_err(|e| LedgerError::StoreError(format!("Failed to open database: {}", e)))?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self, LedgerError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| LedgerError::StoreError(format!("Failed to open database: {}", e)))?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self, LedgerError> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS state (
                key TEXT PRIMARY KEY,
                value BLOB NOT NULL
            )",
            [],
        )
        .map_err(|e| LedgerError::StoreError(format!("Failed to create state table: {}", e)))?;

        Ok(SqliteStore {
            conn: Mutex::new(conn),
        })
    }

    /// Number of stored entries.
    pub fn len(&self) -> Result<usize, LedgerError> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM state", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    pub fn is_empty(&self) -> Result<bool, LedgerError> {
        Ok(self.len()? == 0)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, LedgerError> {
        self.conn
            .lock()
            .map_err(|_| LedgerError::StoreError("Mutex poisoned".to_string()))
    }
}

impl StateStore for SqliteStore {
    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, LedgerError> {
        let conn = self.lock()?;
        conn.query_row(
            "SELECT value FROM state WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| LedgerError::StoreError(format!("Failed to read state {}: {}", key, e)))
    }

    fn put_state(&self, key: &str, value: &[u8]) -> Result<(), LedgerError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO state (key, value) VALUES (?1, ?2)",
            params![key, value],
        )
        .map_err(|e| LedgerError::StoreError(format!("Failed to write state {}: {}", key, e)))?;
        Ok(())
    }

    /// Writes all entries inside one SQL transaction; any failure rolls back the batch.
    fn put_states(&self, entries: &[(String, Vec<u8>)]) -> Result<(), LedgerError> {
        let conn = self.lock()?;
        let tx = conn.unchecked_transaction().map_err(|e| {
            LedgerError::StoreError(format!("Failed to start transaction: {}", e))
        })?;

        for (key, value) in entries {
            tx.execute(
                "INSERT OR REPLACE INTO state (key, value) VALUES (?1, ?2)",
                params![key, value],
            )
            .map_err(|e| {
                LedgerError::StoreError(format!("Failed to write state {}: {}", key, e))
            })?;
        }

        tx.commit().map_err(|e| {
            LedgerError::StoreError(format!("Failed to commit transaction: {}", e))
        })?;

        Ok(())
    }
}

/// Simple in-memory store useful for tests and ephemeral runs.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl StateStore for InMemoryStore {
    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, LedgerError> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn put_state(&self, key: &str, value: &[u8]) -> Result<(), LedgerError> {
        self.entries.write().insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn put_states(&self, entries: &[(String, Vec<u8>)]) -> Result<(), LedgerError> {
        let mut guard = self.entries.write();
        for (key, value) in entries {
            guard.insert(key.clone(), value.clone());
        }
        Ok(())
    }
}
