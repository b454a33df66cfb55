// src/util/database.rs
// Core database struct with connection management and a generic key-value table

use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{AssistantError, Result};

#[derive(Clone)]
pub struct Database {
    pub(crate) app_conn: Arc<Mutex<Connection>>,
}

// Manual Debug implementation since Mutex<Connection> doesn't implement Debug
impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("app_conn", &"Arc<Mutex<Connection>>")
            .finish()
    }
}

impl Database {
    pub fn new(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        Self::from_connection(Connection::open(db_path)?)
    }

    pub fn in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        let db = Database {
            app_conn: Arc::new(Mutex::new(conn)),
        };
        db.init_core_tables()?;
        Ok(db)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.app_conn.lock().map_err(|_| AssistantError::LockPoisoned)
    }

    fn init_core_tables(&self) -> Result<()> {
        let conn = self.lock()?;

        // Opaque persisted key-value state
        conn.execute(
            "CREATE TABLE IF NOT EXISTS app_state (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            )",
            [],
        )?;

        Ok(())
    }

    pub fn save_state(&self, key: &str, value: &str) -> Result<()> {
        let timestamp = chrono::Utc::now().timestamp();

        let conn = self.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO app_state (key, value, updated_at)
             VALUES (?1, ?2, ?3)",
            rusqlite::params![key, value, timestamp],
        )?;

        Ok(())
    }

    pub fn get_state(&self, key: &str) -> Result<Option<String>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT value FROM app_state WHERE key = ?1"
        )?;

        let mut rows = stmt.query_map(rusqlite::params![key], |row| {
            row.get::<_, String>(0)
        })?;

        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_state_round_trip_and_overwrite() {
        let db = Database::in_memory().unwrap();
        assert_eq!(db.get_state("missing").unwrap(), None);

        db.save_state("chat_sessions", "[1]").unwrap();
        db.save_state("chat_sessions", "[2]").unwrap();
        assert_eq!(db.get_state("chat_sessions").unwrap().as_deref(), Some("[2]"));
    }

    #[test]
    fn test_file_database_creates_directory() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("assistant.db");

        {
            let db = Database::new(&path).unwrap();
            db.save_state("k", "v").unwrap();
        }

        let reopened = Database::new(&path).unwrap();
        assert_eq!(reopened.get_state("k").unwrap().as_deref(), Some("v"));
    }
}
