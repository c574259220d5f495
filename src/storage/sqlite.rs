use crate::errors::Result;
use crate::storage::Storage;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// Contains the SQL queries used to interact with the database
pub mod sql_queries {
    pub const CREATE_TABLE: &str =
        "CREATE TABLE IF NOT EXISTS entries (key TEXT PRIMARY KEY, value TEXT NOT NULL)";

    pub const UPSERT_ENTRY: &str = "INSERT INTO entries (key, value) VALUES (?1, ?2) \
         ON CONFLICT(key) DO UPDATE SET value = excluded.value";
    pub const SELECT_ENTRY: &str = "SELECT value FROM entries WHERE key = ?1";
    pub const DELETE_ENTRY: &str = "DELETE FROM entries WHERE key = ?1";
}

/// Local storage kept in a single SQLite table
pub struct SQLiteStorage {
    conn: Connection,
}

impl SQLiteStorage {
    /// Open (or create) the database file at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::init(Connection::open(path)?)
    }

    /// A throwaway database, gone when dropped
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute(sql_queries::CREATE_TABLE, [])?;
        Ok(SQLiteStorage { conn })
    }
}

impl Storage for SQLiteStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.conn
            .prepare_cached(sql_queries::SELECT_ENTRY)?
            .query_row(params![key], |row| row.get(0))
            .optional()
            .map_err(|err| err.into())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.conn
            .prepare_cached(sql_queries::UPSERT_ENTRY)?
            .execute(params![key, value])?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.conn
            .prepare_cached(sql_queries::DELETE_ENTRY)?
            .execute(params![key])?;
        Ok(())
    }
}
