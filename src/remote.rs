use chrono::Utc;
use rusqlite::{Connection, OptionalExtension};
use serde_json::Value;
use std::path::Path;

use crate::error::SyncError;
use crate::model::{AppSettings, StudentData};

/// The multi-tenant remote tier, scoped to one identity per call. Fetches
/// hand back the stored record blobs untouched; hydration is the caller's
/// concern. Writes are idempotent insert-or-replace and are never retried
/// here: retry policy, if any, sits above this adapter.
#[allow(async_fn_in_trait)]
pub trait RemoteStore {
    /// All roster rows for the identity. Order is not guaranteed; callers
    /// treat the result as a set keyed by record id.
    async fn fetch_students(&self, user_id: &str) -> Result<Vec<Value>, SyncError>;
    async fn upsert_student(&self, user_id: &str, student: &StudentData)
        -> Result<(), SyncError>;
    /// Removing an absent id is not an error.
    async fn delete_student(&self, student_id: &str) -> Result<(), SyncError>;
    /// `None` when the identity has never saved settings.
    async fn fetch_settings(&self, user_id: &str) -> Result<Option<Value>, SyncError>;
    async fn save_settings(&self, user_id: &str, settings: &AppSettings)
        -> Result<(), SyncError>;
}

/// SQLite-backed record store with the same two-table layout the hosted
/// deployment uses (one row per student keyed by id and tagged with the
/// owning identity; at most one settings row per identity; full record as an
/// opaque JSON blob plus a last-modified timestamp).
pub struct SqliteRemote {
    conn: Connection,
}

impl SqliteRemote {
    pub fn open(workspace: &Path) -> anyhow::Result<Self> {
        std::fs::create_dir_all(workspace)?;
        let conn = Connection::open(workspace.join("remote.sqlite3"))?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> anyhow::Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> anyhow::Result<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS students(
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                data TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_students_user ON students(user_id)",
            [],
        )?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS settings(
                user_id TEXT PRIMARY KEY,
                data TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;
        Ok(Self { conn })
    }
}

fn remote_err(e: impl std::fmt::Display) -> SyncError {
    SyncError::RemoteWriteFailed(e.to_string())
}

impl RemoteStore for SqliteRemote {
    async fn fetch_students(&self, user_id: &str) -> Result<Vec<Value>, SyncError> {
        let mut stmt = self
            .conn
            .prepare("SELECT data FROM students WHERE user_id = ?1")
            .map_err(remote_err)?;
        let rows = stmt
            .query_map([user_id], |row| row.get::<_, String>(0))
            .map_err(remote_err)?;
        let mut out = Vec::new();
        for row in rows {
            let text = row.map_err(remote_err)?;
            out.push(serde_json::from_str(&text).unwrap_or(Value::Null));
        }
        Ok(out)
    }

    async fn upsert_student(
        &self,
        user_id: &str,
        student: &StudentData,
    ) -> Result<(), SyncError> {
        let data = serde_json::to_string(student).map_err(remote_err)?;
        self.conn
            .execute(
                "INSERT INTO students(id, user_id, data, updated_at)
                 VALUES(?1, ?2, ?3, ?4)
                 ON CONFLICT(id) DO UPDATE SET
                    user_id = excluded.user_id,
                    data = excluded.data,
                    updated_at = excluded.updated_at",
                [
                    student.id.as_str(),
                    user_id,
                    data.as_str(),
                    Utc::now().to_rfc3339().as_str(),
                ],
            )
            .map(|_| ())
            .map_err(remote_err)
    }

    async fn delete_student(&self, student_id: &str) -> Result<(), SyncError> {
        self.conn
            .execute("DELETE FROM students WHERE id = ?1", [student_id])
            .map(|_| ())
            .map_err(remote_err)
    }

    async fn fetch_settings(&self, user_id: &str) -> Result<Option<Value>, SyncError> {
        let text = self
            .conn
            .query_row(
                "SELECT data FROM settings WHERE user_id = ?1",
                [user_id],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .map_err(remote_err)?;
        Ok(text.map(|t| serde_json::from_str(&t).unwrap_or(Value::Null)))
    }

    async fn save_settings(
        &self,
        user_id: &str,
        settings: &AppSettings,
    ) -> Result<(), SyncError> {
        let data = serde_json::to_string(settings).map_err(remote_err)?;
        self.conn
            .execute(
                "INSERT INTO settings(user_id, data, updated_at)
                 VALUES(?1, ?2, ?3)
                 ON CONFLICT(user_id) DO UPDATE SET
                    data = excluded.data,
                    updated_at = excluded.updated_at",
                [user_id, data.as_str(), Utc::now().to_rfc3339().as_str()],
            )
            .map(|_| ())
            .map_err(remote_err)
    }
}
