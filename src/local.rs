use rusqlite::{Connection, OptionalExtension};
use serde_json::Value;
use std::path::Path;

use crate::error::SyncError;
use crate::hydrate;
use crate::model::{AppSettings, StudentData};

/// Key scheme carried over from the browser build of the app:
/// `kinderReport_{purpose}_{identity}`. Two identities never share a key.
pub fn roster_key(identity: &str) -> String {
    format!("kinderReport_roster_{}", identity)
}

pub fn settings_key(identity: &str) -> String {
    format!("kinderReport_settings_{}", identity)
}

/// Where a consumed migration source ends up. The original key becomes
/// absent, which is what makes migration exactly-once.
pub fn migrated_key(key: &str) -> String {
    format!("migrated_{}", key)
}

/// The local persistence tier: a flat string key-value surface. Records are
/// stored and loaded as atomic wholes; there are no partial-record writes.
pub trait LocalStore {
    fn get(&self, key: &str) -> Result<Option<String>, SyncError>;
    fn set(&self, key: &str, value: &str) -> Result<(), SyncError>;
    fn remove(&self, key: &str) -> Result<(), SyncError>;
    fn rename(&self, from: &str, to: &str) -> Result<(), SyncError>;
}

pub struct SqliteLocal {
    conn: Connection,
}

impl SqliteLocal {
    pub fn open(workspace: &Path) -> anyhow::Result<Self> {
        std::fs::create_dir_all(workspace)?;
        let conn = Connection::open(workspace.join("local.sqlite3"))?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> anyhow::Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> anyhow::Result<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS local_kv(
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )?;
        Ok(Self { conn })
    }
}

fn storage_err(e: impl std::fmt::Display) -> SyncError {
    SyncError::StorageUnavailable(e.to_string())
}

impl LocalStore for SqliteLocal {
    fn get(&self, key: &str) -> Result<Option<String>, SyncError> {
        self.conn
            .query_row("SELECT value FROM local_kv WHERE key = ?1", [key], |row| {
                row.get::<_, String>(0)
            })
            .optional()
            .map_err(storage_err)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SyncError> {
        self.conn
            .execute(
                "INSERT INTO local_kv(key, value) VALUES(?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                [key, value],
            )
            .map(|_| ())
            .map_err(storage_err)
    }

    fn remove(&self, key: &str) -> Result<(), SyncError> {
        self.conn
            .execute("DELETE FROM local_kv WHERE key = ?1", [key])
            .map(|_| ())
            .map_err(storage_err)
    }

    fn rename(&self, from: &str, to: &str) -> Result<(), SyncError> {
        self.conn
            .execute(
                "UPDATE OR REPLACE local_kv SET key = ?2 WHERE key = ?1",
                [from, to],
            )
            .map(|_| ())
            .map_err(storage_err)
    }
}

/// `None` means no roster record exists for this identity, as opposed to a
/// stored empty roster. Migration detection relies on the distinction.
pub fn load_roster<L: LocalStore>(
    store: &L,
    identity: &str,
    settings: &AppSettings,
) -> Result<Option<Vec<StudentData>>, SyncError> {
    let Some(text) = store.get(&roster_key(identity))? else {
        return Ok(None);
    };
    let raw: Value = serde_json::from_str(&text).unwrap_or(Value::Null);
    Ok(Some(hydrate::hydrate_roster(&raw, settings)))
}

pub fn save_roster<L: LocalStore>(
    store: &L,
    identity: &str,
    roster: &[StudentData],
) -> Result<(), SyncError> {
    let text = serde_json::to_string(roster).map_err(storage_err)?;
    store.set(&roster_key(identity), &text)
}

pub fn load_settings<L: LocalStore>(
    store: &L,
    identity: &str,
) -> Result<Option<AppSettings>, SyncError> {
    let Some(text) = store.get(&settings_key(identity))? else {
        return Ok(None);
    };
    let raw: Value = serde_json::from_str(&text).unwrap_or(Value::Null);
    Ok(Some(hydrate::hydrate_settings(&raw)))
}

pub fn save_settings<L: LocalStore>(
    store: &L,
    identity: &str,
    settings: &AppSettings,
) -> Result<(), SyncError> {
    let text = serde_json::to_string(settings).map_err(storage_err)?;
    store.set(&settings_key(identity), &text)
}

/// Rename both source keys out of the live namespace. Only called after every
/// remote upsert of a migration has been confirmed.
pub fn mark_migrated<L: LocalStore>(store: &L, identity: &str) -> Result<(), SyncError> {
    let roster = roster_key(identity);
    store.rename(&roster, &migrated_key(&roster))?;
    let settings = settings_key(identity);
    store.rename(&settings, &migrated_key(&settings))
}
