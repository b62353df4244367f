use std::fmt;

/// Failure taxonomy for the two storage tiers and the migration path.
/// Hydration problems are deliberately absent: persisted records that do not
/// match the current schema are repaired silently, never reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// Local key-value storage inaccessible (disk error, quota). Advisory:
    /// the in-memory state stays authoritative for the session.
    StorageUnavailable(String),
    /// A remote upsert/delete/save was rejected (network/auth). Advisory: the
    /// optimistic in-memory change is kept and there is no automatic retry.
    RemoteWriteFailed(String),
    /// An upsert failed while moving guest data into an authenticated
    /// account. Blocking: the source stays unconsumed and the sign-in fails.
    MigrationFailed(String),
}

impl SyncError {
    /// Stable code used in IPC error envelopes.
    pub fn code(&self) -> &'static str {
        match self {
            SyncError::StorageUnavailable(_) => "storage_unavailable",
            SyncError::RemoteWriteFailed(_) => "remote_write_failed",
            SyncError::MigrationFailed(_) => "migration_failed",
        }
    }
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncError::StorageUnavailable(m) => write!(f, "local storage unavailable: {}", m),
            SyncError::RemoteWriteFailed(m) => write!(f, "remote write failed: {}", m),
            SyncError::MigrationFailed(m) => write!(f, "guest data migration failed: {}", m),
        }
    }
}

impl std::error::Error for SyncError {}
