//! The single mutation entry point for the UI layer. Owns the in-memory
//! roster and settings for the active identity and decides, per identity
//! mode and per mutation, whether a write goes to the local tier, goes to
//! the remote tier immediately, or is coalesced behind the debounce slot.
//!
//! Every mutation is optimistic: memory is updated before any persistence
//! call resolves, and a failed write is surfaced but never rolled back.

use chrono::Utc;
use log::warn;
use std::time::{Duration, Instant};

use crate::error::SyncError;
use crate::local::{self, LocalStore};
use crate::migrate;
use crate::model::{clamp_ca, clamp_exam, new_student, AppSettings, StudentData, User};
use crate::remote::RemoteStore;

/// Coalescing window for field-edit bursts. A burst of updates inside one
/// window produces at most one remote upsert.
pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(1500);

/// Single-slot deferred remote write, cancel-and-replace. Last-write-wins
/// across records: a new update supersedes the slot even when it targets a
/// different record.
#[derive(Debug, Clone)]
struct PendingWrite {
    student_id: String,
    due_at: Instant,
}

pub struct SyncController<L, R> {
    local: L,
    remote: R,
    user: Option<User>,
    roster: Vec<StudentData>,
    settings: AppSettings,
    pending: Option<PendingWrite>,
    syncing: bool,
}

impl<L, R> SyncController<L, R>
where
    L: LocalStore,
    R: RemoteStore,
{
    pub fn new(local: L, remote: R) -> Self {
        Self {
            local,
            remote,
            user: None,
            roster: Vec::new(),
            settings: AppSettings::default(),
            pending: None,
            syncing: false,
        }
    }

    // --- session ---

    /// Establish an identity and load its state. Guests load from the local
    /// tier; authenticated users run the one-time guest migration and then
    /// take the remote store as the in-memory truth. A failed migration is
    /// blocking: the controller stays signed out.
    ///
    /// Returns how many guest records were migrated (always 0 for guests).
    pub async fn sign_in(&mut self, user: User) -> Result<usize, SyncError> {
        // Any write still pending belongs to the previous identity.
        self.pending = None;

        if user.is_guest() {
            let settings = match local::load_settings(&self.local, &user.id) {
                Ok(s) => s.unwrap_or_default(),
                Err(e) => {
                    warn!("guest settings load failed, using defaults: {}", e);
                    AppSettings::default()
                }
            };
            let roster = match local::load_roster(&self.local, &user.id, &settings) {
                Ok(r) => r.unwrap_or_default(),
                Err(e) => {
                    warn!("guest roster load failed, starting empty: {}", e);
                    Vec::new()
                }
            };
            self.settings = settings;
            self.roster = roster;
            self.user = Some(user);
            return Ok(0);
        }

        self.syncing = true;
        let result = migrate::migrate_guest_data(&self.local, &self.remote, &user.id).await;
        self.syncing = false;
        let session = result?;
        self.roster = session.roster;
        self.settings = session.settings;
        self.user = Some(user);
        Ok(session.migrated_students)
    }

    /// Clears the session. A pending debounced write is cancelled; an
    /// in-flight one may still land remotely but no longer feeds memory.
    pub fn sign_out(&mut self) {
        self.user = None;
        self.roster.clear();
        self.settings = AppSettings::default();
        self.pending = None;
    }

    // --- mutations ---

    /// Append a new record (defaults from settings, a few fields inherited
    /// from the newest sibling). The remote write is immediate, never
    /// debounced: the record must exist remotely before any later debounced
    /// update can target it.
    pub async fn create_student(&mut self) -> Result<StudentData, SyncError> {
        let student = new_student(&self.settings, self.roster.last());
        self.roster.push(student.clone());
        if self.authenticated() {
            let user_id = self.identity().to_string();
            self.remote.upsert_student(&user_id, &student).await?;
        } else {
            self.persist_local_roster()?;
        }
        Ok(student)
    }

    /// Replace a record in place and schedule persistence. Unknown ids are
    /// ignored. Score components are clamped to their bounds before any
    /// storage sees them. Authenticated updates are debounced through the
    /// single pending slot.
    pub async fn update_student(&mut self, incoming: StudentData) -> Result<(), SyncError> {
        let Some(pos) = self.roster.iter().position(|s| s.id == incoming.id) else {
            return Ok(());
        };
        let mut record = incoming;
        for subject in &mut record.subjects {
            subject.ca_score = clamp_ca(subject.ca_score);
            subject.exam_score = clamp_exam(subject.exam_score);
        }
        record.last_updated = Some(Utc::now().timestamp_millis());
        let student_id = record.id.clone();
        self.roster[pos] = record;

        if self.authenticated() {
            self.pending = Some(PendingWrite {
                student_id,
                due_at: Instant::now() + DEBOUNCE_WINDOW,
            });
            Ok(())
        } else {
            self.persist_local_roster()
        }
    }

    /// Remove a record. The remote delete is immediate and any pending
    /// debounced write for the same record is cancelled first, so a deferred
    /// update can never resurrect a deleted record.
    pub async fn delete_student(&mut self, student_id: &str) -> Result<(), SyncError> {
        self.roster.retain(|s| s.id != student_id);
        if matches!(&self.pending, Some(p) if p.student_id == student_id) {
            self.pending = None;
        }
        if self.authenticated() {
            self.remote.delete_student(student_id).await
        } else {
            self.persist_local_roster()
        }
    }

    /// Settings saves are infrequent and authoritative: persisted
    /// immediately in both modes, never debounced.
    pub async fn save_settings(&mut self, settings: AppSettings) -> Result<(), SyncError> {
        self.settings = settings;
        if self.authenticated() {
            let user_id = self.identity().to_string();
            self.remote.save_settings(&user_id, &self.settings).await
        } else {
            local::save_settings(&self.local, &self.identity().to_string(), &self.settings)
        }
    }

    // --- pending slot ---

    /// Fire the pending write if its window has elapsed. The sidecar loop
    /// calls this after every request. Returns whether a write was sent.
    pub async fn poll_pending(&mut self, now: Instant) -> Result<bool, SyncError> {
        match &self.pending {
            Some(p) if now >= p.due_at => self.fire_pending().await,
            _ => Ok(false),
        }
    }

    /// Fire the pending write immediately regardless of its deadline.
    pub async fn flush_pending(&mut self) -> Result<bool, SyncError> {
        if self.pending.is_some() {
            self.fire_pending().await
        } else {
            Ok(false)
        }
    }

    async fn fire_pending(&mut self) -> Result<bool, SyncError> {
        // The slot is consumed up front: a failed upsert is reported, not
        // retried (the next mutation is the next opportunity).
        let Some(p) = self.pending.take() else {
            return Ok(false);
        };
        let Some(record) = self.roster.iter().find(|s| s.id == p.student_id).cloned() else {
            // Deleted while pending; nothing to write.
            return Ok(false);
        };
        let user_id = self.identity().to_string();
        match self.remote.upsert_student(&user_id, &record).await {
            Ok(()) => Ok(true),
            Err(e) => {
                warn!("deferred upsert of {} failed: {}", p.student_id, e);
                Err(e)
            }
        }
    }

    // --- accessors ---

    pub fn roster(&self) -> &[StudentData] {
        &self.roster
    }

    pub fn student(&self, student_id: &str) -> Option<&StudentData> {
        self.roster.iter().find(|s| s.id == student_id)
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_syncing(&self) -> bool {
        self.syncing
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    // --- internals ---

    fn authenticated(&self) -> bool {
        self.user.as_ref().map(|u| !u.is_guest()).unwrap_or(false)
    }

    fn identity(&self) -> &str {
        self.user
            .as_ref()
            .map(|u| u.id.as_str())
            .unwrap_or(crate::model::GUEST_USER_ID)
    }

    fn persist_local_roster(&self) -> Result<(), SyncError> {
        local::save_roster(&self.local, self.identity(), &self.roster)
    }
}
