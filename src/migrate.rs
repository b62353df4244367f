//! One-time move of guest (offline) data into an authenticated account.
//!
//! Runs on every transition into an authenticated session: detect leftovers
//! under the guest namespace, upload them all, mark the source consumed,
//! then fetch the identity's remote state as the in-memory truth. The
//! mark-consumed step is strictly ordered after the last confirmed upload;
//! a partial migration therefore leaves the source intact and the next
//! sign-in re-queues every record.

use futures_util::future::join_all;
use log::{info, warn};

use crate::error::SyncError;
use crate::hydrate;
use crate::local::{self, LocalStore};
use crate::model::{AppSettings, StudentData, GUEST_USER_ID};
use crate::remote::RemoteStore;

/// In-memory state for a freshly established session, sourced from the
/// remote store (never directly from the local leftovers).
#[derive(Debug, Clone)]
pub struct SessionData {
    pub roster: Vec<StudentData>,
    pub settings: AppSettings,
    /// How many guest records were uploaded this run. Zero when there was
    /// nothing left to migrate.
    pub migrated_students: usize,
}

pub async fn migrate_guest_data<L, R>(
    local: &L,
    remote: &R,
    user_id: &str,
) -> Result<SessionData, SyncError>
where
    L: LocalStore,
    R: RemoteStore,
{
    // Detecting: either record may exist without the other; whichever exists
    // migrates independently.
    let guest_settings = local::load_settings(local, GUEST_USER_ID).map_err(blocked)?;
    let hydration_settings = guest_settings.clone().unwrap_or_default();
    let guest_roster =
        local::load_roster(local, GUEST_USER_ID, &hydration_settings).map_err(blocked)?;

    let mut migrated_students = 0;
    if guest_roster.is_some() || guest_settings.is_some() {
        let records = guest_roster.unwrap_or_default();
        info!(
            "migrating guest data to {}: {} student record(s), settings: {}",
            user_id,
            records.len(),
            guest_settings.is_some()
        );

        // Fan out over all records and join; there is no per-record success
        // bookkeeping, so one rejection fails the whole batch.
        let results = join_all(
            records
                .iter()
                .map(|record| remote.upsert_student(user_id, record)),
        )
        .await;
        let failed = results.iter().filter(|r| r.is_err()).count();
        if failed > 0 {
            warn!(
                "guest migration aborted: {}/{} uploads rejected, source left in place",
                failed,
                results.len()
            );
            return Err(SyncError::MigrationFailed(format!(
                "{} of {} student uploads failed",
                failed,
                results.len()
            )));
        }
        migrated_students = records.len();

        if let Some(settings) = &guest_settings {
            remote.save_settings(user_id, settings).await.map_err(blocked)?;
        }

        // Every upload is confirmed; only now does the source leave the live
        // namespace.
        local::mark_migrated(local, GUEST_USER_ID).map_err(blocked)?;
        info!("guest migration complete: {} record(s) moved", migrated_students);
    }

    // FetchingRemote: unconditional, and authoritative even for the records
    // this same run just wrote.
    let settings = remote
        .fetch_settings(user_id)
        .await?
        .map(|raw| hydrate::hydrate_settings(&raw))
        .unwrap_or_default();
    let roster: Vec<StudentData> = remote
        .fetch_students(user_id)
        .await?
        .iter()
        .map(|raw| hydrate::hydrate_student(raw, &settings))
        .collect();

    Ok(SessionData {
        roster,
        settings,
        migrated_students,
    })
}

/// Anything that fails while the source is still live blocks the sign-in.
fn blocked(e: SyncError) -> SyncError {
    match e {
        SyncError::MigrationFailed(_) => e,
        other => SyncError::MigrationFailed(other.to_string()),
    }
}
