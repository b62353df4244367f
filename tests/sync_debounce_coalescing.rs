mod common;

use std::time::Instant;

use common::{teacher_user, MockRemote};
use kinderreportd::local::SqliteLocal;
use kinderreportd::sync::SyncController;

async fn authed_controller(remote: &MockRemote) -> SyncController<SqliteLocal, MockRemote> {
    let local = SqliteLocal::open_in_memory().expect("local store");
    let mut ctrl = SyncController::new(local, remote.clone());
    ctrl.sign_in(teacher_user("user-1")).await.expect("sign in");
    ctrl
}

#[tokio::test]
async fn burst_of_updates_coalesces_into_one_remote_upsert() {
    let remote = MockRemote::default();
    let mut ctrl = authed_controller(&remote).await;

    let created = ctrl.create_student().await.expect("create");
    assert_eq!(remote.upsert_calls().len(), 1, "create writes immediately");

    for n in 1..=5 {
        let mut edit = created.clone();
        edit.full_name = format!("Ada v{}", n);
        ctrl.update_student(edit).await.expect("update");
    }
    assert_eq!(
        remote.upsert_calls().len(),
        1,
        "updates inside the window stay pending"
    );
    assert!(ctrl.has_pending());

    // Not yet due: nothing fires.
    let fired = ctrl.poll_pending(Instant::now()).await.expect("poll");
    assert!(!fired);
    assert_eq!(remote.upsert_calls().len(), 1);

    let fired = ctrl.flush_pending().await.expect("flush");
    assert!(fired);
    let calls = remote.upsert_calls();
    assert_eq!(calls.len(), 2, "exactly one deferred upsert for the burst");
    assert_eq!(calls.last().expect("last call").full_name, "Ada v5");
    assert!(!ctrl.has_pending());
}

#[tokio::test]
async fn pending_slot_is_last_write_wins_across_records() {
    let remote = MockRemote::default();
    let mut ctrl = authed_controller(&remote).await;

    let a = ctrl.create_student().await.expect("create a");
    let b = ctrl.create_student().await.expect("create b");
    assert_eq!(remote.upsert_calls().len(), 2);

    let mut edit_a = a.clone();
    edit_a.full_name = "First".into();
    ctrl.update_student(edit_a).await.expect("update a");
    let mut edit_b = b.clone();
    edit_b.full_name = "Second".into();
    ctrl.update_student(edit_b).await.expect("update b");

    ctrl.flush_pending().await.expect("flush");
    let calls = remote.upsert_calls();
    // One slot: the edit to `a` was superseded, only the last-touched record
    // reached the remote store.
    assert_eq!(calls.len(), 3);
    assert_eq!(calls.last().expect("last").id, b.id);
    assert_eq!(calls.last().expect("last").full_name, "Second");
}

#[tokio::test]
async fn create_bypasses_the_window_so_updates_cannot_be_lost() {
    let remote = MockRemote::default();
    let mut ctrl = authed_controller(&remote).await;

    let created = ctrl.create_student().await.expect("create");
    let mut edit = created.clone();
    edit.full_name = "Ada".into();
    ctrl.update_student(edit).await.expect("update");

    // The create has already completed remotely while the update is still
    // pending; the record exists for the deferred upsert to target.
    assert_eq!(remote.stored_students("user-1").len(), 1);
    assert!(ctrl.has_pending());

    ctrl.flush_pending().await.expect("flush");
    assert_eq!(
        remote.stored_students("user-1")[0].full_name,
        "Ada".to_string()
    );
}

#[tokio::test]
async fn delete_cancels_the_pending_write_for_that_record() {
    let remote = MockRemote::default();
    let mut ctrl = authed_controller(&remote).await;

    let created = ctrl.create_student().await.expect("create");
    let mut edit = created.clone();
    edit.full_name = "Gone Soon".into();
    ctrl.update_student(edit).await.expect("update");
    assert!(ctrl.has_pending());

    ctrl.delete_student(&created.id).await.expect("delete");
    assert!(!ctrl.has_pending(), "pending write must not resurrect a delete");
    assert_eq!(remote.delete_calls(), vec![created.id.clone()]);

    let fired = ctrl.flush_pending().await.expect("flush");
    assert!(!fired);
    assert!(remote.stored_students("user-1").is_empty());
}

#[tokio::test]
async fn failed_remote_write_keeps_the_optimistic_state() {
    let remote = MockRemote::default();
    let mut ctrl = authed_controller(&remote).await;

    remote.set_fail_writes(true);
    let result = ctrl.create_student().await;
    assert!(result.is_err());
    assert_eq!(ctrl.roster().len(), 1, "memory is not rolled back");

    let record = ctrl.roster()[0].clone();
    let mut edit = record.clone();
    edit.full_name = "Kept In Memory".into();
    ctrl.update_student(edit).await.expect("update is deferred");
    let flush = ctrl.flush_pending().await;
    assert!(flush.is_err(), "deferred write surfaces the failure");
    assert_eq!(ctrl.roster()[0].full_name, "Kept In Memory");
    assert!(!ctrl.has_pending(), "no automatic retry is scheduled");
}

#[tokio::test]
async fn sign_out_cancels_the_pending_write() {
    let remote = MockRemote::default();
    let mut ctrl = authed_controller(&remote).await;

    let created = ctrl.create_student().await.expect("create");
    let mut edit = created.clone();
    edit.full_name = "Never Written".into();
    ctrl.update_student(edit).await.expect("update");
    assert!(ctrl.has_pending());

    ctrl.sign_out();
    assert!(!ctrl.has_pending());
    assert!(ctrl.roster().is_empty());
    assert_eq!(remote.upsert_calls().len(), 1, "only the create ever fired");
}
