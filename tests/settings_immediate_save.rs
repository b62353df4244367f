mod common;

use common::{teacher_user, MockRemote};
use kinderreportd::local::SqliteLocal;
use kinderreportd::sync::SyncController;

#[tokio::test]
async fn authenticated_settings_saves_hit_the_remote_immediately() {
    let local = SqliteLocal::open_in_memory().expect("local");
    let remote = MockRemote::default();
    let mut ctrl = SyncController::new(local, remote.clone());
    ctrl.sign_in(teacher_user("user-1")).await.expect("sign in");

    let mut settings = ctrl.settings().clone();
    settings.school_name = "Hosted Nursery".into();
    ctrl.save_settings(settings).await.expect("save settings");

    assert_eq!(remote.save_settings_calls(), 1, "no debounce for settings");
    assert!(!ctrl.has_pending());
    assert_eq!(
        remote
            .stored_settings("user-1")
            .expect("stored settings")
            .school_name,
        "Hosted Nursery"
    );
}

#[tokio::test]
async fn remote_settings_are_loaded_on_the_next_sign_in() {
    let remote = MockRemote::default();
    {
        let local = SqliteLocal::open_in_memory().expect("local");
        let mut ctrl = SyncController::new(local, remote.clone());
        ctrl.sign_in(teacher_user("user-1")).await.expect("sign in");
        let mut settings = ctrl.settings().clone();
        settings.term = "Third (Summer)".into();
        ctrl.save_settings(settings).await.expect("save settings");
    }

    let local = SqliteLocal::open_in_memory().expect("local");
    let mut ctrl = SyncController::new(local, remote.clone());
    ctrl.sign_in(teacher_user("user-1")).await.expect("sign in");
    assert_eq!(ctrl.settings().term, "Third (Summer)");
}

#[tokio::test]
async fn new_records_copy_defaults_from_the_active_settings() {
    let local = SqliteLocal::open_in_memory().expect("local");
    let remote = MockRemote::default();
    let mut ctrl = SyncController::new(local, remote);
    ctrl.sign_in(teacher_user("user-1")).await.expect("sign in");

    let mut settings = ctrl.settings().clone();
    settings.school_name = "Copied School".into();
    settings.default_teacher_name = "Ms. Ade".into();
    ctrl.save_settings(settings).await.expect("save settings");

    let student = ctrl.create_student().await.expect("create");
    assert_eq!(student.school_name, "Copied School");
    assert_eq!(student.teacher_name, "Ms. Ade");
}
