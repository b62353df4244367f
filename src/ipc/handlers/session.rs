use serde_json::json;

use crate::ipc::error::{err, ok, sync_err};
use crate::ipc::types::{AppState, Request};
use crate::model::User;

/// The auth protocol itself lives in the external provider; these methods
/// accept an identity the provider has already established and drive the
/// controller's session transitions.
async fn handle_sign_in(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(ctrl) = state.ctrl.as_mut() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let Some(user_value) = req.params.get("user") else {
        return err(&req.id, "bad_params", "missing params.user", None);
    };
    let user: User = match serde_json::from_value(user_value.clone()) {
        Ok(u) => u,
        Err(e) => return err(&req.id, "bad_params", format!("invalid user: {}", e), None),
    };
    if user.id.trim().is_empty() {
        return err(&req.id, "bad_params", "user.id must not be empty", None);
    }

    match ctrl.sign_in(user.clone()).await {
        Ok(migrated) => ok(
            &req.id,
            json!({ "user": user, "migratedStudents": migrated }),
        ),
        Err(e) => sync_err(&req.id, &e),
    }
}

async fn handle_guest(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(ctrl) = state.ctrl.as_mut() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let user = User::guest();
    match ctrl.sign_in(user.clone()).await {
        Ok(_) => ok(&req.id, json!({ "user": user })),
        Err(e) => sync_err(&req.id, &e),
    }
}

fn handle_sign_out(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(ctrl) = state.ctrl.as_mut() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    ctrl.sign_out();
    ok(&req.id, json!({ "ok": true }))
}

fn handle_current(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(ctrl) = state.ctrl.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    ok(
        &req.id,
        json!({
            "user": ctrl.user(),
            "mode": ctrl.user().map(|u| if u.is_guest() { "guest" } else { "authenticated" })
        }),
    )
}

pub async fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "session.signIn" => Some(handle_sign_in(state, req).await),
        "session.guest" => Some(handle_guest(state, req).await),
        "session.signOut" => Some(handle_sign_out(state, req)),
        "session.current" => Some(handle_current(state, req)),
        _ => None,
    }
}
