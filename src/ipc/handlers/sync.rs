use serde_json::json;

use crate::ipc::error::{err, ok, sync_err};
use crate::ipc::types::{AppState, Request};

fn handle_status(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(ctrl) = state.ctrl.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    ok(
        &req.id,
        json!({
            "syncing": ctrl.is_syncing(),
            "pendingRemoteWrite": ctrl.has_pending(),
            "user": ctrl.user(),
        }),
    )
}

/// Force the debounced slot to fire now, e.g. before the host shuts down.
async fn handle_flush(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(ctrl) = state.ctrl.as_mut() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    match ctrl.flush_pending().await {
        Ok(fired) => ok(&req.id, json!({ "flushed": fired })),
        Err(e) => sync_err(&req.id, &e),
    }
}

pub async fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "sync.status" => Some(handle_status(state, req)),
        "sync.flush" => Some(handle_flush(state, req).await),
        _ => None,
    }
}
