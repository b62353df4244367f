use serde_json::json;
use std::path::PathBuf;

use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::local::SqliteLocal;
use crate::remote::SqliteRemote;
use crate::sync::SyncController;

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "workspacePath": state.workspace.as_ref().map(|p| p.to_string_lossy().to_string())
        }),
    )
}

/// Opens both storage tiers for a workspace directory and resets the
/// controller. Selecting a new workspace drops any previous session.
fn handle_workspace_select(state: &mut AppState, req: &Request) -> serde_json::Value {
    let p = req
        .params
        .get("path")
        .and_then(|v| v.as_str())
        .map(PathBuf::from);
    let Some(path) = p else {
        return err(&req.id, "bad_params", "missing params.path", None);
    };

    let local = match SqliteLocal::open(&path) {
        Ok(l) => l,
        Err(e) => return err(&req.id, "db_open_failed", format!("{e:?}"), None),
    };
    let remote = match SqliteRemote::open(&path) {
        Ok(r) => r,
        Err(e) => return err(&req.id, "db_open_failed", format!("{e:?}"), None),
    };

    state.workspace = Some(path.clone());
    state.ctrl = Some(SyncController::new(local, remote));
    ok(&req.id, json!({ "workspacePath": path.to_string_lossy() }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "workspace.select" => Some(handle_workspace_select(state, req)),
        _ => None,
    }
}
