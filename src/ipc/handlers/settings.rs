use serde_json::json;

use crate::ipc::error::{err, ok, sync_err};
use crate::ipc::types::{AppState, Request};
use crate::model::AppSettings;

fn handle_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(ctrl) = state.ctrl.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    ok(&req.id, json!({ "settings": ctrl.settings() }))
}

/// Settings saves persist immediately in both modes (spec: never debounced).
async fn handle_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(ctrl) = state.ctrl.as_mut() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    if ctrl.user().is_none() {
        return err(&req.id, "no_session", "sign in first", None);
    }
    let Some(settings_value) = req.params.get("settings") else {
        return err(&req.id, "bad_params", "missing params.settings", None);
    };
    let settings: AppSettings = match serde_json::from_value(settings_value.clone()) {
        Ok(s) => s,
        Err(e) => {
            return err(&req.id, "bad_params", format!("invalid settings: {}", e), None)
        }
    };
    match ctrl.save_settings(settings).await {
        Ok(()) => ok(&req.id, json!({ "settings": ctrl.settings() })),
        Err(e) => sync_err(&req.id, &e),
    }
}

pub async fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "settings.get" => Some(handle_get(state, req)),
        "settings.update" => Some(handle_update(state, req).await),
        _ => None,
    }
}
