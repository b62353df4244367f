use serde_json::json;

use crate::calc;
use crate::ipc::error::{err, ok, sync_err};
use crate::ipc::types::{AppState, Request};
use crate::model::StudentData;
use crate::sync::SyncController;

use crate::local::SqliteLocal;
use crate::remote::SqliteRemote;

fn require_session<'a>(
    state: &'a mut AppState,
    req: &Request,
) -> Result<&'a mut SyncController<SqliteLocal, SqliteRemote>, serde_json::Value> {
    let Some(ctrl) = state.ctrl.as_mut() else {
        return Err(err(&req.id, "no_workspace", "select a workspace first", None));
    };
    if ctrl.user().is_none() {
        return Err(err(&req.id, "no_session", "sign in first", None));
    }
    Ok(ctrl)
}

fn handle_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let ctrl = match require_session(state, req) {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    let summaries: Vec<serde_json::Value> = ctrl
        .roster()
        .iter()
        .map(|s| {
            let mut row = calc::student_summary(s);
            row["studentId"] = json!(s.id);
            row
        })
        .collect();
    ok(
        &req.id,
        json!({ "students": ctrl.roster(), "summaries": summaries }),
    )
}

async fn handle_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let ctrl = match require_session(state, req) {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    match ctrl.create_student().await {
        Ok(student) => ok(&req.id, json!({ "student": student })),
        Err(e) => sync_err(&req.id, &e),
    }
}

async fn handle_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let ctrl = match require_session(state, req) {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    let Some(student_value) = req.params.get("student") else {
        return err(&req.id, "bad_params", "missing params.student", None);
    };
    let student: StudentData = match serde_json::from_value(student_value.clone()) {
        Ok(s) => s,
        Err(e) => {
            return err(&req.id, "bad_params", format!("invalid student: {}", e), None)
        }
    };
    if student.id.trim().is_empty() {
        return err(&req.id, "bad_params", "student.id must not be empty", None);
    }
    match ctrl.update_student(student).await {
        Ok(()) => ok(&req.id, json!({ "pendingRemoteWrite": ctrl.has_pending() })),
        Err(e) => sync_err(&req.id, &e),
    }
}

async fn handle_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let ctrl = match require_session(state, req) {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    let Some(student_id) = req.params.get("studentId").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing params.studentId", None);
    };
    match ctrl.delete_student(student_id).await {
        Ok(()) => ok(&req.id, json!({ "ok": true })),
        Err(e) => sync_err(&req.id, &e),
    }
}

pub async fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "students.list" => Some(handle_list(state, req)),
        "students.create" => Some(handle_create(state, req).await),
        "students.update" => Some(handle_update(state, req).await),
        "students.delete" => Some(handle_delete(state, req).await),
        _ => None,
    }
}
