use serde_json::json;

use crate::ipc::error::{err, ok, sync_err};
use crate::ipc::types::{AppState, Request};
use crate::remarks::RemarkGenerator;

/// Generate both remark fields for one record, then push the change through
/// the ordinary update path (debounced when authenticated).
async fn handle_generate(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(ctrl) = state.ctrl.as_mut() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    if ctrl.user().is_none() {
        return err(&req.id, "no_session", "sign in first", None);
    }
    let Some(student_id) = req.params.get("studentId").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing params.studentId", None);
    };
    let Some(student) = ctrl.student(student_id).cloned() else {
        return err(&req.id, "not_found", "unknown studentId", None);
    };

    let remarks = match state.remarks.generate(&student).await {
        Ok(r) => r,
        Err(e) => return err(&req.id, "remarks_failed", e.to_string(), None),
    };

    let mut updated = student;
    updated.teacher_remark = remarks.teacher_remark.clone();
    updated.head_remark = remarks.head_remark.clone();
    match ctrl.update_student(updated).await {
        Ok(()) => ok(
            &req.id,
            json!({
                "teacherRemark": remarks.teacher_remark,
                "headRemark": remarks.head_remark,
            }),
        ),
        Err(e) => sync_err(&req.id, &e),
    }
}

pub async fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "remarks.generate" => Some(handle_generate(state, req).await),
        _ => None,
    }
}
