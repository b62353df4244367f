use serde_json::json;

use crate::error::SyncError;

pub fn ok(id: &str, result: serde_json::Value) -> serde_json::Value {
    json!({
        "id": id,
        "ok": true,
        "result": result
    })
}

pub fn err(
    id: &str,
    code: &str,
    message: impl Into<String>,
    details: Option<serde_json::Value>,
) -> serde_json::Value {
    let mut error = json!({
        "code": code,
        "message": message.into(),
    });
    if let Some(d) = details {
        error["details"] = d;
    }
    json!({
        "id": id,
        "ok": false,
        "error": error,
    })
}

/// Storage/network failures reach the UI as advisory envelopes with the
/// taxonomy code, never as unhandled faults.
pub fn sync_err(id: &str, e: &SyncError) -> serde_json::Value {
    err(id, e.code(), e.to_string(), None)
}
