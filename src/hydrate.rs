//! Repairs persisted records against the current schema. Old rosters written
//! by earlier revisions come back with missing fields, stale subject lists or
//! loose value types; every read path routes through here so the rest of the
//! crate only ever sees canonical records. Repair is silent: hydration never
//! fails and never reports.

use serde_json::{Map, Value};

use crate::model::{
    clamp_ca, clamp_exam, conduct_catalog, subject_catalog, AppSettings, Conduct, StudentData,
    Subject,
};

/// Settings merge: start from canonical defaults, take saved values that are
/// present and well-typed. Empty strings count as missing.
pub fn hydrate_settings(raw: &Value) -> AppSettings {
    let Some(saved) = raw.as_object() else {
        return AppSettings::default();
    };
    let mut merged = match serde_json::to_value(AppSettings::default()) {
        Ok(Value::Object(m)) => m,
        _ => return AppSettings::default(),
    };
    merge_typed_fields(&mut merged, saved);
    serde_json::from_value(Value::Object(merged)).unwrap_or_default()
}

/// Normalize one raw student record: exactly the canonical subject/conduct
/// catalogs, clamped scores, settings fallbacks for legacy-missing strings.
/// Unknown-but-valid fields are preserved. Pure and idempotent.
pub fn hydrate_student(raw: &Value, settings: &AppSettings) -> StudentData {
    let mut obj = raw.as_object().cloned().unwrap_or_default();

    let subjects = reconcile_subjects(obj.get("subjects"));
    let conducts = reconcile_conducts(obj.get("conducts"));
    // Parsed separately above; keep the typed parse below from tripping on
    // malformed list entries.
    obj.insert("subjects".to_string(), Value::Array(vec![]));
    obj.insert("conducts".to_string(), Value::Array(vec![]));

    if let Ok(Value::Object(template)) = serde_json::to_value(StudentData::default()) {
        drop_mistyped_fields(&mut obj, &template);
    }

    let mut student: StudentData =
        serde_json::from_value(Value::Object(obj)).unwrap_or_default();
    student.subjects = subjects;
    student.conducts = conducts;

    fallback(&mut student.school_name, &settings.school_name);
    fallback(&mut student.school_address, &settings.school_address);
    fallback(&mut student.school_phone, &settings.school_phone);
    fallback(&mut student.teacher_name, &settings.default_teacher_name);
    fallback(&mut student.head_name, &settings.default_head_name);
    fallback(
        &mut student.head_of_school_name,
        &settings.default_head_of_school_name,
    );
    fallback(&mut student.term, &settings.term);
    fallback(&mut student.session, &settings.session);
    fallback(&mut student.next_term_begins, &settings.next_term_begins);

    student
}

/// A persisted roster is a JSON array of records. Anything else hydrates to
/// an empty roster.
pub fn hydrate_roster(raw: &Value, settings: &AppSettings) -> Vec<StudentData> {
    match raw.as_array() {
        Some(items) => items.iter().map(|r| hydrate_student(r, settings)).collect(),
        None => Vec::new(),
    }
}

fn fallback(field: &mut String, default: &str) {
    if field.trim().is_empty() {
        *field = default.to_string();
    }
}

/// Exactly the canonical subject ids, catalog order. Saved entries with a
/// canonical id are carried over (scores clamped to their bounds); ids the
/// catalog does not know are dropped.
fn reconcile_subjects(raw: Option<&Value>) -> Vec<Subject> {
    let entries = raw.and_then(|v| v.as_array()).cloned().unwrap_or_default();
    subject_catalog()
        .into_iter()
        .map(|canonical| {
            let found = entries
                .iter()
                .find(|e| e.get("id").and_then(|v| v.as_str()) == Some(canonical.id.as_str()))
                .and_then(|e| serde_json::from_value::<Subject>(e.clone()).ok());
            match found {
                Some(mut s) => {
                    s.ca_score = clamp_ca(s.ca_score);
                    s.exam_score = clamp_exam(s.exam_score);
                    s
                }
                None => canonical,
            }
        })
        .collect()
}

fn reconcile_conducts(raw: Option<&Value>) -> Vec<Conduct> {
    let entries = raw.and_then(|v| v.as_array()).cloned().unwrap_or_default();
    conduct_catalog()
        .into_iter()
        .map(|canonical| {
            entries
                .iter()
                .find(|e| e.get("id").and_then(|v| v.as_str()) == Some(canonical.id.as_str()))
                .and_then(|e| serde_json::from_value::<Conduct>(e.clone()).ok())
                .unwrap_or(canonical)
        })
        .collect()
}

/// Settings merge helper: copy saved values over defaults when the JSON type
/// agrees with the default's type. Nullable fields accept string or null.
fn merge_typed_fields(defaults: &mut Map<String, Value>, saved: &Map<String, Value>) {
    for (key, value) in saved {
        let accept = match defaults.get(key) {
            Some(Value::String(_)) => {
                matches!(value, Value::String(s) if !s.trim().is_empty())
            }
            Some(Value::Null) => value.is_string() || value.is_null(),
            _ => false,
        };
        if accept {
            defaults.insert(key.clone(), value.clone());
        }
    }
}

/// Remove known fields whose stored JSON type no longer matches the schema so
/// the typed parse falls back to the field default instead of failing the
/// whole record. Unknown keys pass through untouched.
fn drop_mistyped_fields(obj: &mut Map<String, Value>, template: &Map<String, Value>) {
    let mistyped: Vec<String> = obj
        .iter()
        .filter(|(key, value)| match template.get(key.as_str()) {
            Some(Value::String(_)) => !value.is_string(),
            Some(Value::Number(_)) => !value.is_number(),
            Some(Value::Bool(_)) => !value.is_boolean(),
            // Nullable/lenient fields (age, image refs, lastUpdated).
            Some(Value::Null) => {
                !(value.is_null() || value.is_string() || value.is_number())
            }
            _ => false,
        })
        .map(|(key, _)| key.clone())
        .collect();
    for key in mistyped {
        obj.remove(&key);
    }
}
