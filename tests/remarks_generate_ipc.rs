use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_kinderreportd");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn kinderreportd");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({ "id": id, "method": method, "params": params });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");
    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert!(
        value.get("ok").and_then(|v| v.as_bool()).unwrap_or(false),
        "{} failed: {}",
        method,
        value
    );
    value.get("result").cloned().unwrap_or_else(|| json!({}))
}

#[test]
fn remarks_generate_fills_both_fields_through_the_update_path() {
    let workspace = temp_dir("kinderreport-remarks");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let _ = request_ok(&mut stdin, &mut reader, "2", "session.guest", json!({}));

    let created = request_ok(&mut stdin, &mut reader, "3", "students.create", json!({}));
    let mut student = created["student"].clone();
    student["fullName"] = json!("Ada Obi");
    for subject in student["subjects"].as_array_mut().expect("subjects") {
        subject["caScore"] = json!(38.0);
        subject["examScore"] = json!(55.0);
    }
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "students.update",
        json!({ "student": student }),
    );

    let student_id = created["student"]["id"].as_str().expect("id");
    let generated = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "remarks.generate",
        json!({ "studentId": student_id }),
    );
    let teacher_remark = generated["teacherRemark"].as_str().expect("teacherRemark");
    assert!(teacher_remark.contains("Ada"));
    assert!(!generated["headRemark"].as_str().expect("headRemark").is_empty());

    let listed = request_ok(&mut stdin, &mut reader, "6", "students.list", json!({}));
    assert_eq!(
        listed["students"][0]["teacherRemark"].as_str().expect("stored remark"),
        teacher_remark
    );
    // Dashboard summaries ride along with the roster.
    assert_eq!(listed["summaries"][0]["grade"], json!("A+"));

    let _ = child.kill();
}
