#![allow(dead_code)]

use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

pub fn temp_dir(prefix: &str) -> PathBuf {
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

pub fn spawn_sidecar_with(args: &[&str]) -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_rosterd");
    let mut child = Command::new(exe)
        .args(args)
        .env_remove("ROSTERD_WORKSPACE")
        .env_remove("ROSTERD_LOG_FORMAT")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn rosterd");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

pub fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    spawn_sidecar_with(&[])
}

pub fn send_line(stdin: &mut ChildStdin, reader: &mut BufReader<ChildStdout>, line: &str) -> serde_json::Value {
    writeln!(stdin, "{}", line).expect("write request");
    stdin.flush().expect("flush request");

    let mut out = String::new();
    reader.read_line(&mut out).expect("read response line");
    assert!(!out.trim().is_empty(), "empty response for {}", line);
    serde_json::from_str(out.trim()).expect("parse response json")
}

pub fn request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    let value = send_line(stdin, reader, &payload.to_string());
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    value
}

pub fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let value = request(stdin, reader, id, method, params);
    assert_eq!(
        value.get("ok").and_then(|v| v.as_bool()),
        Some(true),
        "{} failed: {}",
        method,
        value
    );
    value.get("result").cloned().expect("result")
}

/// Returns the error object after checking its code.
pub fn request_err(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
    code: &str,
) -> serde_json::Value {
    let value = request(stdin, reader, id, method, params);
    assert_eq!(
        value.get("ok").and_then(|v| v.as_bool()),
        Some(false),
        "{} unexpectedly succeeded: {}",
        method,
        value
    );
    let error = value.get("error").cloned().expect("error");
    assert_eq!(error.get("code").and_then(|v| v.as_str()), Some(code), "{}", error);
    error
}

pub fn str_field(v: &serde_json::Value, key: &str) -> String {
    v.get(key)
        .and_then(|v| v.as_str())
        .unwrap_or_else(|| panic!("missing {} in {}", key, v))
        .to_string()
}

pub fn student_params(no: &str, first: &str, last: &str, email: &str) -> serde_json::Value {
    json!({
        "studentNo": no,
        "firstName": first,
        "lastName": last,
        "email": email,
        "phone": "9876543210",
        "dateOfBirth": "2003-02-11",
        "gender": "M",
        "address": "4 Lake Road",
    })
}

pub fn course_params(code: &str, name: &str, max_students: i64) -> serde_json::Value {
    json!({
        "code": code,
        "name": name,
        "description": "Lectures and labs",
        "credits": 3,
        "instructor": "Dr. Sen",
        "maxStudents": max_students,
    })
}
