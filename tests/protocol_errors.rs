mod test_support;

use serde_json::json;
use test_support::{
    request_err, request_ok, send_line, spawn_sidecar, spawn_sidecar_with, student_params,
    temp_dir,
};

#[test]
fn malformed_lines_and_missing_workspace_are_reported() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let resp = send_line(&mut stdin, &mut reader, "{not json");
    assert_eq!(resp.get("ok").and_then(|v| v.as_bool()), Some(false));
    assert_eq!(
        resp.pointer("/error/code").and_then(|v| v.as_str()),
        Some("bad_json")
    );

    let _ = request_err(
        &mut stdin,
        &mut reader,
        "1",
        "students.list",
        json!({}),
        "no_workspace",
    );
    let _ = request_err(
        &mut stdin,
        &mut reader,
        "2",
        "workspace.select",
        json!({}),
        "bad_params",
    );

    // The daemon keeps serving after errors.
    let health = request_ok(&mut stdin, &mut reader, "3", "health", json!({}));
    assert!(health.get("version").and_then(|v| v.as_str()).is_some());

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn workspace_flag_opens_database_at_startup() {
    let workspace = temp_dir("rosterd-startup-workspace");
    let path = workspace.to_string_lossy().to_string();
    let (mut child, mut stdin, mut reader) = spawn_sidecar_with(&["--workspace", &path]);

    let health = request_ok(&mut stdin, &mut reader, "1", "health", json!({}));
    assert_eq!(
        health.get("workspacePath").and_then(|v| v.as_str()),
        Some(path.as_str())
    );
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "students.create",
        student_params("STU001", "Neha", "Joshi", "neha@school.in"),
    );

    let _ = request_err(
        &mut stdin,
        &mut reader,
        "3",
        "students.get",
        json!({}),
        "bad_params",
    );
    let missing = request_err(
        &mut stdin,
        &mut reader,
        "4",
        "students.get",
        json!({ "id": "no-such-id" }),
        "not_found",
    );
    assert_eq!(
        missing.pointer("/details/entity").and_then(|v| v.as_str()),
        Some("student")
    );

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}
