use crate::db;
use crate::ipc::error::{respond, HandlerError, HandlerResult};
use crate::ipc::types::{AppState, Request};
use serde_json::json;
use std::path::PathBuf;

fn handle_health(state: &AppState) -> HandlerResult {
    Ok(json!({
        "version": env!("CARGO_PKG_VERSION"),
        "workspacePath": state.workspace.as_ref().map(|p| p.to_string_lossy().to_string()),
        "dbFile": db::DB_FILE_NAME,
    }))
}

fn handle_workspace_select(state: &mut AppState, req: &Request) -> HandlerResult {
    let Some(path) = req
        .params
        .get("path")
        .and_then(|v| v.as_str())
        .filter(|s| !s.trim().is_empty())
        .map(PathBuf::from)
    else {
        return Err(HandlerError::bad_params("missing params.path"));
    };

    state
        .open_workspace(&path)
        .map_err(|e| HandlerError::new("db_open_failed", format!("{e:#}")))?;
    Ok(json!({ "workspacePath": path.to_string_lossy() }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "health" => handle_health(state),
        "workspace.select" => handle_workspace_select(state, req),
        _ => return None,
    };
    Some(respond(&req.id, result))
}
