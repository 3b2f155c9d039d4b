use crate::ipc::error::{respond, HandlerResult};
use crate::ipc::helpers::{conn, to_json, today};
use crate::ipc::types::{AppState, Request};
use crate::query;

fn handle_summary(state: &AppState) -> HandlerResult {
    let conn = conn(state)?;
    to_json(&query::dashboard(conn, today())?)
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "dashboard.summary" => Some(respond(&req.id, handle_summary(state))),
        _ => None,
    }
}
