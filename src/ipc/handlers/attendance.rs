use crate::ipc::error::{respond, HandlerResult};
use crate::ipc::helpers::{conn, required_str, to_json};
use crate::ipc::types::{AppState, Request};
use crate::query::{self, AttendanceFilter};
use crate::store::attendance;
use crate::validate;
use serde_json::json;

fn handle_list(state: &AppState, req: &Request) -> HandlerResult {
    let conn = conn(state)?;
    let filter = AttendanceFilter::from_params(&req.params)?;
    let rows = query::list_attendance(conn, &filter)?;
    Ok(json!({ "attendance": rows }))
}

fn handle_get(state: &AppState, req: &Request) -> HandlerResult {
    let conn = conn(state)?;
    let record = attendance::get(conn, required_str(req, "id")?)?;
    to_json(&record)
}

fn handle_create(state: &AppState, req: &Request) -> HandlerResult {
    let conn = conn(state)?;
    let input = validate::attendance(&req.params)?;
    let record = attendance::create(conn, &input)?;
    to_json(&record)
}

fn handle_update(state: &AppState, req: &Request) -> HandlerResult {
    let conn = conn(state)?;
    let id = required_str(req, "id")?;
    let input = validate::attendance(&req.params)?;
    let record = attendance::update(conn, id, &input)?;
    to_json(&record)
}

fn handle_delete(state: &AppState, req: &Request) -> HandlerResult {
    let conn = conn(state)?;
    let id = required_str(req, "id")?;
    attendance::delete(conn, id)?;
    Ok(json!({ "id": id }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "attendance.list" => handle_list(state, req),
        "attendance.get" => handle_get(state, req),
        "attendance.create" => handle_create(state, req),
        "attendance.update" => handle_update(state, req),
        "attendance.delete" => handle_delete(state, req),
        _ => return None,
    };
    Some(respond(&req.id, result))
}
