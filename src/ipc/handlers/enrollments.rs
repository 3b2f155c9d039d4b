use crate::ipc::error::{respond, HandlerResult};
use crate::ipc::helpers::{conn, required_str, to_json, today};
use crate::ipc::types::{AppState, Request};
use crate::query::{self, EnrollmentFilter};
use crate::store::enrollments;
use crate::validate;
use serde_json::json;

fn handle_list(state: &AppState, req: &Request) -> HandlerResult {
    let conn = conn(state)?;
    let filter = EnrollmentFilter::from_params(&req.params)?;
    let rows = query::list_enrollments(conn, &filter)?;
    Ok(json!({ "enrollments": rows }))
}

fn handle_get(state: &AppState, req: &Request) -> HandlerResult {
    let conn = conn(state)?;
    let enrollment = enrollments::get(conn, required_str(req, "id")?)?;
    to_json(&enrollment)
}

fn handle_detail(state: &AppState, req: &Request) -> HandlerResult {
    let conn = conn(state)?;
    let detail = query::enrollment_detail(conn, required_str(req, "id")?)?;
    to_json(&detail)
}

fn handle_create(state: &AppState, req: &Request) -> HandlerResult {
    let conn = conn(state)?;
    let input = validate::enrollment(&req.params)?;
    let enrollment = enrollments::create(conn, &input, today())?;
    to_json(&enrollment)
}

fn handle_update(state: &AppState, req: &Request) -> HandlerResult {
    let conn = conn(state)?;
    let id = required_str(req, "id")?;
    let input = validate::enrollment(&req.params)?;
    let enrollment = enrollments::update(conn, id, &input)?;
    to_json(&enrollment)
}

fn handle_delete(state: &AppState, req: &Request) -> HandlerResult {
    let conn = conn(state)?;
    let id = required_str(req, "id")?;
    let removed = enrollments::delete(conn, id)?;
    Ok(json!({ "id": id, "removed": removed }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "enrollments.list" => handle_list(state, req),
        "enrollments.get" => handle_get(state, req),
        "enrollments.detail" => handle_detail(state, req),
        "enrollments.create" => handle_create(state, req),
        "enrollments.update" => handle_update(state, req),
        "enrollments.delete" => handle_delete(state, req),
        _ => return None,
    };
    Some(respond(&req.id, result))
}
