use crate::ipc::error::{respond, HandlerResult};
use crate::ipc::helpers::{conn, required_str, to_json, today};
use crate::ipc::types::{AppState, Request};
use crate::query::{self, StudentFilter, StudentView};
use crate::store::students;
use crate::validate;
use serde_json::json;

fn handle_list(state: &AppState, req: &Request) -> HandlerResult {
    let conn = conn(state)?;
    let filter = StudentFilter::from_params(&req.params)?;
    let rows = query::list_students(conn, &filter, today())?;
    Ok(json!({ "students": rows }))
}

fn handle_get(state: &AppState, req: &Request) -> HandlerResult {
    let conn = conn(state)?;
    let student = students::get(conn, required_str(req, "id")?)?;
    to_json(&StudentView::new(student, today()))
}

fn handle_detail(state: &AppState, req: &Request) -> HandlerResult {
    let conn = conn(state)?;
    let detail = query::student_detail(conn, required_str(req, "id")?, today())?;
    to_json(&detail)
}

fn handle_create(state: &AppState, req: &Request) -> HandlerResult {
    let conn = conn(state)?;
    let input = validate::student(&req.params)?;
    let today = today();
    let student = students::create(conn, &input, today)?;
    to_json(&StudentView::new(student, today))
}

fn handle_update(state: &AppState, req: &Request) -> HandlerResult {
    let conn = conn(state)?;
    let id = required_str(req, "id")?;
    let input = validate::student(&req.params)?;
    let student = students::update(conn, id, &input)?;
    to_json(&StudentView::new(student, today()))
}

fn handle_delete(state: &AppState, req: &Request) -> HandlerResult {
    let conn = conn(state)?;
    let id = required_str(req, "id")?;
    let removed = students::delete(conn, id)?;
    Ok(json!({ "id": id, "removed": removed }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "students.list" => handle_list(state, req),
        "students.get" => handle_get(state, req),
        "students.detail" => handle_detail(state, req),
        "students.create" => handle_create(state, req),
        "students.update" => handle_update(state, req),
        "students.delete" => handle_delete(state, req),
        _ => return None,
    };
    Some(respond(&req.id, result))
}
