use crate::ipc::error::{respond, HandlerResult};
use crate::ipc::helpers::{conn, required_str, to_json};
use crate::ipc::types::{AppState, Request};
use crate::query::{self, CourseFilter, CourseView};
use crate::store::courses;
use crate::validate;
use serde_json::json;

fn handle_list(state: &AppState, req: &Request) -> HandlerResult {
    let conn = conn(state)?;
    let filter = CourseFilter::from_params(&req.params)?;
    let rows = query::list_courses(conn, &filter)?;
    Ok(json!({ "courses": rows }))
}

fn handle_get(state: &AppState, req: &Request) -> HandlerResult {
    let conn = conn(state)?;
    let detail = query::course_detail(conn, required_str(req, "id")?)?;
    to_json(&detail.course)
}

fn handle_detail(state: &AppState, req: &Request) -> HandlerResult {
    let conn = conn(state)?;
    let detail = query::course_detail(conn, required_str(req, "id")?)?;
    to_json(&detail)
}

fn handle_create(state: &AppState, req: &Request) -> HandlerResult {
    let conn = conn(state)?;
    let input = validate::course(&req.params)?;
    let course = courses::create(conn, &input)?;
    to_json(&CourseView::new(course, 0))
}

fn handle_update(state: &AppState, req: &Request) -> HandlerResult {
    let conn = conn(state)?;
    let id = required_str(req, "id")?;
    let input = validate::course(&req.params)?;
    courses::update(conn, id, &input)?;
    let detail = query::course_detail(conn, id)?;
    to_json(&detail.course)
}

fn handle_delete(state: &AppState, req: &Request) -> HandlerResult {
    let conn = conn(state)?;
    let id = required_str(req, "id")?;
    let removed = courses::delete(conn, id)?;
    Ok(json!({ "id": id, "removed": removed }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "courses.list" => handle_list(state, req),
        "courses.get" => handle_get(state, req),
        "courses.detail" => handle_detail(state, req),
        "courses.create" => handle_create(state, req),
        "courses.update" => handle_update(state, req),
        "courses.delete" => handle_delete(state, req),
        _ => return None,
    };
    Some(respond(&req.id, result))
}
