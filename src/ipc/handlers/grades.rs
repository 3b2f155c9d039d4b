use crate::ipc::error::{respond, HandlerResult};
use crate::ipc::helpers::{conn, required_str, to_json, today};
use crate::ipc::types::{AppState, Request};
use crate::query::{self, GradeFilter, GradeView};
use crate::store::grades;
use crate::validate;
use serde_json::json;

fn handle_list(state: &AppState, req: &Request) -> HandlerResult {
    let conn = conn(state)?;
    let filter = GradeFilter::from_params(&req.params)?;
    let rows = query::list_grades(conn, &filter)?;
    Ok(json!({ "grades": rows }))
}

fn handle_get(state: &AppState, req: &Request) -> HandlerResult {
    let conn = conn(state)?;
    let grade = grades::get(conn, required_str(req, "id")?)?;
    to_json(&GradeView::new(grade))
}

fn handle_create(state: &AppState, req: &Request) -> HandlerResult {
    let conn = conn(state)?;
    let input = validate::grade(&req.params)?;
    let grade = grades::create(conn, &input, today())?;
    to_json(&GradeView::new(grade))
}

fn handle_update(state: &AppState, req: &Request) -> HandlerResult {
    let conn = conn(state)?;
    let id = required_str(req, "id")?;
    let input = validate::grade(&req.params)?;
    let grade = grades::update(conn, id, &input)?;
    to_json(&GradeView::new(grade))
}

fn handle_delete(state: &AppState, req: &Request) -> HandlerResult {
    let conn = conn(state)?;
    let id = required_str(req, "id")?;
    grades::delete(conn, id)?;
    Ok(json!({ "id": id }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "grades.list" => handle_list(state, req),
        "grades.get" => handle_get(state, req),
        "grades.create" => handle_create(state, req),
        "grades.update" => handle_update(state, req),
        "grades.delete" => handle_delete(state, req),
        _ => return None,
    };
    Some(respond(&req.id, result))
}
