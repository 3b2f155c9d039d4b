use crate::ipc::error::{respond, HandlerResult};
use crate::ipc::helpers::{conn, now, required_str, to_json};
use crate::ipc::types::{AppState, Request};
use crate::query::{self, AnnouncementFilter};
use crate::store::announcements;
use crate::validate;
use serde_json::json;

fn handle_list(state: &AppState, req: &Request) -> HandlerResult {
    let conn = conn(state)?;
    let filter = AnnouncementFilter::from_params(&req.params)?;
    let rows = query::list_announcements(conn, &filter)?;
    Ok(json!({ "announcements": rows }))
}

fn handle_get(state: &AppState, req: &Request) -> HandlerResult {
    let conn = conn(state)?;
    let a = announcements::get(conn, required_str(req, "id")?)?;
    to_json(&a)
}

fn handle_create(state: &AppState, req: &Request) -> HandlerResult {
    let conn = conn(state)?;
    let input = validate::announcement(&req.params)?;
    let a = announcements::create(conn, &input, now())?;
    to_json(&a)
}

fn handle_update(state: &AppState, req: &Request) -> HandlerResult {
    let conn = conn(state)?;
    let id = required_str(req, "id")?;
    let input = validate::announcement(&req.params)?;
    let a = announcements::update(conn, id, &input)?;
    to_json(&a)
}

fn handle_delete(state: &AppState, req: &Request) -> HandlerResult {
    let conn = conn(state)?;
    let id = required_str(req, "id")?;
    announcements::delete(conn, id)?;
    Ok(json!({ "id": id }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "announcements.list" => handle_list(state, req),
        "announcements.get" => handle_get(state, req),
        "announcements.create" => handle_create(state, req),
        "announcements.update" => handle_update(state, req),
        "announcements.delete" => handle_delete(state, req),
        _ => return None,
    };
    Some(respond(&req.id, result))
}
