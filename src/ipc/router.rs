use super::handlers;
use super::types::{AppState, Request};
use crate::ipc::error::err;

type TryHandle = fn(&mut AppState, &Request) -> Option<serde_json::Value>;

const HANDLERS: &[TryHandle] = &[
    handlers::core::try_handle,
    handlers::students::try_handle,
    handlers::courses::try_handle,
    handlers::enrollments::try_handle,
    handlers::grades::try_handle,
    handlers::attendance::try_handle,
    handlers::announcements::try_handle,
    handlers::dashboard::try_handle,
];

pub fn handle_request(state: &mut AppState, req: Request) -> serde_json::Value {
    let span = tracing::info_span!("request", id = %req.id, method = %req.method);
    let _enter = span.enter();

    for try_handle in HANDLERS {
        if let Some(resp) = try_handle(state, &req) {
            tracing::debug!(ok = resp["ok"].as_bool().unwrap_or(false), "handled");
            return resp;
        }
    }

    tracing::warn!("unknown method");
    err(
        &req.id,
        "not_implemented",
        format!("unknown method: {}", req.method),
        None,
    )
}
