use crate::error::StoreError;
use serde_json::json;

pub fn ok(id: &str, result: serde_json::Value) -> serde_json::Value {
    json!({
        "id": id,
        "ok": true,
        "result": result
    })
}

pub fn err(
    id: &str,
    code: &str,
    message: impl Into<String>,
    details: Option<serde_json::Value>,
) -> serde_json::Value {
    let mut error = json!({
        "code": code,
        "message": message.into(),
    });
    if let Some(d) = details {
        error["details"] = d;
    }
    json!({
        "id": id,
        "ok": false,
        "error": error,
    })
}

/// Failure of a single method call, already mapped to a wire code.
#[derive(Debug)]
pub struct HandlerError {
    pub code: &'static str,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl HandlerError {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn bad_params(message: impl Into<String>) -> Self {
        Self::new("bad_params", message)
    }
}

impl From<StoreError> for HandlerError {
    fn from(e: StoreError) -> Self {
        Self {
            code: e.code(),
            message: e.to_string(),
            details: e.details(),
        }
    }
}

impl From<serde_json::Error> for HandlerError {
    fn from(e: serde_json::Error) -> Self {
        Self::new("serialize_failed", e.to_string())
    }
}

pub type HandlerResult = Result<serde_json::Value, HandlerError>;

/// Wraps a handler outcome in the response envelope.
pub fn respond(id: &str, result: HandlerResult) -> serde_json::Value {
    match result {
        Ok(v) => ok(id, v),
        Err(e) => {
            if e.code == "db_query_failed" || e.code == "integrity_error" {
                tracing::warn!(id, code = e.code, message = %e.message, "request failed");
            } else {
                tracing::debug!(id, code = e.code, message = %e.message, "request rejected");
            }
            err(id, e.code, e.message, e.details)
        }
    }
}
