use chrono::{DateTime, Local, NaiveDate, Utc};
use rusqlite::Connection;
use serde::Serialize;

use super::error::HandlerError;
use super::types::{AppState, Request};

pub fn conn(state: &AppState) -> Result<&Connection, HandlerError> {
    state
        .db
        .as_ref()
        .ok_or_else(|| HandlerError::new("no_workspace", "select a workspace first"))
}

/// Non-empty string param, e.g. the target id of get/update/delete.
pub fn required_str<'a>(req: &'a Request, key: &str) -> Result<&'a str, HandlerError> {
    match req.params.get(key).and_then(|v| v.as_str()).map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(HandlerError::bad_params(format!("missing params.{key}"))),
    }
}

pub fn to_json<T: Serialize>(value: &T) -> Result<serde_json::Value, HandlerError> {
    Ok(serde_json::to_value(value)?)
}

/// Local calendar date used to stamp new records and compute ages.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn now() -> DateTime<Utc> {
    Utc::now()
}
