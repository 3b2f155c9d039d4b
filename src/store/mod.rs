//! Entity Store: per-entity create/read/update/delete on SQLite.
//!
//! Every write runs in one transaction. Uniqueness and reference checks run
//! inside that transaction and surface as field-level validation errors;
//! anything SQLite still rejects at write time surfaces as an integrity error.

pub mod announcements;
pub mod attendance;
pub mod courses;
pub mod enrollments;
pub mod grades;
pub mod students;

#[cfg(test)]
pub(crate) mod fixtures;

use crate::error::StoreError;
use rusqlite::{Connection, OptionalExtension, ToSql};
use serde::Serialize;
use uuid::Uuid;

/// Field key for errors that concern a combination of fields.
pub const NON_FIELD: &str = "__all__";

pub(crate) fn new_id() -> String {
    Uuid::new_v4().to_string()
}

pub(crate) fn exists(conn: &Connection, table: &str, id: &str) -> Result<bool, StoreError> {
    let sql = format!("SELECT 1 FROM {} WHERE id = ?", table);
    let found = conn
        .query_row(&sql, [id], |r| r.get::<_, i64>(0))
        .optional()?;
    Ok(found.is_some())
}

/// True when `sql` (a `SELECT 1 ...` probe) returns a row.
pub(crate) fn probe(conn: &Connection, sql: &str, params: &[&dyn ToSql]) -> Result<bool, StoreError> {
    let found = conn
        .query_row(sql, params, |r| r.get::<_, i64>(0))
        .optional()?;
    Ok(found.is_some())
}

/// Dependents removed alongside a parent record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Removed {
    pub enrollments: usize,
    pub grades: usize,
    pub attendance: usize,
}

/// Deletes enrollments matching `column = value` together with their grades
/// and attendance, dependents first. Callers own the transaction.
pub(crate) fn delete_enrollments_where(
    conn: &Connection,
    column: &str,
    value: &str,
) -> Result<Removed, StoreError> {
    let grades = conn.execute(
        &format!(
            "DELETE FROM grades
             WHERE enrollment_id IN (SELECT id FROM enrollments WHERE {} = ?)",
            column
        ),
        [value],
    )?;
    let attendance = conn.execute(
        &format!(
            "DELETE FROM attendance
             WHERE enrollment_id IN (SELECT id FROM enrollments WHERE {} = ?)",
            column
        ),
        [value],
    )?;
    let enrollments = conn.execute(
        &format!("DELETE FROM enrollments WHERE {} = ?", column),
        [value],
    )?;
    Ok(Removed {
        enrollments,
        grades,
        attendance,
    })
}
