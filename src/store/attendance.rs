use super::{exists, new_id, probe, NON_FIELD};
use crate::error::{FieldErrors, StoreError};
use crate::model::Attendance;
use crate::validate::NewAttendance;
use rusqlite::{params, Connection, OptionalExtension, Row};

pub const COLUMNS: &str = "id, enrollment_id, date, status, remarks";

pub fn from_row(r: &Row<'_>) -> rusqlite::Result<Attendance> {
    Ok(Attendance {
        id: r.get("id")?,
        enrollment_id: r.get("enrollment_id")?,
        date: r.get("date")?,
        status: r.get("status")?,
        remarks: r.get("remarks")?,
    })
}

/// One record per enrollment per calendar day.
fn check_refs(conn: &Connection, input: &NewAttendance, self_id: &str) -> Result<(), StoreError> {
    if !exists(conn, "enrollments", &input.enrollment_id)? {
        return Err(FieldErrors::single("enrollmentId", "select a valid enrollment").into());
    }
    if probe(
        conn,
        "SELECT 1 FROM attendance WHERE enrollment_id = ? AND date = ? AND id <> ?",
        &[&input.enrollment_id, &input.date, &self_id],
    )? {
        return Err(FieldErrors::single(
            NON_FIELD,
            "attendance with this enrollment and date already exists",
        )
        .into());
    }
    Ok(())
}

pub fn get(conn: &Connection, id: &str) -> Result<Attendance, StoreError> {
    let sql = format!("SELECT {} FROM attendance WHERE id = ?", COLUMNS);
    conn.query_row(&sql, [id], from_row)
        .optional()?
        .ok_or_else(|| StoreError::not_found("attendance", id))
}

pub fn create(conn: &Connection, input: &NewAttendance) -> Result<Attendance, StoreError> {
    let tx = conn.unchecked_transaction()?;
    check_refs(&tx, input, "")?;

    let id = new_id();
    tx.execute(
        "INSERT INTO attendance(id, enrollment_id, date, status, remarks)
         VALUES(?, ?, ?, ?, ?)",
        params![id, input.enrollment_id, input.date, input.status, input.remarks],
    )?;
    let record = get(&tx, &id)?;
    tx.commit()?;

    tracing::info!(
        attendance_id = %id,
        enrollment_id = %input.enrollment_id,
        date = %input.date,
        status = %input.status,
        "attendance recorded"
    );
    Ok(record)
}

pub fn update(conn: &Connection, id: &str, input: &NewAttendance) -> Result<Attendance, StoreError> {
    let tx = conn.unchecked_transaction()?;
    if !exists(&tx, "attendance", id)? {
        return Err(StoreError::not_found("attendance", id));
    }
    check_refs(&tx, input, id)?;

    tx.execute(
        "UPDATE attendance SET enrollment_id = ?, date = ?, status = ?, remarks = ?
         WHERE id = ?",
        params![input.enrollment_id, input.date, input.status, input.remarks, id],
    )?;
    let record = get(&tx, id)?;
    tx.commit()?;

    tracing::info!(attendance_id = %id, "attendance updated");
    Ok(record)
}

pub fn delete(conn: &Connection, id: &str) -> Result<(), StoreError> {
    let n = conn.execute("DELETE FROM attendance WHERE id = ?", [id])?;
    if n == 0 {
        return Err(StoreError::not_found("attendance", id));
    }
    tracing::info!(attendance_id = %id, "attendance deleted");
    Ok(())
}
