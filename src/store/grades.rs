use super::{exists, new_id};
use crate::error::{FieldErrors, StoreError};
use crate::model::Grade;
use crate::validate::NewGrade;
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};

pub const COLUMNS: &str = "id, enrollment_id, assignment_name, marks_obtained, total_marks, date, remarks";

pub fn from_row(r: &Row<'_>) -> rusqlite::Result<Grade> {
    Ok(Grade {
        id: r.get("id")?,
        enrollment_id: r.get("enrollment_id")?,
        assignment_name: r.get("assignment_name")?,
        marks_obtained: r.get("marks_obtained")?,
        total_marks: r.get("total_marks")?,
        date: r.get("date")?,
        remarks: r.get("remarks")?,
    })
}

fn check_enrollment(conn: &Connection, enrollment_id: &str) -> Result<(), StoreError> {
    if !exists(conn, "enrollments", enrollment_id)? {
        return Err(FieldErrors::single("enrollmentId", "select a valid enrollment").into());
    }
    Ok(())
}

pub fn get(conn: &Connection, id: &str) -> Result<Grade, StoreError> {
    let sql = format!("SELECT {} FROM grades WHERE id = ?", COLUMNS);
    conn.query_row(&sql, [id], from_row)
        .optional()?
        .ok_or_else(|| StoreError::not_found("grade", id))
}

/// The record date is stamped with `today` and never changes afterwards.
pub fn create(conn: &Connection, input: &NewGrade, today: NaiveDate) -> Result<Grade, StoreError> {
    let tx = conn.unchecked_transaction()?;
    check_enrollment(&tx, &input.enrollment_id)?;

    let id = new_id();
    tx.execute(
        "INSERT INTO grades(id, enrollment_id, assignment_name, marks_obtained, total_marks,
           date, remarks)
         VALUES(?, ?, ?, ?, ?, ?, ?)",
        params![
            id,
            input.enrollment_id,
            input.assignment_name,
            input.marks_obtained,
            input.total_marks,
            today,
            input.remarks,
        ],
    )?;
    let grade = get(&tx, &id)?;
    tx.commit()?;

    tracing::info!(grade_id = %id, enrollment_id = %input.enrollment_id, "grade recorded");
    Ok(grade)
}

pub fn update(conn: &Connection, id: &str, input: &NewGrade) -> Result<Grade, StoreError> {
    let tx = conn.unchecked_transaction()?;
    if !exists(&tx, "grades", id)? {
        return Err(StoreError::not_found("grade", id));
    }
    check_enrollment(&tx, &input.enrollment_id)?;

    tx.execute(
        "UPDATE grades SET
           enrollment_id = ?, assignment_name = ?, marks_obtained = ?, total_marks = ?,
           remarks = ?
         WHERE id = ?",
        params![
            input.enrollment_id,
            input.assignment_name,
            input.marks_obtained,
            input.total_marks,
            input.remarks,
            id,
        ],
    )?;
    let grade = get(&tx, id)?;
    tx.commit()?;

    tracing::info!(grade_id = %id, "grade updated");
    Ok(grade)
}

pub fn delete(conn: &Connection, id: &str) -> Result<(), StoreError> {
    let n = conn.execute("DELETE FROM grades WHERE id = ?", [id])?;
    if n == 0 {
        return Err(StoreError::not_found("grade", id));
    }
    tracing::info!(grade_id = %id, "grade deleted");
    Ok(())
}
