use super::{delete_enrollments_where, exists, new_id, probe, Removed, NON_FIELD};
use crate::error::{FieldErrors, StoreError};
use crate::model::Enrollment;
use crate::validate::NewEnrollment;
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};

pub const COLUMNS: &str =
    "id, student_id, course_id, enrollment_date, status, final_grade, completion_date";

pub fn from_row(r: &Row<'_>) -> rusqlite::Result<Enrollment> {
    Ok(Enrollment {
        id: r.get("id")?,
        student_id: r.get("student_id")?,
        course_id: r.get("course_id")?,
        enrollment_date: r.get("enrollment_date")?,
        status: r.get("status")?,
        final_grade: r.get("final_grade")?,
        completion_date: r.get("completion_date")?,
    })
}

/// Both parents must exist and the (student, course) pair must be free.
fn check_refs(conn: &Connection, input: &NewEnrollment, self_id: &str) -> Result<(), StoreError> {
    let mut errors = FieldErrors::new();
    if !exists(conn, "students", &input.student_id)? {
        errors.add("studentId", "select a valid student");
    }
    if !exists(conn, "courses", &input.course_id)? {
        errors.add("courseId", "select a valid course");
    }
    if errors.is_empty()
        && probe(
            conn,
            "SELECT 1 FROM enrollments WHERE student_id = ? AND course_id = ? AND id <> ?",
            &[&input.student_id, &input.course_id, &self_id],
        )?
    {
        errors.add(
            NON_FIELD,
            "enrollment with this student and course already exists",
        );
    }
    errors.into_result(())
}

pub fn get(conn: &Connection, id: &str) -> Result<Enrollment, StoreError> {
    let sql = format!("SELECT {} FROM enrollments WHERE id = ?", COLUMNS);
    conn.query_row(&sql, [id], from_row)
        .optional()?
        .ok_or_else(|| StoreError::not_found("enrollment", id))
}

pub fn create(
    conn: &Connection,
    input: &NewEnrollment,
    today: NaiveDate,
) -> Result<Enrollment, StoreError> {
    let tx = conn.unchecked_transaction()?;
    check_refs(&tx, input, "")?;

    let id = new_id();
    tx.execute(
        "INSERT INTO enrollments(id, student_id, course_id, enrollment_date, status,
           final_grade, completion_date)
         VALUES(?, ?, ?, ?, ?, ?, ?)",
        params![
            id,
            input.student_id,
            input.course_id,
            today,
            input.status,
            input.final_grade,
            input.completion_date,
        ],
    )?;
    let enrollment = get(&tx, &id)?;
    tx.commit()?;

    tracing::info!(
        enrollment_id = %id,
        student_id = %input.student_id,
        course_id = %input.course_id,
        "enrollment created"
    );
    Ok(enrollment)
}

pub fn update(conn: &Connection, id: &str, input: &NewEnrollment) -> Result<Enrollment, StoreError> {
    let tx = conn.unchecked_transaction()?;
    if !exists(&tx, "enrollments", id)? {
        return Err(StoreError::not_found("enrollment", id));
    }
    check_refs(&tx, input, id)?;

    tx.execute(
        "UPDATE enrollments SET
           student_id = ?, course_id = ?, status = ?, final_grade = ?, completion_date = ?
         WHERE id = ?",
        params![
            input.student_id,
            input.course_id,
            input.status,
            input.final_grade,
            input.completion_date,
            id,
        ],
    )?;
    let enrollment = get(&tx, id)?;
    tx.commit()?;

    tracing::info!(enrollment_id = %id, status = %enrollment.status, "enrollment updated");
    Ok(enrollment)
}

pub fn delete(conn: &Connection, id: &str) -> Result<Removed, StoreError> {
    let tx = conn.unchecked_transaction()?;
    if !exists(&tx, "enrollments", id)? {
        return Err(StoreError::not_found("enrollment", id));
    }
    let removed = delete_enrollments_where(&tx, "id", id)?;
    tx.commit()?;

    tracing::info!(
        enrollment_id = %id,
        grades = removed.grades,
        attendance = removed.attendance,
        "enrollment deleted"
    );
    Ok(removed)
}
