use super::{delete_enrollments_where, exists, new_id, probe, Removed};
use crate::error::{FieldErrors, StoreError};
use crate::model::Course;
use crate::validate::NewCourse;
use rusqlite::{params, Connection, OptionalExtension, Row};

pub const COLUMNS: &str = "id, code, name, description, credits, instructor, duration_weeks,
    difficulty, max_students, fees, start_date, end_date, is_active";

pub fn from_row(r: &Row<'_>) -> rusqlite::Result<Course> {
    Ok(Course {
        id: r.get("id")?,
        code: r.get("code")?,
        name: r.get("name")?,
        description: r.get("description")?,
        credits: r.get("credits")?,
        instructor: r.get("instructor")?,
        duration_weeks: r.get("duration_weeks")?,
        difficulty: r.get("difficulty")?,
        max_students: r.get("max_students")?,
        fees: r.get("fees")?,
        start_date: r.get("start_date")?,
        end_date: r.get("end_date")?,
        is_active: r.get::<_, i64>("is_active")? != 0,
    })
}

fn check_unique(conn: &Connection, input: &NewCourse, self_id: &str) -> Result<(), StoreError> {
    if probe(
        conn,
        "SELECT 1 FROM courses WHERE code = ? AND id <> ?",
        &[&input.code, &self_id],
    )? {
        return Err(FieldErrors::single("code", "course with this code already exists").into());
    }
    Ok(())
}

pub fn get(conn: &Connection, id: &str) -> Result<Course, StoreError> {
    let sql = format!("SELECT {} FROM courses WHERE id = ?", COLUMNS);
    conn.query_row(&sql, [id], from_row)
        .optional()?
        .ok_or_else(|| StoreError::not_found("course", id))
}

pub fn create(conn: &Connection, input: &NewCourse) -> Result<Course, StoreError> {
    let tx = conn.unchecked_transaction()?;
    check_unique(&tx, input, "")?;

    let id = new_id();
    tx.execute(
        "INSERT INTO courses(id, code, name, description, credits, instructor,
           duration_weeks, difficulty, max_students, fees, start_date, end_date, is_active)
         VALUES(?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        params![
            id,
            input.code,
            input.name,
            input.description,
            input.credits,
            input.instructor,
            input.duration_weeks,
            input.difficulty,
            input.max_students,
            input.fees,
            input.start_date,
            input.end_date,
            input.is_active as i64,
        ],
    )?;
    let course = get(&tx, &id)?;
    tx.commit()?;

    tracing::info!(course_id = %id, code = %course.code, "course created");
    Ok(course)
}

pub fn update(conn: &Connection, id: &str, input: &NewCourse) -> Result<Course, StoreError> {
    let tx = conn.unchecked_transaction()?;
    if !exists(&tx, "courses", id)? {
        return Err(StoreError::not_found("course", id));
    }
    check_unique(&tx, input, id)?;

    tx.execute(
        "UPDATE courses SET
           code = ?, name = ?, description = ?, credits = ?, instructor = ?,
           duration_weeks = ?, difficulty = ?, max_students = ?, fees = ?,
           start_date = ?, end_date = ?, is_active = ?
         WHERE id = ?",
        params![
            input.code,
            input.name,
            input.description,
            input.credits,
            input.instructor,
            input.duration_weeks,
            input.difficulty,
            input.max_students,
            input.fees,
            input.start_date,
            input.end_date,
            input.is_active as i64,
            id,
        ],
    )?;
    let course = get(&tx, id)?;
    tx.commit()?;

    tracing::info!(course_id = %id, "course updated");
    Ok(course)
}

pub fn delete(conn: &Connection, id: &str) -> Result<Removed, StoreError> {
    let tx = conn.unchecked_transaction()?;
    if !exists(&tx, "courses", id)? {
        return Err(StoreError::not_found("course", id));
    }
    let removed = delete_enrollments_where(&tx, "course_id", id)?;
    tx.execute("DELETE FROM courses WHERE id = ?", [id])?;
    tx.commit()?;

    tracing::info!(
        course_id = %id,
        enrollments = removed.enrollments,
        grades = removed.grades,
        attendance = removed.attendance,
        "course deleted"
    );
    Ok(removed)
}
