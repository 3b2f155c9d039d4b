use super::{delete_enrollments_where, exists, new_id, probe, Removed};
use crate::error::{FieldErrors, StoreError};
use crate::model::Student;
use crate::validate::NewStudent;
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};

pub const COLUMNS: &str = "id, student_no, first_name, last_name, email, phone, date_of_birth,
    gender, address, city, state, postal_code, country, enrollment_date, status,
    profile_image, parent_name, parent_phone, emergency_contact, blood_group";

pub fn from_row(r: &Row<'_>) -> rusqlite::Result<Student> {
    Ok(Student {
        id: r.get("id")?,
        student_no: r.get("student_no")?,
        first_name: r.get("first_name")?,
        last_name: r.get("last_name")?,
        email: r.get("email")?,
        phone: r.get("phone")?,
        date_of_birth: r.get("date_of_birth")?,
        gender: r.get("gender")?,
        address: r.get("address")?,
        city: r.get("city")?,
        state: r.get("state")?,
        postal_code: r.get("postal_code")?,
        country: r.get("country")?,
        enrollment_date: r.get("enrollment_date")?,
        status: r.get("status")?,
        profile_image: r.get("profile_image")?,
        parent_name: r.get("parent_name")?,
        parent_phone: r.get("parent_phone")?,
        emergency_contact: r.get("emergency_contact")?,
        blood_group: r.get("blood_group")?,
    })
}

fn check_unique(conn: &Connection, input: &NewStudent, self_id: &str) -> Result<(), StoreError> {
    let mut errors = FieldErrors::new();
    if probe(
        conn,
        "SELECT 1 FROM students WHERE student_no = ? AND id <> ?",
        &[&input.student_no, &self_id],
    )? {
        errors.add("studentNo", "student with this student no already exists");
    }
    if probe(
        conn,
        "SELECT 1 FROM students WHERE email = ? AND id <> ?",
        &[&input.email, &self_id],
    )? {
        errors.add("email", "student with this email already exists");
    }
    errors.into_result(())
}

pub fn get(conn: &Connection, id: &str) -> Result<Student, StoreError> {
    let sql = format!("SELECT {} FROM students WHERE id = ?", COLUMNS);
    conn.query_row(&sql, [id], from_row)
        .optional()?
        .ok_or_else(|| StoreError::not_found("student", id))
}

/// `enrollment_date` is stamped with `today` and never changes afterwards.
pub fn create(conn: &Connection, input: &NewStudent, today: NaiveDate) -> Result<Student, StoreError> {
    let tx = conn.unchecked_transaction()?;
    check_unique(&tx, input, "")?;

    let id = new_id();
    tx.execute(
        "INSERT INTO students(id, student_no, first_name, last_name, email, phone,
           date_of_birth, gender, address, city, state, postal_code, country,
           enrollment_date, status, profile_image, parent_name, parent_phone,
           emergency_contact, blood_group)
         VALUES(?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        params![
            id,
            input.student_no,
            input.first_name,
            input.last_name,
            input.email,
            input.phone,
            input.date_of_birth,
            input.gender,
            input.address,
            input.city,
            input.state,
            input.postal_code,
            input.country,
            today,
            input.status,
            input.profile_image,
            input.parent_name,
            input.parent_phone,
            input.emergency_contact,
            input.blood_group,
        ],
    )?;
    let student = get(&tx, &id)?;
    tx.commit()?;

    tracing::info!(student_id = %id, student_no = %student.student_no, "student created");
    Ok(student)
}

pub fn update(conn: &Connection, id: &str, input: &NewStudent) -> Result<Student, StoreError> {
    let tx = conn.unchecked_transaction()?;
    if !exists(&tx, "students", id)? {
        return Err(StoreError::not_found("student", id));
    }
    check_unique(&tx, input, id)?;

    tx.execute(
        "UPDATE students SET
           student_no = ?, first_name = ?, last_name = ?, email = ?, phone = ?,
           date_of_birth = ?, gender = ?, address = ?, city = ?, state = ?,
           postal_code = ?, country = ?, status = ?, profile_image = ?,
           parent_name = ?, parent_phone = ?, emergency_contact = ?, blood_group = ?
         WHERE id = ?",
        params![
            input.student_no,
            input.first_name,
            input.last_name,
            input.email,
            input.phone,
            input.date_of_birth,
            input.gender,
            input.address,
            input.city,
            input.state,
            input.postal_code,
            input.country,
            input.status,
            input.profile_image,
            input.parent_name,
            input.parent_phone,
            input.emergency_contact,
            input.blood_group,
            id,
        ],
    )?;
    let student = get(&tx, id)?;
    tx.commit()?;

    tracing::info!(student_id = %id, "student updated");
    Ok(student)
}

/// Removes the student with every enrollment, grade and attendance record
/// that hangs off it.
pub fn delete(conn: &Connection, id: &str) -> Result<Removed, StoreError> {
    let tx = conn.unchecked_transaction()?;
    if !exists(&tx, "students", id)? {
        return Err(StoreError::not_found("student", id));
    }
    let removed = delete_enrollments_where(&tx, "student_id", id)?;
    tx.execute("DELETE FROM students WHERE id = ?", [id])?;
    tx.commit()?;

    tracing::info!(
        student_id = %id,
        enrollments = removed.enrollments,
        grades = removed.grades,
        attendance = removed.attendance,
        "student deleted"
    );
    Ok(removed)
}
