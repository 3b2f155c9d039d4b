use rusqlite::functions::FunctionFlags;
use rusqlite::Connection;
use std::path::Path;

pub const DB_FILE_NAME: &str = "roster.sqlite3";

pub fn open_db(workspace: &Path) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(workspace)?;
    let db_path = workspace.join(DB_FILE_NAME);
    let conn = Connection::open(db_path)?;
    register_functions(&conn)?;
    init_schema(&conn)?;
    Ok(conn)
}

#[cfg(test)]
pub fn open_in_memory() -> anyhow::Result<Connection> {
    let conn = Connection::open_in_memory()?;
    register_functions(&conn)?;
    init_schema(&conn)?;
    Ok(conn)
}

/// SQL name of the Unicode-aware lowercase used by text search. The
/// built-in `lower()` only folds ASCII.
pub const LOWER_FN: &str = "unicode_lower";

/// Per-connection SQL functions; must run on every connection before
/// queries that reference them.
pub fn register_functions(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        LOWER_FN,
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let text: Option<String> = ctx.get(0)?;
            Ok(text.map(|t| t.to_lowercase()))
        },
    )
}

/// Foreign keys are declared without ON DELETE CASCADE: parent deletes
/// remove dependents explicitly, in order, inside one transaction.
pub fn init_schema(conn: &Connection) -> anyhow::Result<()> {
    conn.execute("PRAGMA foreign_keys = ON", [])?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS students(
            id TEXT PRIMARY KEY,
            student_no TEXT NOT NULL UNIQUE,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            phone TEXT NOT NULL,
            date_of_birth TEXT NOT NULL,
            gender TEXT NOT NULL,
            address TEXT NOT NULL,
            city TEXT NOT NULL DEFAULT 'Unknown',
            state TEXT NOT NULL DEFAULT 'Unknown',
            postal_code TEXT NOT NULL DEFAULT '000000',
            country TEXT NOT NULL DEFAULT 'India',
            enrollment_date TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'Active',
            profile_image TEXT,
            parent_name TEXT NOT NULL DEFAULT '',
            parent_phone TEXT NOT NULL DEFAULT '',
            emergency_contact TEXT NOT NULL DEFAULT '',
            blood_group TEXT NOT NULL DEFAULT ''
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_students_enrollment_date ON students(enrollment_date)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS courses(
            id TEXT PRIMARY KEY,
            code TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            description TEXT NOT NULL,
            credits INTEGER NOT NULL CHECK(credits BETWEEN 1 AND 10),
            instructor TEXT NOT NULL,
            duration_weeks INTEGER NOT NULL DEFAULT 12,
            difficulty TEXT NOT NULL DEFAULT 'Beginner',
            max_students INTEGER NOT NULL DEFAULT 30 CHECK(max_students > 0),
            fees REAL NOT NULL DEFAULT 0,
            start_date TEXT,
            end_date TEXT,
            is_active INTEGER NOT NULL DEFAULT 1
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS enrollments(
            id TEXT PRIMARY KEY,
            student_id TEXT NOT NULL,
            course_id TEXT NOT NULL,
            enrollment_date TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'Active',
            final_grade TEXT,
            completion_date TEXT,
            FOREIGN KEY(student_id) REFERENCES students(id),
            FOREIGN KEY(course_id) REFERENCES courses(id),
            UNIQUE(student_id, course_id)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_enrollments_student ON enrollments(student_id)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_enrollments_course ON enrollments(course_id)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS grades(
            id TEXT PRIMARY KEY,
            enrollment_id TEXT NOT NULL,
            assignment_name TEXT NOT NULL,
            marks_obtained REAL NOT NULL CHECK(marks_obtained >= 0),
            total_marks REAL NOT NULL CHECK(total_marks > 0),
            date TEXT NOT NULL,
            remarks TEXT NOT NULL DEFAULT '',
            FOREIGN KEY(enrollment_id) REFERENCES enrollments(id)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_grades_enrollment ON grades(enrollment_id)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS attendance(
            id TEXT PRIMARY KEY,
            enrollment_id TEXT NOT NULL,
            date TEXT NOT NULL,
            status TEXT NOT NULL,
            remarks TEXT NOT NULL DEFAULT '',
            FOREIGN KEY(enrollment_id) REFERENCES enrollments(id),
            UNIQUE(enrollment_id, date)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_attendance_enrollment ON attendance(enrollment_id)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS announcements(
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            content TEXT NOT NULL,
            created_at TEXT NOT NULL,
            is_active INTEGER NOT NULL DEFAULT 1,
            priority TEXT NOT NULL DEFAULT 'Medium'
        )",
        [],
    )?;

    Ok(())
}
