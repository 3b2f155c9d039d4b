//! Filtered lists, detail views and the dashboard.
//!
//! Text search is a case-insensitive substring match OR-ed across a fixed
//! set of columns; categorical filters are AND-ed on top. Rows come back in
//! the default order for their entity, newest first, with insertion order
//! breaking ties.

use crate::calc;
use crate::db;
use crate::error::StoreError;
use crate::model::{
    Announcement, Attendance, AttendanceStatus, Course, CourseRef, Difficulty, Enrollment,
    EnrollmentStatus, Gender, Grade, Priority, Student, StudentRef, StudentStatus,
};
use crate::store::{announcements, attendance, courses, enrollments, grades, students};
use crate::validate::Form;
use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row};
use serde::Serialize;

const RECENT_STUDENTS: i64 = 5;
const RECENT_ENROLLMENTS: i64 = 5;
const RECENT_ANNOUNCEMENTS: i64 = 3;
const TOP_COURSES: i64 = 5;
const RECENT_GRADES: i64 = 5;

/// Accumulates WHERE fragments and their bound values.
#[derive(Default)]
struct Filter {
    clauses: Vec<String>,
    args: Vec<Value>,
}

impl Filter {
    fn eq(&mut self, column: &str, value: impl Into<Value>) {
        self.clauses.push(format!("{} = ?", column));
        self.args.push(value.into());
    }

    fn text(&mut self, columns: &[&str], q: Option<&str>) {
        let Some(q) = q else { return };
        let parts: Vec<String> = columns
            .iter()
            .map(|c| format!("instr({}({}), ?) > 0", db::LOWER_FN, c))
            .collect();
        self.clauses.push(format!("({})", parts.join(" OR ")));
        let needle = q.to_lowercase();
        for _ in columns {
            self.args.push(Value::Text(needle.clone()));
        }
    }

    fn where_sql(&self) -> String {
        if self.clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.clauses.join(" AND "))
        }
    }
}

fn collect<T>(
    conn: &Connection,
    sql: &str,
    args: Vec<Value>,
    map: impl FnMut(&Row<'_>) -> rusqlite::Result<T>,
) -> Result<Vec<T>, StoreError> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params_from_iter(args), map)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn count(conn: &Connection, sql: &str) -> Result<i64, StoreError> {
    Ok(conn.query_row(sql, [], |r| r.get(0))?)
}

fn student_ref(r: &Row<'_>) -> rusqlite::Result<StudentRef> {
    let first: String = r.get("s_first_name")?;
    let last: String = r.get("s_last_name")?;
    Ok(StudentRef {
        id: r.get("student_id")?,
        student_no: r.get("s_student_no")?,
        full_name: calc::full_name(&first, &last),
    })
}

fn course_ref(r: &Row<'_>) -> rusqlite::Result<CourseRef> {
    Ok(CourseRef {
        id: r.get("course_id")?,
        code: r.get("c_code")?,
        name: r.get("c_name")?,
    })
}

const REF_COLUMNS: &str = "s.student_no AS s_student_no, s.first_name AS s_first_name,
    s.last_name AS s_last_name, c.code AS c_code, c.name AS c_name";

// ---------------------------------------------------------------------------
// Row views: stored fields plus derived values.

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentView {
    #[serde(flatten)]
    pub student: Student,
    pub full_name: String,
    pub age: u32,
}

impl StudentView {
    pub fn new(student: Student, today: NaiveDate) -> Self {
        Self {
            full_name: calc::full_name(&student.first_name, &student.last_name),
            age: calc::age(student.date_of_birth, today),
            student,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseView {
    #[serde(flatten)]
    pub course: Course,
    pub enrolled_count: i64,
    pub seats_available: i64,
}

impl CourseView {
    pub fn new(course: Course, enrolled_count: i64) -> Self {
        Self {
            seats_available: calc::seats_available(course.max_students, enrolled_count),
            enrolled_count,
            course,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentView {
    #[serde(flatten)]
    pub enrollment: Enrollment,
    pub student: StudentRef,
    pub course: CourseRef,
    pub average_grade: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeView {
    #[serde(flatten)]
    pub grade: Grade,
    pub percentage: f64,
    pub grade_letter: &'static str,
}

impl GradeView {
    pub fn new(grade: Grade) -> Self {
        let percentage = calc::percentage(grade.marks_obtained, grade.total_marks);
        Self {
            grade_letter: calc::grade_letter(percentage),
            percentage,
            grade,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeRow {
    #[serde(flatten)]
    pub grade: GradeView,
    pub student: StudentRef,
    pub course: CourseRef,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRow {
    #[serde(flatten)]
    pub attendance: Attendance,
    pub student: StudentRef,
    pub course: CourseRef,
}

// ---------------------------------------------------------------------------
// Filters.

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StudentFilter {
    pub q: Option<String>,
    pub status: Option<StudentStatus>,
    pub gender: Option<Gender>,
}

impl StudentFilter {
    pub fn from_params(params: &serde_json::Value) -> Result<Self, StoreError> {
        let mut f = Form::new(params);
        let filter = Self {
            q: f.optional_str("q", usize::MAX),
            status: f.optional_choice("status"),
            gender: f.optional_choice("gender"),
        };
        f.finish(filter)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CourseFilter {
    pub q: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub is_active: Option<bool>,
}

impl CourseFilter {
    pub fn from_params(params: &serde_json::Value) -> Result<Self, StoreError> {
        let mut f = Form::new(params);
        let filter = Self {
            q: f.optional_str("q", usize::MAX),
            difficulty: f.optional_choice("difficulty"),
            is_active: f.optional_bool("isActive"),
        };
        f.finish(filter)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnrollmentFilter {
    pub q: Option<String>,
    pub status: Option<EnrollmentStatus>,
    pub student_id: Option<String>,
    pub course_id: Option<String>,
}

impl EnrollmentFilter {
    pub fn from_params(params: &serde_json::Value) -> Result<Self, StoreError> {
        let mut f = Form::new(params);
        let filter = Self {
            q: f.optional_str("q", usize::MAX),
            status: f.optional_choice("status"),
            student_id: f.optional_str("studentId", usize::MAX),
            course_id: f.optional_str("courseId", usize::MAX),
        };
        f.finish(filter)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GradeFilter {
    pub q: Option<String>,
    pub enrollment_id: Option<String>,
}

impl GradeFilter {
    pub fn from_params(params: &serde_json::Value) -> Result<Self, StoreError> {
        let mut f = Form::new(params);
        let filter = Self {
            q: f.optional_str("q", usize::MAX),
            enrollment_id: f.optional_str("enrollmentId", usize::MAX),
        };
        f.finish(filter)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttendanceFilter {
    pub q: Option<String>,
    pub status: Option<AttendanceStatus>,
    pub enrollment_id: Option<String>,
    pub date: Option<NaiveDate>,
}

impl AttendanceFilter {
    pub fn from_params(params: &serde_json::Value) -> Result<Self, StoreError> {
        let mut f = Form::new(params);
        let filter = Self {
            q: f.optional_str("q", usize::MAX),
            status: f.optional_choice("status"),
            enrollment_id: f.optional_str("enrollmentId", usize::MAX),
            date: f.optional_date("date"),
        };
        f.finish(filter)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnnouncementFilter {
    pub q: Option<String>,
    pub priority: Option<Priority>,
    pub is_active: Option<bool>,
}

impl AnnouncementFilter {
    pub fn from_params(params: &serde_json::Value) -> Result<Self, StoreError> {
        let mut f = Form::new(params);
        let filter = Self {
            q: f.optional_str("q", usize::MAX),
            priority: f.optional_choice("priority"),
            is_active: f.optional_bool("isActive"),
        };
        f.finish(filter)
    }
}

// ---------------------------------------------------------------------------
// Lists.

pub fn list_students(
    conn: &Connection,
    filter: &StudentFilter,
    today: NaiveDate,
) -> Result<Vec<StudentView>, StoreError> {
    let mut w = Filter::default();
    w.text(
        &["first_name", "last_name", "student_no", "email"],
        filter.q.as_deref(),
    );
    if let Some(status) = filter.status {
        w.eq("status", status.to_string());
    }
    if let Some(gender) = filter.gender {
        w.eq("gender", gender.to_string());
    }
    let sql = format!(
        "SELECT {} FROM students {} ORDER BY enrollment_date DESC, rowid DESC",
        students::COLUMNS,
        w.where_sql()
    );
    let rows = collect(conn, &sql, w.args, students::from_row)?;
    Ok(rows.into_iter().map(|s| StudentView::new(s, today)).collect())
}

/// Courses with their Active enrollment count, computed as one grouped
/// aggregate rather than per row.
fn courses_with_counts(
    conn: &Connection,
    w: Filter,
    order_limit: &str,
) -> Result<Vec<CourseView>, StoreError> {
    let sql = format!(
        "SELECT c.id, c.code, c.name, c.description, c.credits, c.instructor,
           c.duration_weeks, c.difficulty, c.max_students, c.fees, c.start_date,
           c.end_date, c.is_active,
           COALESCE(SUM(CASE WHEN e.status = 'Active' THEN 1 ELSE 0 END), 0) AS enrolled_count
         FROM courses c
         LEFT JOIN enrollments e ON e.course_id = c.id
         {}
         GROUP BY c.id
         {}",
        w.where_sql(),
        order_limit
    );
    collect(conn, &sql, w.args, |r| {
        let enrolled: i64 = r.get("enrolled_count")?;
        Ok(CourseView::new(courses::from_row(r)?, enrolled))
    })
}

pub fn list_courses(conn: &Connection, filter: &CourseFilter) -> Result<Vec<CourseView>, StoreError> {
    let mut w = Filter::default();
    w.text(&["c.code", "c.name", "c.instructor"], filter.q.as_deref());
    if let Some(d) = filter.difficulty {
        w.eq("c.difficulty", d.to_string());
    }
    if let Some(active) = filter.is_active {
        w.eq("c.is_active", active as i64);
    }
    courses_with_counts(conn, w, "ORDER BY c.code")
}

fn enrollment_rows(
    conn: &Connection,
    w: Filter,
    limit: Option<i64>,
) -> Result<Vec<EnrollmentView>, StoreError> {
    let limit_sql = limit.map(|n| format!("LIMIT {}", n)).unwrap_or_default();
    let sql = format!(
        "SELECT e.id, e.student_id, e.course_id, e.enrollment_date, e.status,
           e.final_grade, e.completion_date, {},
           (SELECT AVG(CASE WHEN g.total_marks > 0
                            THEN g.marks_obtained / g.total_marks * 100.0 ELSE 0 END)
            FROM grades g WHERE g.enrollment_id = e.id) AS avg_pct
         FROM enrollments e
         JOIN students s ON s.id = e.student_id
         JOIN courses c ON c.id = e.course_id
         {}
         ORDER BY e.enrollment_date DESC, e.rowid DESC
         {}",
        REF_COLUMNS,
        w.where_sql(),
        limit_sql
    );
    collect(conn, &sql, w.args, |r| {
        // Same mean-then-round rule as calc::average_grade; no grades gives 0.
        let avg: Option<f64> = r.get("avg_pct")?;
        Ok(EnrollmentView {
            enrollment: enrollments::from_row(r)?,
            student: student_ref(r)?,
            course: course_ref(r)?,
            average_grade: avg.map(calc::round_2).unwrap_or(0.0),
        })
    })
}

pub fn list_enrollments(
    conn: &Connection,
    filter: &EnrollmentFilter,
) -> Result<Vec<EnrollmentView>, StoreError> {
    let mut w = Filter::default();
    w.text(&["s.first_name", "s.last_name", "c.name"], filter.q.as_deref());
    if let Some(status) = filter.status {
        w.eq("e.status", status.to_string());
    }
    if let Some(id) = &filter.student_id {
        w.eq("e.student_id", id.clone());
    }
    if let Some(id) = &filter.course_id {
        w.eq("e.course_id", id.clone());
    }
    enrollment_rows(conn, w, None)
}

fn grade_rows(conn: &Connection, w: Filter, limit: Option<i64>) -> Result<Vec<GradeRow>, StoreError> {
    let limit_sql = limit.map(|n| format!("LIMIT {}", n)).unwrap_or_default();
    let sql = format!(
        "SELECT g.id, g.enrollment_id, g.assignment_name, g.marks_obtained, g.total_marks,
           g.date, g.remarks, e.student_id, e.course_id, {}
         FROM grades g
         JOIN enrollments e ON e.id = g.enrollment_id
         JOIN students s ON s.id = e.student_id
         JOIN courses c ON c.id = e.course_id
         {}
         ORDER BY g.date DESC, g.rowid DESC
         {}",
        REF_COLUMNS,
        w.where_sql(),
        limit_sql
    );
    collect(conn, &sql, w.args, |r| {
        Ok(GradeRow {
            grade: GradeView::new(grades::from_row(r)?),
            student: student_ref(r)?,
            course: course_ref(r)?,
        })
    })
}

pub fn list_grades(conn: &Connection, filter: &GradeFilter) -> Result<Vec<GradeRow>, StoreError> {
    let mut w = Filter::default();
    w.text(
        &["s.first_name", "s.last_name", "g.assignment_name"],
        filter.q.as_deref(),
    );
    if let Some(id) = &filter.enrollment_id {
        w.eq("g.enrollment_id", id.clone());
    }
    grade_rows(conn, w, None)
}

pub fn list_attendance(
    conn: &Connection,
    filter: &AttendanceFilter,
) -> Result<Vec<AttendanceRow>, StoreError> {
    let mut w = Filter::default();
    w.text(&["s.first_name", "s.last_name"], filter.q.as_deref());
    if let Some(status) = filter.status {
        w.eq("a.status", status.to_string());
    }
    if let Some(id) = &filter.enrollment_id {
        w.eq("a.enrollment_id", id.clone());
    }
    if let Some(date) = filter.date {
        w.eq("a.date", date.format("%Y-%m-%d").to_string());
    }
    let sql = format!(
        "SELECT a.id, a.enrollment_id, a.date, a.status, a.remarks,
           e.student_id, e.course_id, {}
         FROM attendance a
         JOIN enrollments e ON e.id = a.enrollment_id
         JOIN students s ON s.id = e.student_id
         JOIN courses c ON c.id = e.course_id
         {}
         ORDER BY a.date DESC, a.rowid DESC",
        REF_COLUMNS,
        w.where_sql()
    );
    collect(conn, &sql, w.args, |r| {
        Ok(AttendanceRow {
            attendance: attendance::from_row(r)?,
            student: student_ref(r)?,
            course: course_ref(r)?,
        })
    })
}

fn announcement_rows(
    conn: &Connection,
    w: Filter,
    limit: Option<i64>,
) -> Result<Vec<Announcement>, StoreError> {
    let limit_sql = limit.map(|n| format!("LIMIT {}", n)).unwrap_or_default();
    let sql = format!(
        "SELECT {} FROM announcements {} ORDER BY created_at DESC, rowid DESC {}",
        announcements::COLUMNS,
        w.where_sql(),
        limit_sql
    );
    collect(conn, &sql, w.args, announcements::from_row)
}

pub fn list_announcements(
    conn: &Connection,
    filter: &AnnouncementFilter,
) -> Result<Vec<Announcement>, StoreError> {
    let mut w = Filter::default();
    w.text(&["title", "content"], filter.q.as_deref());
    if let Some(p) = filter.priority {
        w.eq("priority", p.to_string());
    }
    if let Some(active) = filter.is_active {
        w.eq("is_active", active as i64);
    }
    announcement_rows(conn, w, None)
}

// ---------------------------------------------------------------------------
// Detail views.

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentDetail {
    pub student: StudentView,
    pub enrollments: Vec<EnrollmentView>,
    pub total_courses: i64,
    pub active_courses: i64,
    pub completed_courses: i64,
    pub recent_grades: Vec<GradeRow>,
    pub attendance_percentage: f64,
}

pub fn student_detail(
    conn: &Connection,
    student_id: &str,
    today: NaiveDate,
) -> Result<StudentDetail, StoreError> {
    let student = students::get(conn, student_id)?;

    let mut w = Filter::default();
    w.eq("e.student_id", student_id.to_string());
    let enrollments = enrollment_rows(conn, w, None)?;
    let with_status = |status: EnrollmentStatus| {
        enrollments
            .iter()
            .filter(|e| e.enrollment.status == status)
            .count() as i64
    };
    let active_courses = with_status(EnrollmentStatus::Active);
    let completed_courses = with_status(EnrollmentStatus::Completed);

    let mut w = Filter::default();
    w.eq("e.student_id", student_id.to_string());
    let recent_grades = grade_rows(conn, w, Some(RECENT_GRADES))?;

    let (total_classes, present_count): (i64, i64) = conn.query_row(
        "SELECT COUNT(*), COALESCE(SUM(CASE WHEN a.status = ? THEN 1 ELSE 0 END), 0)
         FROM attendance a
         JOIN enrollments e ON e.id = a.enrollment_id
         WHERE e.student_id = ?",
        (AttendanceStatus::Present, student_id),
        |r| Ok((r.get(0)?, r.get(1)?)),
    )?;

    Ok(StudentDetail {
        student: StudentView::new(student, today),
        total_courses: enrollments.len() as i64,
        active_courses,
        completed_courses,
        enrollments,
        recent_grades,
        attendance_percentage: calc::attendance_percentage(present_count, total_classes),
    })
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseDetail {
    pub course: CourseView,
    pub enrollments: Vec<EnrollmentView>,
}

pub fn course_detail(conn: &Connection, course_id: &str) -> Result<CourseDetail, StoreError> {
    let course = courses::get(conn, course_id)?;
    let mut w = Filter::default();
    w.eq("e.course_id", course_id.to_string());
    let enrollments = enrollment_rows(conn, w, None)?;
    let snapshot: Vec<Enrollment> = enrollments.iter().map(|e| e.enrollment.clone()).collect();
    Ok(CourseDetail {
        course: CourseView::new(course, calc::enrolled_count(&snapshot)),
        enrollments,
    })
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentDetail {
    pub enrollment: EnrollmentView,
    pub average_grade: f64,
    pub grades: Vec<GradeView>,
    pub attendance: Vec<Attendance>,
}

pub fn enrollment_detail(
    conn: &Connection,
    enrollment_id: &str,
) -> Result<EnrollmentDetail, StoreError> {
    let mut w = Filter::default();
    w.eq("e.id", enrollment_id.to_string());
    let enrollment = enrollment_rows(conn, w, Some(1))?
        .into_iter()
        .next()
        .ok_or_else(|| StoreError::not_found("enrollment", enrollment_id))?;

    let grade_sql = format!(
        "SELECT {} FROM grades WHERE enrollment_id = ? ORDER BY date DESC, rowid DESC",
        grades::COLUMNS
    );
    let grade_list = collect(
        conn,
        &grade_sql,
        vec![Value::Text(enrollment_id.to_string())],
        grades::from_row,
    )?;

    let attendance_sql = format!(
        "SELECT {} FROM attendance WHERE enrollment_id = ? ORDER BY date DESC, rowid DESC",
        attendance::COLUMNS
    );
    let attendance = collect(
        conn,
        &attendance_sql,
        vec![Value::Text(enrollment_id.to_string())],
        attendance::from_row,
    )?;

    Ok(EnrollmentDetail {
        enrollment,
        average_grade: calc::average_grade(&grade_list),
        grades: grade_list.into_iter().map(GradeView::new).collect(),
        attendance,
    })
}

// ---------------------------------------------------------------------------
// Dashboard.

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub total_students: i64,
    pub active_students: i64,
    pub total_courses: i64,
    pub active_courses: i64,
    pub total_enrollments: i64,
    pub active_enrollments: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub totals: Totals,
    pub recent_students: Vec<StudentView>,
    pub recent_enrollments: Vec<EnrollmentView>,
    pub announcements: Vec<Announcement>,
    pub top_courses: Vec<CourseView>,
}

pub fn dashboard(conn: &Connection, today: NaiveDate) -> Result<Dashboard, StoreError> {
    let totals = Totals {
        total_students: count(conn, "SELECT COUNT(*) FROM students")?,
        active_students: count(conn, "SELECT COUNT(*) FROM students WHERE status = 'Active'")?,
        total_courses: count(conn, "SELECT COUNT(*) FROM courses")?,
        active_courses: count(conn, "SELECT COUNT(*) FROM courses WHERE is_active = 1")?,
        total_enrollments: count(conn, "SELECT COUNT(*) FROM enrollments")?,
        active_enrollments: count(
            conn,
            "SELECT COUNT(*) FROM enrollments WHERE status = 'Active'",
        )?,
    };

    let sql = format!(
        "SELECT {} FROM students ORDER BY enrollment_date DESC, rowid DESC LIMIT {}",
        students::COLUMNS,
        RECENT_STUDENTS
    );
    let recent_students = collect(conn, &sql, Vec::new(), students::from_row)?
        .into_iter()
        .map(|s| StudentView::new(s, today))
        .collect();

    let recent_enrollments = enrollment_rows(conn, Filter::default(), Some(RECENT_ENROLLMENTS))?;

    let mut w = Filter::default();
    w.eq("is_active", 1i64);
    let announcements = announcement_rows(conn, w, Some(RECENT_ANNOUNCEMENTS))?;

    let top_courses = courses_with_counts(
        conn,
        Filter::default(),
        &format!("ORDER BY enrolled_count DESC, c.code LIMIT {}", TOP_COURSES),
    )?;

    Ok(Dashboard {
        totals,
        recent_students,
        recent_enrollments,
        announcements,
        top_courses,
    })
}
