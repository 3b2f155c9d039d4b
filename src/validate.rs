//! Request params → typed input bundles.
//!
//! Every field is checked before the store is touched; all problems are
//! collected into one [`FieldErrors`] set keyed by the wire field name.
//! Uniqueness and reference checks need the database and happen in the store.

use crate::error::{FieldErrors, StoreError};
use crate::model::{
    AttendanceStatus, Choice, Difficulty, EnrollmentStatus, Gender, Priority, StudentStatus,
};
use chrono::NaiveDate;
use serde_json::Value;

const MAX_MARKS: f64 = 999.99;
const MAX_FEES: f64 = 99_999_999.99;

#[derive(Debug, Clone, PartialEq)]
pub struct NewStudent {
    pub student_no: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    pub address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub status: StudentStatus,
    pub profile_image: Option<String>,
    pub parent_name: String,
    pub parent_phone: String,
    pub emergency_contact: String,
    pub blood_group: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewCourse {
    pub code: String,
    pub name: String,
    pub description: String,
    pub credits: i64,
    pub instructor: String,
    pub duration_weeks: i64,
    pub difficulty: Difficulty,
    pub max_students: i64,
    pub fees: f64,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewEnrollment {
    pub student_id: String,
    pub course_id: String,
    pub status: EnrollmentStatus,
    pub final_grade: Option<String>,
    pub completion_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewGrade {
    pub enrollment_id: String,
    pub assignment_name: String,
    pub marks_obtained: f64,
    pub total_marks: f64,
    pub remarks: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewAttendance {
    pub enrollment_id: String,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub remarks: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewAnnouncement {
    pub title: String,
    pub content: String,
    pub priority: Priority,
    pub is_active: bool,
}

/// Reads fields out of a params object, recording a message for each
/// invalid one and substituting a placeholder so reading can continue.
pub struct Form<'a> {
    params: &'a Value,
    errors: FieldErrors,
}

impl<'a> Form<'a> {
    pub fn new(params: &'a Value) -> Self {
        Self {
            params,
            errors: FieldErrors::new(),
        }
    }

    pub fn finish<T>(self, value: T) -> Result<T, StoreError> {
        self.errors.into_result(value)
    }

    /// Trimmed string, `None` when absent, null or blank.
    fn raw_str(&mut self, key: &str) -> Option<String> {
        match self.params.get(key) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => {
                let t = s.trim();
                if t.is_empty() {
                    None
                } else {
                    Some(t.to_string())
                }
            }
            Some(Value::Number(n)) => Some(n.to_string()),
            Some(_) => {
                self.errors.add(key, "must be a string");
                None
            }
        }
    }

    fn check_len(&mut self, key: &str, value: &str, max_len: usize) {
        let n = value.chars().count();
        if n > max_len {
            self.errors.add(
                key,
                format!("ensure this value has at most {max_len} characters (it has {n})"),
            );
        }
    }

    pub fn required_str(&mut self, key: &str, max_len: usize) -> String {
        match self.raw_str(key) {
            Some(v) => {
                self.check_len(key, &v, max_len);
                v
            }
            None => {
                if !self.errors.contains(key) {
                    self.errors.add(key, "this field is required");
                }
                String::new()
            }
        }
    }

    /// Required text with no length limit.
    pub fn required_text(&mut self, key: &str) -> String {
        self.required_str(key, usize::MAX)
    }

    pub fn str_or(&mut self, key: &str, max_len: usize, default: &str) -> String {
        match self.raw_str(key) {
            Some(v) => {
                self.check_len(key, &v, max_len);
                v
            }
            None => default.to_string(),
        }
    }

    pub fn optional_str(&mut self, key: &str, max_len: usize) -> Option<String> {
        let v = self.raw_str(key)?;
        self.check_len(key, &v, max_len);
        Some(v)
    }

    pub fn email(&mut self, key: &str) -> String {
        let v = self.required_str(key, 254);
        if !v.is_empty() && !is_valid_email(&v) {
            self.errors.add(key, "enter a valid email address");
        }
        v
    }

    fn parse_date(&mut self, key: &str, raw: &str) -> Option<NaiveDate> {
        match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            Ok(d) => Some(d),
            Err(_) => {
                self.errors.add(key, "enter a valid date (YYYY-MM-DD)");
                None
            }
        }
    }

    pub fn required_date(&mut self, key: &str) -> NaiveDate {
        match self.raw_str(key) {
            Some(raw) => self.parse_date(key, &raw).unwrap_or_default(),
            None => {
                if !self.errors.contains(key) {
                    self.errors.add(key, "this field is required");
                }
                NaiveDate::default()
            }
        }
    }

    pub fn optional_date(&mut self, key: &str) -> Option<NaiveDate> {
        let raw = self.raw_str(key)?;
        self.parse_date(key, &raw)
    }

    fn parse_choice<T: Choice>(&mut self, key: &str, raw: &str) -> T {
        match T::parse(raw) {
            Some(v) => v,
            None => {
                self.errors.add(
                    key,
                    format!(
                        "select a valid choice; {raw} is not one of: {}",
                        T::choices().join(", ")
                    ),
                );
                T::default()
            }
        }
    }

    pub fn required_choice<T: Choice>(&mut self, key: &str) -> T {
        match self.raw_str(key) {
            Some(raw) => self.parse_choice(key, &raw),
            None => {
                if !self.errors.contains(key) {
                    self.errors.add(key, "this field is required");
                }
                T::default()
            }
        }
    }

    /// Absent or blank falls back to the enum's default.
    pub fn choice_or_default<T: Choice>(&mut self, key: &str) -> T {
        match self.raw_str(key) {
            Some(raw) => self.parse_choice(key, &raw),
            None => T::default(),
        }
    }

    pub fn optional_choice<T: Choice>(&mut self, key: &str) -> Option<T> {
        let raw = self.raw_str(key)?;
        let v = self.parse_choice(key, &raw);
        if self.errors.contains(key) {
            None
        } else {
            Some(v)
        }
    }

    fn raw_number(&mut self, key: &str) -> Option<f64> {
        match self.params.get(key) {
            None | Some(Value::Null) => None,
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) if s.trim().is_empty() => None,
            Some(Value::String(s)) => match s.trim().parse::<f64>() {
                Ok(v) if v.is_finite() => Some(v),
                _ => {
                    self.errors.add(key, "enter a number");
                    None
                }
            },
            Some(_) => {
                self.errors.add(key, "enter a number");
                None
            }
        }
    }

    fn int_value(&mut self, key: &str) -> Option<i64> {
        let v = self.raw_number(key)?;
        if v.fract() != 0.0 {
            self.errors.add(key, "enter a whole number");
            return None;
        }
        Some(v as i64)
    }

    fn check_int_range(&mut self, key: &str, v: i64, min: i64, max: i64) {
        if v < min {
            self.errors
                .add(key, format!("ensure this value is greater than or equal to {min}"));
        } else if v > max {
            self.errors
                .add(key, format!("ensure this value is less than or equal to {max}"));
        }
    }

    pub fn required_int(&mut self, key: &str, min: i64, max: i64) -> i64 {
        match self.int_value(key) {
            Some(v) => {
                self.check_int_range(key, v, min, max);
                v
            }
            None => {
                if !self.errors.contains(key) {
                    self.errors.add(key, "this field is required");
                }
                0
            }
        }
    }

    pub fn int_or(&mut self, key: &str, min: i64, max: i64, default: i64) -> i64 {
        match self.int_value(key) {
            Some(v) => {
                self.check_int_range(key, v, min, max);
                v
            }
            None => default,
        }
    }

    fn decimal_value(&mut self, key: &str, min: f64, max: f64) -> Option<f64> {
        let v = self.raw_number(key)?;
        let cents = v * 100.0;
        if (cents - cents.round()).abs() > 1e-6 {
            self.errors
                .add(key, "ensure that there are no more than 2 decimal places");
        }
        if v < min {
            self.errors
                .add(key, format!("ensure this value is greater than or equal to {min}"));
        } else if v > max {
            self.errors
                .add(key, format!("ensure this value is less than or equal to {max}"));
        }
        Some(v)
    }

    pub fn required_decimal(&mut self, key: &str, min: f64, max: f64) -> f64 {
        match self.decimal_value(key, min, max) {
            Some(v) => v,
            None => {
                if !self.errors.contains(key) {
                    self.errors.add(key, "this field is required");
                }
                0.0
            }
        }
    }

    pub fn decimal_or(&mut self, key: &str, min: f64, max: f64, default: f64) -> f64 {
        self.decimal_value(key, min, max).unwrap_or(default)
    }

    pub fn bool_or(&mut self, key: &str, default: bool) -> bool {
        match self.params.get(key) {
            None | Some(Value::Null) => default,
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "on" | "1" => true,
                "false" | "off" | "0" | "" => false,
                _ => {
                    self.errors.add(key, "must be a boolean");
                    default
                }
            },
            Some(_) => {
                self.errors.add(key, "must be a boolean");
                default
            }
        }
    }

    /// Tri-state flag for list filters: absent, null or blank is `None`.
    pub fn optional_bool(&mut self, key: &str) -> Option<bool> {
        match self.params.get(key) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) if s.trim().is_empty() => None,
            Some(_) => Some(self.bool_or(key, false)),
        }
    }

    pub fn error(&mut self, key: &str, message: impl Into<String>) {
        self.errors.add(key, message);
    }
}

/// Deliberately loose: one `@`, non-empty local part, a dotted domain, no
/// whitespace.
pub fn is_valid_email(s: &str) -> bool {
    if s.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    !host.is_empty() && !tld.is_empty() && !domain.starts_with('.')
}

pub fn student(params: &Value) -> Result<NewStudent, StoreError> {
    let mut f = Form::new(params);
    let input = NewStudent {
        first_name: f.required_str("firstName", 100),
        last_name: f.required_str("lastName", 100),
        email: f.email("email"),
        phone: f.required_str("phone", 15),
        date_of_birth: f.required_date("dateOfBirth"),
        gender: f.required_choice("gender"),
        address: f.required_text("address"),
        city: f.str_or("city", 100, "Unknown"),
        state: f.str_or("state", 100, "Unknown"),
        postal_code: f.str_or("postalCode", 10, "000000"),
        country: f.str_or("country", 100, "India"),
        student_no: f.required_str("studentNo", 20),
        status: f.choice_or_default("status"),
        profile_image: f.optional_str("profileImage", 255),
        parent_name: f.str_or("parentName", 200, ""),
        parent_phone: f.str_or("parentPhone", 15, ""),
        emergency_contact: f.str_or("emergencyContact", 15, ""),
        blood_group: f.str_or("bloodGroup", 5, ""),
    };
    f.finish(input)
}

pub fn course(params: &Value) -> Result<NewCourse, StoreError> {
    let mut f = Form::new(params);
    let input = NewCourse {
        code: f.required_str("code", 10),
        name: f.required_str("name", 200),
        description: f.required_text("description"),
        credits: f.required_int("credits", 1, 10),
        instructor: f.required_str("instructor", 100),
        duration_weeks: f.int_or("durationWeeks", 1, i64::from(i32::MAX), 12),
        difficulty: f.choice_or_default("difficulty"),
        max_students: f.int_or("maxStudents", 1, i64::from(i32::MAX), 30),
        fees: f.decimal_or("fees", 0.0, MAX_FEES, 0.0),
        start_date: f.optional_date("startDate"),
        end_date: f.optional_date("endDate"),
        is_active: f.bool_or("isActive", true),
    };
    f.finish(input)
}

pub fn enrollment(params: &Value) -> Result<NewEnrollment, StoreError> {
    let mut f = Form::new(params);
    let input = NewEnrollment {
        student_id: f.required_str("studentId", 64),
        course_id: f.required_str("courseId", 64),
        status: f.choice_or_default("status"),
        final_grade: f.optional_str("finalGrade", 2),
        completion_date: f.optional_date("completionDate"),
    };
    f.finish(input)
}

pub fn grade(params: &Value) -> Result<NewGrade, StoreError> {
    let mut f = Form::new(params);
    let enrollment_id = f.required_str("enrollmentId", 64);
    let assignment_name = f.required_str("assignmentName", 200);
    let marks_obtained = f.required_decimal("marksObtained", 0.0, MAX_MARKS);
    let total_marks = f.required_decimal("totalMarks", 0.0, MAX_MARKS);
    if total_marks <= 0.0 && !f.errors.contains("totalMarks") {
        f.error("totalMarks", "ensure this value is greater than 0");
    }
    let remarks = f.str_or("remarks", usize::MAX, "");
    f.finish(NewGrade {
        enrollment_id,
        assignment_name,
        marks_obtained,
        total_marks,
        remarks,
    })
}

pub fn attendance(params: &Value) -> Result<NewAttendance, StoreError> {
    let mut f = Form::new(params);
    let input = NewAttendance {
        enrollment_id: f.required_str("enrollmentId", 64),
        date: f.required_date("date"),
        status: f.required_choice("status"),
        remarks: f.str_or("remarks", usize::MAX, ""),
    };
    f.finish(input)
}

pub fn announcement(params: &Value) -> Result<NewAnnouncement, StoreError> {
    let mut f = Form::new(params);
    let input = NewAnnouncement {
        title: f.required_str("title", 200),
        content: f.required_text("content"),
        priority: f.choice_or_default("priority"),
        is_active: f.bool_or("isActive", true),
    };
    f.finish(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn field_errors(r: Result<impl std::fmt::Debug, StoreError>) -> FieldErrors {
        match r {
            Err(StoreError::Validation(fields)) => fields,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    fn student_params() -> Value {
        json!({
            "studentNo": "STU001",
            "firstName": "Asha",
            "lastName": "Rao",
            "email": "asha@example.com",
            "phone": "+91 1234567890",
            "dateOfBirth": "2004-05-17",
            "gender": "F",
            "address": "12 Park Street",
        })
    }

    #[test]
    fn student_defaults_fill_optional_fields() {
        let s = student(&student_params()).expect("valid student");
        assert_eq!(s.city, "Unknown");
        assert_eq!(s.postal_code, "000000");
        assert_eq!(s.country, "India");
        assert_eq!(s.status, StudentStatus::Active);
        assert_eq!(s.gender, Gender::Female);
        assert_eq!(s.profile_image, None);
    }

    #[test]
    fn student_errors_are_reported_per_field() {
        let mut p = student_params();
        p["email"] = json!("not-an-email");
        p["gender"] = json!("X");
        p["dateOfBirth"] = json!("17/05/2004");
        p["status"] = json!("Expelled");
        p.as_object_mut().expect("object").remove("firstName");
        let errors = field_errors(student(&p));
        assert!(errors.contains("email"));
        assert!(errors.contains("gender"));
        assert!(errors.contains("dateOfBirth"));
        assert!(errors.contains("status"));
        assert_eq!(
            errors.get("firstName"),
            Some(&["this field is required".to_string()][..])
        );
        assert!(!errors.contains("lastName"));
    }

    #[test]
    fn student_no_length_is_limited() {
        let mut p = student_params();
        p["studentNo"] = json!("X".repeat(21));
        let errors = field_errors(student(&p));
        assert!(errors.contains("studentNo"));
    }

    #[test]
    fn course_credits_must_be_in_range() {
        let base = json!({
            "code": "CS101",
            "name": "Intro",
            "description": "Basics",
            "instructor": "Dr. Iyer",
        });
        for bad in [0, 11] {
            let mut p = base.clone();
            p["credits"] = json!(bad);
            assert!(field_errors(course(&p)).contains("credits"));
        }
        let mut p = base.clone();
        p["credits"] = json!("4");
        let c = course(&p).expect("valid course");
        assert_eq!(c.credits, 4);
        assert_eq!(c.max_students, 30);
        assert_eq!(c.duration_weeks, 12);
        assert_eq!(c.difficulty, Difficulty::Beginner);
        assert!(c.is_active);

        let mut p = base;
        p["credits"] = json!(3);
        p["maxStudents"] = json!(0);
        p["fees"] = json!(10.555);
        let errors = field_errors(course(&p));
        assert!(errors.contains("maxStudents"));
        assert!(errors.contains("fees"));
    }

    #[test]
    fn grade_requires_positive_total() {
        let p = json!({
            "enrollmentId": "e1",
            "assignmentName": "Quiz 1",
            "marksObtained": 5,
            "totalMarks": 0,
        });
        let errors = field_errors(grade(&p));
        assert!(errors.contains("totalMarks"));

        let p = json!({
            "enrollmentId": "e1",
            "assignmentName": "Quiz 1",
            "marksObtained": -1,
            "totalMarks": 10,
        });
        assert!(field_errors(grade(&p)).contains("marksObtained"));
    }

    #[test]
    fn attendance_status_is_required() {
        let p = json!({ "enrollmentId": "e1", "date": "2024-03-01" });
        assert!(field_errors(attendance(&p)).contains("status"));
        let p = json!({ "enrollmentId": "e1", "date": "2024-03-01", "status": "Late" });
        assert_eq!(attendance(&p).expect("valid").status, AttendanceStatus::Late);
    }

    #[test]
    fn announcement_defaults() {
        let a = announcement(&json!({ "title": "Exams", "content": "Start Monday" }))
            .expect("valid announcement");
        assert_eq!(a.priority, Priority::Medium);
        assert!(a.is_active);
    }

    #[test]
    fn email_shapes() {
        assert!(is_valid_email("a@b.co"));
        assert!(is_valid_email("first.last+tag@school.edu.in"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("@b.com"));
        assert!(!is_valid_email("a b@c.com"));
        assert!(!is_valid_email("a@@c.com"));
        assert!(!is_valid_email("a@.com"));
    }
}
