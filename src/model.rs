use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

/// A closed set of stored string codes shared by every entity field that
/// draws from it.
pub trait Choice: Copy + Default + 'static {
    fn as_str(self) -> &'static str;
    fn parse(s: &str) -> Option<Self>;
    fn choices() -> &'static [&'static str];
}

macro_rules! choice_enum {
    (
        $(#[$meta:meta])*
        $name:ident (default = $default:ident) {
            $($variant:ident => $code:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $code)]
                $variant,
            )+
        }

        impl Default for $name {
            fn default() -> Self {
                $name::$default
            }
        }

        impl Choice for $name {
            fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $code,)+
                }
            }

            fn parse(s: &str) -> Option<Self> {
                match s {
                    $($code => Some($name::$variant),)+
                    _ => None,
                }
            }

            fn choices() -> &'static [&'static str] {
                &[$($code),+]
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.as_str()))
            }
        }

        impl FromSql for $name {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                let raw = value.as_str()?;
                <$name as Choice>::parse(raw).ok_or_else(|| {
                    FromSqlError::Other(
                        format!("unknown {} code: {}", stringify!($name), raw).into(),
                    )
                })
            }
        }
    };
}

choice_enum! {
    Gender (default = Other) {
        Male => "M",
        Female => "F",
        Other => "O",
    }
}

choice_enum! {
    StudentStatus (default = Active) {
        Active => "Active",
        Inactive => "Inactive",
        Graduated => "Graduated",
        Suspended => "Suspended",
    }
}

choice_enum! {
    Difficulty (default = Beginner) {
        Beginner => "Beginner",
        Intermediate => "Intermediate",
        Advanced => "Advanced",
    }
}

choice_enum! {
    EnrollmentStatus (default = Active) {
        Active => "Active",
        Completed => "Completed",
        Dropped => "Dropped",
        Failed => "Failed",
    }
}

choice_enum! {
    AttendanceStatus (default = Present) {
        Present => "Present",
        Absent => "Absent",
        Late => "Late",
        Excused => "Excused",
    }
}

choice_enum! {
    Priority (default = Medium) {
        Low => "Low",
        Medium => "Medium",
        High => "High",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
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
    pub enrollment_date: NaiveDate,
    pub status: StudentStatus,
    pub profile_image: Option<String>,
    pub parent_name: String,
    pub parent_phone: String,
    pub emergency_contact: String,
    pub blood_group: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: String,
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

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    pub id: String,
    pub student_id: String,
    pub course_id: String,
    pub enrollment_date: NaiveDate,
    pub status: EnrollmentStatus,
    pub final_grade: Option<String>,
    pub completion_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Grade {
    pub id: String,
    pub enrollment_id: String,
    pub assignment_name: String,
    pub marks_obtained: f64,
    pub total_marks: f64,
    pub date: NaiveDate,
    pub remarks: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendance {
    pub id: String,
    pub enrollment_id: String,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub remarks: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    pub id: String,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
    pub priority: Priority,
}

/// Identity of a student attached to rows of other entities.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRef {
    pub id: String,
    pub student_no: String,
    pub full_name: String,
}

/// Identity of a course attached to rows of other entities.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseRef {
    pub id: String,
    pub code: String,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_parse_back_to_variants() {
        for code in Gender::choices() {
            let g = Gender::parse(code).expect("gender code");
            assert_eq!(g.as_str(), *code);
        }
        assert_eq!(Gender::parse("M"), Some(Gender::Male));
        assert_eq!(StudentStatus::parse("Graduated"), Some(StudentStatus::Graduated));
        assert_eq!(EnrollmentStatus::parse("active"), None);
        assert_eq!(Priority::default(), Priority::Medium);
    }

    #[test]
    fn serializes_as_stored_code() {
        let v = serde_json::to_value(Gender::Female).expect("serialize");
        assert_eq!(v, serde_json::json!("F"));
        let v = serde_json::to_value(AttendanceStatus::Excused).expect("serialize");
        assert_eq!(v, serde_json::json!("Excused"));
    }
}
