//! Input builders shared by the store and query unit tests.

use crate::model::{AttendanceStatus, Difficulty, EnrollmentStatus, Gender, Priority, StudentStatus};
use crate::validate::{
    NewAnnouncement, NewAttendance, NewCourse, NewEnrollment, NewGrade, NewStudent,
};
use chrono::NaiveDate;

pub fn today() -> NaiveDate {
    date(2024, 9, 1)
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub fn student(no: &str, email: &str) -> NewStudent {
    NewStudent {
        student_no: no.to_string(),
        first_name: "Asha".to_string(),
        last_name: "Rao".to_string(),
        email: email.to_string(),
        phone: "12345".to_string(),
        date_of_birth: date(2004, 5, 17),
        gender: Gender::Female,
        address: "12 Park Street".to_string(),
        city: "Unknown".to_string(),
        state: "Unknown".to_string(),
        postal_code: "000000".to_string(),
        country: "India".to_string(),
        status: StudentStatus::Active,
        profile_image: Some("students/asha.png".to_string()),
        parent_name: String::new(),
        parent_phone: String::new(),
        emergency_contact: String::new(),
        blood_group: "O+".to_string(),
    }
}

pub fn named_student(no: &str, first: &str, last: &str, email: &str) -> NewStudent {
    NewStudent {
        first_name: first.to_string(),
        last_name: last.to_string(),
        ..student(no, email)
    }
}

pub fn course(code: &str, max_students: i64) -> NewCourse {
    NewCourse {
        code: code.to_string(),
        name: format!("Course {}", code),
        description: "Lectures and labs".to_string(),
        credits: 4,
        instructor: "Dr. Iyer".to_string(),
        duration_weeks: 12,
        difficulty: Difficulty::Beginner,
        max_students,
        fees: 1500.0,
        start_date: Some(date(2024, 9, 2)),
        end_date: None,
        is_active: true,
    }
}

pub fn enrollment(student_id: &str, course_id: &str) -> NewEnrollment {
    NewEnrollment {
        student_id: student_id.to_string(),
        course_id: course_id.to_string(),
        status: EnrollmentStatus::Active,
        final_grade: None,
        completion_date: None,
    }
}

pub fn grade(enrollment_id: &str, name: &str, marks: f64, total: f64) -> NewGrade {
    NewGrade {
        enrollment_id: enrollment_id.to_string(),
        assignment_name: name.to_string(),
        marks_obtained: marks,
        total_marks: total,
        remarks: String::new(),
    }
}

pub fn attendance(enrollment_id: &str, day: NaiveDate, status: AttendanceStatus) -> NewAttendance {
    NewAttendance {
        enrollment_id: enrollment_id.to_string(),
        date: day,
        status,
        remarks: String::new(),
    }
}

pub fn announcement(title: &str, is_active: bool) -> NewAnnouncement {
    NewAnnouncement {
        title: title.to_string(),
        content: format!("{} details", title),
        priority: Priority::High,
        is_active,
    }
}
