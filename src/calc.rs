use crate::model::{Enrollment, EnrollmentStatus, Grade};
use chrono::{Datelike, NaiveDate};

/// Round half away from zero to 2 decimals, the precision every derived
/// percentage is reported at.
pub fn round_2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

pub fn full_name(first_name: &str, last_name: &str) -> String {
    format!("{} {}", first_name, last_name)
}

/// Whole years between `date_of_birth` and `today`. A birth date in the
/// future yields 0.
pub fn age(date_of_birth: NaiveDate, today: NaiveDate) -> u32 {
    let mut years = today.year() - date_of_birth.year();
    if (today.month(), today.day()) < (date_of_birth.month(), date_of_birth.day()) {
        years -= 1;
    }
    years.max(0) as u32
}

pub fn enrolled_count(enrollments: &[Enrollment]) -> i64 {
    enrollments
        .iter()
        .filter(|e| e.status == EnrollmentStatus::Active)
        .count() as i64
}

/// Not clamped: an over-enrolled course reports a negative value.
pub fn seats_available(max_students: i64, enrolled: i64) -> i64 {
    max_students - enrolled
}

/// `marks / total * 100` at 2 decimals. A non-positive total yields 0 rather
/// than a division error; writes already reject such totals.
pub fn percentage(marks_obtained: f64, total_marks: f64) -> f64 {
    if total_marks <= 0.0 {
        return 0.0;
    }
    round_2(marks_obtained / total_marks * 100.0)
}

pub fn grade_letter(percentage: f64) -> &'static str {
    if percentage >= 90.0 {
        "A+"
    } else if percentage >= 80.0 {
        "A"
    } else if percentage >= 70.0 {
        "B+"
    } else if percentage >= 60.0 {
        "B"
    } else if percentage >= 50.0 {
        "C"
    } else if percentage >= 40.0 {
        "D"
    } else {
        "F"
    }
}

/// Mean of the unrounded per-grade percentages, rounded once at the end.
/// 0 when there are no grades.
pub fn average_grade(grades: &[Grade]) -> f64 {
    if grades.is_empty() {
        return 0.0;
    }
    let total: f64 = grades
        .iter()
        .map(|g| {
            if g.total_marks > 0.0 {
                g.marks_obtained / g.total_marks * 100.0
            } else {
                0.0
            }
        })
        .sum();
    round_2(total / grades.len() as f64)
}

pub fn attendance_percentage(present_count: i64, total_classes: i64) -> f64 {
    if total_classes <= 0 {
        return 0.0;
    }
    round_2(present_count as f64 / total_classes as f64 * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn grade(marks: f64, total: f64) -> Grade {
        Grade {
            id: "g".to_string(),
            enrollment_id: "e".to_string(),
            assignment_name: "quiz".to_string(),
            marks_obtained: marks,
            total_marks: total,
            date: date(2024, 1, 1),
            remarks: String::new(),
        }
    }

    fn enrollment(status: EnrollmentStatus) -> Enrollment {
        Enrollment {
            id: "e".to_string(),
            student_id: "s".to_string(),
            course_id: "c".to_string(),
            enrollment_date: date(2024, 1, 1),
            status,
            final_grade: None,
            completion_date: None,
        }
    }

    #[test]
    fn age_drops_by_one_only_before_birthday() {
        let dob = date(2000, 6, 15);
        assert_eq!(age(dob, date(2024, 6, 14)), 23);
        assert_eq!(age(dob, date(2024, 6, 15)), 24);
        assert_eq!(age(dob, date(2024, 12, 31)), 24);
        assert_eq!(age(dob, date(2024, 1, 1)), 23);
    }

    #[test]
    fn age_is_never_negative() {
        assert_eq!(age(date(2030, 1, 1), date(2024, 1, 1)), 0);
        assert_eq!(age(date(2024, 3, 1), date(2024, 2, 1)), 0);
    }

    #[test]
    fn leap_day_birthday_counts_from_march() {
        let dob = date(2004, 2, 29);
        assert_eq!(age(dob, date(2023, 2, 28)), 18);
        assert_eq!(age(dob, date(2023, 3, 1)), 19);
    }

    #[test]
    fn enrolled_count_only_counts_active() {
        let rows = vec![
            enrollment(EnrollmentStatus::Active),
            enrollment(EnrollmentStatus::Completed),
            enrollment(EnrollmentStatus::Active),
            enrollment(EnrollmentStatus::Dropped),
            enrollment(EnrollmentStatus::Failed),
        ];
        let enrolled = enrolled_count(&rows);
        assert_eq!(enrolled, 2);
        assert_eq!(seats_available(30, enrolled), 28);
        assert_eq!(seats_available(1, enrolled), -1);
    }

    #[test]
    fn percentage_rounds_to_two_decimals() {
        assert_eq!(percentage(80.0, 100.0), 80.0);
        assert_eq!(percentage(1.0, 3.0), 33.33);
        assert_eq!(percentage(2.0, 3.0), 66.67);
        assert_eq!(percentage(5.0, 0.0), 0.0);
    }

    #[test]
    fn grade_letter_boundaries_are_inclusive() {
        assert_eq!(grade_letter(percentage(90.0, 100.0)), "A+");
        assert_eq!(grade_letter(percentage(89.99, 100.0)), "A");
        assert_eq!(grade_letter(80.0), "A");
        assert_eq!(grade_letter(79.99), "B+");
        assert_eq!(grade_letter(70.0), "B+");
        assert_eq!(grade_letter(60.0), "B");
        assert_eq!(grade_letter(percentage(50.0, 100.0)), "C");
        assert_eq!(grade_letter(percentage(49.99, 100.0)), "D");
        assert_eq!(grade_letter(40.0), "D");
        assert_eq!(grade_letter(39.99), "F");
        assert_eq!(grade_letter(0.0), "F");
    }

    #[test]
    fn average_grade_is_zero_without_grades() {
        assert_eq!(average_grade(&[]), 0.0);
    }

    #[test]
    fn average_grade_means_percentages() {
        let grades = vec![grade(80.0, 100.0), grade(90.0, 100.0)];
        assert_eq!(average_grade(&grades), 85.0);

        // Mixed totals average the ratios, not the raw marks.
        let grades = vec![grade(10.0, 20.0), grade(90.0, 100.0)];
        assert_eq!(average_grade(&grades), 70.0);
    }

    #[test]
    fn attendance_percentage_guards_zero_classes() {
        assert_eq!(attendance_percentage(0, 0), 0.0);
        assert_eq!(attendance_percentage(2, 3), 66.67);
        assert_eq!(attendance_percentage(4, 4), 100.0);
    }
}
