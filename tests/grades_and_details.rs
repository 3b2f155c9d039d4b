mod test_support;

use serde_json::json;
use test_support::{
    course_params, request_err, request_ok, spawn_sidecar, str_field, student_params, temp_dir,
};

fn f64_at(v: &serde_json::Value, pointer: &str) -> f64 {
    v.pointer(pointer)
        .and_then(|v| v.as_f64())
        .unwrap_or_else(|| panic!("missing {} in {}", pointer, v))
}

#[test]
fn grades_feed_percentages_and_enrollment_average() {
    let workspace = temp_dir("rosterd-grades");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let student = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "students.create",
        student_params("STU001", "Asha", "Rao", "asha@school.in"),
    );
    let course = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "courses.create",
        course_params("CS101", "Programming", 30),
    );
    let enrollment = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "enrollments.create",
        json!({ "studentId": str_field(&student, "id"), "courseId": str_field(&course, "id") }),
    );
    let eid = str_field(&enrollment, "id");

    let detail = request_ok(&mut stdin, &mut reader, "5", "enrollments.detail", json!({ "id": eid }));
    assert_eq!(f64_at(&detail, "/averageGrade"), 0.0);

    let _ = request_err(
        &mut stdin,
        &mut reader,
        "6",
        "grades.create",
        json!({ "enrollmentId": eid, "assignmentName": "Bad", "marksObtained": 1, "totalMarks": 0 }),
        "validation_failed",
    );

    let first = request_ok(
        &mut stdin,
        &mut reader,
        "7",
        "grades.create",
        json!({ "enrollmentId": eid, "assignmentName": "Quiz 1", "marksObtained": 80, "totalMarks": 100 }),
    );
    assert_eq!(f64_at(&first, "/percentage"), 80.0);
    assert_eq!(str_field(&first, "gradeLetter"), "A");
    let second = request_ok(
        &mut stdin,
        &mut reader,
        "8",
        "grades.create",
        json!({ "enrollmentId": eid, "assignmentName": "Quiz 2", "marksObtained": "90.00", "totalMarks": "100" }),
    );
    assert_eq!(str_field(&second, "gradeLetter"), "A+");

    let detail = request_ok(&mut stdin, &mut reader, "9", "enrollments.detail", json!({ "id": eid }));
    assert_eq!(f64_at(&detail, "/averageGrade"), 85.0);
    let listed = request_ok(
        &mut stdin,
        &mut reader,
        "9a",
        "enrollments.list",
        json!({ "studentId": str_field(&student, "id") }),
    );
    assert_eq!(f64_at(&listed, "/enrollments/0/averageGrade"), 85.0);
    assert_eq!(
        detail.get("grades").and_then(|v| v.as_array()).map(|a| a.len()),
        Some(2)
    );
    assert_eq!(
        detail.pointer("/enrollment/course/code").and_then(|v| v.as_str()),
        Some("CS101")
    );

    let updated = request_ok(
        &mut stdin,
        &mut reader,
        "10",
        "grades.update",
        json!({
            "id": str_field(&first, "id"),
            "enrollmentId": eid,
            "assignmentName": "Quiz 1",
            "marksObtained": 49.99,
            "totalMarks": 100
        }),
    );
    assert_eq!(str_field(&updated, "gradeLetter"), "D");

    for (i, (date, status)) in [("2024-09-02", "Present"), ("2024-09-03", "Absent"), ("2024-09-04", "Present")]
        .iter()
        .enumerate()
    {
        let _ = request_ok(
            &mut stdin,
            &mut reader,
            &format!("a{}", i),
            "attendance.create",
            json!({ "enrollmentId": eid, "date": date, "status": status }),
        );
    }

    let sd = request_ok(
        &mut stdin,
        &mut reader,
        "11",
        "students.detail",
        json!({ "id": str_field(&student, "id") }),
    );
    assert_eq!(f64_at(&sd, "/attendancePercentage"), 66.67);
    assert_eq!(sd.get("totalCourses").and_then(|v| v.as_i64()), Some(1));
    assert_eq!(sd.get("activeCourses").and_then(|v| v.as_i64()), Some(1));
    assert_eq!(sd.get("completedCourses").and_then(|v| v.as_i64()), Some(0));
    assert_eq!(
        sd.pointer("/student/fullName").and_then(|v| v.as_str()),
        Some("Asha Rao")
    );
    assert_eq!(
        sd.get("recentGrades").and_then(|v| v.as_array()).map(|a| a.len()),
        Some(2)
    );

    let absent = request_ok(
        &mut stdin,
        &mut reader,
        "12",
        "attendance.list",
        json!({ "status": "Absent" }),
    );
    assert_eq!(
        absent.pointer("/attendance/0/date").and_then(|v| v.as_str()),
        Some("2024-09-03")
    );

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "13",
        "enrollments.update",
        json!({
            "id": eid,
            "studentId": str_field(&student, "id"),
            "courseId": str_field(&course, "id"),
            "status": "Completed",
            "finalGrade": "B+",
            "completionDate": "2024-12-20"
        }),
    );
    let cd = request_ok(
        &mut stdin,
        &mut reader,
        "14",
        "courses.detail",
        json!({ "id": str_field(&course, "id") }),
    );
    assert_eq!(cd.pointer("/course/enrolledCount").and_then(|v| v.as_i64()), Some(0));
    assert_eq!(cd.pointer("/course/seatsAvailable").and_then(|v| v.as_i64()), Some(30));
    assert_eq!(
        cd.pointer("/enrollments/0/student/studentNo").and_then(|v| v.as_str()),
        Some("STU001")
    );

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}
