mod test_support;

use serde_json::json;
use test_support::{request_ok, spawn_sidecar, temp_dir};

#[test]
fn list_students_computes_average_and_attendance() {
    let workspace = temp_dir("studentrecd-metrics");
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "students.create",
        json!({ "id": "s1", "name": "Sam" }),
    );

    let mut next_id = 3;
    for (score, date) in [(90, "2024-01-15"), (80, "2024-01-20"), (70, "2024-01-25")] {
        let _ = request_ok(
            &mut stdin,
            &mut reader,
            &next_id.to_string(),
            "assignments.add",
            json!({ "student_id": "s1", "subject": "Math", "score": score, "assignment_date": date }),
        );
        next_id += 1;
    }
    for day in 1..=10 {
        let _ = request_ok(
            &mut stdin,
            &mut reader,
            &next_id.to_string(),
            "attendance.mark",
            json!({
                "student_id": "s1",
                "date": format!("2024-01-{:02}", day),
                "present": day <= 8
            }),
        );
        next_id += 1;
    }

    let listed = request_ok(
        &mut stdin,
        &mut reader,
        &next_id.to_string(),
        "students.list",
        json!({}),
    );
    let students = listed.get("students").and_then(|v| v.as_array()).expect("students");
    assert_eq!(students.len(), 1);
    let row = &students[0];
    assert_eq!(row.get("id").and_then(|v| v.as_str()), Some("s1"));
    assert_eq!(row.get("avg_score").and_then(|v| v.as_f64()), Some(80.0));
    assert_eq!(
        row.get("attendance_percentage").and_then(|v| v.as_f64()),
        Some(80.0)
    );
}

#[test]
fn students_without_history_surface_null_metrics() {
    let workspace = temp_dir("studentrecd-null-metrics");
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "students.create",
        json!({ "id": "s1", "name": "Sam" }),
    );

    let listed = request_ok(&mut stdin, &mut reader, "3", "students.list", json!({}));
    let students = listed.get("students").and_then(|v| v.as_array()).expect("students");
    assert_eq!(students.len(), 1);
    // Zero assignment/attendance rows: null metrics, the student still shows.
    assert!(students[0].get("avg_score").expect("avg_score").is_null());
    assert!(students[0]
        .get("attendance_percentage")
        .expect("attendance_percentage")
        .is_null());
}

#[test]
fn duplicate_attendance_marks_count_as_independent_samples() {
    let workspace = temp_dir("studentrecd-dup-attendance");
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "students.create",
        json!({ "id": "s1", "name": "Sam" }),
    );
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "attendance.mark",
        json!({ "student_id": "s1", "date": "2024-03-01", "present": true }),
    );
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "attendance.mark",
        json!({ "student_id": "s1", "date": "2024-03-01", "present": false }),
    );

    let detail = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "students.get",
        json!({ "id": "s1" }),
    );
    assert_eq!(
        detail
            .get("attendance")
            .and_then(|v| v.as_array())
            .map(|a| a.len()),
        Some(2)
    );

    let listed = request_ok(&mut stdin, &mut reader, "6", "students.list", json!({}));
    let students = listed.get("students").and_then(|v| v.as_array()).expect("students");
    assert_eq!(
        students[0]
            .get("attendance_percentage")
            .and_then(|v| v.as_f64()),
        Some(50.0)
    );
}

#[test]
fn student_detail_orders_lists_and_caps_attendance() {
    let workspace = temp_dir("studentrecd-detail-order");
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "students.create",
        json!({ "id": "s1", "name": "Sam" }),
    );
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "assignments.add",
        json!({ "student_id": "s1", "subject": "Math", "score": 70, "assignment_date": "2024-01-10" }),
    );
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "assignments.add",
        json!({ "student_id": "s1", "subject": "ML", "score": 80, "assignment_date": "2024-01-20" }),
    );
    let mut next_id = 5;
    for day in 1..=31 {
        let _ = request_ok(
            &mut stdin,
            &mut reader,
            &next_id.to_string(),
            "attendance.mark",
            json!({ "student_id": "s1", "date": format!("2024-03-{:02}", day) }),
        );
        next_id += 1;
    }

    let detail = request_ok(
        &mut stdin,
        &mut reader,
        &next_id.to_string(),
        "students.get",
        json!({ "id": "s1" }),
    );
    let assignments = detail
        .get("assignments")
        .and_then(|v| v.as_array())
        .expect("assignments");
    assert_eq!(
        assignments[0].get("subject").and_then(|v| v.as_str()),
        Some("ML")
    );
    assert_eq!(
        assignments[1].get("subject").and_then(|v| v.as_str()),
        Some("Math")
    );

    let attendance = detail
        .get("attendance")
        .and_then(|v| v.as_array())
        .expect("attendance");
    assert_eq!(attendance.len(), 30);
    assert_eq!(
        attendance[0].get("date").and_then(|v| v.as_str()),
        Some("2024-03-31")
    );
    // Day 1 fell off the 30-row cap.
    assert_eq!(
        attendance[29].get("date").and_then(|v| v.as_str()),
        Some("2024-03-02")
    );
}
