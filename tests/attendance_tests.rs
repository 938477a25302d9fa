mod common;

use common::{LECTURER, STUDENT, ok, rat, seed_campus, seed_session, setup_test_db, temp_out};
use predicates::prelude::*;
use predicates::str::contains;
use std::fs;

#[test]
fn test_self_mark_inside_window_is_present() {
    let db = setup_test_db("mark_present");
    seed_session(&db);

    rat()
        .args(["--db", &db, "--test", "--by", STUDENT, "attend", "mark", "--session", "1", "--student", STUDENT])
        .args(["--at", "2025-03-03 10:02"])
        .assert()
        .success()
        .stdout(contains("present"));

    rat()
        .args(["--db", &db, "--by", LECTURER, "attend", "list", "--session", "1"])
        .assert()
        .success()
        .stdout(contains("S-100"))
        .stdout(contains("2025-03-03 10:02:00"));
}

#[test]
fn test_students_cannot_override_the_clock() {
    let db = setup_test_db("mark_clock");
    seed_session(&db);

    rat()
        .args(["--db", &db, "--by", STUDENT, "attend", "mark", "--session", "1", "--student", STUDENT])
        .args(["--at", "2025-03-03 10:02"])
        .assert()
        .failure()
        .stderr(contains("may not override the clock"));

    rat()
        .args(["--db", &db, "--by", LECTURER, "attend", "close", "--session", "1"])
        .args(["--at", "2025-03-03 11:30"])
        .assert()
        .failure()
        .stderr(contains("may not override the clock"));

    rat()
        .args(["--db", &db, "--by", LECTURER, "attend", "list", "--session", "1"])
        .assert()
        .success()
        .stdout(contains("No attendance recorded"));
}

#[test]
fn test_second_mark_is_rejected() {
    let db = setup_test_db("mark_twice");
    seed_session(&db);

    let mark = |at: &str| {
        rat()
            .args(["--db", &db, "--test", "--by", STUDENT, "attend", "mark", "--session", "1", "--student", STUDENT])
            .args(["--at", at])
            .assert()
    };

    mark("2025-03-03 10:00").success();
    mark("2025-03-03 10:01")
        .failure()
        .stderr(contains("already marked"));
}

#[test]
fn test_mark_outside_window_fails() {
    let db = setup_test_db("mark_outside");
    seed_session(&db);

    for at in ["2025-03-03 09:54", "2025-03-03 10:06"] {
        rat()
            .args(["--db", &db, "attend", "mark", "--session", "1", "--student", STUDENT, "--at", at])
            .assert()
            .failure()
            .stderr(contains("not open"));
    }
}

#[test]
fn test_mark_after_late_threshold_is_late() {
    let db = setup_test_db("mark_late");
    seed_campus(&db);
    ok(
        &db,
        &[
            "session", "add", "--assignment", "1", "--title", "Trees", "--date", "2025-03-04",
            "--start", "09:00", "--end", "10:00", "--after", "30", "--method", "manual",
        ],
    );

    rat()
        .args(["--db", &db, "attend", "mark", "--session", "1", "--student", STUDENT])
        .args(["--at", "2025-03-04 09:20"])
        .assert()
        .success()
        .stdout(contains("late"));
}

#[test]
fn test_only_enrolled_students_can_mark() {
    let db = setup_test_db("mark_not_enrolled");
    seed_session(&db);
    ok(
        &db,
        &[
            "user", "add", "--email", "other@uni.edu", "--name", "Other", "--role", "student",
            "--student-id", "S-200", "--dept", "CSC", "--level", "200",
        ],
    );

    rat()
        .args(["--db", &db, "attend", "mark", "--session", "1", "--student", "other@uni.edu"])
        .args(["--at", "2025-03-03 10:00"])
        .assert()
        .failure()
        .stderr(contains("not enrolled"));
}

#[test]
fn test_close_marks_missing_students_absent() {
    let db = setup_test_db("close_absent");
    seed_session(&db);

    rat()
        .args(["--db", &db, "--test", "--by", LECTURER, "attend", "close", "--session", "1"])
        .args(["--at", "2025-03-03 10:03"])
        .assert()
        .failure()
        .stderr(contains("open until"));

    rat()
        .args(["--db", &db, "--test", "--by", LECTURER, "attend", "close", "--session", "1"])
        .args(["--at", "2025-03-03 11:30"])
        .assert()
        .success()
        .stdout(contains("1 student(s) marked absent"));

    rat()
        .args(["--db", &db, "--by", LECTURER, "report", "session", "--id", "1"])
        .assert()
        .success()
        .stdout(contains("0.0%"));
}

#[test]
fn test_lecturer_override_and_student_report() {
    let db = setup_test_db("override_report");
    seed_session(&db);

    ok(
        &db,
        &[
            "--by", LECTURER, "attend", "set", "--session", "1", "--student", STUDENT, "--status", "e",
            "--notes", "medical",
        ],
    );

    rat()
        .args(["--db", &db, "--by", STUDENT, "report", "student", "--email", STUDENT])
        .args(["--at", "2025-03-10 12:00"])
        .assert()
        .success()
        .stdout(contains("excused"))
        .stdout(contains("0/1"));

    rat()
        .args(["--db", &db, "--by", STUDENT, "attend", "set", "--session", "1", "--student", STUDENT])
        .args(["--status", "present"])
        .assert()
        .failure()
        .stderr(contains("Permission denied"));
}

#[test]
fn test_face_method_requires_registered_face() {
    let db = setup_test_db("face_mark");
    seed_campus(&db);
    ok(
        &db,
        &[
            "session", "add", "--assignment", "1", "--title", "Graphs", "--date", "2025-03-05",
            "--start", "14:00", "--end", "15:00",
        ],
    );

    let mark = |extra: &[&str]| {
        rat()
            .args(["--db", &db, "attend", "mark", "--session", "1", "--student", STUDENT])
            .args(["--at", "2025-03-05 14:01"])
            .args(extra)
            .assert()
    };

    mark(&[]).failure().stderr(contains("face image"));

    let img = temp_out("face_capture", "jpg");
    fs::write(&img, [0xFFu8, 0xD8, 0xFF, 0xE0, 1, 2, 3, 4]).unwrap();

    mark(&["--image", &img])
        .failure()
        .stderr(contains("no face registered"));

    ok(&db, &["--by", STUDENT, "face", "register", "--user", STUDENT, "--image", &img]);

    mark(&["--image", &img])
        .success()
        .stdout(contains("face verified"));

    rat()
        .args(["--db", &db, "--by", STUDENT, "face", "log", "--user", STUDENT])
        .assert()
        .success()
        .stdout(contains("failed"))
        .stdout(contains("no face registered"))
        .stdout(contains("success"));

    rat()
        .args(["--db", &db, "--by", LECTURER, "face", "log", "--user", STUDENT])
        .assert()
        .failure()
        .stderr(contains("Permission denied"));
}

#[test]
fn test_room_conflicts_block_scheduling() {
    let db = setup_test_db("room_conflict");
    seed_session(&db);
    ok(
        &db,
        &["course", "add", "--code", "csc205", "--title", "Logic", "--dept", "CSC", "--level", "200"],
    );
    ok(
        &db,
        &[
            "user", "add", "--email", "lec2@uni.edu", "--name", "Second", "--role", "lecturer",
            "--lecturer-id", "L-002", "--dept", "CSC",
        ],
    );
    ok(
        &db,
        &["assign", "add", "--course", "CSC205", "--lecturer", "lec2@uni.edu", "--year", "2024/2025", "--semester", "First"],
    );

    let add = |extra: &[&str]| {
        rat()
            .args(["--db", &db, "session", "add", "--assignment", "2", "--title", "Intro"])
            .args(["--date", "2025-03-03", "--start", "10:30", "--end", "11:30", "--room", "LT1"])
            .args(extra)
            .assert()
    };

    add(&[]).failure().stderr(contains("conflict"));
    add(&["--allow-conflicts"])
        .success()
        .stdout(contains("room conflict"));
}

#[test]
fn test_weekly_recurrence_and_listing() {
    let db = setup_test_db("weekly");
    seed_campus(&db);

    rat()
        .args(["--db", &db, "--by", LECTURER, "session", "add", "--assignment", "1", "--title", "Weekly"])
        .args(["--date", "2025-03-03", "--start", "08:00", "--end", "09:00", "--recurrence", "weekly"])
        .args(["--until", "2025-03-24"])
        .assert()
        .success()
        .stdout(contains("4 occurrences"));

    rat()
        .args(["--db", &db, "session", "list", "--range", "2025-03-10:2025-03-17"])
        .assert()
        .success()
        .stdout(contains("2025-03-10"))
        .stdout(contains("2025-03-17"))
        .stdout(contains("2025-03-03").not());

    rat()
        .args(["--db", &db, "session", "show", "--id", "1"])
        .assert()
        .success()
        .stdout(contains("weekly until 2025-03-24"));
}

#[test]
fn test_edit_reschedules_and_notifies() {
    let db = setup_test_db("edit_session");
    seed_session(&db);

    rat()
        .args(["--db", &db, "--by", LECTURER, "session", "edit", "--id", "1"])
        .args(["--date", "2025-03-04", "--start", "14:00", "--end", "15:30"])
        .assert()
        .success()
        .stdout(contains("date, start, end"))
        .stdout(contains("2025-03-04 14:00-15:30"));

    rat()
        .args(["--db", &db, "--by", STUDENT, "notify", "list", "--user", STUDENT, "--unread"])
        .assert()
        .success()
        .stdout(contains("Class updated: CSC201"));

    // The old slot no longer accepts marks; the new one does.
    rat()
        .args(["--db", &db, "attend", "mark", "--session", "1", "--student", STUDENT])
        .args(["--at", "2025-03-03 10:00"])
        .assert()
        .failure()
        .stderr(contains("not open"));
    ok(
        &db,
        &["attend", "mark", "--session", "1", "--student", STUDENT, "--at", "2025-03-04 14:02"],
    );

    rat()
        .args(["--db", &db, "--by", LECTURER, "session", "edit", "--id", "1", "--before", "1441"])
        .assert()
        .failure()
        .stderr(contains("must not exceed 1440"));

    rat()
        .args(["--db", &db, "--by", STUDENT, "session", "edit", "--id", "1", "--title", "Mine"])
        .assert()
        .failure()
        .stderr(contains("Permission denied"));
}

#[test]
fn test_cancel_notifies_enrolled_students() {
    let db = setup_test_db("cancel_notify");
    seed_session(&db);

    rat()
        .args(["--db", &db, "--by", LECTURER, "session", "cancel", "--id", "1"])
        .args(["--reason", "Public holiday"])
        .assert()
        .success();

    rat()
        .args(["--db", &db, "--by", STUDENT, "notify", "list", "--user", STUDENT, "--unread"])
        .assert()
        .success()
        .stdout(contains("Class cancelled: CSC201"));

    ok(&db, &["--by", STUDENT, "notify", "read", "--user", STUDENT, "--all"]);

    rat()
        .args(["--db", &db, "--by", STUDENT, "notify", "list", "--user", STUDENT, "--unread"])
        .assert()
        .success()
        .stdout(contains("No notifications"));

    rat()
        .args(["--db", &db, "attend", "mark", "--session", "1", "--student", STUDENT])
        .args(["--at", "2025-03-03 10:00"])
        .assert()
        .failure()
        .stderr(contains("cancelled"));
}

#[test]
fn test_available_sessions_and_dashboard() {
    let db = setup_test_db("available_dash");
    seed_session(&db);

    rat()
        .args(["--db", &db, "session", "available", "--student", STUDENT, "--at", "2025-03-03 10:01"])
        .assert()
        .success()
        .stdout(contains("Linked lists"))
        .stdout(contains("4m 00s"));

    rat()
        .args(["--db", &db, "session", "available", "--student", STUDENT, "--at", "2025-03-03 12:00"])
        .assert()
        .success()
        .stdout(contains("No sessions are open"));

    rat()
        .args(["--db", &db, "--by", LECTURER, "dashboard", "--user", LECTURER, "--at", "2025-03-03 08:00"])
        .assert()
        .success()
        .stdout(contains("Welcome, Ada Obi"))
        .stdout(contains("Linked lists"));

    rat()
        .args(["--db", &db, "dashboard"])
        .assert()
        .success()
        .stdout(contains("Pending enrollments"));
}

#[test]
fn test_enrollment_rejection_and_withdrawal() {
    let db = setup_test_db("enroll_flow");
    seed_campus(&db);

    rat()
        .args(["--db", &db, "enroll", "list", "--assignment", "1"])
        .assert()
        .success()
        .stdout(contains("approved"));

    ok(&db, &["--by", STUDENT, "enroll", "withdraw", "--id", "1"]);

    rat()
        .args(["--db", &db, "--by", LECTURER, "enroll", "approve", "--id", "1"])
        .assert()
        .failure()
        .stderr(contains("withdrawn"));

    rat()
        .args(["--db", &db, "--by", STUDENT, "enroll", "request", "--student", STUDENT, "--assignment", "1"])
        .assert()
        .failure()
        .stderr(contains("already requested"));
}
