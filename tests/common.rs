#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use std::env;
use std::fs;
use std::path::PathBuf;

pub const LECTURER: &str = "lec@uni.edu";
pub const STUDENT: &str = "stu@uni.edu";

pub fn rat() -> Command {
    cargo_bin_cmd!("rattendance")
}

/// Create a unique test DB path inside the system temp dir and remove any existing file
pub fn setup_test_db(name: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_rattendance.sqlite", name));
    let db_path = path.to_string_lossy().to_string();
    fs::remove_file(&db_path).ok();
    db_path
}

/// Create a temporary output file path inside tempdir and ensure it's removed
pub fn temp_out(name: &str, ext: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_out.{}", name, ext));
    let p = path.to_string_lossy().to_string();
    fs::remove_file(&p).ok();
    p
}

/// Run `args` against `db` and require success.
pub fn ok(db: &str, args: &[&str]) {
    rat().arg("--db").arg(db).args(args).assert().success();
}

/// Fresh database only.
pub fn init_db(db: &str) {
    ok(db, &["--test", "init"]);
}

/// College, department, course, room, one lecturer and one student.
pub fn seed_catalog(db: &str) {
    init_db(db);
    ok(db, &["college", "add", "--code", "sci", "--name", "College of Science"]);
    ok(db, &["dept", "add", "--code", "csc", "--name", "Computer Science", "--college", "SCI"]);
    ok(
        db,
        &["course", "add", "--code", "csc201", "--title", "Data Structures", "--dept", "CSC", "--level", "200"],
    );
    ok(
        db,
        &["room", "add", "--code", "lt1", "--name", "Lecture Theatre 1", "--capacity", "120", "--building", "Main"],
    );
    ok(
        db,
        &[
            "user", "add", "--email", LECTURER, "--name", "Ada Obi", "--role", "lecturer",
            "--lecturer-id", "L-001", "--dept", "CSC",
        ],
    );
    ok(
        db,
        &[
            "user", "add", "--email", STUDENT, "--name", "Tunde Bello", "--role", "student",
            "--student-id", "S-100", "--dept", "CSC", "--level", "200",
        ],
    );
}

/// Catalog plus assignment 1 and an approved enrollment of the student.
pub fn seed_campus(db: &str) {
    seed_catalog(db);
    ok(
        db,
        &["assign", "add", "--course", "CSC201", "--lecturer", LECTURER, "--year", "2024/2025", "--semester", "First"],
    );
    ok(db, &["--by", STUDENT, "enroll", "request", "--student", STUDENT, "--assignment", "1"]);
    ok(db, &["--by", LECTURER, "enroll", "approve", "--id", "1"]);
}

/// Session 1 on 2025-03-03 10:00-11:00 in LT1, marked without a face image.
pub fn seed_session(db: &str) {
    seed_campus(db);
    ok(
        db,
        &[
            "--by", LECTURER, "session", "add", "--assignment", "1", "--title", "Linked lists",
            "--date", "2025-03-03", "--start", "10:00", "--end", "11:00", "--room", "LT1",
            "--method", "manual",
        ],
    );
}
