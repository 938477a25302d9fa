mod common;

use common::{LECTURER, STUDENT, init_db, ok, rat, seed_catalog, setup_test_db};
use predicates::prelude::*;
use predicates::str::contains;

#[test]
fn test_college_and_department_lifecycle() {
    let db = setup_test_db("college_lifecycle");
    init_db(&db);

    ok(&db, &["college", "add", "--code", "eng", "--name", "Engineering"]);
    ok(&db, &["college", "edit", "--code", "ENG", "--name", "College of Engineering"]);
    ok(&db, &["dept", "add", "--code", "mee", "--name", "Mechanical", "--college", "eng"]);

    rat()
        .args(["--db", &db, "college", "list"])
        .assert()
        .success()
        .stdout(contains("College of Engineering"));

    rat()
        .args(["--db", &db, "dept", "list", "--college", "ENG"])
        .assert()
        .success()
        .stdout(contains("MEE"));

    ok(&db, &["dept", "del", "--code", "MEE"]);

    rat()
        .args(["--db", &db, "dept", "list"])
        .assert()
        .success()
        .stdout(contains("No departments found"));

    rat()
        .args(["--db", &db, "dept", "list", "--all"])
        .assert()
        .success()
        .stdout(contains("MEE"));
}

#[test]
fn test_duplicate_college_code_fails() {
    let db = setup_test_db("college_dup");
    init_db(&db);

    ok(&db, &["college", "add", "--code", "law", "--name", "Law"]);
    rat()
        .args(["--db", &db, "college", "add", "--code", "LAW", "--name", "Law again"])
        .assert()
        .failure()
        .stderr(contains("LAW"));
}

#[test]
fn test_course_listing_filters() {
    let db = setup_test_db("course_filters");
    seed_catalog(&db);

    ok(
        &db,
        &["course", "add", "--code", "csc401", "--title", "Compilers", "--dept", "CSC", "--level", "400"],
    );

    rat()
        .args(["--db", &db, "course", "list", "--level", "400"])
        .assert()
        .success()
        .stdout(contains("CSC401"))
        .stdout(contains("CSC201").not());

    rat()
        .args(["--db", &db, "course", "list", "--search", "data"])
        .assert()
        .success()
        .stdout(contains("CSC201"));

    rat()
        .args(["--db", &db, "course", "add", "--code", "csc999", "--title", "Bad", "--dept", "CSC", "--level", "250"])
        .assert()
        .failure()
        .stderr(contains("250"));
}

#[test]
fn test_rooms_can_be_closed_and_reopened() {
    let db = setup_test_db("rooms_toggle");
    seed_catalog(&db);

    ok(
        &db,
        &[
            "room", "add", "--code", "vr1", "--name", "Online", "--type", "virtual", "--capacity", "300",
            "--platform", "zoom", "--link", "https://zoom.example/vr1",
        ],
    );
    ok(&db, &["room", "del", "--code", "LT1"]);

    rat()
        .args(["--db", &db, "room", "list", "--available"])
        .assert()
        .success()
        .stdout(contains("VR1"))
        .stdout(contains("LT1").not());

    ok(&db, &["room", "edit", "--code", "LT1", "--available", "true"]);

    rat()
        .args(["--db", &db, "room", "list", "--available"])
        .assert()
        .success()
        .stdout(contains("LT1"));

    rat()
        .args(["--db", &db, "room", "add", "--code", "x1", "--name", "No capacity"])
        .assert()
        .failure()
        .stderr(contains("capacity"));
}

#[test]
fn test_user_rules() {
    let db = setup_test_db("user_rules");
    seed_catalog(&db);

    rat()
        .args(["--db", &db, "user", "list", "--role", "student"])
        .assert()
        .success()
        .stdout(contains(STUDENT))
        .stdout(contains(LECTURER).not());

    rat()
        .args(["--db", &db, "user", "add", "--email", "x@uni.edu", "--name", "X", "--role", "student", "--dept", "CSC"])
        .assert()
        .failure()
        .stderr(contains("level"));

    rat()
        .args(["--db", &db, "--by", STUDENT, "college", "add", "--code", "art", "--name", "Arts"])
        .assert()
        .failure()
        .stderr(contains("Permission denied"));

    ok(&db, &["user", "deactivate", "--email", STUDENT]);

    rat()
        .args(["--db", &db, "user", "list", "--role", "student"])
        .assert()
        .success()
        .stdout(contains("No users found"));
}
