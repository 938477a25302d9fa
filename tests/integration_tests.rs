mod common;

use common::{init_db, rat, setup_test_db};
use predicates::str::contains;
use std::path::Path;

#[test]
fn test_init_creates_database() {
    let db_path = setup_test_db("init_creates");
    init_db(&db_path);

    assert!(Path::new(&db_path).exists());

    rat()
        .args(["--db", &db_path, "db", "--info"])
        .assert()
        .success()
        .stdout(contains("Colleges"));
}

#[test]
fn test_commands_require_initialized_database() {
    let db_path = setup_test_db("missing_db");

    rat()
        .args(["--db", &db_path, "college", "list"])
        .assert()
        .failure()
        .stderr(contains("rattendance init"));
}

#[test]
fn test_db_migrate_and_check() {
    let db_path = setup_test_db("db_check");
    init_db(&db_path);

    rat()
        .args(["--db", &db_path, "db", "--migrate", "--check"])
        .assert()
        .success()
        .stdout(contains("Schema is up to date"))
        .stdout(contains("Integrity check passed"));
}

#[test]
fn test_log_records_init_and_migrations() {
    let db_path = setup_test_db("log_print");
    init_db(&db_path);

    rat()
        .args(["--db", &db_path, "log", "--print"])
        .assert()
        .success()
        .stdout(contains("migration_applied"))
        .stdout(contains("init"));

    rat()
        .args(["--db", &db_path, "log", "--op", "init", "--last", "1"])
        .assert()
        .success()
        .stdout(contains("Database initialized"));
}

#[test]
fn test_unknown_actor_is_rejected() {
    let db_path = setup_test_db("unknown_actor");
    init_db(&db_path);

    rat()
        .args(["--db", &db_path, "--by", "ghost@uni.edu", "college", "add", "--code", "x", "--name", "X"])
        .assert()
        .failure()
        .stderr(contains("ghost@uni.edu"));
}
