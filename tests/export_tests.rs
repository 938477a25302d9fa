mod common;

use common::{STUDENT, ok, rat, seed_session, setup_test_db, temp_out};
use predicates::str::contains;
use serde_json::Value;
use std::fs;
use std::path::Path;

fn seed_marked(name: &str) -> String {
    let db = setup_test_db(name);
    seed_session(&db);
    ok(
        &db,
        &["attend", "mark", "--session", "1", "--student", STUDENT, "--at", "2025-03-03 10:01"],
    );
    db
}

#[test]
fn test_export_csv_contains_records() {
    let db = seed_marked("export_csv");
    let out = temp_out("export_csv", "csv");

    rat()
        .args(["--db", &db, "export", "--format", "csv", "--file", &out])
        .assert()
        .success()
        .stdout(contains("CSV export completed"));

    let content = fs::read_to_string(&out).unwrap();
    let mut lines = content.lines();
    assert!(lines.next().unwrap().starts_with("id,date,start_time,course"));
    let row = lines.next().unwrap();
    assert!(row.contains("CSC201"));
    assert!(row.contains(STUDENT));
    assert!(row.contains("present"));
}

#[test]
fn test_export_json_with_filters() {
    let db = seed_marked("export_json");
    let out = temp_out("export_json", "json");

    rat()
        .args(["--db", &db, "export", "--format", "json", "--file", &out])
        .args(["--range", "2025-03", "--course", "csc201", "--status", "present"])
        .assert()
        .success();

    let v: Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    let arr = v.as_array().unwrap();
    assert_eq!(arr.len(), 1);
    assert_eq!(arr[0]["student_id"], "S-100");
    assert_eq!(arr[0]["date"], "2025-03-03");
}

#[test]
fn test_export_with_no_match_writes_nothing() {
    let db = seed_marked("export_empty");
    let out = temp_out("export_empty", "csv");

    rat()
        .args(["--db", &db, "export", "--file", &out, "--status", "absent"])
        .assert()
        .success()
        .stdout(contains("No attendance records"));

    assert!(!Path::new(&out).exists());
}

#[test]
fn test_export_requires_absolute_path() {
    let db = seed_marked("export_relative");

    rat()
        .args(["--db", &db, "export", "--file", "relative.csv"])
        .assert()
        .failure()
        .stderr(contains("must be absolute"));
}

#[test]
fn test_export_xlsx_and_pdf() {
    let db = seed_marked("export_binary");

    for ext in ["xlsx", "pdf"] {
        let out = temp_out("export_binary", ext);
        rat()
            .args(["--db", &db, "export", "--format", ext, "--file", &out])
            .assert()
            .success();
        assert!(fs::metadata(&out).unwrap().len() > 0);
    }
}

#[test]
fn test_backup_copies_and_compresses() {
    let db = seed_marked("backup");
    let plain = temp_out("backup_plain", "sqlite");

    rat()
        .args(["--db", &db, "backup", "--file", &plain])
        .assert()
        .success()
        .stdout(contains("Backup created"));
    assert!(Path::new(&plain).exists());

    let zipped = temp_out("backup_zip", "sqlite");
    let zip_path = Path::new(&zipped).with_extension("zip");
    fs::remove_file(&zip_path).ok();

    rat()
        .args(["--db", &db, "backup", "--file", &zipped, "--compress"])
        .assert()
        .success()
        .stdout(contains("Compressed"));
    assert!(zip_path.exists());
    assert!(!Path::new(&zipped).exists());

    rat()
        .args(["--db", &db, "backup", "--file", "copy.sqlite"])
        .assert()
        .failure()
        .stderr(contains("absolute"));
}
