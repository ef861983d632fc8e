mod common;

use assert_cmd::Command;
use predicates::str::contains;
use serde_json::{Value, json};

use common::{PEOPLE_CSV, TestWorkspace};

fn csv_users() -> Command {
    let mut cmd = Command::cargo_bin("csv-users").expect("binary exists");
    cmd.env_remove("CSV_FILE_PATH").env_remove("USERS_TABLE_PATH");
    cmd
}

#[test]
fn convert_prints_success_document() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("people.csv", PEOPLE_CSV);
    let table = workspace.join("users.csv");

    let output = csv_users()
        .args([
            "convert",
            "-i",
            input.to_str().unwrap(),
            "-t",
            table.to_str().unwrap(),
        ])
        .output()
        .expect("run convert");
    assert!(output.status.success());

    let document: Value = serde_json::from_slice(&output.stdout).expect("json stdout");
    assert_eq!(document["status"], "success");
    assert_eq!(
        document["message"],
        "CSV processing complete and 4 age groups reported."
    );
    assert_eq!(document["age_distribution"]["< 20"], "40.00%");

    let stored = std::fs::read_to_string(&table).expect("users table");
    assert_eq!(stored.lines().count(), 6);
    assert!(stored.contains("\"Ann Lee\",\"30\""));
}

#[test]
fn convert_reads_paths_from_environment() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("people.csv", PEOPLE_CSV);
    let table = workspace.join("users.csv");

    csv_users()
        .env("CSV_FILE_PATH", &input)
        .env("USERS_TABLE_PATH", &table)
        .args(["convert", "--format", "table"])
        .assert()
        .success()
        .stdout(contains("20 to 40  20.00%"));
    assert!(table.exists());
}

#[test]
fn convert_reports_missing_file() {
    let workspace = TestWorkspace::new();
    let output = csv_users()
        .args([
            "convert",
            "-i",
            workspace.join("absent.csv").to_str().unwrap(),
            "-t",
            workspace.join("users.csv").to_str().unwrap(),
        ])
        .output()
        .expect("run convert");
    assert!(!output.status.success());
    let document: Value = serde_json::from_slice(&output.stdout).expect("json stdout");
    assert_eq!(document["status"], "error");
    assert!(
        document["message"]
            .as_str()
            .unwrap()
            .starts_with("File Not Found: ")
    );
    assert!(!workspace.join("users.csv").exists());
}

#[test]
fn convert_reports_empty_file_as_processing_failure() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("empty.csv", "");
    csv_users()
        .args([
            "convert",
            "-i",
            input.to_str().unwrap(),
            "-t",
            workspace.join("users.csv").to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stdout(contains("Processing failed: CSV file is empty"))
        .stderr(contains("error:"));
}

#[test]
fn nest_prints_one_json_document_per_row() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("people.csv", PEOPLE_CSV);
    let output = csv_users()
        .args(["nest", "-i", input.to_str().unwrap(), "--limit", "2"])
        .output()
        .expect("run nest");
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("utf-8");
    let lines = stdout.lines().collect::<Vec<_>>();
    assert_eq!(lines.len(), 2);
    let first: Value = serde_json::from_str(lines[0]).expect("json line");
    assert_eq!(
        first,
        json!({
            "name": {"firstName": "Ann", "lastName": "Lee"},
            "age": "30",
            "address": {"line1": "1 Main St", "city": "Pune"},
            "gender": "female",
            "hobby": "chess",
        })
    );
}

#[test]
fn nest_mapped_emits_users() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("people.csv", PEOPLE_CSV);
    csv_users()
        .args(["nest", "-i", input.to_str().unwrap(), "--mapped"])
        .assert()
        .success()
        .stdout(contains(r#""name":"Old Timer","age":75"#));
}
