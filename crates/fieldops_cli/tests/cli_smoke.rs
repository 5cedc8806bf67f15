use std::path::PathBuf;
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_path(file_name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("fieldops-{nanos}-{file_name}"))
}

fn run_once(args: &[&str]) -> Output {
    let exe = env!("CARGO_BIN_EXE_fieldops_cli");
    Command::new(exe)
        .args(args)
        .env("FIELDOPS_CONFIG_PATH", temp_path("missing-config.json"))
        .env_remove("FIELDOPS_SEED_PATH")
        .env_remove("FIELDOPS_DESKTOP_NOTIFICATIONS")
        .output()
        .expect("failed to run fieldops_cli")
}

fn last_json_line(output: &Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let line = stdout
        .lines()
        .rev()
        .find(|line| line.starts_with('{'))
        .expect("no JSON line in stdout");
    serde_json::from_str(line).expect("stdout line is not JSON")
}

#[test]
fn cli_smoke_help() {
    let output = run_once(&["--help"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage"));
    assert!(stdout.contains("select"));
}

#[test]
fn jobs_requires_login() {
    let output = run_once(&["jobs"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: unauthenticated - login required"));
}

#[test]
fn unknown_command_reports_invalid_input() {
    let output = run_once(&["teleport"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_input"));
}

#[test]
fn jobs_json_lists_seed_with_pending_banner() {
    let output = run_once(&["--user", "ahmad", "--password", "x", "jobs", "--json"]);

    assert!(output.status.success());
    let json = last_json_line(&output);
    assert_eq!(json["pending_count"], 2);
    assert_eq!(
        json["banner"],
        "Anda memiliki 2 tugas baru yang belum dikerjakan"
    );
    let rows = json["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0]["id"], "JOB-001");
    assert_eq!(rows[2]["status"]["status"], "in-progress");
    assert_eq!(rows[3]["status"]["label"], "Selesai");
    assert!(rows[3]["chat_action"].is_null());
}

#[test]
fn jobs_plain_shows_table_and_banner() {
    let output = run_once(&["--user", "ahmad", "--password", "x", "jobs"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("ISP Operations [2]"));
    assert!(stdout.contains("Anda memiliki 2 tugas baru yang belum dikerjakan"));
    assert!(stdout.contains("Budi Santoso"));
    assert!(stdout.contains("Sedang Dikerjakan"));
}

#[test]
fn profile_json_shows_employee() {
    let output = run_once(&["--user", "ahmad", "--password", "x", "profile", "--json"]);

    assert!(output.status.success());
    let json = last_json_line(&output);
    assert_eq!(json["name"], "Ahmad Ridwan");
    assert_eq!(json["fields"][0]["label"], "ID Karyawan");
    assert_eq!(json["fields"][0]["value"], "ISP-2024-001");
}

#[test]
fn complete_marks_job_and_notifies() {
    let output = run_once(&[
        "--user",
        "ahmad",
        "--password",
        "x",
        "complete",
        "JOB-003",
        "--photo",
        "data:image/png;base64,AAAA",
        "--address",
        "Jl. Kenanga 3",
        "--lat",
        "-6.2",
        "--lng",
        "106.8",
        "--json",
    ]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("NOTICE: Tugas berhasil diselesaikan!"));
    let json = last_json_line(&output);
    assert_eq!(json["id"], "JOB-003");
    assert_eq!(json["status"], "completed");
    assert_eq!(json["notes"], "Selesai di Jl. Kenanga 3");
}

#[test]
fn complete_unknown_job_is_silent() {
    let output = run_once(&[
        "--user",
        "ahmad",
        "--password",
        "x",
        "complete",
        "JOB-404",
        "--photo",
        "data:image/png;base64,AAAA",
        "--address",
        "Jl. Kenanga 3",
        "--lat",
        "1",
        "--lng",
        "2",
    ]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains("NOTICE"));
    assert!(stdout.trim().is_empty());
}

#[test]
fn complete_rejects_non_image_photo() {
    let output = run_once(&[
        "--user",
        "ahmad",
        "--password",
        "x",
        "complete",
        "JOB-001",
        "--photo",
        "hello",
        "--address",
        "Jl. Kenanga 3",
        "--lat",
        "1",
        "--lng",
        "2",
    ]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_input - photo must be an image data URL"));
}

#[test]
fn seed_fixture_replaces_mock_jobs() {
    let exe = env!("CARGO_BIN_EXE_fieldops_cli");
    let seed_path = temp_path("seed.json");
    let content = serde_json::json!({
        "schema_version": 1,
        "jobs": [
            {
                "id": "JOB-100",
                "customer_name": "Rina Wati",
                "address": "Jl. Melati 7, Depok",
                "phone": "+62 811-0000-1111",
                "package_type": "Paket 20 Mbps",
                "scheduled_time": "08:00 - 10:00 WIB",
                "status": "pending",
                "priority": "low"
            }
        ]
    });
    std::fs::write(&seed_path, serde_json::to_string_pretty(&content).unwrap()).unwrap();

    let output = Command::new(exe)
        .args(["--user", "ahmad", "--password", "x", "jobs", "--json"])
        .env("FIELDOPS_CONFIG_PATH", temp_path("missing-config.json"))
        .env("FIELDOPS_SEED_PATH", &seed_path)
        .output()
        .expect("failed to run jobs command");

    std::fs::remove_file(&seed_path).ok();
    assert!(output.status.success());
    let json = last_json_line(&output);
    assert_eq!(json["rows"].as_array().unwrap().len(), 1);
    assert_eq!(json["rows"][0]["customer_name"], "Rina Wati");
    assert_eq!(json["pending_count"], 1);
}

#[test]
fn invalid_config_override_fails_startup() {
    let output = run_once(&["--config-override", "chat_reply_delay_ms=soon", "jobs"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_input - chat_reply_delay_ms must be a whole number"));
}
