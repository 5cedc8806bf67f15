use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_path(file_name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("fieldops-{nanos}-{file_name}"))
}

fn run_chat(delay_ms: u64, input: &str) -> Output {
    let exe = env!("CARGO_BIN_EXE_fieldops_cli");
    let delay = format!("chat_reply_delay_ms={delay_ms}");

    let mut child = Command::new(exe)
        .args(["--config-override", delay.as_str()])
        .env("FIELDOPS_CONFIG_PATH", temp_path("missing-config.json"))
        .env_remove("FIELDOPS_SEED_PATH")
        .env_remove("FIELDOPS_DESKTOP_NOTIFICATIONS")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn interactive session");

    {
        let stdin = child.stdin.as_mut().expect("stdin");
        stdin
            .write_all(input.as_bytes())
            .expect("failed to write to stdin");
    }

    child
        .wait_with_output()
        .expect("failed to read interactive output")
}

#[test]
fn chat_opens_with_greeting_and_dial_link() {
    let output = run_chat(0, "login a b\nchat JOB-002\nexit\n");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("CS Support - Online - Siap membantu"));
    assert!(stdout.contains("Job: Siti Nurhaliza - Paket 100 Mbps"));
    assert!(stdout.contains("tel:+6281324681357"));
    assert!(stdout.contains("Ada yang bisa saya bantu terkait instalasi untuk Siti Nurhaliza?"));
}

#[test]
fn phone_question_gets_customer_phone() {
    let output = run_chat(0, "login a b\nchat JOB-002\nsay nomor telepon\nwait\nexit\n");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Anda: nomor telepon"));
    assert!(stdout.contains(
        "Nomor telepon pelanggan: +62 813-2468-1357. Silakan hubungi 30 menit sebelum tiba."
    ));
}

#[test]
fn unmatched_message_gets_fallback_reply() {
    let output = run_chat(0, "login a b\nchat JOB-001\nsay halo\nwait\nexit\n");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Silakan tanyakan tentang alamat, nomor telepon, paket, atau jadwal"));
}

#[test]
fn quick_reply_fills_draft_then_send_asks_support() {
    let output = run_chat(
        0,
        "login a b\nchat JOB-001\nquick 4\nmessages --json\nsend\nwait\nexit\n",
    );

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Draft: Konfirmasi jadwal instalasi"));
    assert!(stdout.contains("Jadwal instalasi: 10:00 - 12:00 WIB"));

    let view: serde_json::Value = stdout
        .lines()
        .find(|line| line.starts_with('{'))
        .map(|line| serde_json::from_str(line).unwrap())
        .expect("chat JSON");
    assert_eq!(view["draft"], "Konfirmasi jadwal instalasi");
    assert_eq!(view["lines"].as_array().unwrap().len(), 1);
    assert_eq!(view["quick_replies"].as_array().unwrap().len(), 4);
}

#[test]
fn quick_reply_out_of_range_is_rejected() {
    let output = run_chat(0, "login a b\nchat JOB-001\nquick 0\nquick 5\nexit\n");

    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(
        stderr
            .matches("ERROR: invalid_input - quick reply must be between 1 and 4")
            .count(),
        2
    );
}

#[test]
fn reply_for_closed_chat_is_dropped() {
    let output = run_chat(
        200,
        "login a b\nchat JOB-001\nsay alamat\nchat-close\nwait 500\nexit\n",
    );

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Chat closed"));
    assert!(!stdout.contains("Alamat pelanggan yang terdaftar"));
}

#[test]
fn reopening_chat_starts_fresh_log() {
    let output = run_chat(
        200,
        "login a b\nchat JOB-001\nsay paket\nchat JOB-001\nwait 500\nmessages --json\nexit\n",
    );

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains("Pelanggan berlangganan"));

    let view: serde_json::Value = stdout
        .lines()
        .rev()
        .find(|line| line.starts_with('{'))
        .map(|line| serde_json::from_str(line).unwrap())
        .expect("chat JSON");
    assert_eq!(view["lines"].as_array().unwrap().len(), 1);
    assert_eq!(view["typing"], false);
}

#[test]
fn chat_does_not_start_the_job() {
    let output = run_chat(0, "login a b\nchat JOB-001\njobs --json\nexit\n");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let jobs: serde_json::Value = stdout
        .lines()
        .find(|line| line.starts_with('{'))
        .map(|line| serde_json::from_str(line).unwrap())
        .expect("jobs JSON");
    assert_eq!(jobs["rows"][0]["status"]["status"], "pending");
    assert_eq!(jobs["pending_count"], 2);
}

#[test]
fn say_without_open_chat_fails() {
    let output = run_chat(0, "login a b\nsay halo\nexit\n");

    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_input - chat is not open"));
}

#[test]
fn completed_job_has_no_chat_action() {
    let output = run_chat(0, "login a b\nchat JOB-004\nsay alamat\nwait\nexit\n");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stdout.contains("chat <JOB-001|JOB-002|JOB-003>"));
    assert!(stdout.contains("JOB-004 is already completed, no chat action"));
    assert!(!stdout.contains("Job: Maya Indah - Paket 75 Mbps"));
    assert!(stderr.contains("ERROR: invalid_input - chat is not open"));
}
