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

fn run_script(overrides: &[&str], input: &str) -> Output {
    let exe = env!("CARGO_BIN_EXE_fieldops_cli");
    let mut args = Vec::new();
    for value in overrides {
        args.push("--config-override");
        args.push(value);
    }

    let mut child = Command::new(exe)
        .args(&args)
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

fn json_lines(stdout: &str) -> Vec<serde_json::Value> {
    stdout
        .lines()
        .filter(|line| line.starts_with('{'))
        .map(|line| serde_json::from_str(line).expect("stdout line is not JSON"))
        .collect()
}

#[test]
fn select_attach_locate_and_submit_completes_job() {
    let photo = temp_path("ont.png");
    std::fs::write(&photo, [0x89, 0x50, 0x4e, 0x47]).unwrap();
    let script = format!(
        "login ahmad rahasia\nselect JOB-001\nwait\nphoto \"{}\"\nwait\nnotes ONT di ruang tamu\nform --json\nsubmit\njobs --json\nexit\n",
        photo.display()
    );

    let output = run_script(&["device_position=-6.175,106.827"], &script);
    std::fs::remove_file(&photo).ok();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!stderr.contains("ERROR"), "unexpected errors: {stderr}");

    assert!(stdout.contains("Lokasi terdeteksi: -6.175000, 106.827000"));
    assert!(stdout.contains("Photo attached:"));
    assert!(stdout.contains("NOTICE: Tugas berhasil diselesaikan!"));
    assert!(stdout.contains("Completed job: Budi Santoso (JOB-001) completed"));
    assert!(stdout.contains("Selesai di -6.175000, 106.827000"));

    let payloads = json_lines(&stdout);
    let form = &payloads[0];
    assert_eq!(form["job_id"], "JOB-001");
    assert_eq!(form["photo_attached"], true);
    assert_eq!(form["photo_bytes"], "data:image/png;base64,iVBORw==".len());
    assert_eq!(form["location"]["state"], "detected");
    assert_eq!(form["location"]["latitude"], "-6.175000");
    assert_eq!(form["notes"], "ONT di ruang tamu");
    assert_eq!(form["submit_enabled"], true);

    let jobs = &payloads[1];
    assert_eq!(jobs["pending_count"], 1);
    assert_eq!(jobs["rows"][0]["status"]["status"], "completed");
    assert_eq!(jobs["rows"][0]["notes"], "Selesai di -6.175000, 106.827000");
}

#[test]
fn selecting_job_moves_it_in_progress_once() {
    let output = run_script(
        &[],
        "login a b\nselect JOB-002\nselect JOB-002\nclose\njobs --json\nexit\n",
    );

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.matches("Form Update Tugas").count(), 2);
    assert!(stdout.contains("Form closed"));

    let jobs = &json_lines(&stdout)[0];
    assert_eq!(jobs["rows"][1]["status"]["status"], "in-progress");
    assert_eq!(jobs["pending_count"], 1);
}

#[test]
fn selecting_completed_job_opens_nothing() {
    let output = run_script(&[], "login a b\nselect JOB-004\nform\nexit\n");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("JOB-004 is already completed"));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_input - no task form is open"));
}

#[test]
fn submit_without_proof_warns_and_keeps_form() {
    let output = run_script(&[], "login a b\nselect JOB-002\nsubmit\nform --json\nexit\n");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("NOTICE: Mohon ambil foto dan pastikan lokasi terdeteksi"));

    let form = &json_lines(&stdout)[0];
    assert_eq!(form["job_id"], "JOB-002");
    assert_eq!(form["photo_attached"], false);
    assert_eq!(form["submit_enabled"], false);
}

#[test]
fn device_without_geolocation_uses_fallback_address() {
    let output = run_script(&[], "login a b\nselect JOB-001\nwait\nform --json\nexit\n");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Lokasi terdeteksi: Geolocation tidak didukung browser"));

    let form = &json_lines(&stdout)[0];
    assert_eq!(form["location"]["latitude"], "-6.208800");
    assert_eq!(form["location"]["longitude"], "106.845600");
}

#[test]
fn geolocation_error_falls_back_to_jakarta() {
    let output = run_script(
        &["geolocation_error=denied"],
        "login a b\nselect JOB-001\nwait\nexit\n",
    );

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Lokasi tidak tersedia (menggunakan default Jakarta)"));
}

#[test]
fn photo_must_be_an_image() {
    let output = run_script(&[], "login a b\nselect JOB-001\nphoto notes.txt\nexit\n");

    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_input - photo must be an image file"));
}

#[test]
fn missing_photo_file_reports_io_error() {
    let missing = temp_path("missing.jpg");
    let script = format!(
        "login a b\nselect JOB-001\nphoto \"{}\"\nwait\nexit\n",
        missing.display()
    );
    let output = run_script(&[], &script);

    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: io_error"));
}

#[test]
fn removing_photo_disables_submit() {
    let photo = temp_path("ont.jpg");
    std::fs::write(&photo, [0xff, 0xd8, 0xff]).unwrap();
    let script = format!(
        "login a b\nselect JOB-001\nphoto \"{}\"\nwait\nphoto --remove\nform --json\nexit\n",
        photo.display()
    );
    let output = run_script(&["device_position=1,2"], &script);
    std::fs::remove_file(&photo).ok();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Photo removed"));
    let form = &json_lines(&stdout)[0];
    assert_eq!(form["photo_attached"], false);
    assert_eq!(form["submit_enabled"], false);
}
