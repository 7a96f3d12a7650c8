use assert_cmd::Command;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn combined_output(output: &std::process::Output) -> String {
    format!(
        "{}\n{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    )
}

fn write_config(path: &Path) {
    fs::write(
        path,
        r#"{"nr_pixels": 3, "integration_time_limit": 1000,
            "lower_boundary": 100, "upper_boundary": 200}"#,
    )
    .expect("write config");
}

fn write_folder(dir: &Path) {
    let files = [
        ("20260121T143000-F1-i100.txt", "2 1 1 0 0 0 0 10 400 20 3"),
        ("20260121T143001-F1-i200.txt", "2 1 1 0 0 0 0 10 150 20 3"),
        ("20260121T143002-F1-i400.txt", "2 1 1 0 0 0 0 10 50 20 3"),
        ("20260121T143003-F1-i400.txt", "2, 1, 1"),
    ];
    for (name, content) in files {
        fs::write(dir.join(name), content).expect("write measurement");
    }
}

fn report_cmd() -> Command {
    let mut cmd = Command::cargo_bin("flame-report").expect("binary");
    cmd.env_remove("FLAME_CONFIG");
    cmd
}

#[test]
fn prints_well_formedness_and_success_rate() {
    let tmp = TempDir::new().expect("tempdir");
    let data = tmp.path().join("data");
    fs::create_dir(&data).expect("mkdir");
    write_folder(&data);
    let config = tmp.path().join("flame.json");
    write_config(&config);

    let output = report_cmd()
        .arg(&data)
        .arg("--config")
        .arg(&config)
        .arg("--details")
        .output()
        .expect("run flame-report");
    let text = combined_output(&output);
    assert!(output.status.success(), "flame-report failed:\n{text}");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("1 erroneous files:"), "{stdout}");
    assert!(stdout.contains("20260121T143003-F1-i400.txt\n\tError: Too few values"), "{stdout}");
    assert!(stdout.contains("3/4 files are well-formed."), "{stdout}");
    assert!(stdout.contains("20260121T143001-F1-i200.txt\t150\ttrue"), "{stdout}");
    assert!(stdout.contains("20260121T143002-F1-i400.txt\t50\tfalse"), "{stdout}");
    assert!(stdout.contains("20260121T143003-F1-i400.txt\t-\tunknown"), "{stdout}");
    assert!(stdout.contains("Success rate: 50.0% (1/2)"), "{stdout}");
}

#[test]
fn overrides_apply_and_csv_is_written() {
    let tmp = TempDir::new().expect("tempdir");
    let data = tmp.path().join("data");
    fs::create_dir(&data).expect("mkdir");
    write_folder(&data);
    let config = tmp.path().join("flame.json");
    write_config(&config);
    let success_csv = tmp.path().join("success.csv");

    // a cap of 150 µs leaves no scorable change
    let output = report_cmd()
        .arg(&data)
        .arg("--config")
        .arg(&config)
        .args(["--integration-time-limit", "150"])
        .arg("--success-csv")
        .arg(&success_csv)
        .output()
        .expect("run flame-report");
    assert!(output.status.success(), "{}", combined_output(&output));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Success rate: no data"), "{stdout}");

    let csv = fs::read_to_string(&success_csv).expect("read csv");
    assert!(csv.starts_with("filename,max_value,status\n"), "{csv}");
    assert_eq!(csv.lines().count(), 5);
}

#[test]
fn defaults_to_current_folder() {
    let tmp = TempDir::new().expect("tempdir");
    let data = tmp.path().join("data");
    fs::create_dir(&data).expect("mkdir");
    write_folder(&data);
    let config = tmp.path().join("flame.json");
    write_config(&config);

    let output = report_cmd()
        .current_dir(&data)
        .arg("--config")
        .arg(&config)
        .output()
        .expect("run flame-report");
    assert!(output.status.success(), "{}", combined_output(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("3/4 files are well-formed."), "{stdout}");
}

#[test]
fn accepts_a_single_file() {
    let tmp = TempDir::new().expect("tempdir");
    write_folder(tmp.path());
    let config = tmp.path().join("flame.json");
    write_config(&config);

    let output = report_cmd()
        .arg(tmp.path().join("20260121T143001-F1-i200.txt"))
        .arg("--config")
        .arg(&config)
        .output()
        .expect("run flame-report");
    assert!(output.status.success(), "{}", combined_output(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("1/1 files are well-formed."), "{stdout}");
    assert!(stdout.contains("Success rate: no data"), "{stdout}");
}

#[test]
fn missing_config_is_fatal() {
    let tmp = TempDir::new().expect("tempdir");
    let output = report_cmd()
        .arg(tmp.path())
        .arg("--config")
        .arg(tmp.path().join("absent.json"))
        .output()
        .expect("run flame-report");
    assert!(!output.status.success());
    assert!(combined_output(&output).contains("failed to read config"));
}

#[test]
fn invalid_override_is_rejected() {
    let tmp = TempDir::new().expect("tempdir");
    let config = tmp.path().join("flame.json");
    write_config(&config);
    let output = report_cmd()
        .arg(tmp.path())
        .arg("--config")
        .arg(&config)
        .args(["--lower-boundary", "500"])
        .output()
        .expect("run flame-report");
    assert!(!output.status.success());
    assert!(combined_output(&output).contains("must be below upper_boundary"));
}
