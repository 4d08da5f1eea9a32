use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

const NOW: &str = "2024-03-31 12:00:00";

struct CliTestEnv {
    _temp_dir: TempDir,
    home: PathBuf,
    xdg_config: PathBuf,
    xdg_state: PathBuf,
    dataset: PathBuf,
}

impl CliTestEnv {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let base = temp_dir.path().to_path_buf();
        let home = base.join("home");
        let xdg_config = base.join("xdg-config");
        let xdg_state = base.join("xdg-state");

        fs::create_dir_all(&home).expect("failed to create HOME");
        fs::create_dir_all(&xdg_config).expect("failed to create XDG_CONFIG_HOME");
        fs::create_dir_all(&xdg_state).expect("failed to create XDG_STATE_HOME");

        let dataset = base.join("activity.csv");
        fs::copy(fixture_path(), &dataset).expect("failed to copy fixture");

        Self {
            _temp_dir: temp_dir,
            home,
            xdg_config,
            xdg_state,
            dataset,
        }
    }

    fn write_config(&self, contents: &str) {
        let dir = self.xdg_config.join("matiks");
        fs::create_dir_all(&dir).expect("failed to create config dir");
        fs::write(dir.join("config.toml"), contents).expect("failed to write config");
    }
}

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../matiks-core/tests/fixtures/activity.csv")
}

fn run_report(env: &CliTestEnv, args: &[&str]) -> Output {
    let bin_path = PathBuf::from(assert_cmd::cargo::cargo_bin!("matiks-report"));

    Command::new(bin_path)
        .args(args)
        .env("HOME", &env.home)
        .env("XDG_CONFIG_HOME", &env.xdg_config)
        .env("XDG_STATE_HOME", &env.xdg_state)
        .env_remove("RUST_LOG")
        .output()
        .unwrap_or_else(|e| panic!("failed to execute matiks-report: {e}"))
}

fn assert_success(args: &[&str], output: &Output) {
    if output.status.success() {
        return;
    }

    let rendered_args = args
        .iter()
        .map(|arg| OsString::from(arg).to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ");
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    panic!(
        "matiks-report {rendered_args} failed\nstatus: {}\nstdout:\n{}\nstderr:\n{}",
        output.status, stdout, stderr
    );
}

fn report_json(env: &CliTestEnv, extra: &[&str]) -> serde_json::Value {
    let data = env.dataset.to_string_lossy().into_owned();
    let mut args = vec!["--data", data.as_str(), "--now", NOW, "--export", "json"];
    args.extend_from_slice(extra);

    let output = run_report(env, &args);
    assert_success(&args, &output);
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

#[test]
fn json_export_covers_whole_dataset() {
    let env = CliTestEnv::new();
    let json = report_json(&env, &[]);

    assert_eq!(json["load"]["rows_read"], 12);
    assert_eq!(json["load"]["rows_kept"], 10);

    let dashboard = &json["dashboard"];
    assert_eq!(dashboard["kpis"]["total_users"], 10);
    assert_eq!(dashboard["kpis"]["total_revenue"], 1280.0);
    assert_eq!(dashboard["insights"]["churn_risk_users"], 5);
    assert_eq!(dashboard["monthly_revenue"][0]["key"], "2024-01");
    assert_eq!(dashboard["recommendations"].as_array().map(Vec::len), Some(8));
}

#[test]
fn repeated_filters_combine() {
    let env = CliTestEnv::new();
    let json = report_json(
        &env,
        &["--country", "India", "--country", "USA", "--tier", "Mid"],
    );

    let dashboard = &json["dashboard"];
    assert_eq!(dashboard["record_count"], 3);
    assert_eq!(dashboard["kpis"]["total_revenue"], 260.0);
    assert_eq!(dashboard["selection"]["countries"][0], "India");
}

#[test]
fn config_supplies_dataset_and_thresholds() {
    let env = CliTestEnv::new();
    env.write_config(&format!(
        "[dataset]\npath = {:?}\n\n[insights]\nchurn_inactive_days = 60\nlow_session_threshold = 0\n",
        env.dataset.to_string_lossy()
    ));

    let args = ["--now", NOW, "--export", "json"];
    let output = run_report(&env, &args);
    assert_success(&args, &output);

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["dashboard"]["insights"]["churn_risk_users"], 2);
}

#[test]
fn terminal_and_markdown_output() {
    let env = CliTestEnv::new();
    let data = env.dataset.to_string_lossy().into_owned();

    let args = ["--data", data.as_str(), "--now", NOW];
    let output = run_report(&env, &args);
    assert_success(&args, &output);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("MATIKS ACTIVITY REPORT"));
    assert!(stdout.contains("$1,280.00"));
    assert!(stdout.contains("RECOMMENDATIONS"));

    let args = ["--data", data.as_str(), "--now", NOW, "--export", "md"];
    let output = run_report(&env, &args);
    assert_success(&args, &output);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("# Matiks Activity Report"));
    assert!(stdout.contains("| Users | 10 |"));
}

#[test]
fn empty_selection_reports_no_users() {
    let env = CliTestEnv::new();
    let data = env.dataset.to_string_lossy().into_owned();

    let args = ["--data", data.as_str(), "--now", NOW, "--country", "Atlantis"];
    let output = run_report(&env, &args);
    assert_success(&args, &output);
    assert!(String::from_utf8_lossy(&output.stdout).contains("No users match this selection."));
}

#[test]
fn missing_dataset_fails_with_message() {
    let env = CliTestEnv::new();
    let output = run_report(&env, &["--data", "/nonexistent/activity.csv"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("dataset not found"),
        "expected missing-dataset error, got:\n{stderr}"
    );
}

#[test]
fn invalid_arguments_are_rejected() {
    let env = CliTestEnv::new();
    let data = env.dataset.to_string_lossy().into_owned();

    let output = run_report(&env, &["--data", data.as_str(), "--export", "xml"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Unknown export format"));

    let output = run_report(&env, &["--data", data.as_str(), "--now", "yesterday"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid --now value"));
}
