use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

/// Command with settings isolated in `home` and logs written under it.
fn triage(home: &TempDir) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("triage_ansible");
    cmd.env("XDG_CONFIG_HOME", home.path())
        .env_remove("RUST_LOG")
        .arg("--logfile")
        .arg(home.path().join("bot.log"));
    cmd
}

fn logfile(home: &TempDir) -> String {
    std::fs::read_to_string(home.path().join("bot.log")).unwrap_or_default()
}

#[test]
fn test_version() {
    let mut cmd = cargo_bin_cmd!("triage_ansible");
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("triage_ansible"));
}

#[test]
fn test_help_lists_historical_flags() {
    let mut cmd = cargo_bin_cmd!("triage_ansible");
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--skip_no_update"))
        .stdout(predicate::str::contains("--dry-run"))
        .stdout(predicate::str::contains("--start-at"))
        .stdout(predicate::str::contains("--daemonize_interval"))
        .stdout(predicate::str::contains("/var/log/ansibullbot.log"));
}

#[test]
fn test_invalid_sort_is_usage_error() {
    let home = TempDir::new().unwrap();
    triage(&home)
        .arg("--sort")
        .arg("sideways")
        .assert()
        .failure()
        .code(predicate::eq(2))
        .stderr(predicate::str::contains("sideways"));

    assert!(!logfile(&home).contains("Triage pass planned"));
}

#[test]
fn test_unknown_flag_is_usage_error() {
    let home = TempDir::new().unwrap();
    triage(&home)
        .arg("--issue_component_matching")
        .assert()
        .failure()
        .code(predicate::eq(2));
}

#[test]
fn test_non_integer_interval_is_usage_error() {
    let home = TempDir::new().unwrap();
    triage(&home)
        .arg("--daemonize_interval")
        .arg("half-an-hour")
        .assert()
        .failure()
        .code(predicate::eq(2));
}

#[test]
fn test_single_repo_run_completes() {
    let home = TempDir::new().unwrap();
    triage(&home)
        .args(["--repo", "ansible/ansible", "--pr", "123,456", "--dry-run"])
        .assert()
        .success();

    let log = logfile(&home);
    assert!(log.contains("Triage pass planned"));
    assert!(log.contains("ansible/ansible"));
    assert!(!log.contains("ERROR"));
}

#[test]
fn test_invalid_ids_logged_once_and_exit_nonzero() {
    let home = TempDir::new().unwrap();
    triage(&home)
        .args(["--pr", "12,abc"])
        .assert()
        .failure()
        .code(predicate::eq(1));

    let log = logfile(&home);
    let errors = log.lines().filter(|line| line.contains("ERROR")).count();
    assert_eq!(errors, 1, "log was:\n{log}");
    assert!(log.contains("Uncaught exception"));
    assert!(log.contains("invalid_item_id"));
}

#[test]
fn test_dump_actions_writes_plan() {
    let home = TempDir::new().unwrap();
    let dump_dir = home.path().join("actions");
    triage(&home)
        .env("ANSIBULLBOT_ACTIONS__DUMP_DIR", &dump_dir)
        .args(["--dump_actions", "--skip_module_repos", "--sort", "asc"])
        .assert()
        .success();

    let written = std::fs::read_to_string(dump_dir.join("plan.json")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&written).unwrap();
    assert_eq!(json["plan"]["repos"], serde_json::json!(["ansible/ansible"]));
    assert_eq!(json["plan"]["items"]["sort"], "asc");
}

#[test]
fn test_unwritable_logfile_falls_back_to_stderr() {
    let home = TempDir::new().unwrap();
    let mut cmd = cargo_bin_cmd!("triage_ansible");
    cmd.env("XDG_CONFIG_HOME", home.path())
        .env_remove("RUST_LOG")
        .arg("--logfile")
        .arg(home.path().join("missing").join("bot.log"))
        .args(["--repo", "ansible/ansible"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Cannot open log file"));
}

#[test]
fn test_conflicting_flags_warn_and_continue() {
    let home = TempDir::new().unwrap();
    triage(&home)
        .args(["--repo", "ansible/ansible", "--only_prs", "--only_issues"])
        .assert()
        .success();

    assert!(logfile(&home).contains("mutually exclusive"));
}
