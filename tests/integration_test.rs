// tests/integration_test.rs
use std::fs;
use std::process::Command;
use tempfile::TempDir;

fn release_keeper() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_release-keeper"));
    command
        .env_remove("SLACK_TOKEN")
        .env_remove("CLICKUP_API_KEY")
        .env_remove("GITHUB_EVENT_PATH")
        .env_remove("PROJECT_ICON");
    command
}

#[test]
fn test_release_keeper_help() {
    let output = release_keeper()
        .arg("--help")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("release-keeper"));
    assert!(stdout.contains("release"));
    assert!(stdout.contains("sync-status"));
    assert!(stdout.contains("coverage-badge"));
}

#[test]
fn test_release_keeper_version() {
    let output = release_keeper()
        .arg("--version")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_coverage_badge_command() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("coverage")).unwrap();
    fs::write(
        dir.path().join("coverage/lcov.info"),
        "SF:a.js\nLF:20\nLH:19\nend_of_record\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("README.md"),
        "# app\n![Coverage](https://img.shields.io/badge/coverage-unknown-critical)\n",
    )
    .unwrap();

    let output = release_keeper()
        .arg("coverage-badge")
        .current_dir(dir.path())
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    assert_eq!(
        fs::read_to_string(dir.path().join("README.md")).unwrap(),
        "# app\n![Coverage](https://img.shields.io/badge/coverage-95%25-important)\n"
    );
}

#[test]
fn test_coverage_badge_from_subdirectory_uses_repository_root() {
    let dir = TempDir::new().unwrap();
    git2::Repository::init(dir.path()).unwrap();
    fs::create_dir_all(dir.path().join("coverage")).unwrap();
    fs::create_dir_all(dir.path().join("src/components")).unwrap();
    fs::write(dir.path().join("coverage/lcov.info"), "LF:1000\nLH:995\n").unwrap();
    fs::write(
        dir.path().join("README.md"),
        "![Coverage](https://img.shields.io/badge/coverage-unknown-critical)\n",
    )
    .unwrap();

    let output = release_keeper()
        .arg("coverage-badge")
        .current_dir(dir.path().join("src/components"))
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    assert_eq!(
        fs::read_to_string(dir.path().join("README.md")).unwrap(),
        "![Coverage](https://img.shields.io/badge/coverage-99%25-success)\n"
    );
    assert!(!dir.path().join("src/components/README.md").exists());
}

#[test]
fn test_note_without_token_fails() {
    let dir = TempDir::new().unwrap();

    let output = release_keeper()
        .args(["note", "--icon", "🤖"])
        .current_dir(dir.path())
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("Slack token is missing"));
}

#[test]
fn test_sync_status_without_event_fails() {
    let dir = TempDir::new().unwrap();

    let output = release_keeper()
        .arg("sync-status")
        .current_dir(dir.path())
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("GITHUB_EVENT_PATH"));
}
