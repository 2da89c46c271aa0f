// tests/config_test.rs
use semver_git_resource::config::{load_settings, Settings, SETTINGS_ENV};
use serial_test::serial;
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;

fn settings_file(content: &str) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(content.as_bytes()).unwrap();
    temp_file.flush().unwrap();
    temp_file
}

#[test]
fn test_default_settings() {
    let settings = Settings::default();
    assert_eq!(settings.retry.push_attempts, 10);
    assert_eq!(settings.retry.backoff_ms, 250);
    assert_eq!(settings.retry.bump_rounds, 3);
    assert_eq!(settings.git.remote, "origin");
    assert_eq!(settings.git.committer_name, "semver-git-resource");
}

#[test]
fn test_load_from_explicit_path() {
    let file = settings_file(
        r#"
[retry]
push_attempts = 4
backoff_ms = 10

[git]
committer_email = "ci@example.com"
"#,
    );

    let settings = load_settings(Some(file.path())).unwrap();
    assert_eq!(settings.retry.push_attempts, 4);
    assert_eq!(settings.retry.bump_rounds, 3);
    assert_eq!(settings.git.remote, "origin");
    assert_eq!(settings.git.committer_email, "ci@example.com");

    let policy = settings.retry.push_policy();
    assert_eq!(policy.max_attempts, 4);
    assert_eq!(policy.backoff, Duration::from_millis(10));
}

#[test]
fn test_partial_file_keeps_defaults() {
    let file = settings_file("[git]\nremote = \"upstream\"\n");

    let settings = load_settings(Some(file.path())).unwrap();
    assert_eq!(settings.git.remote, "upstream");
    assert_eq!(settings.retry, Settings::default().retry);
}

#[test]
fn test_invalid_toml_is_a_config_error() {
    let file = settings_file("[retry\npush_attempts = ");

    let err = load_settings(Some(file.path())).unwrap_err();
    assert!(err.to_string().contains("cannot parse settings"));
}

#[test]
fn test_missing_explicit_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_settings(Some(&dir.path().join("absent.toml"))).unwrap_err();
    assert!(err.to_string().contains("cannot read settings"));
}

#[test]
#[serial]
fn test_env_var_points_at_settings() {
    let file = settings_file("[retry]\nbump_rounds = 7\n");
    std::env::set_var(SETTINGS_ENV, file.path());

    let settings = load_settings(None);
    std::env::remove_var(SETTINGS_ENV);

    assert_eq!(settings.unwrap().retry.bump_rounds, 7);
}

#[test]
#[serial]
fn test_explicit_path_wins_over_env_var() {
    let from_env = settings_file("[git]\nremote = \"env\"\n");
    let explicit = settings_file("[git]\nremote = \"explicit\"\n");
    std::env::set_var(SETTINGS_ENV, from_env.path());

    let settings = load_settings(Some(explicit.path()));
    std::env::remove_var(SETTINGS_ENV);

    assert_eq!(settings.unwrap().git.remote, "explicit");
}
