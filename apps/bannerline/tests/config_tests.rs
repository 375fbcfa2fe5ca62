//! Tests for loading and validating `bannerline.toml`.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use bannerline::cli::write_config_template;
use bannerline::config::{
    BuildConfig, CONFIG_ENV_VAR, DEFAULT_CONFIG_FILE, find_config_file, resolve_config_file,
};
use std::sync::Mutex;
use bannerline::host::BuildRunner;
use bannerline_core::{BannerlineError, RuleSpec};
use std::path::PathBuf;
use tempfile::TempDir;

// =============================================================================
// PARSING
// =============================================================================

#[test]
fn test_full_config_parses() {
    let text = r#"
context = "web/src"
output = "web/dist"
jobs = 4

[[rules]]
test = ".*"
use = ["banner"]

[[rules]]
test = "\\.svg$"
exclude = "^vendor/"
use = ["banner"]
"#;
    let config = BuildConfig::from_toml_str(text).unwrap();

    assert_eq!(config.context, PathBuf::from("web/src"));
    assert_eq!(config.output, PathBuf::from("web/dist"));
    assert_eq!(config.jobs, Some(4));
    assert_eq!(config.rules.len(), 2);
    assert_eq!(
        config.rules[1],
        RuleSpec::new(r"\.svg$", ["banner"]).excluding("^vendor/")
    );
}

#[test]
fn test_unknown_top_level_key_rejected() {
    let result = BuildConfig::from_toml_str("minify = true\n");
    assert!(matches!(result, Err(BannerlineError::Config(_))));
}

#[test]
fn test_unknown_rule_key_rejected() {
    let text = r#"
[[rules]]
test = ".*"
issuer = "\\.tsx$"
use = ["banner"]
"#;
    let result = BuildConfig::from_toml_str(text);
    assert!(matches!(result, Err(BannerlineError::Config(_))));
}

#[test]
fn test_malformed_toml_rejected() {
    let result = BuildConfig::from_toml_str("context = \n");
    assert!(matches!(result, Err(BannerlineError::Config(_))));
}

// =============================================================================
// VALIDATION
// =============================================================================

#[test]
fn test_zero_jobs_rejected() {
    let result = BuildConfig::from_toml_str("jobs = 0\n");
    match result {
        Err(BannerlineError::Config(message)) => assert!(message.contains("jobs")),
        other => panic!("expected config error, got {other:?}"),
    }
}

#[test]
fn test_empty_rules_rejected() {
    let result = BuildConfig::from_toml_str("rules = []\n");
    assert!(matches!(result, Err(BannerlineError::Config(_))));
}

#[test]
fn test_same_context_and_output_rejected() {
    let result = BuildConfig::from_toml_str("context = \"out\"\noutput = \"out\"\n");
    assert!(matches!(result, Err(BannerlineError::Config(_))));
}

#[test]
fn test_unknown_stage_rejected_when_building_runner() {
    let text = r#"
[[rules]]
test = "\\.svg$"
use = ["@svgr/webpack"]
"#;
    let config = BuildConfig::from_toml_str(text).unwrap();
    let result = BuildRunner::from_config(&config);

    assert!(matches!(
        result,
        Err(BannerlineError::UnknownStage { rule: 0, .. })
    ));
}

#[test]
fn test_invalid_pattern_rejected_when_building_pipeline() {
    let text = r#"
[[rules]]
test = "(unclosed"
use = ["banner"]
"#;
    let config = BuildConfig::from_toml_str(text).unwrap();
    assert!(matches!(
        config.pipeline(),
        Err(BannerlineError::InvalidPattern { rule: 0, .. })
    ));
}

// =============================================================================
// LOADING FROM DISK
// =============================================================================

#[test]
fn test_load_resolves_paths_against_config_dir() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bannerline.toml");
    std::fs::write(&path, "context = \"src\"\noutput = \"dist\"\n").unwrap();

    let config = BuildConfig::load(&path).unwrap();

    assert_eq!(config.context, dir.path().join("src"));
    assert_eq!(config.output, dir.path().join("dist"));
}

#[test]
fn test_load_error_names_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.toml");
    std::fs::write(&path, "jobs = \"many\"\n").unwrap();

    match BuildConfig::load(&path) {
        Err(BannerlineError::Config(message)) => assert!(message.contains("broken.toml")),
        other => panic!("expected config error, got {other:?}"),
    }
}

#[test]
fn test_explicit_missing_config_is_error() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.toml");
    assert!(matches!(
        find_config_file(Some(&missing)),
        Err(BannerlineError::Config(_))
    ));
}

#[test]
fn test_explicit_config_found() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("custom.toml");
    std::fs::write(&path, "").unwrap();

    assert_eq!(find_config_file(Some(&path)).unwrap(), Some(path));
}

#[test]
fn test_env_config_used_when_no_explicit_path() {
    let dir = TempDir::new().unwrap();
    let from_env = dir.path().join("ci.toml");
    std::fs::write(&from_env, "").unwrap();
    std::fs::write(dir.path().join(DEFAULT_CONFIG_FILE), "").unwrap();

    let found = resolve_config_file(None, Some(from_env.clone()), dir.path()).unwrap();
    assert_eq!(found, Some(from_env));
}

#[test]
fn test_explicit_config_wins_over_env() {
    let dir = TempDir::new().unwrap();
    let explicit = dir.path().join("custom.toml");
    std::fs::write(&explicit, "").unwrap();

    let from_env = Some(dir.path().join("missing.toml"));
    let found = resolve_config_file(Some(&explicit), from_env, dir.path()).unwrap();
    assert_eq!(found, Some(explicit));
}

#[test]
fn test_env_config_missing_is_error() {
    let dir = TempDir::new().unwrap();
    let from_env = Some(dir.path().join("gone.toml"));

    match resolve_config_file(None, from_env, dir.path()) {
        Err(BannerlineError::Config(message)) => {
            assert!(message.contains(CONFIG_ENV_VAR));
            assert!(message.contains("gone.toml"));
        }
        other => panic!("expected config error, got {other:?}"),
    }
}

#[test]
fn test_working_directory_config_fallback() {
    let dir = TempDir::new().unwrap();
    let local = dir.path().join(DEFAULT_CONFIG_FILE);
    std::fs::write(&local, "jobs = 3\n").unwrap();

    let found = resolve_config_file(None, None, dir.path()).unwrap();
    assert_eq!(found, Some(local));
}

#[test]
fn test_no_config_anywhere_is_not_an_error() {
    let dir = TempDir::new().unwrap();
    assert_eq!(resolve_config_file(None, None, dir.path()).unwrap(), None);
}

/// Serializes tests that touch `BANNERLINE_CONFIG`.
static ENV_TEST_MUTEX: Mutex<()> = Mutex::new(());

#[test]
fn test_find_config_file_reads_env_var() {
    let _guard = ENV_TEST_MUTEX.lock().unwrap();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("from-env.toml");
    std::fs::write(&path, "").unwrap();

    // SAFETY: Tests touching BANNERLINE_CONFIG run under ENV_TEST_MUTEX.
    unsafe { std::env::set_var(CONFIG_ENV_VAR, &path) };
    let found = find_config_file(None);
    // SAFETY: Tests touching BANNERLINE_CONFIG run under ENV_TEST_MUTEX.
    unsafe { std::env::remove_var(CONFIG_ENV_VAR) };

    assert_eq!(found.unwrap(), Some(path));
}

// =============================================================================
// INIT TEMPLATE
// =============================================================================

#[test]
fn test_template_written_and_loadable() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bannerline.toml");

    write_config_template(&path, false).unwrap();
    let config = BuildConfig::load(&path).unwrap();

    assert_eq!(config.rules, vec![RuleSpec::catch_all()]);
    assert_eq!(config.context, dir.path().join("src"));
}

#[test]
fn test_template_not_overwritten_without_force() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bannerline.toml");
    std::fs::write(&path, "jobs = 2\n").unwrap();

    assert!(matches!(
        write_config_template(&path, false),
        Err(BannerlineError::Config(_))
    ));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "jobs = 2\n");

    write_config_template(&path, true).unwrap();
    assert!(std::fs::read_to_string(&path).unwrap().contains("[[rules]]"));
}
