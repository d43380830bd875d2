//! Unit tests for configuration loading and resolution
//!
//! Note: Uses serial_test crate to prevent ENV variable race conditions.
//! Tests that manipulate TMT_* variables are marked with #[serial]
//! to ensure they run sequentially, not in parallel.

use serial_test::serial;
use std::env;
use std::io::Write;
use tmt_common::config::{
    load_config, read_toml_config, CliOverrides, Settings, TomlConfig, CONFIG_PATH_ENV,
    DEFAULT_MAX_MAPS, DEFAULT_USER_AGENT, DEFAULT_WORKERS, MAX_MAPS_ENV, USER_AGENT_ENV,
};
use tmt_common::Error;

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn clear_env() {
    env::remove_var(USER_AGENT_ENV);
    env::remove_var(MAX_MAPS_ENV);
    env::remove_var(CONFIG_PATH_ENV);
}

// ============================================================================
// Loading
// ============================================================================

#[test]
fn test_full_config_parses() {
    let file = write_config(
        r#"
user_agent = "MyTool/2.0"
max_maps = 25
request_timeout_secs = 10
requests_per_second = 2
leaderboard_length = 50
workers = 8

[logging]
level = "debug"
"#,
    );

    let config = read_toml_config(file.path()).unwrap();
    assert_eq!(config.user_agent.as_deref(), Some("MyTool/2.0"));
    assert_eq!(config.max_maps, Some(25));
    assert_eq!(config.request_timeout_secs, Some(10));
    assert_eq!(config.requests_per_second, Some(2));
    assert_eq!(config.leaderboard_length, Some(50));
    assert_eq!(config.workers, Some(8));
    assert_eq!(config.logging.level, "debug");
}

#[test]
fn test_empty_config_uses_defaults() {
    let file = write_config("");
    let config = read_toml_config(file.path()).unwrap();
    assert!(config.user_agent.is_none());
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_malformed_config_is_error() {
    let file = write_config("max_maps = \"many\"");
    let result = read_toml_config(file.path());
    assert!(matches!(result, Err(Error::Toml(_))));
}

#[test]
fn test_explicit_missing_path_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.toml");
    let result = load_config(Some(missing.as_path()));
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
#[serial]
fn test_env_path_missing_file_uses_defaults() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    env::set_var(CONFIG_PATH_ENV, dir.path().join("absent.toml"));

    let config = load_config(None).unwrap();
    assert!(config.max_maps.is_none());

    clear_env();
}

#[test]
#[serial]
fn test_env_path_is_loaded() {
    clear_env();
    let file = write_config("max_maps = 12");
    env::set_var(CONFIG_PATH_ENV, file.path());

    let config = load_config(None).unwrap();
    assert_eq!(config.max_maps, Some(12));

    clear_env();
}

// ============================================================================
// Resolution
// ============================================================================

#[test]
#[serial]
fn test_defaults_when_nothing_configured() {
    clear_env();

    let settings = Settings::resolve(&CliOverrides::default(), &TomlConfig::default());
    assert_eq!(settings.user_agent, DEFAULT_USER_AGENT);
    assert_eq!(settings.max_maps, DEFAULT_MAX_MAPS);
    assert_eq!(settings.workers, DEFAULT_WORKERS);
    assert_eq!(settings.request_timeout_secs, 30);
    assert_eq!(settings.leaderboard_length, 20);
}

#[test]
#[serial]
fn test_cli_overrides_env_and_toml() {
    clear_env();
    env::set_var(USER_AGENT_ENV, "EnvAgent/1.0");
    env::set_var(MAX_MAPS_ENV, "40");

    let toml_config = TomlConfig {
        user_agent: Some("TomlAgent/1.0".to_string()),
        max_maps: Some(30),
        ..Default::default()
    };
    let cli = CliOverrides {
        user_agent: Some("CliAgent/1.0".to_string()),
        max_maps: Some(50),
        workers: None,
    };

    let settings = Settings::resolve(&cli, &toml_config);
    assert_eq!(settings.user_agent, "CliAgent/1.0");
    assert_eq!(settings.max_maps, 50);

    clear_env();
}

#[test]
#[serial]
fn test_env_overrides_toml() {
    clear_env();
    env::set_var(USER_AGENT_ENV, "EnvAgent/1.0");
    env::set_var(MAX_MAPS_ENV, "40");

    let toml_config = TomlConfig {
        user_agent: Some("TomlAgent/1.0".to_string()),
        max_maps: Some(30),
        ..Default::default()
    };

    let settings = Settings::resolve(&CliOverrides::default(), &toml_config);
    assert_eq!(settings.user_agent, "EnvAgent/1.0");
    assert_eq!(settings.max_maps, 40);

    clear_env();
}

#[test]
#[serial]
fn test_unparseable_env_falls_through_to_toml() {
    clear_env();
    env::set_var(MAX_MAPS_ENV, "lots");

    let toml_config = TomlConfig {
        max_maps: Some(30),
        ..Default::default()
    };

    let settings = Settings::resolve(&CliOverrides::default(), &toml_config);
    assert_eq!(settings.max_maps, 30);

    clear_env();
}

#[test]
#[serial]
fn test_blank_user_agent_replaced_by_default() {
    clear_env();

    let cli = CliOverrides {
        user_agent: Some("   ".to_string()),
        ..Default::default()
    };

    let settings = Settings::resolve(&cli, &TomlConfig::default());
    assert_eq!(settings.user_agent, DEFAULT_USER_AGENT);
}

#[test]
#[serial]
fn test_zero_max_maps_uses_default() {
    clear_env();
    env::set_var(MAX_MAPS_ENV, "0");

    let settings = Settings::resolve(&CliOverrides::default(), &TomlConfig::default());
    assert_eq!(settings.max_maps, DEFAULT_MAX_MAPS);

    let cli = CliOverrides {
        max_maps: Some(0),
        ..Default::default()
    };
    let settings = Settings::resolve(&cli, &TomlConfig::default());
    assert_eq!(settings.max_maps, DEFAULT_MAX_MAPS);

    clear_env();
}
