//! Configuration loading and validation.

use tasksync::config::Config;

#[test]
fn defaults_validate() {
    let config = Config::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.sync.auto_sync_interval_minutes, 15);
    assert!(!config.logging.enabled);
}

#[test]
fn partial_file_fills_in_defaults() {
    let config: Config = toml::from_str(
        r#"
        [server]
        base_url = "https://tasks.example.com/api"

        [logging]
        enabled = true
        "#,
    )
    .unwrap();

    assert_eq!(config.server.base_url, "https://tasks.example.com/api");
    assert!(config.logging.enabled);
    assert_eq!(config.logging.level, "info");
    assert_eq!(config.sync.auto_sync_interval_minutes, 15);
}

#[test]
fn bad_base_url_is_rejected() {
    let mut config = Config::default();
    config.server.base_url = "tasks.example.com".to_string();
    assert!(config.validate().is_err());

    config.server.base_url = String::new();
    assert!(config.validate().is_err());
}

#[test]
fn excessive_sync_interval_is_rejected() {
    let mut config = Config::default();
    config.sync.auto_sync_interval_minutes = 1441;
    assert!(config.validate().is_err());
}

#[test]
fn unknown_log_level_is_rejected() {
    let mut config = Config::default();
    config.logging.level = "loud".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn generated_file_loads_back() {
    let dir = std::env::temp_dir().join(format!("tasksync-config-{}", std::process::id()));
    let path = dir.join("config.toml");

    Config::generate_default_config(&path).unwrap();
    let loaded = Config::load_from_file(&path).unwrap();
    assert_eq!(loaded.server.base_url, Config::default().server.base_url);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn api_token_resolves_from_environment() {
    let mut config = Config::default();
    config.server.api_token_env = Some("TASKSYNC_TEST_TOKEN".to_string());
    assert_eq!(config.api_token(), None);

    std::env::set_var("TASKSYNC_TEST_TOKEN", "secret");
    assert_eq!(config.api_token().as_deref(), Some("secret"));
    std::env::remove_var("TASKSYNC_TEST_TOKEN");
}
