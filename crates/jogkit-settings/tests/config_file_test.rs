use jogkit_settings::{Config, ConfigError, Parity, SettingsError};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_round_trip_toml() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let mut config = Config::default();
    config.connection.port = "/dev/ttyACM0".to_string();
    config.machine.work_area_x = 400;
    config.save_to_file(&path).unwrap();

    let loaded = Config::load_from_file(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_round_trip_json() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");

    let mut config = Config::default();
    config.connection.parity = Parity::Even;
    config.logging.file = Some(dir.path().join("jogkit.log"));
    config.save_to_file(&path).unwrap();

    let loaded = Config::load_from_file(&path).unwrap();
    assert_eq!(loaded.connection.parity, Parity::Even);
    assert_eq!(loaded.logging.file, config.logging.file);
}

#[test]
fn test_partial_file_uses_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
[connection]
port = "COM9"

[machine]
jog_speed = 5000
"#,
    )
    .unwrap();

    let config = Config::load_from_file(&path).unwrap();
    assert_eq!(config.connection.port, "COM9");
    assert_eq!(config.connection.baud_rate, 115200);
    assert_eq!(config.machine.jog_speed, 5000);
    assert_eq!(config.machine.rapid_speed, 20000);
    assert_eq!(config.timing.poll_interval_ms, 500);
}

#[test]
fn test_invalid_values_are_rejected_on_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, r#"{ "timing": { "write_retries": 0 } }"#).unwrap();

    let err = Config::load_from_file(&path).unwrap_err();
    assert!(matches!(
        err,
        SettingsError::Config(ConfigError::ValueOutOfRange { .. })
    ));
}

#[test]
fn test_unsupported_extension() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.yaml");
    fs::write(&path, "connection: {}").unwrap();

    let err = Config::load_from_file(&path).unwrap_err();
    assert!(matches!(
        err,
        SettingsError::Config(ConfigError::UnsupportedFormat(_))
    ));
}

#[test]
fn test_missing_file_falls_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    let config = Config::load_or_default(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(config, Config::default());
}
