use hostpulse::core::system_monitor::AlertConfiguration;
use hostpulse::{MonitorError, Settings};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_settings_roundtrip() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nested").join("settings.json");

    let settings = Settings {
        refresh_interval_ms: 500,
        history_size: 120,
        thresholds: AlertConfiguration {
            cpu_threshold_percent: 70.0,
            memory_threshold_duration_secs: 30,
            cooldown_secs: 60,
            ..Default::default()
        },
    };

    settings.save_to(&path).unwrap();
    assert!(path.exists());

    let loaded = Settings::load_from(&path).unwrap();
    assert_eq!(loaded, settings);
}

#[test]
fn test_load_from_missing_file_fails() {
    let temp_dir = TempDir::new().unwrap();
    let result = Settings::load_from(&temp_dir.path().join("absent.json"));
    assert!(result.is_err());
}

#[test]
fn test_load_from_corrupted_file_fails() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("settings.json");
    fs::write(&path, "{ not json").unwrap();

    assert!(Settings::load_from(&path).is_err());
}

#[test]
fn test_load_from_empty_file_returns_default() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("settings.json");
    fs::write(&path, "").unwrap();

    assert_eq!(Settings::load_from(&path).unwrap(), Settings::default());
}

#[test]
fn test_load_never_fails() {
    // Falls back to defaults whatever the state of the user's config dir
    let _settings = Settings::load();
}

#[test]
fn test_validation_errors() {
    let settings = Settings {
        refresh_interval_ms: 0,
        ..Default::default()
    };

    match settings.validate() {
        Err(MonitorError::InvalidConfiguration(message)) => {
            assert!(message.contains("interval"));
        }
        other => panic!("unexpected result: {:?}", other),
    }
}
