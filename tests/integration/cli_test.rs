use hostpulse::commands::{build_cli, monitor::resolve_settings};
use hostpulse::Settings;
use tempfile::TempDir;

#[test]
fn test_cli_parses_flags() {
    let matches = build_cli()
        .try_get_matches_from(["hostpulse", "--interval", "250", "--history", "30", "--json"])
        .unwrap();

    assert_eq!(matches.get_one::<u64>("interval"), Some(&250));
    assert_eq!(matches.get_one::<usize>("history"), Some(&30));
    assert!(matches.get_flag("json"));
}

#[test]
fn test_cli_rejects_non_numeric_interval() {
    let result = build_cli().try_get_matches_from(["hostpulse", "--interval", "fast"]);
    assert!(result.is_err());
}

#[test]
fn test_flags_override_settings_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("settings.json");
    Settings {
        refresh_interval_ms: 2000,
        history_size: 10,
        ..Default::default()
    }
    .save_to(&path)
    .unwrap();

    let matches = build_cli()
        .try_get_matches_from([
            "hostpulse",
            "--config",
            path.to_str().unwrap(),
            "--interval",
            "100",
        ])
        .unwrap();

    let settings = resolve_settings(&matches).unwrap();
    assert_eq!(settings.refresh_interval_ms, 100);
    assert_eq!(settings.history_size, 10);
}

#[test]
fn test_zero_history_flag_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("settings.json");
    Settings::default().save_to(&path).unwrap();

    let matches = build_cli()
        .try_get_matches_from(["hostpulse", "--config", path.to_str().unwrap(), "--history", "0"])
        .unwrap();

    assert!(resolve_settings(&matches).is_err());
}
