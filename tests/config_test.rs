use storeviz::config::{AppConfig, ColorParser, ConfigManager, Theme};
use tempfile::TempDir;

#[test]
fn test_missing_config_file_gives_defaults() {
    let temp = TempDir::new().unwrap();
    let manager = ConfigManager::with_dir(temp.path().to_path_buf());
    let config = manager.load().unwrap();
    assert_eq!(config.chart.row_limit, None);
    assert!(!config.loading.try_parse_dates);
}

#[test]
fn test_user_values_override_defaults() {
    let temp = TempDir::new().unwrap();
    let manager = ConfigManager::with_dir(temp.path().to_path_buf());
    std::fs::write(
        manager.config_path("config.toml"),
        r#"
[chart]
row_limit = 500

[loading]
try_parse_dates = true

[theme.colors]
selector_focused = "magenta"
"#,
    )
    .unwrap();

    let config = manager.load().unwrap();
    assert_eq!(config.chart.row_limit, Some(500));
    assert!(config.loading.try_parse_dates);
    assert_eq!(config.theme.colors.selector_focused, "magenta");
    // untouched sections keep their defaults
    assert_eq!(config.display.table_cell_padding, 2);
    assert_eq!(config.theme.colors.primary, "cyan");
}

#[test]
fn test_invalid_values_are_rejected() {
    let temp = TempDir::new().unwrap();
    let manager = ConfigManager::with_dir(temp.path().to_path_buf());

    std::fs::write(manager.config_path("config.toml"), "[chart]\nrow_limit = 0\n").unwrap();
    assert!(manager.load().is_err());

    // NO_COLOR turns every color into the terminal default, valid or not
    if std::env::var("NO_COLOR").is_err() {
        std::fs::write(
            manager.config_path("config.toml"),
            "[theme.colors]\nprimary = \"not-a-color\"\n",
        )
        .unwrap();
        let err = manager.load().unwrap_err();
        assert!(err.to_string().contains("primary"));
    }
}

#[test]
fn test_generated_config_parses_and_is_not_overwritten() {
    let temp = TempDir::new().unwrap();
    let manager = ConfigManager::with_dir(temp.path().join("storeviz"));

    let path = manager.write_default_config(false).unwrap();
    assert!(path.exists());
    assert!(manager.write_default_config(false).is_err());
    assert!(manager.write_default_config(true).is_ok());

    let parsed: AppConfig = toml::from_str(&manager.generate_default_config()).unwrap();
    assert_eq!(parsed.version, "0.1");
    assert!(manager.load().is_ok());
}

#[test]
fn test_default_theme_parses() {
    let theme = Theme::from_config(&AppConfig::default().theme).unwrap();
    let parser = ColorParser::new();
    assert_eq!(
        theme.get("selector_focused"),
        parser.parse("yellow").unwrap()
    );
    assert_eq!(theme.series_color(0), theme.series_color(7));
}
