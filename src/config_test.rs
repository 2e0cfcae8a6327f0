use super::*;

#[test]
fn defaults_match_documented_timings() {
    let config = PageConfig::default();
    assert_eq!(config.autoplay_ms, 5_000);
    assert_eq!(config.autoplay_grace_ms, 2_000);
    assert_eq!(config.announcement_ms, 1_000);
    assert_eq!(config.toast_exit_ms, 300);
    assert_eq!(config.progress_ms, 500);
    assert_eq!(config.resize_debounce_ms, 250);
    assert_eq!(config.scroll_throttle_ms, 100);
    assert_eq!(config.theme_overlay_ms, 300);
    assert_eq!(config.animation_stagger_ms, 100);
}

#[test]
fn partial_json_keeps_other_defaults() {
    let config = PageConfig::from_json(r#"{ "autoplayMs": 8000, "themeStorageKey": "site-theme" }"#);
    assert_eq!(config.autoplay_ms, 8_000);
    assert_eq!(config.theme_storage_key, "site-theme");
    assert_eq!(config.toast_ms, 3_000);
}

#[test]
fn malformed_json_falls_back_to_defaults() {
    assert_eq!(PageConfig::from_json("{ not json"), PageConfig::default());
    assert_eq!(PageConfig::from_json("   "), PageConfig::default());
}

#[test]
fn log_level_parses_known_names() {
    let mut config = PageConfig::default();
    config.log_level = "DEBUG".to_owned();
    assert_eq!(config.log_level(), log::Level::Debug);
    config.log_level = "warning".to_owned();
    assert_eq!(config.log_level(), log::Level::Warn);
    config.log_level = "loud".to_owned();
    assert_eq!(config.log_level(), log::Level::Info);
}
