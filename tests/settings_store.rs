//! 设置存储集成测试

use std::fs;

use chat_overlay::env::EnvConfig;
use chat_overlay::settings::{
    FileSettingsStore, MemorySettingsStore, Settings, SettingsError, SettingsHandle,
    SettingsStore, API_KEY_KEY, TARGET_LANGUAGE_KEY,
};

mod common {
    include!("common/mod.rs");
}

use common::RecordingNotifier;

#[test]
fn test_file_store_round_trips_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("settings.toml");

    let mut store = FileSettingsStore::open(&path).unwrap();
    assert!(store.get(API_KEY_KEY).unwrap().is_none());

    let handle = SettingsHandle::default();
    let notifier = RecordingNotifier::default();
    handle
        .save(&mut store, Settings::new("  abc123  ", "ja"), &notifier)
        .unwrap();

    assert_eq!(handle.snapshot(), Settings::new("abc123", "ja"));
    assert_eq!(notifier.notices(), vec!["设置已保存！"]);

    let reopened = FileSettingsStore::open(&path).unwrap();
    assert_eq!(reopened.get(API_KEY_KEY).unwrap().as_deref(), Some("abc123"));
    assert_eq!(Settings::load(&reopened).unwrap(), Settings::new("abc123", "ja"));
}

#[test]
fn test_invalid_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.toml");
    fs::write(&path, "gemini_api_key = [unterminated").unwrap();

    let error = FileSettingsStore::open(&path).unwrap_err();
    assert!(matches!(error, SettingsError::Parse(_)));
}

#[test]
fn test_blank_language_falls_back_to_default() {
    let mut store = MemorySettingsStore::new();
    store.set(TARGET_LANGUAGE_KEY, "  ").unwrap();

    let settings = Settings::load(&store).unwrap();
    assert_eq!(settings.target_language, "zh-CN");
    assert!(!settings.has_api_key());
}

#[test]
fn test_snapshot_is_detached_from_later_saves() {
    let handle = SettingsHandle::new(Settings::new("old", "en"));
    let before = handle.snapshot();

    let mut store = MemorySettingsStore::new();
    handle
        .save(&mut store, Settings::new("new", "fr"), &RecordingNotifier::default())
        .unwrap();

    assert_eq!(before.api_key, "old");
    assert_eq!(handle.snapshot().api_key, "new");
    assert_eq!(store.get(TARGET_LANGUAGE_KEY).unwrap().as_deref(), Some("fr"));
}

#[test]
fn test_environment_overrides_stored_values() {
    let base = EnvConfig::from_env().unwrap();

    let env = EnvConfig {
        api_key: Some("from-env".into()),
        target_language: Some("ko".into()),
        ..base.clone()
    };
    let settings = Settings::new("stored", "en").with_env_overrides(&env);
    assert_eq!(settings, Settings::new("from-env", "ko"));

    // 未设置的项保留已保存的值
    let env = EnvConfig {
        api_key: None,
        target_language: None,
        ..base
    };
    let settings = Settings::new("stored", "en").with_env_overrides(&env);
    assert_eq!(settings, Settings::new("stored", "en"));
}
