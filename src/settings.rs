//! 用户设置
//!
//! 设置只有两项：API Key 与目标语言。存储层是不透明的字符串键值对，
//! 控制器在每次翻译时通过 [`SettingsHandle::snapshot`] 读取一次，
//! 不存在模块级的全局状态。

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::env::EnvConfig;
use crate::host::Notifier;
use crate::translation::config::constants;

/// API Key 的存储键
pub const API_KEY_KEY: &str = "gemini_api_key";
/// 目标语言的存储键
pub const TARGET_LANGUAGE_KEY: &str = "target_language";

/// 保存成功后的提示
pub const SAVED_NOTICE: &str = "设置已保存！";

/// 设置错误
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("设置文件读写失败: {0}")]
    Io(#[from] std::io::Error),

    #[error("设置文件格式错误: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("设置序列化失败: {0}")]
    Serialize(#[from] toml::ser::Error),
}

pub type SettingsResult<T> = Result<T, SettingsError>;

fn default_target_language() -> String {
    constants::DEFAULT_TARGET_LANGUAGE.to_string()
}

/// 用户设置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_target_language")]
    pub target_language: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            target_language: default_target_language(),
        }
    }
}

impl Settings {
    pub fn new(api_key: impl Into<String>, target_language: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            target_language: target_language.into(),
        }
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    /// 从存储读取，缺失的键使用默认值
    pub fn load(store: &dyn SettingsStore) -> SettingsResult<Self> {
        let mut settings = Settings::default();
        if let Some(key) = store.get(API_KEY_KEY)? {
            settings.api_key = key;
        }
        if let Some(lang) = store.get(TARGET_LANGUAGE_KEY)?.filter(|l| !l.trim().is_empty()) {
            settings.target_language = lang;
        }
        Ok(settings)
    }

    /// 用已加载的环境配置覆盖对应项
    pub fn with_env_overrides(mut self, env: &EnvConfig) -> Self {
        if let Some(key) = &env.api_key {
            self.api_key = key.clone();
        }
        if let Some(lang) = &env.target_language {
            self.target_language = lang.clone();
        }
        self
    }
}

/// 键值设置存储
pub trait SettingsStore {
    fn get(&self, key: &str) -> SettingsResult<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> SettingsResult<()>;
}

/// 内存存储
#[derive(Debug, Clone, Default)]
pub struct MemorySettingsStore {
    values: HashMap<String, String>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemorySettingsStore {
    fn get(&self, key: &str) -> SettingsResult<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> SettingsResult<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// TOML 文件存储
///
/// 文件内容是一张扁平的字符串表，每次写入都整体落盘。
#[derive(Debug, Clone)]
pub struct FileSettingsStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FileSettingsStore {
    /// 打开设置文件；文件不存在时视为空表
    pub fn open(path: impl AsRef<Path>) -> SettingsResult<Self> {
        let path = path.as_ref().to_path_buf();
        let values: BTreeMap<String, String> = if path.exists() {
            let content = fs::read_to_string(&path)?;
            toml::from_str(&content)?
        } else {
            BTreeMap::new()
        };

        tracing::debug!(path = %path.display(), entries = values.len(), "已打开设置文件");
        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> SettingsResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, toml::to_string(&self.values)?)?;
        Ok(())
    }
}

impl SettingsStore for FileSettingsStore {
    fn get(&self, key: &str) -> SettingsResult<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> SettingsResult<()> {
        self.values.insert(key.to_string(), value.to_string());
        self.persist()
    }
}

/// 注入给控制器的设置访问器
#[derive(Debug, Clone, Default)]
pub struct SettingsHandle {
    current: Rc<RefCell<Settings>>,
}

impl SettingsHandle {
    pub fn new(settings: Settings) -> Self {
        Self {
            current: Rc::new(RefCell::new(settings)),
        }
    }

    /// 当前设置的副本
    pub fn snapshot(&self) -> Settings {
        self.current.borrow().clone()
    }

    pub fn replace(&self, settings: Settings) {
        *self.current.borrow_mut() = settings;
    }

    /// 写入存储并替换当前设置，成功后提示用户
    pub fn save(
        &self,
        store: &mut dyn SettingsStore,
        settings: Settings,
        notifier: &dyn Notifier,
    ) -> SettingsResult<()> {
        store.set(API_KEY_KEY, settings.api_key.trim())?;
        store.set(TARGET_LANGUAGE_KEY, &settings.target_language)?;

        self.replace(Settings {
            api_key: settings.api_key.trim().to_string(),
            ..settings
        });
        notifier.notify(SAVED_NOTICE);
        tracing::info!(target_language = %self.current.borrow().target_language, "设置已更新");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_have_no_key_and_chinese_target() {
        let settings = Settings::default();
        assert!(!settings.has_api_key());
        assert_eq!(settings.target_language, "zh-CN");
    }

    #[test]
    fn load_fills_missing_keys_with_defaults() {
        let mut store = MemorySettingsStore::new();
        store.set(API_KEY_KEY, "secret").unwrap();

        let settings = Settings::load(&store).unwrap();
        assert_eq!(settings, Settings::new("secret", "zh-CN"));
    }

    #[test]
    fn whitespace_key_counts_as_missing() {
        assert!(!Settings::new("   ", "en").has_api_key());
    }

    #[test]
    fn handle_shares_updates_between_clones() {
        let handle = SettingsHandle::default();
        let other = handle.clone();
        other.replace(Settings::new("k", "ja"));
        assert_eq!(handle.snapshot().target_language, "ja");
    }
}
