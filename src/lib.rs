//! # Chat Overlay Library
//!
//! 为持续变化的聊天文档树按需挂载翻译叠加层：发现新渲染的消息，
//! 提取保留格式的纯文本，并为每条消息驱动一个“点击→请求→展示/出错→
//! 冷却→重试”的状态机。
//!
//! ## 模块组织
//!
//! - `core` - 配置、启动与运行时装配
//! - `discovery` - 消息发现循环
//! - `env` - 环境变量管理
//! - `host` - 宿主文档、变更通知与用户提示
//! - `locator` - 消息根节点、内容节点与按钮锚点的定位
//! - `logging` - 日志初始化
//! - `overlay` - 单条消息的叠加层状态机
//! - `parsers` - HTML 解析、DOM 操作与文本提取
//! - `settings` - 用户设置与持久化
//! - `translation` - 翻译后端客户端

pub mod core;
pub mod discovery;
pub mod env;
pub mod host;
pub mod locator;
pub mod logging;
pub mod overlay;
pub mod parsers;
pub mod settings;
pub mod translation;

// Re-export commonly used items for convenience
pub use self::core::{bootstrap_from_env, start, Bootstrap, OverlayConfig, OverlayError, OverlayRuntime};
pub use discovery::{DiscoveryLoop, ScanReport};
pub use host::{mutation_channel, LiveDocument, MutationRecord, Notifier, TracingNotifier};
pub use locator::MessageLocator;
pub use overlay::{Activation, MessageOverlayController, OverlayState};
pub use parsers::{extract_text, ExtractedText, NodeId, TextExtractor};
pub use settings::{Settings, SettingsHandle, SettingsStore};
pub use translation::{GeminiClient, TranslationError, TranslationOutcome, Translator};
