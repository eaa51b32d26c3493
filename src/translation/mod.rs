//! 翻译模块
//!
//! 对单条消息文本发起一次翻译请求，并把结果归入有限的几种失败类别：
//! - **client**: 翻译后端抽象与 Gemini 客户端
//! - **config**: 客户端配置与语言列表
//! - **error**: 错误处理
//!
//! # 基本用法
//!
//! ```rust,no_run
//! use chat_overlay::translation::{ClientConfig, GeminiClient, Translator};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = GeminiClient::new(ClientConfig::default())?;
//! let translated = client.translate("Hello", "zh-CN", "my-api-key").await?;
//! println!("{}", translated);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;

pub use client::{
    build_prompt, build_request_body, classify_response, GeminiClient, TranslationOutcome,
    Translator,
};
pub use config::{constants, language_name, ClientConfig};
pub use error::{ErrorSeverity, FailureKind, TranslationError, TranslationResult};
