//! 统一的环境变量管理系统
//!
//! 提供类型安全、可验证的环境变量访问。所有变量都有默认值，
//! API Key 除外。

use std::env;
use std::fmt;
use std::time::Duration;

/// 环境变量解析错误
#[derive(Debug, Clone)]
pub struct EnvError {
    pub variable: String,
    pub message: String,
}

impl fmt::Display for EnvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Environment variable '{}': {}", self.variable, self.message)
    }
}

impl std::error::Error for EnvError {}

pub type EnvResult<T> = Result<T, EnvError>;

/// 环境变量访问器特性
pub trait EnvVar<T> {
    const NAME: &'static str;
    const DEFAULT: Option<T>;
    const DESCRIPTION: &'static str;

    fn parse(value: &str) -> EnvResult<T>;

    fn get() -> EnvResult<T> {
        match env::var(Self::NAME) {
            Ok(value) => Self::parse(&value),
            Err(_) => Self::DEFAULT.ok_or_else(|| EnvError {
                variable: Self::NAME.to_string(),
                message: "Required environment variable not set".to_string(),
            }),
        }
    }
}

/// 加载 `.env` 文件（如果存在）
pub fn load_dotenv() {
    if let Ok(path) = dotenv::dotenv() {
        tracing::info!("已加载环境变量文件: {}", path.display());
    }
}

/// 核心环境变量定义
pub mod core {
    use super::*;

    /// 日志级别
    pub struct LogLevel;
    impl EnvVar<String> for LogLevel {
        const NAME: &'static str = "CHAT_TRANSLATOR_LOG_LEVEL";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Log level: trace, debug, info, warn, error";

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("info".to_string()),
            }
        }

        fn parse(value: &str) -> EnvResult<String> {
            match value.to_lowercase().as_str() {
                "trace" | "debug" | "info" | "warn" | "error" => Ok(value.to_lowercase()),
                _ => Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: format!(
                        "Invalid log level '{}'. Use: trace, debug, info, warn, error",
                        value
                    ),
                }),
            }
        }
    }
}

/// 翻译相关环境变量
pub mod translation {
    use super::*;
    use crate::translation::config::constants;

    /// API Key
    pub struct ApiKey;
    impl EnvVar<String> for ApiKey {
        const NAME: &'static str = "CHAT_TRANSLATOR_API_KEY";
        const DEFAULT: Option<String> = None; // 无默认值
        const DESCRIPTION: &'static str = "Gemini API key used for translation requests";

        fn parse(value: &str) -> EnvResult<String> {
            let key = value.trim();
            if key.is_empty() {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "API key cannot be empty".to_string(),
                });
            }
            Ok(key.to_string())
        }
    }

    /// 目标语言
    pub struct TargetLang;
    impl EnvVar<String> for TargetLang {
        const NAME: &'static str = "CHAT_TRANSLATOR_TARGET_LANG";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Target language code overriding the stored setting, e.g. zh-CN, en, ja";

        fn parse(value: &str) -> EnvResult<String> {
            let lang = value.trim();
            let valid = (2..=8).contains(&lang.len())
                && lang.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
            if !valid {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: format!("Invalid language code '{}'", value),
                });
            }
            Ok(lang.to_string())
        }
    }

    /// API URL
    pub struct ApiUrl;
    impl EnvVar<String> for ApiUrl {
        const NAME: &'static str = "CHAT_TRANSLATOR_API_URL";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Translation API endpoint URL";

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok(constants::DEFAULT_API_URL.to_string()),
            }
        }

        fn parse(value: &str) -> EnvResult<String> {
            let url = value.trim();
            if url.starts_with("http://") || url.starts_with("https://") {
                Ok(url.to_string())
            } else {
                Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "API URL must start with http:// or https://".to_string(),
                })
            }
        }
    }

    /// 请求超时
    pub struct Timeout;
    impl EnvVar<Duration> for Timeout {
        const NAME: &'static str = "CHAT_TRANSLATOR_TIMEOUT";
        const DEFAULT: Option<Duration> = Some(Duration::from_secs(constants::DEFAULT_TIMEOUT_SECS));
        const DESCRIPTION: &'static str = "Translation request timeout in seconds";

        fn parse(value: &str) -> EnvResult<Duration> {
            parse_duration_secs(value, Self::NAME, 1, 300)
        }
    }
}

/// 叠加层时序相关环境变量
pub mod overlay {
    use super::*;

    /// 翻译成功后的冷却时间
    pub struct CoolDownMs;
    impl EnvVar<Duration> for CoolDownMs {
        const NAME: &'static str = "CHAT_TRANSLATOR_COOL_DOWN_MS";
        const DEFAULT: Option<Duration> = Some(Duration::from_millis(3000));
        const DESCRIPTION: &'static str = "Cool-down after a successful translation in milliseconds";

        fn parse(value: &str) -> EnvResult<Duration> {
            parse_duration_millis(value, Self::NAME, 0, 60_000)
        }
    }

    /// 变更通知去抖延迟
    pub struct DebounceMs;
    impl EnvVar<Duration> for DebounceMs {
        const NAME: &'static str = "CHAT_TRANSLATOR_DEBOUNCE_MS";
        const DEFAULT: Option<Duration> = Some(Duration::from_millis(100));
        const DESCRIPTION: &'static str = "Debounce delay after mutation notifications in milliseconds";

        fn parse(value: &str) -> EnvResult<Duration> {
            parse_duration_millis(value, Self::NAME, 0, 5_000)
        }
    }

    /// 兜底扫描周期
    pub struct FallbackSecs;
    impl EnvVar<Duration> for FallbackSecs {
        const NAME: &'static str = "CHAT_TRANSLATOR_FALLBACK_SECS";
        const DEFAULT: Option<Duration> = Some(Duration::from_secs(10));
        const DESCRIPTION: &'static str = "Period of the fallback discovery scan in seconds";

        fn parse(value: &str) -> EnvResult<Duration> {
            parse_duration_secs(value, Self::NAME, 1, 3600)
        }
    }

    /// 就绪后到首次扫描的等待时间
    pub struct SettleMs;
    impl EnvVar<Duration> for SettleMs {
        const NAME: &'static str = "CHAT_TRANSLATOR_SETTLE_MS";
        const DEFAULT: Option<Duration> = Some(Duration::from_millis(2000));
        const DESCRIPTION: &'static str = "Delay between host readiness and the initial scan in milliseconds";

        fn parse(value: &str) -> EnvResult<Duration> {
            parse_duration_millis(value, Self::NAME, 0, 60_000)
        }
    }
}

/// 辅助函数
fn parse_number(value: &str, var_name: &str) -> EnvResult<u64> {
    value.trim().parse().map_err(|_| EnvError {
        variable: var_name.to_string(),
        message: "Must be a valid positive number".to_string(),
    })
}

fn check_range(num: u64, var_name: &str, min: u64, max: u64) -> EnvResult<u64> {
    if num < min {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Value {} is below minimum {}", num, min),
        });
    }

    if num > max {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Value {} exceeds maximum {}", num, max),
        });
    }

    Ok(num)
}

fn parse_duration_secs(value: &str, var_name: &str, min: u64, max: u64) -> EnvResult<Duration> {
    let secs = check_range(parse_number(value, var_name)?, var_name, min, max)?;
    Ok(Duration::from_secs(secs))
}

fn parse_duration_millis(value: &str, var_name: &str, min: u64, max: u64) -> EnvResult<Duration> {
    let millis = check_range(parse_number(value, var_name)?, var_name, min, max)?;
    Ok(Duration::from_millis(millis))
}

/// 读取可选变量：未设置时为 `None`，设置了但无效时报错
fn optional<T, V: EnvVar<T>>() -> EnvResult<Option<T>> {
    match env::var(V::NAME) {
        Ok(value) => V::parse(&value).map(Some),
        Err(_) => Ok(None),
    }
}

/// 环境变量配置汇总
#[derive(Debug, Clone)]
pub struct EnvConfig {
    pub log_level: String,

    pub api_key: Option<String>,
    /// 仅在设置了环境变量时存在，用于覆盖已保存的目标语言
    pub target_language: Option<String>,
    pub api_url: String,
    pub timeout: Duration,

    pub cool_down: Duration,
    pub debounce: Duration,
    pub fallback_period: Duration,
    pub settle_delay: Duration,
}

impl EnvConfig {
    /// 从环境变量加载配置
    pub fn from_env() -> EnvResult<Self> {
        Ok(Self {
            log_level: core::LogLevel::get()?,

            api_key: translation::ApiKey::get().ok(),
            target_language: optional::<String, translation::TargetLang>()?,
            api_url: translation::ApiUrl::get()?,
            timeout: translation::Timeout::get()?,

            cool_down: overlay::CoolDownMs::get()?,
            debounce: overlay::DebounceMs::get()?,
            fallback_period: overlay::FallbackSecs::get()?,
            settle_delay: overlay::SettleMs::get()?,
        })
    }

    /// 记录配置摘要（隐藏敏感信息）
    pub fn log_summary(&self) {
        tracing::info!(
            log_level = %self.log_level,
            target_language = self.target_language.as_deref().unwrap_or("[stored]"),
            api_url = %self.api_url,
            timeout_secs = self.timeout.as_secs(),
            api_key = if self.api_key.is_some() { "[configured]" } else { "[missing]" },
            "环境配置已加载"
        );
    }
}

/// 环境变量文档生成器
pub fn generate_env_docs() -> String {
    fn entry<T: fmt::Debug, V: EnvVar<T>>() -> String {
        format!("- `{}`: {} (default: {:?})\n", V::NAME, V::DESCRIPTION, V::DEFAULT)
    }

    let mut docs = String::new();
    docs.push_str("# Environment Variables Documentation\n\n");

    docs.push_str("## Core Configuration\n\n");
    docs.push_str(&entry::<String, core::LogLevel>());

    docs.push_str("\n## Translation Configuration\n\n");
    docs.push_str(&entry::<String, translation::ApiKey>());
    docs.push_str(&entry::<String, translation::TargetLang>());
    docs.push_str(&entry::<String, translation::ApiUrl>());
    docs.push_str(&entry::<Duration, translation::Timeout>());

    docs.push_str("\n## Overlay Timing\n\n");
    docs.push_str(&entry::<Duration, overlay::CoolDownMs>());
    docs.push_str(&entry::<Duration, overlay::DebounceMs>());
    docs.push_str(&entry::<Duration, overlay::FallbackSecs>());
    docs.push_str(&entry::<Duration, overlay::SettleMs>());

    docs
}
