//! 翻译客户端配置

use std::time::Duration;

use crate::env::EnvConfig;

/// 翻译配置常量
pub mod constants {
    pub const DEFAULT_API_URL: &str =
        "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash-exp:generateContent";
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
    pub const DEFAULT_TEMPERATURE: f64 = 0.1;
    pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 2048;
    pub const DEFAULT_TARGET_LANGUAGE: &str = "zh-CN";

    /// 支持的目标语言（代码，名称）
    pub const SUPPORTED_LANGUAGES: &[(&str, &str)] = &[
        ("zh-CN", "简体中文"),
        ("zh-TW", "繁体中文"),
        ("en", "英语"),
        ("ja", "日语"),
        ("ko", "韩语"),
        ("fr", "法语"),
        ("de", "德语"),
        ("es", "西班牙语"),
    ];
}

/// 获取语言名称，未知代码原样返回
pub fn language_name(code: &str) -> &str {
    constants::SUPPORTED_LANGUAGES
        .iter()
        .find(|(c, _)| c.eq_ignore_ascii_case(code))
        .map(|(_, name)| *name)
        .unwrap_or(code)
}

/// 翻译客户端配置
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// 后端地址，API Key 以 `key` 查询参数附加
    pub api_url: String,
    /// 单次请求超时
    pub timeout: Duration,
    pub temperature: f64,
    pub max_output_tokens: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: constants::DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(constants::DEFAULT_TIMEOUT_SECS),
            temperature: constants::DEFAULT_TEMPERATURE,
            max_output_tokens: constants::DEFAULT_MAX_OUTPUT_TOKENS,
        }
    }
}

impl ClientConfig {
    /// 由已加载的环境配置构建，其余项使用默认值
    pub fn from_env_config(env: &EnvConfig) -> Self {
        Self {
            api_url: env.api_url.clone(),
            timeout: env.timeout,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_resolve_to_names() {
        assert_eq!(language_name("zh-CN"), "简体中文");
        assert_eq!(language_name("JA"), "日语");
    }

    #[test]
    fn unknown_codes_pass_through() {
        assert_eq!(language_name("pt-BR"), "pt-BR");
    }

    #[test]
    fn defaults_match_backend_contract() {
        let config = ClientConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.max_output_tokens, 2048);
        assert_eq!(config.temperature, 0.1);
    }
}
