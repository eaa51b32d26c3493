//! 翻译模块统一错误处理
//!
//! 提供结构化错误类型和错误处理机制

use std::fmt;

use thiserror::Error;

/// 翻译失败类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// 未配置 API Key
    ConfigMissing,
    /// 传输失败或超时
    Network,
    /// 非 2xx 状态码
    ApiStatus,
    /// 后端返回的结构化错误
    ApiError,
    /// 响应结构不符合预期
    MalformedResponse,
    /// 响应结构正确但译文为空
    EmptyResult,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureKind::ConfigMissing => "config-missing",
            FailureKind::Network => "network",
            FailureKind::ApiStatus => "api-status",
            FailureKind::ApiError => "api-error",
            FailureKind::MalformedResponse => "malformed-response",
            FailureKind::EmptyResult => "empty-result",
        };
        f.write_str(name)
    }
}

/// 翻译错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TranslationError {
    /// 配置错误
    #[error("请先设置API Key！")]
    ConfigMissing,

    /// 网络错误
    #[error("网络错误: {0}")]
    Network(String),

    /// 状态码错误
    #[error("请求失败: {code} {description}")]
    ApiStatus { code: u16, description: String },

    /// 后端错误
    #[error("翻译服务错误: {0}")]
    ApiError(String),

    /// 响应格式错误
    #[error("无效响应 ({0})")]
    MalformedResponse(String),

    /// 空译文
    #[error("译文为空")]
    EmptyResult,
}

impl TranslationError {
    /// 获取错误类别
    pub fn kind(&self) -> FailureKind {
        match self {
            TranslationError::ConfigMissing => FailureKind::ConfigMissing,
            TranslationError::Network(_) => FailureKind::Network,
            TranslationError::ApiStatus { .. } => FailureKind::ApiStatus,
            TranslationError::ApiError(_) => FailureKind::ApiError,
            TranslationError::MalformedResponse(_) => FailureKind::MalformedResponse,
            TranslationError::EmptyResult => FailureKind::EmptyResult,
        }
    }

    /// 检查错误是否可以原地重试
    ///
    /// 缺少配置时重试没有意义，需要先完成设置。
    pub fn is_retryable(&self) -> bool {
        !matches!(self, TranslationError::ConfigMissing)
    }

    /// 获取错误的严重程度
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            TranslationError::ConfigMissing => ErrorSeverity::Info,
            TranslationError::Network(_) => ErrorSeverity::Warning,
            TranslationError::ApiStatus { code, .. } if *code >= 500 => ErrorSeverity::Warning,
            TranslationError::ApiStatus { .. } => ErrorSeverity::Error,
            TranslationError::ApiError(_) => ErrorSeverity::Error,
            TranslationError::MalformedResponse(_) => ErrorSeverity::Error,
            TranslationError::EmptyResult => ErrorSeverity::Warning,
        }
    }

    /// 是否为超时导致的网络错误
    pub fn is_timeout(&self) -> bool {
        matches!(self, TranslationError::Network(msg) if msg == "timeout")
    }
}

/// 错误严重程度
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
}

impl From<reqwest::Error> for TranslationError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            TranslationError::Network("timeout".to_string())
        } else {
            TranslationError::Network(error.to_string())
        }
    }
}

impl From<serde_json::Error> for TranslationError {
    fn from(error: serde_json::Error) -> Self {
        TranslationError::MalformedResponse(error.to_string())
    }
}

/// 错误结果类型别名
pub type TranslationResult<T> = Result<T, TranslationError>;

/// 错误处理助手函数
pub mod helpers {
    use super::*;

    /// 按严重程度记录错误
    pub fn log_error(error: &TranslationError) {
        match error.severity() {
            ErrorSeverity::Info => tracing::info!(kind = %error.kind(), "翻译提示: {}", error),
            ErrorSeverity::Warning => tracing::warn!(kind = %error.kind(), "翻译警告: {}", error),
            ErrorSeverity::Error => tracing::error!(kind = %error.kind(), "翻译错误: {}", error),
        }
    }

    /// 创建网络错误
    pub fn network_error<T: fmt::Display>(msg: T) -> TranslationError {
        TranslationError::Network(msg.to_string())
    }

    /// 创建响应格式错误
    pub fn malformed<T: fmt::Display>(msg: T) -> TranslationError {
        TranslationError::MalformedResponse(msg.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_map_one_to_one() {
        assert_eq!(TranslationError::ConfigMissing.kind(), FailureKind::ConfigMissing);
        assert_eq!(
            TranslationError::ApiStatus {
                code: 403,
                description: "Forbidden".into()
            }
            .kind(),
            FailureKind::ApiStatus
        );
        assert_eq!(TranslationError::EmptyResult.kind(), FailureKind::EmptyResult);
    }

    #[test]
    fn only_missing_config_is_not_retryable() {
        assert!(!TranslationError::ConfigMissing.is_retryable());
        assert!(TranslationError::Network("timeout".into()).is_retryable());
        assert!(TranslationError::EmptyResult.is_retryable());
    }

    #[test]
    fn status_message_carries_code_and_description() {
        let error = TranslationError::ApiStatus {
            code: 429,
            description: "Too Many Requests".into(),
        };
        assert_eq!(error.to_string(), "请求失败: 429 Too Many Requests");
    }

    #[test]
    fn timeout_is_a_network_failure() {
        let error = helpers::network_error("timeout");
        assert!(error.is_timeout());
        assert_eq!(error.kind(), FailureKind::Network);
    }
}
