//! 翻译客户端
//!
//! 每次调用只发出一个请求：不缓存、不分批、不限速，也不在内部重试。
//! 重试由用户在消息叠加层上手动触发。

use std::future::Future;

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Value};
use url::Url;

use super::config::{language_name, ClientConfig};
use super::error::{helpers, TranslationError, TranslationResult};

/// 翻译结果：成功时为去除首尾空白的译文
pub type TranslationOutcome = TranslationResult<String>;

/// 翻译后端抽象
///
/// 叠加层控制器与发现循环对它泛型，测试中可以替换为脚本化的实现。
pub trait Translator {
    fn translate(
        &self,
        text: &str,
        target_language: &str,
        api_key: &str,
    ) -> impl Future<Output = TranslationOutcome>;
}

/// 构造翻译提示词
pub fn build_prompt(text: &str, target_language: &str) -> String {
    format!(
        "请将以下文本翻译成{}，保留原文的换行和段落结构，只返回翻译结果，不要添加任何解释或格式：\n\n{}",
        language_name(target_language),
        text
    )
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Option<Vec<Candidate>>,
    #[serde(default)]
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// 构造请求体
pub fn build_request_body(text: &str, target_language: &str, config: &ClientConfig) -> Value {
    json!({
        "contents": [{
            "parts": [{ "text": build_prompt(text, target_language) }]
        }],
        "generationConfig": {
            "temperature": config.temperature,
            "maxOutputTokens": config.max_output_tokens,
        }
    })
}

/// 根据状态码与响应体对结果分类
pub fn classify_response(status: u16, body: &str) -> TranslationOutcome {
    let parsed: Result<GenerateResponse, _> = serde_json::from_str(body);

    if !(200..300).contains(&status) {
        let reason = StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("Unknown Status");
        let detail = parsed
            .ok()
            .and_then(|r| r.error)
            .and_then(|e| e.message)
            .filter(|m| !m.trim().is_empty());

        return Err(TranslationError::ApiStatus {
            code: status,
            description: match detail {
                Some(message) => format!("{}: {}", reason, message.trim()),
                None => reason.to_string(),
            },
        });
    }

    let response = parsed?;

    if let Some(error) = response.error {
        return Err(TranslationError::ApiError(
            error.message.unwrap_or_else(|| "未知错误".to_string()),
        ));
    }

    let text = response
        .candidates
        .as_ref()
        .and_then(|candidates| candidates.first())
        .and_then(|candidate| candidate.content.as_ref())
        .and_then(|content| content.parts.first())
        .and_then(|part| part.text.as_deref())
        .ok_or_else(|| helpers::malformed("缺少 candidates[0].content.parts[0].text"))?;

    let translated = text.trim();
    if translated.is_empty() {
        return Err(TranslationError::EmptyResult);
    }

    Ok(translated.to_string())
}

/// 基于 Gemini generateContent 接口的翻译客户端
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl GeminiClient {
    pub fn new(config: ClientConfig) -> TranslationResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// 附加 `key` 查询参数后的请求地址
    pub fn request_url(&self, api_key: &str) -> TranslationResult<Url> {
        Url::parse_with_params(&self.config.api_url, &[("key", api_key)])
            .map_err(|e| helpers::network_error(format!("无效的接口地址 {}: {}", self.config.api_url, e)))
    }

    async fn send(&self, text: &str, target_language: &str, api_key: &str) -> TranslationOutcome {
        if api_key.trim().is_empty() {
            return Err(TranslationError::ConfigMissing);
        }

        let url = self.request_url(api_key.trim())?;
        let body = build_request_body(text, target_language, &self.config);

        tracing::debug!(
            chars = text.chars().count(),
            target = target_language,
            "发送翻译请求"
        );

        let response = self.http.post(url).json(&body).send().await?;
        let status = response.status().as_u16();
        let payload = response.text().await?;

        classify_response(status, &payload)
    }
}

impl Translator for GeminiClient {
    fn translate(
        &self,
        text: &str,
        target_language: &str,
        api_key: &str,
    ) -> impl Future<Output = TranslationOutcome> {
        self.send(text, target_language, api_key)
    }
}
