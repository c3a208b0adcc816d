// Failure taxonomy for the question pipeline.

use axum::http::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QuizError {
    /// The caller's request body was malformed or out of range.
    #[error("请求参数无效: {0}")]
    InvalidRequest(String),

    #[error("题目生成服务未配置: 缺少 GEMINI_API_KEY")]
    NotConfigured,

    /// Non-success HTTP status from the generation API.
    #[error("Gemini API 调用失败: {0}")]
    UpstreamStatus(u16),

    /// The API answered but carried no candidate text.
    #[error("AI 服务暂时不可用，请稍后重试")]
    EmptyReply,

    #[error("AI 服务请求超时，请重试")]
    Timeout,

    #[error("网络请求失败: {0}")]
    Network(String),

    /// Model text is not valid JSON.
    #[error("AI 返回的题目格式解析失败，请重试")]
    Parse(String),

    /// Model JSON does not have the expected question shape.
    #[error("题目验证失败: {0}")]
    Schema(String),
}

impl QuizError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            QuizError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short stable label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            QuizError::InvalidRequest(_) => "invalid_request",
            QuizError::NotConfigured => "not_configured",
            QuizError::UpstreamStatus(_) => "upstream_status",
            QuizError::EmptyReply => "empty_reply",
            QuizError::Timeout => "timeout",
            QuizError::Network(_) => "network",
            QuizError::Parse(_) => "parse",
            QuizError::Schema(_) => "schema",
        }
    }
}
