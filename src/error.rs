use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// 400/404 错误响应中固定返回的 developerMessage 文案。
pub const RESPONSE_STATUS_EXCEPTION_MESSAGE: &str = "A ResponseStatusException Happened";

/// 应用统一错误类型
#[derive(Error, Debug, utoipa::ToSchema)]
pub enum AppError {
    /// 参数校验错误
    #[error("参数校验错误: {0}")]
    Validation(String),

    /// 资源不存在
    #[error("资源不存在: {0}")]
    NotFound(String),

    /// 认证失败
    #[error("认证失败: {0}")]
    Auth(String),

    /// 禁止访问
    #[error("禁止访问: {0}")]
    Forbidden(String),

    /// JSON 解析错误
    #[error("JSON 解析错误: {0}")]
    Json(String),

    /// 数据库错误
    #[error("数据库错误: {0}")]
    Database(String),

    /// 内部服务器错误
    #[error("内部错误: {0}")]
    Internal(String),
}

/// 统一错误响应体。
///
/// 所有 API 错误都序列化为 `{status, developerMessage}`：
/// - 400/404 固定返回 [`RESPONSE_STATUS_EXCEPTION_MESSAGE`]
/// - 其余状态码回填错误自身的描述文本
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// HTTP 状态码（与响应 status 一致）
    #[schema(example = 404)]
    pub status: u16,

    /// 面向开发者的错误信息
    #[schema(example = "A ResponseStatusException Happened")]
    pub developer_message: String,
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::Json(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn developer_message(&self) -> String {
        match self.status_code() {
            StatusCode::BAD_REQUEST | StatusCode::NOT_FOUND => {
                RESPONSE_STATUS_EXCEPTION_MESSAGE.to_string()
            }
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            status: status.as_u16(),
            developer_message: self.developer_message(),
        };

        let mut res = Json(body).into_response();
        *res.status_mut() = status;
        // Basic 认证失败时按 RFC7617 回带 challenge 头
        if status == StatusCode::UNAUTHORIZED {
            res.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                HeaderValue::from_static("Basic realm=\"anime-backend\""),
            );
        }
        res
    }
}
