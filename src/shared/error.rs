use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;

/// 统一的错误类型
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    /// 请求未得到任何响应（网络不可达、超时等）
    #[error("Network error: no response from GitHub API ({0})")]
    Transport(String),

    /// 401: 凭证缺失或无效
    #[error("Unauthorized: invalid or missing GitHub token ({0})")]
    Unauthorized(String),

    /// 403: 频率限制或权限不足
    #[error("Forbidden: rate limit exceeded or insufficient permissions ({0})")]
    Forbidden(String),

    /// 404: 资源不存在
    #[error("Not found: {0}")]
    NotFound(String),

    /// 其他非 2xx 状态码
    #[error("GitHub API error {status}: {message}")]
    Status { status: u16, message: String },

    /// 响应体无法解析为预期结构
    #[error("Unexpected response payload: {0}")]
    Decode(String),

    /// 本地校验失败
    #[error("Validation failed: {0}")]
    Validation(String),

    /// 仪表盘尚未完成加载
    #[error("Dashboard is not ready: {0}")]
    NotReady(String),

    /// 配置错误
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO 错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Template 渲染错误
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

impl DashboardError {
    /// 用于日志和 JSON 响应的错误类别
    pub fn kind(&self) -> &'static str {
        match self {
            DashboardError::Transport(_) => "transport",
            DashboardError::Unauthorized(_) => "unauthorized",
            DashboardError::Forbidden(_) => "forbidden",
            DashboardError::NotFound(_) => "not_found",
            DashboardError::Status { .. } => "status",
            DashboardError::Decode(_) => "decode",
            DashboardError::Validation(_) => "validation",
            DashboardError::NotReady(_) => "not_ready",
            DashboardError::Config(_) => "config",
            DashboardError::Io(_) => "io",
            DashboardError::Template(_) => "template",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            DashboardError::Validation(_) => StatusCode::BAD_REQUEST,
            DashboardError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            DashboardError::Forbidden(_) => StatusCode::FORBIDDEN,
            DashboardError::NotFound(_) => StatusCode::NOT_FOUND,
            DashboardError::NotReady(_) => StatusCode::SERVICE_UNAVAILABLE,
            DashboardError::Transport(_)
            | DashboardError::Status { .. }
            | DashboardError::Decode(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 面向用户的提示语
    pub fn user_message(&self) -> String {
        match self {
            DashboardError::Validation(msg) => msg.clone(),
            DashboardError::Unauthorized(_) => {
                "Make sure you have a valid GitHub token with proper permissions.".to_string()
            }
            DashboardError::Forbidden(_) => {
                "GitHub refused the request: rate limit exceeded or insufficient permissions."
                    .to_string()
            }
            DashboardError::NotFound(what) => format!("Not found: {}", what),
            DashboardError::Transport(_) => {
                "Could not reach the GitHub API. Check your network connection.".to_string()
            }
            DashboardError::NotReady(_) => {
                "Repositories are still loading. Please try again shortly.".to_string()
            }
            DashboardError::Status { message, .. } => format!("GitHub API error: {}", message),
            _ => "Internal server error".to_string(),
        }
    }
}

/// 用于 Axum 的错误响应实现
impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(kind = self.kind(), "Request error: {}", self);
        } else {
            tracing::warn!(kind = self.kind(), "Request rejected: {}", self);
        }

        let body = Json(json!({
            "error": self.kind(),
            "message": self.user_message(),
        }));

        (status, body).into_response()
    }
}
