use async_trait::async_trait;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, error};
use crate::domain::entities::{CreateRepoPayload, OwnerProfile, Repository, UpdateRepoPayload};
use crate::ports::github::GitHubPort;
use crate::shared::config::GitHubConfig;
use crate::shared::error::DashboardError;
use crate::shared::result::Result;

const ACCEPT_JSON: &str = "application/vnd.github.v3+json";
const ACCEPT_RAW: &str = "application/vnd.github.v3.raw";

/// GitHub 错误响应体
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
}

/// GitHub REST 客户端实现（基于 reqwest）
pub struct GitHubClient {
    http: Client,
    base_url: String,
    username: String,
    token: Option<String>,
}

impl GitHubClient {
    pub fn new(config: &GitHubConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static(ACCEPT_JSON));

        let http = Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DashboardError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            username: config.username.clone(),
            token: config.token.clone(),
        })
    }

    /// `/repos/{username}/{repo}`，名称做 URL 编码
    fn repo_path(&self, name: &str) -> String {
        format!(
            "/repos/{}/{}",
            urlencoding::encode(&self.username),
            urlencoding::encode(name)
        )
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, format!("{}{}", self.base_url, path));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// 发送请求并把非 2xx 响应转换为统一错误
    async fn send(&self, builder: RequestBuilder, what: &str) -> Result<Response> {
        let response = builder.send().await.map_err(|e| {
            error!(kind = "transport", "Network error while requesting {}: {}", what, e);
            DashboardError::Transport(e.to_string())
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response
            .json::<ApiErrorBody>()
            .await
            .ok()
            .and_then(|body| body.message)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_string());

        let err = match status {
            StatusCode::UNAUTHORIZED => DashboardError::Unauthorized(message),
            StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS => DashboardError::Forbidden(message),
            StatusCode::NOT_FOUND => DashboardError::NotFound(what.to_string()),
            _ => DashboardError::Status {
                status: status.as_u16(),
                message,
            },
        };
        error!(kind = err.kind(), status = status.as_u16(), "GitHub request for {} failed: {}", what, err);
        Err(err)
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder, what: &str) -> Result<T> {
        let response = self.send(builder, what).await?;
        response.json::<T>().await.map_err(|e| {
            error!(kind = "decode", "Failed to decode {}: {}", what, e);
            DashboardError::Decode(e.to_string())
        })
    }
}

#[async_trait]
impl GitHubPort for GitHubClient {
    async fn get_user(&self) -> Result<OwnerProfile> {
        let path = format!("/users/{}", urlencoding::encode(&self.username));
        let what = format!("user {}", self.username);
        self.send_json(self.request(Method::GET, &path), &what).await
    }

    async fn list_repositories(&self, page: u32, per_page: u32) -> Result<Vec<Repository>> {
        let path = format!("/users/{}/repos", urlencoding::encode(&self.username));
        let builder = self.request(Method::GET, &path).query(&[
            ("page", page.to_string()),
            ("per_page", per_page.to_string()),
            ("sort", "updated".to_string()),
            ("direction", "desc".to_string()),
        ]);
        debug!("Requesting repositories page {} (per_page={})", page, per_page);
        self.send_json(builder, &format!("repositories page {}", page)).await
    }

    async fn get_repository(&self, name: &str) -> Result<Repository> {
        let builder = self.request(Method::GET, &self.repo_path(name));
        self.send_json(builder, &format!("repository {}", name)).await
    }

    async fn create_repository(&self, payload: &CreateRepoPayload) -> Result<Repository> {
        let builder = self.request(Method::POST, "/user/repos").json(payload);
        self.send_json(builder, &format!("create repository {}", payload.name)).await
    }

    async fn update_repository(&self, name: &str, payload: &UpdateRepoPayload) -> Result<Repository> {
        let builder = self.request(Method::PATCH, &self.repo_path(name)).json(payload);
        self.send_json(builder, &format!("update repository {}", name)).await
    }

    async fn delete_repository(&self, name: &str) -> Result<()> {
        let builder = self.request(Method::DELETE, &self.repo_path(name));
        self.send(builder, &format!("delete repository {}", name)).await?;
        Ok(())
    }

    async fn get_languages(&self, name: &str) -> Result<HashMap<String, u64>> {
        let path = format!("{}/languages", self.repo_path(name));
        self.send_json(self.request(Method::GET, &path), &format!("languages of {}", name))
            .await
    }

    async fn get_readme(&self, name: &str) -> String {
        let path = format!("{}/readme", self.repo_path(name));
        let builder = self
            .request(Method::GET, &path)
            .header(header::ACCEPT, ACCEPT_RAW);

        // 缺少 README 是常见情况，不走 send() 的错误日志
        let response = match builder.send().await {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                debug!(status = response.status().as_u16(), "No README for {}", name);
                return String::new();
            }
            Err(e) => {
                debug!("README request for {} failed: {}", name, e);
                return String::new();
            }
        };

        match response.text().await {
            Ok(text) => text,
            Err(e) => {
                debug!("Failed to read README body for {}: {}", name, e);
                String::new()
            }
        }
    }
}
