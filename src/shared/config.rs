use serde::Deserialize;
use std::fmt;
use std::net::SocketAddr;
use std::path::Path;
use crate::shared::error::DashboardError;
use crate::shared::result::Result;

/// GitHub 单页最多返回 100 条
pub const GITHUB_MAX_PER_PAGE: u32 = 100;

/// 应用配置
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub github: GitHubConfig,
    pub dashboard: DashboardConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: SocketAddr,
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([127, 0, 0, 1], 8080)),
            cors_origins: vec!["http://localhost:3000".to_string()],
        }
    }
}

/// GitHub 配置
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    pub username: String,
    pub token: Option<String>,
    pub api_base_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            username: "octocat".to_string(),
            token: None,
            api_base_url: "https://api.github.com".to_string(),
            user_agent: concat!("repodash/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_secs: 30,
        }
    }
}

// token 不能出现在日志里
impl fmt::Debug for GitHubConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubConfig")
            .field("username", &self.username)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("api_base_url", &self.api_base_url)
            .field("user_agent", &self.user_agent)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// 仪表盘配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// UI 每页展示的仓库数
    pub page_size: usize,
    /// 全量拉取时每次请求的条数
    pub fetch_page_size: u32,
    /// 成功提示的展示时长
    pub notice_ttl_secs: u64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            page_size: 20,
            fetch_page_size: GITHUB_MAX_PER_PAGE,
            notice_ttl_secs: 5,
        }
    }
}

/// 环境变量覆盖项
#[derive(Debug, Clone, Default)]
pub struct EnvOverrides {
    pub username: Option<String>,
    pub token: Option<String>,
    pub api_base_url: Option<String>,
    pub page_size: Option<String>,
    pub bind_address: Option<String>,
}

impl EnvOverrides {
    /// 读取进程环境（只在启动时调用一次）
    pub fn from_env() -> Self {
        let var = |key: &str| std::env::var(key).ok();
        Self {
            username: var("GITHUB_USERNAME"),
            token: var("GITHUB_TOKEN"),
            api_base_url: var("GITHUB_API_BASE_URL"),
            page_size: var("REPOS_PER_PAGE"),
            bind_address: var("REPODASH_BIND"),
        }
    }
}

impl Config {
    /// 从文件加载配置
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| DashboardError::Config(e.to_string()))?;
        Ok(config)
    }

    /// 依次合并：配置文件 -> 环境变量 -> 命令行参数
    pub fn load(
        config_path: &Path,
        env: EnvOverrides,
        bind_address: Option<SocketAddr>,
    ) -> Result<Self> {
        let mut config = if config_path.exists() {
            Self::from_file(config_path)?
        } else {
            tracing::debug!("No config file at {}, using defaults", config_path.display());
            Config::default()
        };

        config.apply_env(env)?;

        if let Some(addr) = bind_address {
            config.server.bind_address = addr;
        }

        config.validate()?;
        Ok(config)
    }

    fn apply_env(&mut self, env: EnvOverrides) -> Result<()> {
        if let Some(username) = env.username.filter(|u| !u.trim().is_empty()) {
            self.github.username = username.trim().to_string();
        }
        if let Some(token) = env.token {
            self.github.token = Some(token);
        }
        if let Some(url) = env.api_base_url.filter(|u| !u.trim().is_empty()) {
            self.github.api_base_url = url.trim().to_string();
        }
        if let Some(size) = env.page_size {
            self.dashboard.page_size = size
                .trim()
                .parse()
                .map_err(|_| DashboardError::Config(format!("REPOS_PER_PAGE is not a number: {}", size)))?;
        }
        if let Some(addr) = env.bind_address {
            self.server.bind_address = addr
                .parse()
                .map_err(|_| DashboardError::Config(format!("Invalid bind address: {}", addr)))?;
        }
        Ok(())
    }

    fn validate(&mut self) -> Result<()> {
        // 空 token 等同于未配置
        if self.github.token.as_deref().map(str::trim).is_some_and(str::is_empty) {
            self.github.token = None;
        }

        let base = self.github.api_base_url.trim_end_matches('/').to_string();
        if base.is_empty() {
            return Err(DashboardError::Config("GitHub API base URL is empty".into()));
        }
        self.github.api_base_url = base;

        if self.github.username.is_empty() {
            return Err(DashboardError::Config("GitHub username is empty".into()));
        }
        if self.dashboard.page_size == 0 {
            return Err(DashboardError::Config("page_size must be at least 1".into()));
        }
        if self.dashboard.fetch_page_size == 0 || self.dashboard.fetch_page_size > GITHUB_MAX_PER_PAGE {
            return Err(DashboardError::Config(format!(
                "fetch_page_size must be between 1 and {}",
                GITHUB_MAX_PER_PAGE
            )));
        }
        Ok(())
    }

    pub fn has_token(&self) -> bool {
        self.github.token.is_some()
    }
}
