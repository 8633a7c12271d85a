//! 测试用的假数据与内存版 GitHubPort
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use crate::domain::entities::{
    CreateRepoPayload, OwnerProfile, Repository, RepositoryOwner, UpdateRepoPayload,
};
use crate::ports::github::GitHubPort;
use crate::shared::error::DashboardError;
use crate::shared::result::Result;

pub fn repo_json(id: u64, name: &str) -> Value {
    json!({
        "id": id,
        "node_id": format!("node-{}", id),
        "name": name,
        "full_name": format!("octocat/{}", name),
        "private": false,
        "owner": {"login": "octocat", "id": 1, "avatar_url": "", "html_url": ""},
        "html_url": format!("https://github.com/octocat/{}", name),
        "description": null,
        "fork": false,
        "created_at": "2020-01-01T00:00:00Z",
        "updated_at": "2024-01-01T00:00:00Z",
        "pushed_at": "2024-01-01T00:00:00Z",
        "homepage": null,
        "size": 10,
        "stargazers_count": 0,
        "watchers_count": 0,
        "language": null,
        "forks_count": 0,
        "open_issues_count": 0,
        "default_branch": "main",
        "topics": [],
        "visibility": "public",
        "license": null
    })
}

pub fn at(days: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + chrono::Duration::days(days as i64)
}

pub fn repo(id: u64, name: &str) -> Repository {
    Repository {
        id,
        node_id: format!("node-{}", id),
        name: name.to_string(),
        full_name: format!("octocat/{}", name),
        private: false,
        owner: RepositoryOwner {
            login: "octocat".into(),
            id: 1,
            avatar_url: String::new(),
            html_url: String::new(),
        },
        html_url: format!("https://github.com/octocat/{}", name),
        description: None,
        fork: false,
        created_at: at(0),
        updated_at: at(0),
        pushed_at: Some(at(0)),
        homepage: None,
        size: 1,
        stargazers_count: 0,
        watchers_count: 0,
        language: None,
        forks_count: 0,
        open_issues_count: 0,
        default_branch: "main".into(),
        topics: Vec::new(),
        visibility: "public".into(),
        license: None,
    }
}

pub struct RepoBuilder(Repository);

impl RepoBuilder {
    pub fn new(id: u64, name: &str) -> Self {
        Self(repo(id, name))
    }

    pub fn description(mut self, d: &str) -> Self {
        self.0.description = Some(d.into());
        self
    }

    pub fn language(mut self, l: &str) -> Self {
        self.0.language = Some(l.into());
        self
    }

    pub fn stars(mut self, n: u64) -> Self {
        self.0.stargazers_count = n;
        self
    }

    pub fn forks(mut self, n: u64) -> Self {
        self.0.forks_count = n;
        self
    }

    pub fn updated(mut self, days: u32) -> Self {
        self.0.updated_at = at(days);
        self
    }

    pub fn build(self) -> Repository {
        self.0
    }
}

pub fn profile() -> OwnerProfile {
    OwnerProfile {
        login: "octocat".into(),
        id: 1,
        avatar_url: String::new(),
        html_url: String::new(),
        name: Some("The Octocat".into()),
        company: None,
        blog: None,
        location: None,
        email: None,
        bio: None,
        public_repos: 0,
        followers: 0,
        following: 0,
        created_at: None,
    }
}

/// 内存版 GitHub：按页返回预设的仓库，写操作要求 token
pub struct FakeGitHub {
    pub pages: Vec<Vec<Repository>>,
    pub token: Option<String>,
    pub fail_user: bool,
    pub panic_on_languages: bool,
    pub fail_page: Mutex<Option<u32>>,
    pub page_requests: AtomicU32,
    pub requested_pages: Mutex<Vec<u32>>,
    pub languages: HashMap<String, u64>,
    pub readme: Option<String>,
    next_id: AtomicU32,
}

impl FakeGitHub {
    pub fn new(pages: Vec<Vec<Repository>>) -> Self {
        Self {
            pages,
            token: None,
            fail_user: false,
            panic_on_languages: false,
            fail_page: Mutex::new(None),
            page_requests: AtomicU32::new(0),
            requested_pages: Mutex::new(Vec::new()),
            languages: HashMap::new(),
            readme: None,
            next_id: AtomicU32::new(10_000),
        }
    }

    /// 生成若干页，每页指定条数
    pub fn with_page_sizes(sizes: &[usize]) -> Self {
        let mut id = 0u64;
        let pages = sizes
            .iter()
            .map(|&size| {
                (0..size)
                    .map(|_| {
                        id += 1;
                        repo(id, &format!("repo-{}", id))
                    })
                    .collect()
            })
            .collect();
        Self::new(pages)
    }

    pub fn with_token(mut self, token: &str) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn fail_on_page(&self, page: Option<u32>) {
        *self.fail_page.lock().unwrap() = page;
    }

    pub fn requests(&self) -> u32 {
        self.page_requests.load(Ordering::SeqCst)
    }

    fn require_token(&self) -> Result<()> {
        if self.token.is_some() {
            Ok(())
        } else {
            Err(DashboardError::Unauthorized("Requires authentication".into()))
        }
    }
}

#[async_trait]
impl GitHubPort for FakeGitHub {
    async fn get_user(&self) -> Result<OwnerProfile> {
        if self.fail_user {
            return Err(DashboardError::NotFound("user octocat".into()));
        }
        Ok(profile())
    }

    async fn list_repositories(&self, page: u32, _per_page: u32) -> Result<Vec<Repository>> {
        self.page_requests.fetch_add(1, Ordering::SeqCst);
        self.requested_pages.lock().unwrap().push(page);
        if *self.fail_page.lock().unwrap() == Some(page) {
            return Err(DashboardError::Transport("connection reset".into()));
        }
        Ok(self
            .pages
            .get(page as usize - 1)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_repository(&self, name: &str) -> Result<Repository> {
        self.pages
            .iter()
            .flatten()
            .find(|r| r.name == name)
            .cloned()
            .ok_or_else(|| DashboardError::NotFound(format!("repository {}", name)))
    }

    async fn create_repository(&self, payload: &CreateRepoPayload) -> Result<Repository> {
        self.require_token()?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) as u64;
        let mut created = repo(id, &payload.name);
        created.description = payload.description.clone();
        created.private = payload.private.unwrap_or(false);
        created.updated_at = at(365);
        Ok(created)
    }

    async fn update_repository(&self, name: &str, payload: &UpdateRepoPayload) -> Result<Repository> {
        self.require_token()?;
        let mut existing = self.get_repository(name).await?;
        if let Some(new_name) = &payload.name {
            existing.name = new_name.clone();
        }
        if let Some(description) = &payload.description {
            existing.description = Some(description.clone());
        }
        if let Some(private) = payload.private {
            existing.private = private;
        }
        Ok(existing)
    }

    async fn delete_repository(&self, name: &str) -> Result<()> {
        self.require_token()?;
        self.get_repository(name).await.map(|_| ())
    }

    async fn get_languages(&self, name: &str) -> Result<HashMap<String, u64>> {
        if self.panic_on_languages {
            panic!("languages payload exploded");
        }
        self.get_repository(name).await?;
        Ok(self.languages.clone())
    }

    async fn get_readme(&self, _name: &str) -> String {
        self.readme.clone().unwrap_or_default()
    }
}
