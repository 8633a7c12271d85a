use std::sync::Arc;
use tracing::{debug, info};
use crate::domain::entities::Repository;
use crate::ports::github::GitHubPort;
use crate::shared::result::Result;

/// 全量拉取服务 - 逐页请求直到返回的页不满
pub struct CollectionFetcher {
    github: Arc<dyn GitHubPort>,
    per_page: u32,
}

impl CollectionFetcher {
    pub fn new(github: Arc<dyn GitHubPort>, per_page: u32) -> Self {
        Self {
            github,
            per_page: per_page.max(1),
        }
    }

    /// 拉取全部仓库
    ///
    /// 页按顺序依次请求；任意一页失败则整体失败，已拉取的部分丢弃。
    pub async fn fetch_all(&self) -> Result<Vec<Repository>> {
        let mut all_repos = Vec::new();
        let mut page = 1u32;

        loop {
            let repos = self.github.list_repositories(page, self.per_page).await?;
            let fetched = repos.len();
            debug!("Fetched page {} with {} repositories", page, fetched);

            all_repos.extend(repos);

            if fetched < self.per_page as usize {
                break;
            }
            page += 1;
        }

        info!("Fetched {} repositories in {} page(s)", all_repos.len(), page);
        Ok(all_repos)
    }
}
