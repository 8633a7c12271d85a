use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use crate::domain::entities::{
    CreateRepoPayload, OwnerProfile, Repository, RepositoryDetail, UpdateRepoPayload,
};
use crate::domain::value_objects::{confirm_delete, LanguageFilter, QueryState, RepoName, SortKey};
use crate::ports::github::GitHubPort;
use crate::services::fetcher::CollectionFetcher;
use crate::services::format::language_shares;
use crate::services::pagination::PaginationInfo;
use crate::services::pipeline;
use crate::shared::config::Config;
use crate::shared::error::DashboardError;
use crate::shared::result::Result;

const LOAD_FAILED: &str =
    "Failed to load repositories. Please check your configuration and try again.";

/// 仪表盘加载阶段
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "lowercase")]
pub enum LoadPhase {
    Initializing,
    Ready,
    Error(String),
}

/// 操作成功后的短暂提示
#[derive(Debug, Clone)]
struct Notice {
    message: String,
    shown_at: Instant,
}

struct DashboardState {
    phase: LoadPhase,
    owner: Option<OwnerProfile>,
    repositories: Vec<Repository>,
    query: QueryState,
    notice: Option<Notice>,
    /// 每次初始化加一，过期的加载结果直接丢弃
    generation: u64,
}

impl DashboardState {
    fn new() -> Self {
        Self {
            phase: LoadPhase::Initializing,
            owner: None,
            repositories: Vec::new(),
            query: QueryState::default(),
            notice: None,
            generation: 0,
        }
    }

    fn filtered(&self) -> Vec<Repository> {
        pipeline::apply(&self.repositories, &self.query)
    }

    fn notify(&mut self, message: String) {
        info!("{}", message);
        self.notice = Some(Notice {
            message,
            shown_at: Instant::now(),
        });
    }
}

/// 一次渲染所需的全部数据
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub phase: LoadPhase,
    pub owner: Option<OwnerProfile>,
    pub total_count: usize,
    pub filtered_count: usize,
    pub languages: Vec<String>,
    pub query: QueryState,
    pub pagination: PaginationInfo,
    pub repositories: Vec<Repository>,
    pub notice: Option<String>,
}

/// 一次请求携带的查询参数修改
#[derive(Debug, Clone, Default)]
pub struct QueryUpdate {
    pub search: Option<String>,
    pub language: Option<LanguageFilter>,
    pub sort: Option<SortKey>,
    pub page: Option<usize>,
}

/// 视图状态控制器
///
/// 持有全量仓库集合和查询状态；集合只会在远端确认 创建/更新/删除 成功后被修改。
pub struct DashboardController {
    config: Arc<Config>,
    github: Arc<dyn GitHubPort>,
    state: RwLock<DashboardState>,
    shutdown: CancellationToken,
}

impl DashboardController {
    pub fn new(config: Arc<Config>, github: Arc<dyn GitHubPort>) -> Self {
        Self {
            config,
            github,
            state: RwLock::new(DashboardState::new()),
            shutdown: CancellationToken::new(),
        }
    }

    /// 并发拉取用户资料和全量仓库，两者都成功才进入 ready
    pub async fn initialize(&self) -> Result<()> {
        let generation = {
            let mut state = self.state.write().await;
            state.phase = LoadPhase::Initializing;
            state.generation += 1;
            state.generation
        };

        info!("Loading repositories for {}", self.config.github.username);

        let fetcher = CollectionFetcher::new(
            self.github.clone(),
            self.config.dashboard.fetch_page_size,
        );
        let load = async { tokio::try_join!(self.github.get_user(), fetcher.fetch_all()) };

        let outcome = tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => {
                info!("Initialization cancelled");
                return Ok(());
            }
            outcome = load => outcome,
        };

        let mut state = self.state.write().await;
        if state.generation != generation {
            info!("Discarding stale load result");
            return Ok(());
        }

        match outcome {
            Ok((owner, repositories)) => {
                info!("Dashboard ready with {} repositories", repositories.len());
                state.owner = Some(owner);
                state.repositories = repositories;
                state.phase = LoadPhase::Ready;
                self.clamp_current_page(&mut state);
                Ok(())
            }
            Err(e) => {
                error!(kind = e.kind(), "Error fetching data: {}", e);
                state.owner = None;
                state.repositories.clear();
                state.phase = LoadPhase::Error(LOAD_FAILED.to_string());
                Err(e)
            }
        }
    }

    /// 重新加载（出错后的重试入口），查询状态回到默认值
    pub async fn reload(&self) -> Result<()> {
        {
            let mut state = self.state.write().await;
            state.query = QueryState::default();
            state.notice = None;
        }
        self.initialize().await
    }

    /// 取消进行中的加载
    pub fn teardown(&self) {
        self.shutdown.cancel();
    }

    pub async fn phase(&self) -> LoadPhase {
        self.state.read().await.phase.clone()
    }

    async fn ensure_ready(&self) -> Result<()> {
        match &self.state.read().await.phase {
            LoadPhase::Ready => Ok(()),
            LoadPhase::Initializing => Err(DashboardError::NotReady("still loading".into())),
            LoadPhase::Error(msg) => Err(DashboardError::NotReady(msg.clone())),
        }
    }

    // ===== 查询状态 =====

    /// 页码限制在 [1, 总页数]
    fn clamp_page(&self, state: &DashboardState, page: usize) -> usize {
        let total = state.filtered().len();
        let info = PaginationInfo::calculate(total, 1, self.config.dashboard.page_size);
        page.clamp(1, info.total_pages.max(1))
    }

    /// 集合变化后当前页可能越界，重新收紧
    fn clamp_current_page(&self, state: &mut DashboardState) {
        let page = self.clamp_page(state, state.query.page);
        state.query.set_page(page);
    }

    /// 应用一次请求里的查询修改
    ///
    /// 搜索词、语言、排序有变化时页码回到 1，此时忽略请求中的页码。
    pub async fn update_query(&self, update: QueryUpdate) {
        let mut state = self.state.write().await;
        let mut filters_changed = false;

        if let Some(search) = update.search {
            if search != state.query.search {
                state.query.set_search(search);
                filters_changed = true;
            }
        }
        if let Some(language) = update.language {
            if language != state.query.language {
                state.query.set_language(language);
                filters_changed = true;
            }
        }
        if let Some(sort) = update.sort {
            if sort != state.query.sort {
                state.query.set_sort(sort);
                filters_changed = true;
            }
        }

        if !filters_changed {
            if let Some(page) = update.page {
                let page = self.clamp_page(&state, page);
                state.query.set_page(page);
            }
        }
    }

    // ===== 视图 =====

    pub async fn view(&self) -> DashboardView {
        let state = self.state.read().await;
        let filtered = state.filtered();
        let pagination = PaginationInfo::calculate(
            filtered.len(),
            state.query.page,
            self.config.dashboard.page_size,
        );
        let ttl = Duration::from_secs(self.config.dashboard.notice_ttl_secs);

        DashboardView {
            phase: state.phase.clone(),
            owner: state.owner.clone(),
            total_count: state.repositories.len(),
            filtered_count: filtered.len(),
            languages: pipeline::unique_languages(&state.repositories),
            query: state.query.clone(),
            pagination,
            repositories: pagination.slice(&filtered).to_vec(),
            notice: state
                .notice
                .as_ref()
                .filter(|n| n.shown_at.elapsed() < ttl)
                .map(|n| n.message.clone()),
        }
    }

    pub async fn languages(&self) -> Vec<String> {
        pipeline::unique_languages(&self.state.read().await.repositories)
    }

    pub async fn dismiss_notice(&self) {
        self.state.write().await.notice = None;
    }

    // ===== 增删改 =====

    pub async fn create_repository(&self, payload: CreateRepoPayload) -> Result<Repository> {
        self.ensure_ready().await?;
        let mut payload = payload.normalized();
        payload.name = RepoName::parse(&payload.name)?.into_string();

        let created = self
            .github
            .create_repository(&payload)
            .await
            .inspect_err(|e| warn!(kind = e.kind(), "Error creating repository: {}", e))?;

        self.on_create_success(created.clone()).await;
        Ok(created)
    }

    pub async fn update_repository(&self, name: &str, mut payload: UpdateRepoPayload) -> Result<Repository> {
        self.ensure_ready().await?;
        if payload.is_empty() {
            return Err(DashboardError::Validation("Nothing to update".into()));
        }
        if let Some(new_name) = payload.name.take() {
            payload.name = Some(RepoName::parse(&new_name)?.into_string());
        }

        let updated = self
            .github
            .update_repository(name, &payload)
            .await
            .inspect_err(|e| warn!(kind = e.kind(), "Error updating repository {}: {}", name, e))?;

        self.on_update_success(updated.clone()).await;
        Ok(updated)
    }

    /// 删除前必须输入完全一致的仓库名
    pub async fn delete_repository(&self, name: &str, confirmation: &str) -> Result<()> {
        self.ensure_ready().await?;
        confirm_delete(name, confirmation)?;

        self.github
            .delete_repository(name)
            .await
            .inspect_err(|e| warn!(kind = e.kind(), "Error deleting repository {}: {}", name, e))?;

        self.on_delete_success(name).await;
        Ok(())
    }

    /// 新仓库插到最前面
    pub async fn on_create_success(&self, repo: Repository) {
        let mut state = self.state.write().await;
        let message = format!("Repository \"{}\" created successfully!", repo.name);
        state.repositories.insert(0, repo);
        self.clamp_current_page(&mut state);
        state.notify(message);
    }

    /// 按 id 替换
    pub async fn on_update_success(&self, repo: Repository) {
        let mut state = self.state.write().await;
        let message = format!("Repository \"{}\" updated successfully!", repo.name);
        if let Some(slot) = state.repositories.iter_mut().find(|r| r.id == repo.id) {
            *slot = repo;
        }
        self.clamp_current_page(&mut state);
        state.notify(message);
    }

    /// 按名称移除
    pub async fn on_delete_success(&self, name: &str) {
        let mut state = self.state.write().await;
        state.repositories.retain(|r| !r.matches_name(name));
        self.clamp_current_page(&mut state);
        state.notify(format!("Repository \"{}\" deleted successfully!", name));
    }

    // ===== 详情 =====

    /// 并发获取仓库、语言和 README；README 缺失不算错误
    pub async fn repository_detail(&self, name: &str) -> Result<RepositoryDetail> {
        let (repository, languages, readme) = futures::future::join3(
            self.github.get_repository(name),
            self.github.get_languages(name),
            self.github.get_readme(name),
        )
        .await;

        let repository = repository
            .inspect_err(|e| warn!(kind = e.kind(), "Error fetching repository details: {}", e))?;
        let languages = languages
            .inspect_err(|e| warn!(kind = e.kind(), "Error fetching languages: {}", e))?;

        Ok(RepositoryDetail {
            repository,
            languages: language_shares(&languages),
            readme,
        })
    }
}

#[cfg(test)]
impl DashboardController {
    pub async fn query(&self) -> QueryState {
        self.state.read().await.query.clone()
    }

    pub async fn set_search(&self, search: impl Into<String>) {
        self.state.write().await.query.set_search(search);
    }

    pub async fn set_language(&self, language: LanguageFilter) {
        self.state.write().await.query.set_language(language);
    }

    pub async fn set_page(&self, page: usize) {
        let mut state = self.state.write().await;
        let page = self.clamp_page(&state, page);
        state.query.set_page(page);
    }

    pub async fn find_repository(&self, name: &str) -> Option<Repository> {
        self.state
            .read()
            .await
            .repositories
            .iter()
            .find(|r| r.matches_name(name))
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{FakeGitHub, RepoBuilder};
    use std::collections::HashMap;

    fn config() -> Arc<Config> {
        Arc::new(Config::default())
    }

    async fn ready_controller(fake: FakeGitHub) -> DashboardController {
        let controller = DashboardController::new(config(), Arc::new(fake));
        controller.initialize().await.unwrap();
        controller
    }

    #[tokio::test]
    async fn starts_initializing_then_becomes_ready() {
        let controller = DashboardController::new(config(), Arc::new(FakeGitHub::with_page_sizes(&[45])));
        assert_eq!(controller.phase().await, LoadPhase::Initializing);

        controller.initialize().await.unwrap();
        assert_eq!(controller.phase().await, LoadPhase::Ready);

        let view = controller.view().await;
        assert_eq!(view.total_count, 45);
        assert_eq!(view.repositories.len(), 20);
        assert_eq!(view.pagination.total_pages, 3);
        assert_eq!(view.owner.unwrap().login, "octocat");
    }

    #[tokio::test]
    async fn owner_failure_moves_to_error() {
        let mut fake = FakeGitHub::with_page_sizes(&[3]);
        fake.fail_user = true;
        let controller = DashboardController::new(config(), Arc::new(fake));

        assert!(controller.initialize().await.is_err());
        assert!(matches!(controller.phase().await, LoadPhase::Error(_)));
        assert_eq!(controller.view().await.total_count, 0);
    }

    #[tokio::test]
    async fn fetch_failure_moves_to_error_and_reload_recovers() {
        let fake = Arc::new(FakeGitHub::with_page_sizes(&[100, 5]));
        fake.fail_on_page(Some(2));
        let controller = DashboardController::new(config(), fake.clone());
        assert!(controller.initialize().await.is_err());
        assert!(matches!(controller.phase().await, LoadPhase::Error(_)));
        assert_eq!(controller.view().await.total_count, 0);

        fake.fail_on_page(None);
        controller.set_search("repo").await;
        controller.reload().await.unwrap();
        assert_eq!(controller.phase().await, LoadPhase::Ready);
        assert_eq!(controller.view().await.total_count, 105);
        assert_eq!(controller.query().await, QueryState::default());
    }

    #[tokio::test]
    async fn teardown_discards_pending_load() {
        let controller = DashboardController::new(config(), Arc::new(FakeGitHub::with_page_sizes(&[3])));
        controller.teardown();
        controller.initialize().await.unwrap();
        assert_eq!(controller.phase().await, LoadPhase::Initializing);
        assert_eq!(controller.view().await.total_count, 0);
    }

    #[tokio::test]
    async fn crud_is_rejected_until_ready() {
        let controller = DashboardController::new(config(), Arc::new(FakeGitHub::with_page_sizes(&[1])));
        let result = controller.create_repository(CreateRepoPayload::new("demo-1")).await;
        assert!(matches!(result, Err(DashboardError::NotReady(_))));
    }

    #[tokio::test]
    async fn create_without_token_is_unauthorized_and_leaves_state() {
        let controller = ready_controller(FakeGitHub::with_page_sizes(&[3])).await;

        let result = controller.create_repository(CreateRepoPayload::new("demo-1")).await;
        assert!(matches!(result, Err(DashboardError::Unauthorized(_))));

        let view = controller.view().await;
        assert_eq!(view.total_count, 3);
        assert!(view.notice.is_none());
        assert_eq!(view.phase, LoadPhase::Ready);
    }

    #[tokio::test]
    async fn create_with_token_prepends_and_shows_on_first_page() {
        let controller = ready_controller(FakeGitHub::with_page_sizes(&[45]).with_token("ghp")).await;
        controller.set_page(3).await;

        let created = controller.create_repository(CreateRepoPayload::new("demo-1")).await.unwrap();
        assert_eq!(created.name, "demo-1");

        controller.set_page(1).await;
        let view = controller.view().await;
        assert_eq!(view.total_count, 46);
        assert_eq!(view.repositories[0].name, "demo-1");
        assert_eq!(view.notice.as_deref(), Some("Repository \"demo-1\" created successfully!"));
    }

    #[tokio::test]
    async fn invalid_name_is_rejected_locally() {
        let controller = ready_controller(FakeGitHub::with_page_sizes(&[1]).with_token("ghp")).await;
        let result = controller.create_repository(CreateRepoPayload::new("bad name!")).await;
        assert!(matches!(result, Err(DashboardError::Validation(_))));
        assert_eq!(controller.view().await.total_count, 1);
    }

    #[tokio::test]
    async fn update_replaces_record_by_id() {
        let controller = ready_controller(FakeGitHub::with_page_sizes(&[3]).with_token("ghp")).await;
        let payload = UpdateRepoPayload {
            name: Some("renamed".into()),
            description: Some("fresh".into()),
            ..Default::default()
        };

        let updated = controller.update_repository("repo-2", payload).await.unwrap();
        assert_eq!(updated.id, 2);

        let view = controller.view().await;
        assert_eq!(view.total_count, 3);
        let record = controller.find_repository("renamed").await.unwrap();
        assert_eq!(record.id, 2);
        assert_eq!(record.description.as_deref(), Some("fresh"));
        assert!(controller.find_repository("repo-2").await.is_none());
    }

    #[tokio::test]
    async fn update_rename_is_validated_and_trimmed() {
        let controller = ready_controller(FakeGitHub::with_page_sizes(&[3]).with_token("ghp")).await;

        let padded = UpdateRepoPayload { name: Some(" renamed ".into()), ..Default::default() };
        let updated = controller.update_repository("repo-1", padded).await.unwrap();
        assert_eq!(updated.name, "renamed");
        assert!(controller.find_repository("renamed").await.is_some());

        let spaced = UpdateRepoPayload { name: Some("two words".into()), ..Default::default() };
        let result = controller.update_repository("repo-2", spaced).await;
        assert!(matches!(result, Err(DashboardError::Validation(_))));
        assert!(controller.find_repository("repo-2").await.is_some());
    }

    #[tokio::test]
    async fn empty_update_is_a_validation_failure() {
        let controller = ready_controller(FakeGitHub::with_page_sizes(&[1]).with_token("ghp")).await;
        let result = controller.update_repository("repo-1", UpdateRepoPayload::default()).await;
        assert!(matches!(result, Err(DashboardError::Validation(_))));
    }

    #[tokio::test]
    async fn delete_requires_exact_confirmation() {
        let controller = ready_controller(FakeGitHub::with_page_sizes(&[3]).with_token("ghp")).await;

        let result = controller.delete_repository("repo-1", "REPO-1").await;
        assert!(matches!(result, Err(DashboardError::Validation(_))));
        assert_eq!(controller.view().await.total_count, 3);

        controller.delete_repository("repo-1", "repo-1").await.unwrap();
        assert_eq!(controller.view().await.total_count, 2);
        assert!(controller.find_repository("repo-1").await.is_none());
    }

    #[tokio::test]
    async fn failed_delete_leaves_collection_untouched() {
        let controller = ready_controller(FakeGitHub::with_page_sizes(&[3])).await;
        let result = controller.delete_repository("repo-1", "repo-1").await;
        assert!(matches!(result, Err(DashboardError::Unauthorized(_))));
        assert_eq!(controller.view().await.total_count, 3);
    }

    #[tokio::test]
    async fn search_change_resets_page() {
        let controller = ready_controller(FakeGitHub::with_page_sizes(&[60])).await;
        controller.set_page(3).await;
        assert_eq!(controller.query().await.page, 3);

        controller.set_search("repo").await;
        let query = controller.query().await;
        assert_eq!(query.page, 1);
        assert_eq!(query.search, "repo");

        controller.set_page(2).await;
        let query = controller.query().await;
        assert_eq!(query.page, 2);
        assert_eq!(query.search, "repo");
        assert_eq!(query.sort, SortKey::Updated);
        assert_eq!(query.language, LanguageFilter::All);
    }

    #[tokio::test]
    async fn update_query_ignores_page_when_filters_change() {
        let controller = ready_controller(FakeGitHub::with_page_sizes(&[60])).await;
        controller.update_query(QueryUpdate { page: Some(3), ..Default::default() }).await;
        assert_eq!(controller.query().await.page, 3);

        controller
            .update_query(QueryUpdate {
                sort: Some(SortKey::Name),
                page: Some(3),
                ..Default::default()
            })
            .await;
        let query = controller.query().await;
        assert_eq!(query.page, 1);
        assert_eq!(query.sort, SortKey::Name);

        // 过滤条件未变化时只翻页
        controller
            .update_query(QueryUpdate {
                sort: Some(SortKey::Name),
                page: Some(2),
                ..Default::default()
            })
            .await;
        assert_eq!(controller.query().await.page, 2);
    }

    #[tokio::test]
    async fn page_is_clamped_to_available_range() {
        let controller = ready_controller(FakeGitHub::with_page_sizes(&[45])).await;
        controller.set_page(99).await;
        assert_eq!(controller.query().await.page, 3);
        controller.set_page(0).await;
        assert_eq!(controller.query().await.page, 1);
    }

    #[tokio::test]
    async fn delete_of_last_item_on_page_moves_back_a_page() {
        let controller = ready_controller(FakeGitHub::with_page_sizes(&[41]).with_token("ghp")).await;
        controller.set_page(3).await;
        let view = controller.view().await;
        assert_eq!(view.repositories.len(), 1);
        let last = view.repositories[0].name.clone();

        controller.delete_repository(&last, &last).await.unwrap();
        let view = controller.view().await;
        assert_eq!(view.query.page, 2);
        assert_eq!(view.pagination.total_pages, 2);
        assert_eq!(view.repositories.len(), 20);
    }

    #[tokio::test]
    async fn language_filter_and_choices() {
        let repos = vec![
            RepoBuilder::new(1, "a").language("Rust").build(),
            RepoBuilder::new(2, "b").language("Go").build(),
            RepoBuilder::new(3, "c").build(),
        ];
        let controller = ready_controller(FakeGitHub::new(vec![repos])).await;
        assert_eq!(controller.languages().await, vec!["Go", "Rust"]);

        controller.set_language(LanguageFilter::Only("Go".into())).await;
        let view = controller.view().await;
        assert_eq!(view.filtered_count, 1);
        assert_eq!(view.repositories[0].name, "b");
        assert_eq!(view.total_count, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn notice_expires_and_can_be_dismissed() {
        let controller = ready_controller(FakeGitHub::with_page_sizes(&[2]).with_token("ghp")).await;

        controller.delete_repository("repo-1", "repo-1").await.unwrap();
        assert!(controller.view().await.notice.is_some());

        tokio::time::advance(Duration::from_secs(4)).await;
        assert!(controller.view().await.notice.is_some());

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(controller.view().await.notice.is_none());

        controller.delete_repository("repo-2", "repo-2").await.unwrap();
        controller.dismiss_notice().await;
        assert!(controller.view().await.notice.is_none());
    }

    #[tokio::test]
    async fn detail_tolerates_missing_readme() {
        let mut fake = FakeGitHub::with_page_sizes(&[1]);
        fake.languages = HashMap::from([("Rust".to_string(), 300), ("C".to_string(), 100)]);
        let controller = DashboardController::new(config(), Arc::new(fake));

        let detail = controller.repository_detail("repo-1").await.unwrap();
        assert_eq!(detail.repository.id, 1);
        assert_eq!(detail.readme, "");
        assert_eq!(detail.languages[0].language, "Rust");
        assert_eq!(detail.languages[0].percentage, "75.0");

        assert!(matches!(
            controller.repository_detail("missing").await,
            Err(DashboardError::NotFound(_))
        ));
    }
}
