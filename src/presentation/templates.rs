use askama::Template;
use chrono::Utc;
use crate::domain::entities::{LanguageShare, OwnerProfile, Repository, RepositoryDetail};
use crate::domain::value_objects::{QueryState, SortKey};
use crate::services::controller::DashboardView;
use crate::services::format::{format_date, format_number, relative_time};
use crate::services::pagination::PageLink;

/// 主页 - 仓库列表
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub owner: Option<OwnerItem>,
    pub notice: Option<String>,
    pub form_error: Option<String>,
    pub has_token: bool,
    pub total_count: usize,
    pub filtered_count: usize,
    pub search: String,
    pub languages: Vec<SelectOption>,
    pub sort_options: Vec<SelectOption>,
    pub repositories: Vec<RepoItem>,
    pub pagination: Option<PaginationItem>,
}

impl IndexTemplate {
    pub fn from_view(view: DashboardView, form_error: Option<String>, has_token: bool) -> Self {
        let query = &view.query;

        let mut languages = vec![SelectOption {
            value: "all".to_string(),
            label: "All languages".to_string(),
            selected: query.language.as_str() == "all",
        }];
        languages.extend(view.languages.iter().map(|lang| SelectOption {
            value: lang.clone(),
            label: lang.clone(),
            selected: query.language.as_str() == lang.as_str(),
        }));

        let sort_options = SortKey::ALL
            .iter()
            .map(|key| SelectOption {
                value: key.as_str().to_string(),
                label: key.label().to_string(),
                selected: *key == query.sort,
            })
            .collect();

        let pagination = view
            .pagination
            .is_multi_page()
            .then(|| PaginationItem::new(query, &view.pagination.links(), view.pagination.has_prev, view.pagination.has_next));

        Self {
            owner: view.owner.as_ref().map(OwnerItem::from),
            notice: view.notice.clone(),
            form_error,
            has_token,
            total_count: view.total_count,
            filtered_count: view.filtered_count,
            search: query.search.clone(),
            languages,
            sort_options,
            repositories: view.repositories.iter().map(RepoItem::from).collect(),
            pagination,
        }
    }
}

#[derive(Clone)]
pub struct OwnerItem {
    pub login: String,
    pub display_name: String,
    pub avatar_url: String,
    pub bio: Option<String>,
    pub public_repos: String,
    pub followers: String,
    pub following: String,
}

impl From<&OwnerProfile> for OwnerItem {
    fn from(owner: &OwnerProfile) -> Self {
        Self {
            login: owner.login.clone(),
            display_name: owner.display_name().to_string(),
            avatar_url: owner.avatar_url.clone(),
            bio: owner.bio.clone(),
            public_repos: format_number(owner.public_repos),
            followers: format_number(owner.followers),
            following: format_number(owner.following),
        }
    }
}

#[derive(Clone)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

#[derive(Clone)]
pub struct RepoItem {
    pub name: String,
    pub href: String,
    pub description: Option<String>,
    pub language: Option<String>,
    pub stars: String,
    pub forks: String,
    pub private: bool,
    pub updated: String,
    pub topics: Vec<String>,
}

impl From<&Repository> for RepoItem {
    fn from(repo: &Repository) -> Self {
        Self {
            name: repo.name.clone(),
            href: repo_href(&repo.name),
            description: repo.description.clone(),
            language: repo.language.clone(),
            stars: format_number(repo.stargazers_count),
            forks: format_number(repo.forks_count),
            private: repo.private,
            updated: relative_time(&repo.updated_at, Utc::now()),
            topics: repo.topics.iter().take(3).cloned().collect(),
        }
    }
}

pub fn repo_href(name: &str) -> String {
    format!("/repository/{}", urlencoding::encode(name))
}

/// 列表页链接，保留当前的查询条件
pub fn list_href(query: &QueryState, page: usize) -> String {
    format!(
        "/?q={}&lang={}&sort={}&page={}",
        urlencoding::encode(&query.search),
        urlencoding::encode(query.language.as_str()),
        query.sort.as_str(),
        page
    )
}

#[derive(Clone)]
pub struct PaginationItem {
    pub prev_href: Option<String>,
    pub next_href: Option<String>,
    pub links: Vec<PageLinkItem>,
}

impl PaginationItem {
    fn new(query: &QueryState, links: &[PageLink], has_prev: bool, has_next: bool) -> Self {
        let current = query.page;
        Self {
            prev_href: has_prev.then(|| list_href(query, current - 1)),
            next_href: has_next.then(|| list_href(query, current + 1)),
            links: links
                .iter()
                .map(|link| match link {
                    PageLink::Page(n) => PageLinkItem {
                        label: n.to_string(),
                        href: Some(list_href(query, *n)),
                        current: *n == current,
                    },
                    PageLink::Ellipsis => PageLinkItem {
                        label: "...".to_string(),
                        href: None,
                        current: false,
                    },
                })
                .collect(),
        }
    }
}

#[derive(Clone)]
pub struct PageLinkItem {
    pub label: String,
    pub href: Option<String>,
    pub current: bool,
}

/// 加载中
#[derive(Template)]
#[template(path = "loading.html")]
pub struct LoadingTemplate {
    pub message: String,
}

/// 错误页
#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub title: String,
    pub message: String,
    /// 显示“重试”按钮
    pub retry: bool,
}

/// 404
#[derive(Template)]
#[template(path = "not_found.html")]
pub struct NotFoundTemplate {
    pub path: String,
}

/// 仓库详情页
#[derive(Template)]
#[template(path = "detail.html")]
pub struct DetailTemplate {
    pub repo: RepoDetailItem,
    pub languages: Vec<LanguageShare>,
    pub readme: String,
    pub form_error: Option<String>,
    pub has_token: bool,
}

impl DetailTemplate {
    pub fn new(detail: RepositoryDetail, form_error: Option<String>, has_token: bool) -> Self {
        Self {
            repo: RepoDetailItem::from(&detail.repository),
            languages: detail.languages,
            readme: detail.readme,
            form_error,
            has_token,
        }
    }
}

#[derive(Clone)]
pub struct RepoDetailItem {
    pub name: String,
    pub full_name: String,
    pub html_url: String,
    pub homepage: String,
    pub description: String,
    pub private: bool,
    pub fork: bool,
    pub topics: Vec<String>,
    pub stars: String,
    pub forks: String,
    pub watchers: String,
    pub open_issues: String,
    pub size_kb: String,
    pub default_branch: String,
    pub license: Option<String>,
    pub created: String,
    pub updated: String,
    pub pushed: Option<String>,
    pub update_action: String,
    pub delete_action: String,
}

impl From<&Repository> for RepoDetailItem {
    fn from(repo: &Repository) -> Self {
        let href = repo_href(&repo.name);
        Self {
            name: repo.name.clone(),
            full_name: repo.full_name.clone(),
            html_url: repo.html_url.clone(),
            homepage: repo.homepage.clone().unwrap_or_default(),
            description: repo.description.clone().unwrap_or_default(),
            private: repo.private,
            fork: repo.fork,
            topics: repo.topics.clone(),
            stars: format_number(repo.stargazers_count),
            forks: format_number(repo.forks_count),
            watchers: format_number(repo.watchers_count),
            open_issues: format_number(repo.open_issues_count),
            size_kb: format_number(repo.size),
            default_branch: repo.default_branch.clone(),
            license: repo.license.as_ref().map(|l| l.name.clone()),
            created: format_date(&repo.created_at),
            updated: format_date(&repo.updated_at),
            pushed: repo.pushed_at.as_ref().map(|d| relative_time(d, Utc::now())),
            update_action: format!("{}/update", href),
            delete_action: format!("{}/delete", href),
        }
    }
}
