use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use crate::shared::error::DashboardError;
use crate::shared::result::Result;

fn repo_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9._-]+$").expect("static pattern"))
}

/// 仓库名称值对象
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoName(String);

impl RepoName {
    /// 只允许字母、数字、点、连字符和下划线
    pub fn parse(name: &str) -> Result<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DashboardError::Validation("Repository name is required".into()));
        }
        if !repo_name_pattern().is_match(name) {
            return Err(DashboardError::Validation(
                "Only letters, numbers, dots, hyphens, and underscores are allowed".into(),
            ));
        }
        Ok(Self(name.to_string()))
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for RepoName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 删除确认：输入必须与仓库名完全一致（区分大小写，不去空白）
pub fn confirm_delete(target_name: &str, typed: &str) -> Result<()> {
    if typed == target_name {
        Ok(())
    } else {
        Err(DashboardError::Validation(
            "Repository name does not match. Please type the exact repository name.".into(),
        ))
    }
}

/// 排序方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Updated,
    Name,
    Stars,
    Forks,
}

impl SortKey {
    pub const ALL: [SortKey; 4] = [SortKey::Updated, SortKey::Name, SortKey::Stars, SortKey::Forks];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Updated => "updated",
            SortKey::Name => "name",
            SortKey::Stars => "stars",
            SortKey::Forks => "forks",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortKey::Updated => "Recently updated",
            SortKey::Name => "Name",
            SortKey::Stars => "Stars",
            SortKey::Forks => "Forks",
        }
    }
}

impl FromStr for SortKey {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "updated" => Ok(SortKey::Updated),
            "name" => Ok(SortKey::Name),
            "stars" => Ok(SortKey::Stars),
            "forks" => Ok(SortKey::Forks),
            other => Err(DashboardError::Validation(format!("Unknown sort key: {}", other))),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 语言过滤："all" 或某一种具体语言
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum LanguageFilter {
    #[default]
    All,
    Only(String),
}

impl LanguageFilter {
    pub const ALL_SENTINEL: &'static str = "all";

    pub fn parse(value: &str) -> Self {
        if value.is_empty() || value == Self::ALL_SENTINEL {
            LanguageFilter::All
        } else {
            LanguageFilter::Only(value.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            LanguageFilter::All => Self::ALL_SENTINEL,
            LanguageFilter::Only(lang) => lang,
        }
    }
}

impl fmt::Display for LanguageFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for LanguageFilter {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for LanguageFilter {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(LanguageFilter::parse(&value))
    }
}

/// 查询状态
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryState {
    pub search: String,
    pub language: LanguageFilter,
    pub sort: SortKey,
    /// 从 1 开始
    pub page: usize,
}

impl Default for QueryState {
    fn default() -> Self {
        Self {
            search: String::new(),
            language: LanguageFilter::All,
            sort: SortKey::Updated,
            page: 1,
        }
    }
}

impl QueryState {
    /// 修改搜索词，页码回到 1
    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
        self.page = 1;
    }

    /// 修改语言过滤，页码回到 1
    pub fn set_language(&mut self, language: LanguageFilter) {
        self.language = language;
        self.page = 1;
    }

    /// 修改排序，页码回到 1
    pub fn set_sort(&mut self, sort: SortKey) {
        self.sort = sort;
        self.page = 1;
    }

    /// 只修改页码
    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }
}
