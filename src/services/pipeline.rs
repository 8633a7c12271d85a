//! 仓库列表的搜索、过滤和排序
//!
//! 纯函数：相同的输入总是得到相同顺序的输出。顺序固定为 搜索 -> 语言过滤 -> 排序，
//! 排序是稳定的，键相同的仓库保持输入顺序。
use std::cmp::Ordering;
use std::collections::BTreeSet;
use crate::domain::entities::Repository;
use crate::domain::value_objects::{LanguageFilter, QueryState, SortKey};

/// 按查询状态计算视图（不含分页）
pub fn apply(repos: &[Repository], query: &QueryState) -> Vec<Repository> {
    let searched = search(repos, &query.search);
    let filtered = filter_by_language(searched, &query.language);
    sort(filtered, query.sort)
}

/// 名称或描述包含查询词（忽略大小写）
pub fn search<'a>(repos: &'a [Repository], query: &str) -> Vec<&'a Repository> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return repos.iter().collect();
    }

    repos
        .iter()
        .filter(|repo| {
            repo.name.to_lowercase().contains(&needle)
                || repo
                    .description
                    .as_deref()
                    .is_some_and(|d| d.to_lowercase().contains(&needle))
        })
        .collect()
}

/// 语言精确匹配（区分大小写）
pub fn filter_by_language<'a>(repos: Vec<&'a Repository>, language: &LanguageFilter) -> Vec<&'a Repository> {
    match language {
        LanguageFilter::All => repos,
        LanguageFilter::Only(lang) => repos
            .into_iter()
            .filter(|repo| repo.language.as_deref() == Some(lang.as_str()))
            .collect(),
    }
}

pub fn sort(mut repos: Vec<&Repository>, key: SortKey) -> Vec<Repository> {
    // sort_by 是稳定排序
    match key {
        SortKey::Name => repos.sort_by(|a, b| locale_compare(&a.name, &b.name)),
        SortKey::Stars => repos.sort_by(|a, b| b.stargazers_count.cmp(&a.stargazers_count)),
        SortKey::Forks => repos.sort_by(|a, b| b.forks_count.cmp(&a.forks_count)),
        SortKey::Updated => repos.sort_by(|a, b| b.updated_at.cmp(&a.updated_at)),
    }
    repos.into_iter().cloned().collect()
}

/// 当前集合中出现过的语言，去重后升序
pub fn unique_languages(repos: &[Repository]) -> Vec<String> {
    repos
        .iter()
        .filter_map(|repo| repo.language.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// 近似 ICU 根排序规则的名称比较
///
/// 一级比较：标点 < 数字 < 字母，字母忽略大小写；
/// 一级相同时小写排在大写前面。
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    let primary = a
        .chars()
        .map(primary_weight)
        .cmp(b.chars().map(primary_weight));

    primary.then_with(|| {
        a.chars()
            .map(case_weight)
            .cmp(b.chars().map(case_weight))
    })
}

fn primary_weight(c: char) -> (u8, u32) {
    match c {
        '_' => (0, 0),
        '-' => (0, 1),
        '.' => (0, 2),
        c if c.is_whitespace() => (0, 3),
        c if c.is_ascii_punctuation() => (1, c as u32),
        c if c.is_numeric() => (2, c.to_digit(10).unwrap_or(c as u32)),
        c if c.is_alphabetic() => {
            let folded = c.to_lowercase().next().unwrap_or(c);
            (3, folded as u32)
        }
        c => (4, c as u32),
    }
}

fn case_weight(c: char) -> u8 {
    if c.is_uppercase() { 1 } else { 0 }
}
