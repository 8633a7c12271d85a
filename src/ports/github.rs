use async_trait::async_trait;
use std::collections::HashMap;
use crate::domain::entities::{CreateRepoPayload, OwnerProfile, Repository, UpdateRepoPayload};
use crate::shared::result::Result;

/// GitHub 远端接口
///
/// 每次调用最多产生一个错误，不做重试，由调用方处理。
#[async_trait]
pub trait GitHubPort: Send + Sync {
    /// 获取用户资料
    async fn get_user(&self) -> Result<OwnerProfile>;

    /// 获取一页仓库（按更新时间倒序）
    async fn list_repositories(&self, page: u32, per_page: u32) -> Result<Vec<Repository>>;

    /// 根据名称获取仓库
    async fn get_repository(&self, name: &str) -> Result<Repository>;

    /// 创建仓库（需要 token）
    async fn create_repository(&self, payload: &CreateRepoPayload) -> Result<Repository>;

    /// 更新仓库（需要 token）
    async fn update_repository(&self, name: &str, payload: &UpdateRepoPayload) -> Result<Repository>;

    /// 删除仓库（需要 token）
    async fn delete_repository(&self, name: &str) -> Result<()>;

    /// 获取语言 -> 字节数
    async fn get_languages(&self, name: &str) -> Result<HashMap<String, u64>>;

    /// 获取 README 原文，不存在时返回空字符串
    async fn get_readme(&self, name: &str) -> String;
}
