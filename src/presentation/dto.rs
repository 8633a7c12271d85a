use serde::{Deserialize, Serialize};
use crate::domain::entities::{CreateRepoPayload, UpdateRepoPayload};
use crate::domain::value_objects::{LanguageFilter, SortKey};
use crate::services::controller::{LoadPhase, QueryUpdate};
use crate::shared::result::Result;

/// 列表页查询参数：`?q=&lang=&sort=&page=`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    pub q: Option<String>,
    pub lang: Option<String>,
    pub sort: Option<String>,
    pub page: Option<usize>,
}

impl ListQuery {
    pub fn into_update(self) -> Result<QueryUpdate> {
        let sort = match self.sort.as_deref() {
            Some(s) if !s.is_empty() => Some(s.parse::<SortKey>()?),
            _ => None,
        };

        Ok(QueryUpdate {
            search: self.q,
            language: self.lang.as_deref().map(LanguageFilter::parse),
            sort,
            page: self.page,
        })
    }
}

/// 状态 DTO
#[derive(Debug, Clone, Serialize)]
pub struct StatusDto {
    pub phase: LoadPhase,
    pub username: String,
    pub authenticated: bool,
}

/// 删除请求
#[derive(Debug, Clone, Deserialize)]
pub struct DeleteRequest {
    pub confirm: String,
}

/// 创建表单（HTML）
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRepoForm {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub homepage: String,
    /// 复选框，勾选时为 "on"
    pub private: Option<String>,
    pub auto_init: Option<String>,
}

impl From<CreateRepoForm> for CreateRepoPayload {
    fn from(form: CreateRepoForm) -> Self {
        Self {
            description: Some(form.description),
            homepage: Some(form.homepage),
            private: Some(form.private.is_some()),
            auto_init: Some(form.auto_init.is_some()),
            ..CreateRepoPayload::new(form.name)
        }
    }
}

/// 更新表单（HTML）
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateRepoForm {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub homepage: String,
    pub private: Option<String>,
}

impl UpdateRepoForm {
    /// 表单总是提交全部字段；名称没变时不发送 name
    pub fn into_payload(self, current_name: &str) -> UpdateRepoPayload {
        let name = self.name.trim().to_string();
        UpdateRepoPayload {
            name: (!name.is_empty() && name != current_name).then_some(name),
            description: Some(self.description),
            homepage: Some(self.homepage),
            private: Some(self.private.is_some()),
            default_branch: None,
        }
    }
}

/// 删除表单（HTML）
#[derive(Debug, Clone, Deserialize)]
pub struct DeleteRepoForm {
    #[serde(default)]
    pub confirm: String,
}
