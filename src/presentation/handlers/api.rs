use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use std::sync::Arc;
use crate::domain::entities::{CreateRepoPayload, Repository, RepositoryDetail, UpdateRepoPayload};
use crate::presentation::dto::{DeleteRequest, ListQuery, StatusDto};
use crate::presentation::routes::AppContext;
use crate::services::controller::{DashboardView, LoadPhase};
use crate::shared::result::Result;

/// API: 加载状态
pub async fn api_status(State(ctx): State<Arc<AppContext>>) -> Json<StatusDto> {
    Json(StatusDto {
        phase: ctx.controller.phase().await,
        username: ctx.config.github.username.clone(),
        authenticated: ctx.config.has_token(),
    })
}

/// API: 当前页的仓库，查询参数与主页相同
pub async fn api_list_repositories(
    State(ctx): State<Arc<AppContext>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<DashboardView>> {
    ctx.controller.update_query(query.into_update()?).await;
    Ok(Json(ctx.controller.view().await))
}

pub async fn api_languages(State(ctx): State<Arc<AppContext>>) -> Json<Vec<String>> {
    Json(ctx.controller.languages().await)
}

/// API: 仓库详情（含语言占比和 README）
pub async fn api_get_repository(
    State(ctx): State<Arc<AppContext>>,
    Path(name): Path<String>,
) -> Result<Json<RepositoryDetail>> {
    Ok(Json(ctx.controller.repository_detail(&name).await?))
}

pub async fn api_create_repository(
    State(ctx): State<Arc<AppContext>>,
    Json(payload): Json<CreateRepoPayload>,
) -> Result<(StatusCode, Json<Repository>)> {
    let created = ctx.controller.create_repository(payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn api_update_repository(
    State(ctx): State<Arc<AppContext>>,
    Path(name): Path<String>,
    Json(payload): Json<UpdateRepoPayload>,
) -> Result<Json<Repository>> {
    Ok(Json(ctx.controller.update_repository(&name, payload).await?))
}

/// API: 删除仓库，请求体需带上完整的仓库名作为确认
pub async fn api_delete_repository(
    State(ctx): State<Arc<AppContext>>,
    Path(name): Path<String>,
    Json(req): Json<DeleteRequest>,
) -> Result<StatusCode> {
    ctx.controller.delete_repository(&name, &req.confirm).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// API: 重新加载全部数据
pub async fn api_reload(State(ctx): State<Arc<AppContext>>) -> Result<Json<LoadPhase>> {
    ctx.controller.reload().await?;
    Ok(Json(ctx.controller.phase().await))
}

pub async fn api_dismiss_notice(State(ctx): State<Arc<AppContext>>) -> StatusCode {
    ctx.controller.dismiss_notice().await;
    StatusCode::NO_CONTENT
}
