use askama::Template;
use axum::{
    extract::{Form, Path, Query, State},
    http::{StatusCode, Uri},
    response::{Html, IntoResponse, Redirect, Response},
};
use std::any::Any;
use std::sync::Arc;
use tracing::{error, warn};
use crate::presentation::dto::{CreateRepoForm, DeleteRepoForm, ListQuery, UpdateRepoForm};
use crate::presentation::routes::AppContext;
use crate::presentation::templates::*;
use crate::services::controller::LoadPhase;
use crate::shared::error::DashboardError;
use crate::shared::result::Result;

fn render<T: Template>(status: StatusCode, template: T) -> Result<Response> {
    Ok((status, Html(template.render()?)).into_response())
}

/// 加载中或加载失败时直接渲染对应页面
fn render_phase(phase: &LoadPhase) -> Option<Result<Response>> {
    match phase {
        LoadPhase::Ready => None,
        LoadPhase::Initializing => Some(render(
            StatusCode::OK,
            LoadingTemplate {
                message: "Loading repositories...".to_string(),
            },
        )),
        LoadPhase::Error(message) => Some(render(
            StatusCode::SERVICE_UNAVAILABLE,
            ErrorTemplate {
                title: "Error".to_string(),
                message: message.clone(),
                retry: true,
            },
        )),
    }
}

async fn render_index(ctx: &AppContext, status: StatusCode, form_error: Option<String>) -> Result<Response> {
    let view = ctx.controller.view().await;
    if let Some(page) = render_phase(&view.phase) {
        return page;
    }
    render(status, IndexTemplate::from_view(view, form_error, ctx.config.has_token()))
}

async fn render_detail(ctx: &AppContext, name: &str, status: StatusCode, form_error: Option<String>) -> Result<Response> {
    match ctx.controller.repository_detail(name).await {
        Ok(detail) => render(status, DetailTemplate::new(detail, form_error, ctx.config.has_token())),
        Err(DashboardError::NotFound(_)) => render(
            StatusCode::NOT_FOUND,
            NotFoundTemplate {
                path: format!("/repository/{}", name),
            },
        ),
        Err(e) => render(
            e.status_code(),
            ErrorTemplate {
                title: "Could not load repository".to_string(),
                message: e.user_message(),
                retry: false,
            },
        ),
    }
}

/// 主页 - 仓库列表
pub async fn list_repositories(
    State(ctx): State<Arc<AppContext>>,
    Query(query): Query<ListQuery>,
) -> Result<Response> {
    let form_error = match query.into_update() {
        Ok(update) => {
            ctx.controller.update_query(update).await;
            None
        }
        Err(e) => Some(e.user_message()),
    };

    let status = if form_error.is_some() { StatusCode::BAD_REQUEST } else { StatusCode::OK };
    render_index(&ctx, status, form_error).await
}

/// 仓库详情页
pub async fn repository_detail(
    State(ctx): State<Arc<AppContext>>,
    Path(name): Path<String>,
) -> Result<Response> {
    render_detail(&ctx, &name, StatusCode::OK, None).await
}

/// 创建仓库表单提交
pub async fn create_repository_form(
    State(ctx): State<Arc<AppContext>>,
    Form(form): Form<CreateRepoForm>,
) -> Result<Response> {
    match ctx.controller.create_repository(form.into()).await {
        Ok(_) => Ok(Redirect::to("/").into_response()),
        Err(e) => render_index(&ctx, e.status_code(), Some(e.user_message())).await,
    }
}

/// 更新仓库表单提交，改名后跳到新地址
pub async fn update_repository_form(
    State(ctx): State<Arc<AppContext>>,
    Path(name): Path<String>,
    Form(form): Form<UpdateRepoForm>,
) -> Result<Response> {
    let payload = form.into_payload(&name);
    match ctx.controller.update_repository(&name, payload).await {
        Ok(repo) => Ok(Redirect::to(&repo_href(&repo.name)).into_response()),
        Err(e) => render_detail(&ctx, &name, e.status_code(), Some(e.user_message())).await,
    }
}

/// 删除仓库表单提交
pub async fn delete_repository_form(
    State(ctx): State<Arc<AppContext>>,
    Path(name): Path<String>,
    Form(form): Form<DeleteRepoForm>,
) -> Result<Response> {
    match ctx.controller.delete_repository(&name, &form.confirm).await {
        Ok(()) => Ok(Redirect::to("/").into_response()),
        Err(e) => render_detail(&ctx, &name, e.status_code(), Some(e.user_message())).await,
    }
}

pub async fn dismiss_notice(State(ctx): State<Arc<AppContext>>) -> Redirect {
    ctx.controller.dismiss_notice().await;
    Redirect::to("/")
}

/// 重新加载；失败时主页会显示错误页
pub async fn reload(State(ctx): State<Arc<AppContext>>) -> Redirect {
    if let Err(e) = ctx.controller.reload().await {
        warn!(kind = e.kind(), "Reload failed: {}", e);
    }
    Redirect::to("/")
}

pub async fn not_found(uri: Uri) -> Result<Response> {
    render(
        StatusCode::NOT_FOUND,
        NotFoundTemplate {
            path: uri.path().to_string(),
        },
    )
}

/// 处理请求时发生 panic，返回错误页而不是断开连接
pub fn panic_page(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!(kind = "panic", "Request handler panicked: {}", detail);

    let page = ErrorTemplate {
        title: "Something went wrong".to_string(),
        message: "An unexpected error occurred while rendering this page.".to_string(),
        retry: false,
    };
    match page.render() {
        Ok(html) => (StatusCode::INTERNAL_SERVER_ERROR, Html(html)).into_response(),
        Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong").into_response(),
    }
}
