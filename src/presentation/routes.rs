use axum::{Router, routing::{get, post}};
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use crate::presentation::handlers;
use crate::services::controller::DashboardController;
use crate::shared::config::Config;

/// 应用状态
pub struct AppContext {
    pub controller: Arc<DashboardController>,
    pub config: Arc<Config>,
}

/// 创建应用路由
pub fn create_app_router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        // 主页 - 仓库列表
        .route("/", get(handlers::repository::list_repositories))

        // UI 路由 - 表单提交
        .route("/repositories", post(handlers::repository::create_repository_form))
        .route("/repository/{name}", get(handlers::repository::repository_detail))
        .route("/repository/{name}/update", post(handlers::repository::update_repository_form))
        .route("/repository/{name}/delete", post(handlers::repository::delete_repository_form))
        .route("/notice/dismiss", post(handlers::repository::dismiss_notice))
        .route("/reload", post(handlers::repository::reload))

        // API 路由
        .nest("/api", api_routes())

        .fallback(handlers::repository::not_found)
        .with_state(ctx)
        .layer(CatchPanicLayer::custom(handlers::repository::panic_page))
}

/// API 路由
fn api_routes() -> Router<Arc<AppContext>> {
    Router::new()
        .route("/status", get(handlers::api::api_status))
        .route("/languages", get(handlers::api::api_languages))
        .route("/reload", post(handlers::api::api_reload))
        .route("/notice/dismiss", post(handlers::api::api_dismiss_notice))

        // 仓库 API
        .route(
            "/repositories",
            get(handlers::api::api_list_repositories).post(handlers::api::api_create_repository),
        )
        .route(
            "/repositories/{name}",
            get(handlers::api::api_get_repository)
                .patch(handlers::api::api_update_repository)
                .delete(handlers::api::api_delete_repository),
        )
}
