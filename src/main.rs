use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use anyhow::Context;
use clap::Parser;
use axum::http::{HeaderValue, Method};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod shared;
mod domain;
mod ports;
mod infrastructure;
mod services;
mod presentation;

use shared::config::{Config, EnvOverrides};
use infrastructure::github::GitHubClient;
use presentation::routes::AppContext;
use services::controller::DashboardController;


#[derive(Parser, Debug)]
#[clap(name = "repodash")]
#[clap(version)]
#[clap(about = "GitHub repository dashboard")]
pub struct Args {
    /// Path to the TOML config file (missing file means defaults)
    #[clap(short, long, value_parser, env = "REPODASH_CONFIG", default_value = "repodash.toml")]
    config: PathBuf,

    /// Server bind address, overrides config and REPODASH_BIND
    #[clap(short, long)]
    bind_address: Option<SocketAddr>,

    /// Emit logs as JSON
    #[clap(long)]
    json_logs: bool,
}


#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    // 初始化日志
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("repodash=info,tower_http=info"));
    if args.json_logs {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    // 加载配置
    let config = Config::load(&args.config, EnvOverrides::from_env(), args.bind_address)
        .with_context(|| format!("Failed to load configuration from {}", args.config.display()))?;
    let config = Arc::new(config);

    info!("Starting repodash...");
    info!("Configuration loaded: {:?}", config);
    if !config.has_token() {
        warn!("No GitHub token configured, create/update/delete will be rejected by GitHub");
    }

    let github = Arc::new(GitHubClient::new(&config.github).context("Failed to create GitHub client")?);
    let controller = Arc::new(DashboardController::new(config.clone(), github));

    // 后台加载，加载期间页面显示 loading
    let loader = controller.clone();
    tokio::spawn(async move {
        if let Err(e) = loader.initialize().await {
            warn!(kind = e.kind(), "Initial load failed: {}", e);
        }
    });

    let app_context = Arc::new(AppContext {
        controller: controller.clone(),
        config: config.clone(),
    });

    let origins = config
        .server
        .cors_origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .with_context(|| format!("Invalid CORS origin {}", origin))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let serve_dir_service = ServeDir::new("statics");

    let app = presentation::routes::create_app_router(app_context)
        .nest_service("/statics", serve_dir_service)
        .layer(CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE]))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&config.server.bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind_address))?;

    info!("Server listening on {}", config.server.bind_address);
    info!("Web UI available at: http://{}/", config.server.bind_address);
    info!("API available at: http://{}/api/", config.server.bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(controller))
        .await
        .context("Server error")?;

    Ok(())
}

async fn shutdown_signal(controller: Arc<DashboardController>) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutting down...");
    controller.teardown();
}
