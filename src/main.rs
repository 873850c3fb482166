use std::sync::Arc;

use axum::{Router, http::StatusCode, middleware, response::Json, routing::get};
use serde_json::json;
use tower_http::compression::CompressionLayer;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use anime_backend::config::AppConfig;
use anime_backend::features::anime::{AnimeService, create_anime_router};
use anime_backend::features::auth::middleware::basic_auth_middleware;
use anime_backend::shutdown::ShutdownManager;
use anime_backend::startup::run_startup_checks;
use anime_backend::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(
        anime_backend::features::anime::handler::list_all,
        anime_backend::features::anime::handler::get_by_id,
        anime_backend::features::anime::handler::save,
        anime_backend::features::anime::handler::save_batch,
        anime_backend::features::anime::handler::update_anime,
        anime_backend::features::anime::handler::delete_anime,
        health_check,
    ),
    components(schemas(
        anime_backend::features::anime::Anime,
        anime_backend::error::ErrorResponse,
    )),
    modifiers(&BasicAuthSecurity),
    tags(
        (name = "Anime", description = "Anime CRUD APIs"),
        (name = "Health", description = "Health APIs"),
    ),
    info(
        title = "Anime Backend API",
        version = "0.1.0",
        description = "Anime CRUD backend service (Axum)"
    )
)]
pub struct ApiDoc;

struct BasicAuthSecurity;

impl Modify for BasicAuthSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "BasicAuth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Basic)),
        );
    }
}

#[utoipa::path(
    get,
    path = "/health",
    summary = "健康检查",
    description = "用于探活的健康检查端点，返回服务状态与版本信息。",
    responses((status = 200, description = "服务健康", body = serde_json::Value)),
    tag = "Health"
)]
async fn health_check() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "anime-backend",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "anime_backend=info,tower_http=info".into()),
        )
        .init();

    // 创建优雅退出管理器
    let shutdown_manager = ShutdownManager::new();

    // Load config
    if let Err(e) = AppConfig::init_global() {
        tracing::error!("Config init failed: {}", e);
        std::process::exit(1);
    }
    let config = AppConfig::global();

    // 启动信号处理器
    if let Err(e) = shutdown_manager.start_signal_handler().await {
        tracing::error!("信号处理器启动失败: {}", e);
        std::process::exit(1);
    }

    // Run startup checks: 数据库连接、建表、用户目录初始化
    let (anime_storage, user_storage) = match run_startup_checks(config).await {
        Ok(v) => v,
        Err(e) => {
            tracing::error!("Startup checks failed: {}", e);
            std::process::exit(1);
        }
    };

    // Shared state
    let app_state = AppState {
        anime_service: Arc::new(AnimeService::new(Arc::new(anime_storage))),
        user_directory: Arc::new(user_storage),
        auth_hash_secret: Arc::new(config.auth.hash_secret.clone()),
    };

    // Routes: 受保护的 API 统一前置 Basic 认证中间件
    let api_router = Router::<AppState>::new()
        .nest("/animes", create_anime_router())
        .layer(middleware::from_fn_with_state(
            app_state.clone(),
            basic_auth_middleware,
        ));

    let mut app = Router::<AppState>::new()
        .route("/health", get(health_check))
        .nest(&config.api.prefix, api_router)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(app_state);

    if let Some(cors) = anime_backend::cors::build_cors_layer(&config.cors) {
        app = app.layer(cors);
    }
    app = app.layer(middleware::from_fn(
        anime_backend::request_id::request_id_middleware,
    ));
    app = app.layer(CompressionLayer::new());

    let addr = config.server_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Bind address failed {}: {}", addr, e);
            std::process::exit(1);
        });

    tracing::info!("Server: http://{}", addr);
    tracing::info!("Docs: http://{}/docs", addr);
    tracing::info!("Health: http://{}/health", addr);
    tracing::info!("Anime API: http://{}{}/animes", addr, config.api.prefix);

    // 启动服务器并等待优雅退出信号
    let shutdown_timeout = config.shutdown.timeout_duration();
    let graceful = axum::serve(listener, app).with_graceful_shutdown(async move {
        let reason = shutdown_manager.wait_for_shutdown().await;
        tracing::info!("接收到退出信号: {:?}，开始优雅退出...", reason);

        // 超时兜底：存量连接迟迟不结束时强制退出
        tokio::spawn(async move {
            tokio::time::sleep(shutdown_timeout).await;
            tracing::warn!("优雅退出超时（{}s），强制退出", shutdown_timeout.as_secs());
            std::process::exit(0);
        });
    });

    if let Err(e) = graceful.await {
        tracing::error!("服务器运行错误: {}", e);
        std::process::exit(1);
    }

    tracing::info!("服务器已优雅关闭");
}
