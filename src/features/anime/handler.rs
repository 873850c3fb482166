use axum::{
    Extension, Router,
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
};

use super::models::Anime;
use super::service::ensure_non_empty_name;
use crate::error::{AppError, ErrorResponse};
use crate::features::auth::middleware::require_admin;
use crate::features::auth::models::AuthenticatedUser;
use crate::state::AppState;

/// 创建请求体约束：id 必须缺省（由服务端分配），名称非空。
fn ensure_new_payload(anime: &Anime) -> Result<(), AppError> {
    if anime.id.is_some() {
        return Err(AppError::Validation("创建时不允许携带 id".into()));
    }
    ensure_non_empty_name(anime)
}

#[utoipa::path(
    get,
    path = "/animes",
    summary = "动画列表",
    description = "返回全部动画记录，需要 admin 角色。",
    security(("BasicAuth" = [])),
    responses(
        (status = 200, description = "动画列表", body = [Anime]),
        (status = 401, description = "未认证", body = ErrorResponse),
        (status = 403, description = "缺少 admin 角色", body = ErrorResponse)
    ),
    tag = "Anime"
)]
pub async fn list_all(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<Anime>>, AppError> {
    require_admin(&user)?;
    tracing::info!("查询全部动画");
    Ok(Json(state.anime_service.find_all().await?))
}

#[utoipa::path(
    get,
    path = "/animes/{id}",
    summary = "按 id 查询动画",
    params(("id" = i64, Path, description = "动画 ID")),
    security(("BasicAuth" = [])),
    responses(
        (status = 200, description = "动画记录", body = Anime),
        (status = 401, description = "未认证", body = ErrorResponse),
        (status = 404, description = "动画不存在", body = ErrorResponse)
    ),
    tag = "Anime"
)]
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Anime>, AppError> {
    tracing::info!("按 id 查询动画: {id}");
    Ok(Json(state.anime_service.find_by_id(id).await?))
}

#[utoipa::path(
    post,
    path = "/animes",
    summary = "创建动画",
    description = "请求体不携带 id（由服务端分配），名称必填且非空。",
    request_body = Anime,
    security(("BasicAuth" = [])),
    responses(
        (status = 201, description = "创建成功，返回持久化记录", body = Anime),
        (status = 400, description = "请求体校验失败", body = ErrorResponse),
        (status = 401, description = "未认证", body = ErrorResponse)
    ),
    tag = "Anime"
)]
pub async fn save(
    State(state): State<AppState>,
    Json(anime): Json<Anime>,
) -> Result<(StatusCode, Json<Anime>), AppError> {
    ensure_new_payload(&anime)?;
    tracing::info!("创建动画: {}", anime.name);
    let saved = state.anime_service.save(anime).await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

#[utoipa::path(
    post,
    path = "/animes/batch",
    summary = "批量创建动画",
    description = "逐条持久化并按序返回。某条记录名称为空时以 400 终止，此前已写入的记录不回滚。",
    request_body = Vec<Anime>,
    security(("BasicAuth" = [])),
    responses(
        (status = 201, description = "创建成功，按写入顺序返回持久化记录", body = [Anime]),
        (status = 400, description = "存在名称为空的记录", body = ErrorResponse),
        (status = 401, description = "未认证", body = ErrorResponse)
    ),
    tag = "Anime"
)]
pub async fn save_batch(
    State(state): State<AppState>,
    Json(animes): Json<Vec<Anime>>,
) -> Result<(StatusCode, Json<Vec<Anime>>), AppError> {
    tracing::info!("批量创建动画: {} 条", animes.len());
    let saved = state.anime_service.save_all(animes).await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

#[utoipa::path(
    put,
    path = "/animes/{id}",
    summary = "更新动画",
    description = "以路径中的 id 覆盖请求体 id。目标不存在时返回 404。",
    params(("id" = i64, Path, description = "动画 ID")),
    request_body = Anime,
    security(("BasicAuth" = [])),
    responses(
        (status = 204, description = "更新成功，无响应体"),
        (status = 400, description = "请求体校验失败", body = ErrorResponse),
        (status = 401, description = "未认证", body = ErrorResponse),
        (status = 404, description = "动画不存在", body = ErrorResponse)
    ),
    tag = "Anime"
)]
pub async fn update_anime(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(anime): Json<Anime>,
) -> Result<StatusCode, AppError> {
    ensure_non_empty_name(&anime)?;
    tracing::info!("更新动画: id={id}");
    state.anime_service.update(anime.with_id(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete,
    path = "/animes/{id}",
    summary = "删除动画",
    params(("id" = i64, Path, description = "动画 ID")),
    security(("BasicAuth" = [])),
    responses(
        (status = 204, description = "删除成功，无响应体"),
        (status = 401, description = "未认证", body = ErrorResponse),
        (status = 404, description = "动画不存在", body = ErrorResponse)
    ),
    tag = "Anime"
)]
pub async fn delete_anime(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    tracing::info!("删除动画: id={id}");
    state.anime_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn create_anime_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_all).post(save))
        .route("/batch", post(save_batch))
        .route("/:id", get(get_by_id).put(update_anime).delete(delete_anime))
}
