use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
    middleware,
};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64_STANDARD};
use serde_json::json;
use tower::ServiceExt;

use anime_backend::features::anime::{
    Anime, AnimeRepository, AnimeService, InMemoryAnimeRepository, create_anime_router,
};
use anime_backend::features::auth::directory::InMemoryUserDirectory;
use anime_backend::features::auth::middleware::{basic_auth_middleware, hash_password};
use anime_backend::features::auth::models::{Role, UserAccount};
use anime_backend::state::AppState;

const HASH_SECRET: &str = "contract-test-secret";
const ADMIN_USER: &str = "nelson";
const REGULAR_USER: &str = "user";
const PASSWORD: &str = "devdojo";

fn build_state(repo: InMemoryAnimeRepository) -> AppState {
    let directory = InMemoryUserDirectory::new()
        .with_user(UserAccount {
            id: 1,
            username: ADMIN_USER.into(),
            password_hash: hash_password(HASH_SECRET, PASSWORD),
            roles: vec![Role::Admin, Role::User],
        })
        .with_user(UserAccount {
            id: 2,
            username: REGULAR_USER.into(),
            password_hash: hash_password(HASH_SECRET, PASSWORD),
            roles: vec![Role::User],
        });
    AppState {
        anime_service: Arc::new(AnimeService::new(Arc::new(repo))),
        user_directory: Arc::new(directory),
        auth_hash_secret: Arc::new(HASH_SECRET.to_string()),
    }
}

/// 与生产装配一致：/api/v1 下挂载动画路由，Basic 认证中间件前置
fn build_app(state: AppState) -> Router {
    let api = Router::new()
        .nest("/animes", create_anime_router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            basic_auth_middleware,
        ));
    Router::new().nest("/api/v1", api).with_state(state)
}

fn basic_auth(username: &str, password: &str) -> String {
    format!(
        "Basic {}",
        BASE64_STANDARD.encode(format!("{username}:{password}"))
    )
}

fn request(method: &str, uri: &str, auth: Option<&str>, body: Option<serde_json::Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    match body {
        Some(v) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&v).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn body_json(resp: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("parse json")
}

async fn assert_error_body(resp: axum::response::Response, status: u16) {
    let v = body_json(resp).await;
    assert_eq!(v["status"], status);
    if status == 400 || status == 404 {
        assert_eq!(v["developerMessage"], "A ResponseStatusException Happened");
    } else {
        assert!(v["developerMessage"].is_string());
    }
}

// ============ 认证与角色 ============

#[tokio::test]
async fn list_returns_unauthorized_when_not_authenticated() {
    let app = build_app(build_state(InMemoryAnimeRepository::new()));
    let resp = app
        .oneshot(request("GET", "/api/v1/animes", None, None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let challenge = resp
        .headers()
        .get(header::WWW_AUTHENTICATE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    assert!(challenge.starts_with("Basic"), "got: {challenge}");
    assert_error_body(resp, 401).await;
}

#[tokio::test]
async fn list_returns_forbidden_without_admin_role() {
    let app = build_app(build_state(InMemoryAnimeRepository::new()));
    let resp = app
        .oneshot(request(
            "GET",
            "/api/v1/animes",
            Some(&basic_auth(REGULAR_USER, PASSWORD)),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_error_body(resp, 403).await;
}

#[tokio::test]
async fn wrong_password_returns_unauthorized() {
    let app = build_app(build_state(InMemoryAnimeRepository::new()));
    let resp = app
        .oneshot(request(
            "GET",
            "/api/v1/animes/1",
            Some(&basic_auth(REGULAR_USER, "wrong")),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn get_by_id_is_allowed_for_regular_user() {
    let repo = InMemoryAnimeRepository::new();
    repo.save(Anime::new("Dragon Ball")).await.unwrap();
    let app = build_app(build_state(repo));

    let resp = app
        .oneshot(request(
            "GET",
            "/api/v1/animes/1",
            Some(&basic_auth(REGULAR_USER, PASSWORD)),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

// ============ 列表与按 id 查询 ============

#[tokio::test]
async fn list_returns_animes_for_admin() {
    let repo = InMemoryAnimeRepository::new();
    repo.save(Anime::new("Dragon Ball")).await.unwrap();
    let app = build_app(build_state(repo));

    let resp = app
        .oneshot(request(
            "GET",
            "/api/v1/animes",
            Some(&basic_auth(ADMIN_USER, PASSWORD)),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let v = body_json(resp).await;
    assert_eq!(v.as_array().unwrap().len(), 1);
    assert_eq!(v[0]["id"], 1);
    assert_eq!(v[0]["name"], "Dragon Ball");
}

#[tokio::test]
async fn get_by_id_returns_not_found_when_missing() {
    let app = build_app(build_state(InMemoryAnimeRepository::new()));
    let resp = app
        .oneshot(request(
            "GET",
            "/api/v1/animes/1",
            Some(&basic_auth(REGULAR_USER, PASSWORD)),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_error_body(resp, 404).await;
}

// ============ 创建 ============

#[tokio::test]
async fn create_and_fetch_round_trip() {
    let state = build_state(InMemoryAnimeRepository::new());

    let resp = build_app(state.clone())
        .oneshot(request(
            "POST",
            "/api/v1/animes",
            Some(&basic_auth(ADMIN_USER, PASSWORD)),
            Some(json!({"name": "Dragon Ball"})),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created = body_json(resp).await;
    assert_eq!(created["name"], "Dragon Ball");
    let id = created["id"].as_i64().expect("assigned id");

    let resp = build_app(state)
        .oneshot(request(
            "GET",
            &format!("/api/v1/animes/{id}"),
            Some(&basic_auth(REGULAR_USER, PASSWORD)),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let fetched = body_json(resp).await;
    assert_eq!(fetched["name"], "Dragon Ball");
}

#[tokio::test]
async fn create_with_empty_name_returns_bad_request() {
    let app = build_app(build_state(InMemoryAnimeRepository::new()));
    let resp = app
        .oneshot(request(
            "POST",
            "/api/v1/animes",
            Some(&basic_auth(ADMIN_USER, PASSWORD)),
            Some(json!({"name": ""})),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_error_body(resp, 400).await;
}

#[tokio::test]
async fn create_with_absent_name_returns_bad_request() {
    let app = build_app(build_state(InMemoryAnimeRepository::new()));
    let resp = app
        .oneshot(request(
            "POST",
            "/api/v1/animes",
            Some(&basic_auth(ADMIN_USER, PASSWORD)),
            Some(json!({})),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_error_body(resp, 400).await;
}

#[tokio::test]
async fn create_with_explicit_id_returns_bad_request() {
    let app = build_app(build_state(InMemoryAnimeRepository::new()));
    let resp = app
        .oneshot(request(
            "POST",
            "/api/v1/animes",
            Some(&basic_auth(ADMIN_USER, PASSWORD)),
            Some(json!({"id": 5, "name": "Dragon Ball"})),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_error_body(resp, 400).await;
}

// ============ 批量创建 ============

#[tokio::test]
async fn batch_create_returns_records_in_emission_order() {
    let app = build_app(build_state(InMemoryAnimeRepository::new()));
    let resp = app
        .oneshot(request(
            "POST",
            "/api/v1/animes/batch",
            Some(&basic_auth(ADMIN_USER, PASSWORD)),
            Some(json!([{"name": "Dragon Ball"}, {"name": "Naruto"}])),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let v = body_json(resp).await;
    assert_eq!(v.as_array().unwrap().len(), 2);
    assert_eq!(v[0]["id"], 1);
    assert_eq!(v[0]["name"], "Dragon Ball");
    assert_eq!(v[1]["id"], 2);
    assert_eq!(v[1]["name"], "Naruto");
}

#[tokio::test]
async fn batch_create_fails_on_invalid_element_without_rollback() {
    let repo = InMemoryAnimeRepository::new();
    let state = build_state(repo.clone());

    let resp = build_app(state)
        .oneshot(request(
            "POST",
            "/api/v1/animes/batch",
            Some(&basic_auth(ADMIN_USER, PASSWORD)),
            Some(json!([{"name": "Dragon Ball"}, {"name": ""}, {"name": "Naruto"}])),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_error_body(resp, 400).await;

    // 失败元素之前（含失败元素）已入库且不回滚，其后的元素未入库
    let rows = repo.find_all().await.unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].name, "Dragon Ball");
    assert_eq!(rows[1].name, "");
}

// ============ 更新 ============

#[tokio::test]
async fn update_persists_and_returns_no_content() {
    let repo = InMemoryAnimeRepository::new();
    repo.save(Anime::new("Dragon Ball")).await.unwrap();
    let state = build_state(repo);

    let resp = build_app(state.clone())
        .oneshot(request(
            "PUT",
            "/api/v1/animes/1",
            Some(&basic_auth(ADMIN_USER, PASSWORD)),
            Some(json!({"name": "Dragon Ball Super"})),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    assert!(bytes.is_empty());

    let resp = build_app(state)
        .oneshot(request(
            "GET",
            "/api/v1/animes/1",
            Some(&basic_auth(REGULAR_USER, PASSWORD)),
            None,
        ))
        .await
        .unwrap();
    let v = body_json(resp).await;
    assert_eq!(v["name"], "Dragon Ball Super");
}

#[tokio::test]
async fn update_with_empty_name_returns_bad_request() {
    let repo = InMemoryAnimeRepository::new();
    repo.save(Anime::new("Dragon Ball")).await.unwrap();
    let app = build_app(build_state(repo));

    let resp = app
        .oneshot(request(
            "PUT",
            "/api/v1/animes/1",
            Some(&basic_auth(ADMIN_USER, PASSWORD)),
            Some(json!({"name": ""})),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_error_body(resp, 400).await;
}

#[tokio::test]
async fn update_returns_not_found_when_missing() {
    let app = build_app(build_state(InMemoryAnimeRepository::new()));
    let resp = app
        .oneshot(request(
            "PUT",
            "/api/v1/animes/1",
            Some(&basic_auth(ADMIN_USER, PASSWORD)),
            Some(json!({"name": "Dragon Ball Super"})),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_error_body(resp, 404).await;
}

// ============ 删除 ============

#[tokio::test]
async fn delete_returns_no_content_then_get_returns_not_found() {
    let repo = InMemoryAnimeRepository::new();
    repo.save(Anime::new("Dragon Ball")).await.unwrap();
    let state = build_state(repo);

    let resp = build_app(state.clone())
        .oneshot(request(
            "DELETE",
            "/api/v1/animes/1",
            Some(&basic_auth(ADMIN_USER, PASSWORD)),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    assert!(bytes.is_empty());

    let resp = build_app(state)
        .oneshot(request(
            "GET",
            "/api/v1/animes/1",
            Some(&basic_auth(REGULAR_USER, PASSWORD)),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_returns_not_found_when_missing() {
    let app = build_app(build_state(InMemoryAnimeRepository::new()));
    let resp = app
        .oneshot(request(
            "DELETE",
            "/api/v1/animes/1",
            Some(&basic_auth(ADMIN_USER, PASSWORD)),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_error_body(resp, 404).await;
}
