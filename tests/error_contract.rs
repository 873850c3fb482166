use axum::{
    http::{StatusCode, header},
    response::IntoResponse,
};

/// 契约关键点：所有错误响应都是 `{status, developerMessage}` JSON，
/// 且 400/404 的 developerMessage 为固定文案。
#[tokio::test]
async fn not_found_response_matches_error_contract() {
    let resp = anime_backend::AppError::NotFound("id=42".into()).into_response();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let content_type = resp
        .headers()
        .get(header::CONTENT_TYPE)
        .expect("missing Content-Type")
        .to_str()
        .expect("invalid Content-Type");
    assert!(content_type.starts_with("application/json"), "got: {content_type}");

    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    let v: serde_json::Value = serde_json::from_slice(&bytes).expect("parse json");
    assert_eq!(v["status"], 404);
    assert_eq!(v["developerMessage"], "A ResponseStatusException Happened");
}

#[tokio::test]
async fn validation_response_matches_error_contract() {
    let resp = anime_backend::AppError::Validation("名称不能为空".into()).into_response();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    let v: serde_json::Value = serde_json::from_slice(&bytes).expect("parse json");
    assert_eq!(v["status"], 400);
    assert_eq!(v["developerMessage"], "A ResponseStatusException Happened");
}

#[tokio::test]
async fn auth_response_keeps_own_message_and_challenge() {
    let resp = anime_backend::AppError::Auth("用户名或口令错误".into()).into_response();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(resp.headers().contains_key(header::WWW_AUTHENTICATE));

    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    let v: serde_json::Value = serde_json::from_slice(&bytes).expect("parse json");
    assert_eq!(v["status"], 401);
    let msg = v["developerMessage"].as_str().unwrap_or("");
    assert!(msg.contains("用户名或口令错误"), "got: {msg}");
}
