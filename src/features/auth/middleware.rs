use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64_STANDARD};

use super::models::{AuthenticatedUser, Role};
use crate::{error::AppError, state::AppState};

/// 用配置密钥对口令做 HMAC-SHA256 散列（hex 编码）
pub fn hash_password(secret: &str, password: &str) -> String {
    use hmac::{Hmac, Mac};
    use sha2::Sha256;

    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).expect("hmac key");
    mac.update(password.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// 凭证提取：解析 `Authorization: Basic <base64(user:pass)>` 头
fn extract_basic_credentials(headers: &HeaderMap) -> Result<(String, String), AppError> {
    let raw = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Auth("缺少 Authorization 请求头".into()))?;
    let encoded = raw
        .strip_prefix("Basic ")
        .ok_or_else(|| AppError::Auth("仅支持 Basic 认证".into()))?
        .trim();
    let decoded = BASE64_STANDARD
        .decode(encoded)
        .map_err(|_| AppError::Auth("Basic 凭证不是合法的 base64".into()))?;
    let decoded =
        String::from_utf8(decoded).map_err(|_| AppError::Auth("Basic 凭证不是合法的 UTF-8".into()))?;
    let (username, password) = decoded
        .split_once(':')
        .ok_or_else(|| AppError::Auth("Basic 凭证缺少口令部分".into()))?;
    if username.is_empty() {
        return Err(AppError::Auth("用户名不能为空".into()));
    }
    Ok((username.to_string(), password.to_string()))
}

/// 身份解析：目录查找 + 口令散列比对
async fn resolve_identity(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<AuthenticatedUser, AppError> {
    let (username, password) = extract_basic_credentials(headers)?;
    let account = state
        .user_directory
        .find_by_username(&username)
        .await?
        .ok_or_else(|| AppError::Auth("用户名或口令错误".into()))?;
    let presented = hash_password(&state.auth_hash_secret, &password);
    if presented != account.password_hash {
        return Err(AppError::Auth("用户名或口令错误".into()));
    }
    Ok(AuthenticatedUser {
        username: account.username,
        roles: account.roles,
    })
}

/// Basic 认证中间件：凭证提取 → 身份解析 → 写入请求扩展。
///
/// 未认证的请求在进入资源服务之前被短路为 401。
pub async fn basic_auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    match resolve_identity(&state, req.headers()).await {
        Ok(user) => {
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        Err(e) => e.into_response(),
    }
}

/// 角色检查：要求 admin 角色。
///
/// 需要管理权限的 handler 在调用资源服务之前执行，未通过即短路为 403。
pub fn require_admin(user: &AuthenticatedUser) -> Result<(), AppError> {
    if !user.has_role(Role::Admin) {
        return Err(AppError::Forbidden(format!(
            "用户 {} 缺少 admin 角色",
            user.username
        )));
    }
    Ok(())
}
