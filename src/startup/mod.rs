//! 启动检查与存储初始化

use std::fs;
use std::path::Path;

use crate::config::AppConfig;
use crate::error::AppError;
use crate::features::anime::storage::AnimeStorage;
use crate::features::auth::middleware::hash_password;
use crate::features::auth::models::parse_roles;
use crate::features::auth::storage::UserStorage;

/// 执行启动检查并完成存储初始化
///
/// 1. 确保数据库目录存在
/// 2. 建立连接池并初始化表结构
/// 3. 将配置中的账号写入用户目录
pub async fn run_startup_checks(
    config: &AppConfig,
) -> Result<(AnimeStorage, UserStorage), AppError> {
    tracing::info!("开始执行启动检查...");

    ensure_database_dir(&config.database.path)?;

    let pool = crate::db::connect_sqlite(&config.database.path, config.database.wal).await?;
    let anime_storage = AnimeStorage::new(pool.clone());
    anime_storage.init_schema().await?;
    let user_storage = UserStorage::new(pool);
    user_storage.init_schema().await?;

    seed_users(config, &user_storage).await?;

    tracing::info!("启动检查完成");
    Ok((anime_storage, user_storage))
}

/// 确保数据库文件所在目录存在
fn ensure_database_dir(path: &str) -> Result<(), AppError> {
    if let Some(parent) = Path::new(path).parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        tracing::warn!("未找到数据库目录，正在创建: {:?}", parent);
        fs::create_dir_all(parent)
            .map_err(|e| AppError::Internal(format!("创建数据库目录失败: {e}")))?;
    }
    Ok(())
}

/// 将配置中的账号写入用户目录（幂等）
async fn seed_users(config: &AppConfig, storage: &UserStorage) -> Result<(), AppError> {
    if config.auth.users.is_empty() {
        tracing::warn!("auth.users 为空，所有受保护接口都将返回 401");
        return Ok(());
    }
    if config.auth.hash_secret.trim().is_empty() {
        return Err(AppError::Internal(
            "未配置口令散列密钥（auth.hash_secret 或 APP_AUTH_HASH_SECRET）".into(),
        ));
    }

    let now = chrono::Utc::now().to_rfc3339();
    for seed in &config.auth.users {
        let roles = parse_roles(&seed.roles)?;
        let roles_csv = roles
            .iter()
            .map(|r| r.as_str())
            .collect::<Vec<_>>()
            .join(",");
        let password_hash = hash_password(&config.auth.hash_secret, &seed.password);
        storage
            .upsert_user(&seed.username, &password_hash, &roles_csv, &now)
            .await?;
    }
    tracing::info!("用户目录初始化完成: {} 个账号", config.auth.users.len());
    Ok(())
}
