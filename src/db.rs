use std::path::Path;

use sqlx::{SqlitePool, sqlite::SqliteConnectOptions};

use crate::error::AppError;

/// 建立 SQLite 连接池并设置常用 PRAGMA。
///
/// 动画表与用户表共用同一个连接池，由启动流程创建后注入各自的存储。
pub async fn connect_sqlite(path: &str, wal: bool) -> Result<SqlitePool, AppError> {
    let opt = SqliteConnectOptions::new()
        .filename(Path::new(path))
        .create_if_missing(true);
    let pool = SqlitePool::connect_with(opt)
        .await
        .map_err(|e| AppError::Database(format!("sqlite connect: {e}")))?;
    if wal {
        sqlx::query("PRAGMA journal_mode=WAL;")
            .execute(&pool)
            .await
            .ok();
    }
    sqlx::query("PRAGMA synchronous=NORMAL;")
        .execute(&pool)
        .await
        .ok();
    sqlx::query("PRAGMA foreign_keys=ON;")
        .execute(&pool)
        .await
        .ok();
    Ok(pool)
}
