use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use super::directory::UserDirectory;
use super::models::{UserAccount, parse_roles};
use crate::error::AppError;

/// SQLite 用户目录
#[derive(Clone)]
pub struct UserStorage {
    pub pool: SqlitePool,
}

impl UserStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn init_schema(&self) -> Result<(), AppError> {
        let ddl = r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE COLLATE NOCASE,
            password_hash TEXT NOT NULL,
            roles TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#;
        sqlx::query(ddl)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("init users schema: {e}")))?;
        Ok(())
    }

    /// 写入或更新账号（幂等，按用户名冲突合并）
    pub async fn upsert_user(
        &self,
        username: &str,
        password_hash: &str,
        roles_csv: &str,
        now_rfc3339: &str,
    ) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO users(username, password_hash, roles, created_at, updated_at) VALUES(?,?,?,?,?)
             ON CONFLICT(username) DO UPDATE SET
               password_hash = excluded.password_hash,
               roles = excluded.roles,
               updated_at = excluded.updated_at",
        )
        .bind(username)
        .bind(password_hash)
        .bind(roles_csv)
        .bind(now_rfc3339)
        .bind(now_rfc3339)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(format!("upsert user: {e}")))?;
        Ok(())
    }
}

#[async_trait]
impl UserDirectory for UserStorage {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserAccount>, AppError> {
        let row = sqlx::query("SELECT id, username, password_hash, roles FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("query user: {e}")))?;
        let Some(r) = row else {
            return Ok(None);
        };
        let roles = parse_roles(&r.get::<String, _>("roles"))
            .map_err(|_| AppError::Internal("用户目录中的角色数据非法".into()))?;
        Ok(Some(UserAccount {
            id: r.get("id"),
            username: r.get("username"),
            password_hash: r.get("password_hash"),
            roles,
        }))
    }
}
