use std::collections::HashMap;

use async_trait::async_trait;

use super::models::UserAccount;
use crate::error::AppError;

/// 身份解析抽象：按用户名查找账号。
///
/// 用户名匹配忽略大小写，与 SQLite 实现的 `COLLATE NOCASE` 行为一致。
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserAccount>, AppError>;
}

/// 内存用户目录，主要用于测试。
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserDirectory {
    users: HashMap<String, UserAccount>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, account: UserAccount) -> Self {
        self.users
            .insert(account.username.to_ascii_lowercase(), account);
        self
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserAccount>, AppError> {
        Ok(self.users.get(&username.to_ascii_lowercase()).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::auth::models::Role;

    #[tokio::test]
    async fn lookup_is_case_insensitive() {
        let directory = InMemoryUserDirectory::new().with_user(UserAccount {
            id: 1,
            username: "Nelson".into(),
            password_hash: "h".into(),
            roles: vec![Role::Admin],
        });

        let found = directory.find_by_username("nelson").await.unwrap();
        assert!(found.is_some());
        assert!(
            directory
                .find_by_username("unknown")
                .await
                .unwrap()
                .is_none()
        );
    }
}
