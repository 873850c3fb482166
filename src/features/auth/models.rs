use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// 用户角色（闭集）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// 普通用户：可访问除列表外的全部动画接口
    User,
    /// 管理员：额外允许访问动画列表
    Admin,
}

impl Role {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "user" => Some(Role::User),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

/// 解析逗号分隔的角色列表；未知角色视为配置错误
pub fn parse_roles(csv: &str) -> Result<Vec<Role>, AppError> {
    let mut roles = Vec::new();
    for part in csv.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let role = Role::parse(part)
            .ok_or_else(|| AppError::Validation(format!("未知角色: {part}")))?;
        if !roles.contains(&role) {
            roles.push(role);
        }
    }
    if roles.is_empty() {
        return Err(AppError::Validation("角色列表不能为空".into()));
    }
    Ok(roles)
}

/// 用户目录中的账号记录
#[derive(Debug, Clone)]
pub struct UserAccount {
    pub id: i64,
    pub username: String,
    /// HMAC-SHA256 口令散列（hex）
    pub password_hash: String,
    pub roles: Vec<Role>,
}

/// 认证通过后附加到请求扩展上的身份
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub username: String,
    pub roles: Vec<Role>,
}

impl AuthenticatedUser {
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}
