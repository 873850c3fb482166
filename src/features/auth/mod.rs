/// 角色与账号模型
pub mod models;

/// 用户目录抽象与内存实现
pub mod directory;

/// SQLite 用户目录实现
pub mod storage;

/// Basic 认证中间件（凭证提取 → 身份解析 → 角色检查）
pub mod middleware;

pub use directory::{InMemoryUserDirectory, UserDirectory};
pub use middleware::{basic_auth_middleware, hash_password, require_admin};
pub use models::{AuthenticatedUser, Role, UserAccount};
pub use storage::UserStorage;
