use std::sync::Arc;

use crate::features::anime::service::AnimeService;
use crate::features::auth::directory::UserDirectory;

/// 聚合的应用共享状态
#[derive(Clone)]
pub struct AppState {
    /// 动画资源服务
    pub anime_service: Arc<AnimeService>,
    /// 用户目录（Basic 认证的身份解析来源）
    pub user_directory: Arc<dyn UserDirectory>,
    /// 口令散列密钥（HMAC-SHA256）
    pub auth_hash_secret: Arc<String>,
}
