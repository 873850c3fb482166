/// 领域模型
pub mod models;

/// 仓储抽象与内存实现
pub mod repository;

/// SQLite 仓储实现
pub mod storage;

/// 动画资源服务
pub mod service;

/// HTTP 处理器与路由
pub mod handler;

pub use handler::create_anime_router;
pub use models::Anime;
pub use repository::{AnimeRepository, InMemoryAnimeRepository};
pub use service::AnimeService;
pub use storage::AnimeStorage;
