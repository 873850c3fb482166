use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::stream::{self, BoxStream, StreamExt};
use tokio::sync::RwLock;

use super::models::Anime;
use crate::error::AppError;

/// 动画仓储抽象。
///
/// 覆盖 find-all / find-by-id / save / save-all / delete 五种能力；
/// `save_all` 返回逐条持久化的惰性流，消费一条写入一条，
/// 中途停止消费时剩余元素不会入库。
#[async_trait]
pub trait AnimeRepository: Send + Sync {
    /// 返回全部记录（顺序由实现决定）
    async fn find_all(&self) -> Result<Vec<Anime>, AppError>;

    /// 按 id 查找
    async fn find_by_id(&self, id: i64) -> Result<Option<Anime>, AppError>;

    /// 持久化一条记录；`id` 为空时由仓储分配
    async fn save(&self, anime: Anime) -> Result<Anime, AppError>;

    /// 逐条持久化并按序回吐已保存的记录
    fn save_all(&self, animes: Vec<Anime>) -> BoxStream<'static, Result<Anime, AppError>>;

    /// 按实体删除
    async fn delete(&self, anime: &Anime) -> Result<(), AppError>;
}

#[derive(Debug, Default)]
struct InMemoryInner {
    rows: BTreeMap<i64, Anime>,
    next_id: i64,
}

/// 内存仓储实现，主要用于测试与本地演示。
#[derive(Debug, Clone, Default)]
pub struct InMemoryAnimeRepository {
    inner: Arc<RwLock<InMemoryInner>>,
}

impl InMemoryAnimeRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AnimeRepository for InMemoryAnimeRepository {
    async fn find_all(&self) -> Result<Vec<Anime>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner.rows.values().cloned().collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Anime>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner.rows.get(&id).cloned())
    }

    async fn save(&self, mut anime: Anime) -> Result<Anime, AppError> {
        let mut inner = self.inner.write().await;
        let id = match anime.id {
            Some(id) => id,
            None => {
                inner.next_id += 1;
                inner.next_id
            }
        };
        anime.id = Some(id);
        inner.rows.insert(id, anime.clone());
        Ok(anime)
    }

    fn save_all(&self, animes: Vec<Anime>) -> BoxStream<'static, Result<Anime, AppError>> {
        let repo = self.clone();
        stream::iter(animes)
            .then(move |anime| {
                let repo = repo.clone();
                async move { repo.save(anime).await }
            })
            .boxed()
    }

    async fn delete(&self, anime: &Anime) -> Result<(), AppError> {
        let Some(id) = anime.id else {
            return Ok(());
        };
        let mut inner = self.inner.write().await;
        inner.rows.remove(&id);
        Ok(())
    }
}
