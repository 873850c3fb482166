use std::sync::Arc;

use futures_util::StreamExt;

use super::models::Anime;
use super::repository::AnimeRepository;
use crate::error::AppError;

/// 校验名称非空。
///
/// 创建/更新请求体与批量保存回吐的记录共用这一约束。
pub fn ensure_non_empty_name(anime: &Anime) -> Result<(), AppError> {
    if anime.name.is_empty() {
        return Err(AppError::Validation("名称不能为空".into()));
    }
    Ok(())
}

/// 动画资源服务：路由层与仓储之间的直通编排。
pub struct AnimeService {
    repository: Arc<dyn AnimeRepository>,
}

impl AnimeService {
    pub fn new(repository: Arc<dyn AnimeRepository>) -> Self {
        Self { repository }
    }

    /// 返回仓储中的全部记录（顺序由仓储决定）
    pub async fn find_all(&self) -> Result<Vec<Anime>, AppError> {
        self.repository.find_all().await
    }

    /// 按 id 查找，未命中返回 NotFound
    pub async fn find_by_id(&self, id: i64) -> Result<Anime, AppError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("不存在的动画: id={id}")))
    }

    /// 持久化新条目并返回带 id 的记录
    pub async fn save(&self, anime: Anime) -> Result<Anime, AppError> {
        self.repository.save(anime).await
    }

    /// 批量保存。
    ///
    /// 仓储流逐条持久化、逐条校验：某条回吐记录名称为空时立即以
    /// ValidationError 终止。此前已持久化的记录保留（不回滚），
    /// 其后的元素不再消费、也不会入库。
    pub async fn save_all(&self, animes: Vec<Anime>) -> Result<Vec<Anime>, AppError> {
        let mut stream = self.repository.save_all(animes);
        let mut saved = Vec::new();
        while let Some(item) = stream.next().await {
            let anime = item?;
            ensure_non_empty_name(&anime)?;
            saved.push(anime);
        }
        Ok(saved)
    }

    /// 先确认存在（NotFound），再按调用方给定的 id 覆盖保存
    pub async fn update(&self, anime: Anime) -> Result<(), AppError> {
        let Some(id) = anime.id else {
            return Err(AppError::Validation("更新时必须携带 id".into()));
        };
        self.find_by_id(id).await?;
        self.repository.save(anime).await?;
        Ok(())
    }

    /// 先确认存在（NotFound），再删除
    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        let anime = self.find_by_id(id).await?;
        self.repository.delete(&anime).await
    }
}
