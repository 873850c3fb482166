use async_trait::async_trait;
use futures_util::stream::{self, BoxStream, StreamExt};
use sqlx::{Row, SqlitePool};

use super::models::Anime;
use super::repository::AnimeRepository;
use crate::error::AppError;

/// SQLite 动画仓储
#[derive(Clone)]
pub struct AnimeStorage {
    pub pool: SqlitePool,
}

impl AnimeStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn init_schema(&self) -> Result<(), AppError> {
        let ddl = r#"
        CREATE TABLE IF NOT EXISTS anime (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL
        );
        "#;
        sqlx::query(ddl)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("init anime schema: {e}")))?;
        Ok(())
    }
}

fn row_to_anime(row: &sqlx::sqlite::SqliteRow) -> Anime {
    Anime {
        id: Some(row.get::<i64, _>("id")),
        name: row.get::<String, _>("name"),
    }
}

async fn insert_or_update(pool: &SqlitePool, mut anime: Anime) -> Result<Anime, AppError> {
    match anime.id {
        Some(id) => {
            sqlx::query(
                "INSERT INTO anime(id, name) VALUES(?, ?)
                 ON CONFLICT(id) DO UPDATE SET name = excluded.name",
            )
            .bind(id)
            .bind(&anime.name)
            .execute(pool)
            .await
            .map_err(|e| AppError::Database(format!("save anime: {e}")))?;
        }
        None => {
            let res = sqlx::query("INSERT INTO anime(name) VALUES(?)")
                .bind(&anime.name)
                .execute(pool)
                .await
                .map_err(|e| AppError::Database(format!("insert anime: {e}")))?;
            anime.id = Some(res.last_insert_rowid());
        }
    }
    Ok(anime)
}

#[async_trait]
impl AnimeRepository for AnimeStorage {
    async fn find_all(&self) -> Result<Vec<Anime>, AppError> {
        let rows = sqlx::query("SELECT id, name FROM anime ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("query animes: {e}")))?;
        Ok(rows.iter().map(row_to_anime).collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Anime>, AppError> {
        let row = sqlx::query("SELECT id, name FROM anime WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("query anime by id: {e}")))?;
        Ok(row.as_ref().map(row_to_anime))
    }

    async fn save(&self, anime: Anime) -> Result<Anime, AppError> {
        insert_or_update(&self.pool, anime).await
    }

    fn save_all(&self, animes: Vec<Anime>) -> BoxStream<'static, Result<Anime, AppError>> {
        let pool = self.pool.clone();
        stream::iter(animes)
            .then(move |anime| {
                let pool = pool.clone();
                async move { insert_or_update(&pool, anime).await }
            })
            .boxed()
    }

    async fn delete(&self, anime: &Anime) -> Result<(), AppError> {
        let Some(id) = anime.id else {
            return Ok(());
        };
        sqlx::query("DELETE FROM anime WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("delete anime: {e}")))?;
        Ok(())
    }
}
