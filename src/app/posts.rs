use anyhow::Result;
use sqlx::postgres::PgRow;
use sqlx::Row;
use uuid::Uuid;

use crate::app::search::optional_pattern;
use crate::domain::engagement::LikeSet;
use crate::domain::post::{NewPost, Post};
use crate::infra::db::Db;

pub(crate) const POST_COLUMNS: &str = "id, author_id, title, body, likes, created_at";

#[derive(Clone)]
pub struct PostService {
    db: Db,
}

impl PostService {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    pub async fn create_post(&self, author_id: Uuid, post: NewPost) -> Result<Post> {
        let row = sqlx::query(&format!(
            "INSERT INTO posts (author_id, title, body) VALUES ($1, $2, $3) \
             RETURNING {POST_COLUMNS}"
        ))
        .bind(author_id)
        .bind(post.title)
        .bind(post.body)
        .fetch_one(self.db.pool())
        .await?;

        Ok(post_from_row(&row))
    }

    pub async fn get_post(&self, post_id: Uuid) -> Result<Option<Post>> {
        let row = sqlx::query(&format!("SELECT {POST_COLUMNS} FROM posts WHERE id = $1"))
            .bind(post_id)
            .fetch_optional(self.db.pool())
            .await?;

        Ok(row.as_ref().map(post_from_row))
    }

    pub async fn list_posts(&self, search: Option<&str>, limit: i64) -> Result<Vec<Post>> {
        let rows = sqlx::query(&format!(
            "SELECT {POST_COLUMNS} FROM posts \
             WHERE ($1::text IS NULL \
                    OR title ILIKE $1 ESCAPE '\\' \
                    OR body ILIKE $1 ESCAPE '\\') \
             ORDER BY created_at DESC, id DESC \
             LIMIT $2"
        ))
        .bind(optional_pattern(search))
        .bind(limit)
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows.iter().map(post_from_row).collect())
    }
}

pub(crate) fn post_from_row(row: &PgRow) -> Post {
    Post {
        id: row.get("id"),
        author_id: row.get("author_id"),
        title: row.get("title"),
        body: row.get("body"),
        likes: LikeSet::from(row.get::<Vec<Uuid>, _>("likes")),
        created_at: row.get("created_at"),
    }
}
