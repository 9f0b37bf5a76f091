use anyhow::Result;
use sqlx::postgres::PgRow;
use sqlx::Row;
use uuid::Uuid;

use crate::app::search::optional_pattern;
use crate::domain::listing::{Blog, ListingFilter, NewBlog};
use crate::infra::db::Db;

#[derive(Clone)]
pub struct BlogService {
    db: Db,
}

impl BlogService {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    pub async fn create(&self, author_id: Uuid, blog: NewBlog) -> Result<Blog> {
        let row = sqlx::query(
            "INSERT INTO blogs (author_id, title, body) VALUES ($1, $2, $3) \
             RETURNING id, author_id, title, body, created_at",
        )
        .bind(author_id)
        .bind(blog.title)
        .bind(blog.body)
        .fetch_one(self.db.pool())
        .await?;

        Ok(blog_from_row(&row))
    }

    pub async fn get(&self, blog_id: Uuid) -> Result<Option<Blog>> {
        let row = sqlx::query(
            "SELECT id, author_id, title, body, created_at FROM blogs WHERE id = $1",
        )
        .bind(blog_id)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.as_ref().map(blog_from_row))
    }

    /// Newest first. Blogs carry no category, so only `search` and `limit`
    /// apply.
    pub async fn list(&self, filter: &ListingFilter) -> Result<Vec<Blog>> {
        let rows = sqlx::query(
            "SELECT id, author_id, title, body, created_at FROM blogs \
             WHERE $1::text IS NULL \
                OR title ILIKE $1 ESCAPE '\\' \
                OR body ILIKE $1 ESCAPE '\\' \
             ORDER BY created_at DESC, id DESC \
             LIMIT $2",
        )
        .bind(optional_pattern(filter.search.as_deref()))
        .bind(filter.limit)
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows.iter().map(blog_from_row).collect())
    }
}

fn blog_from_row(row: &PgRow) -> Blog {
    Blog {
        id: row.get("id"),
        author_id: row.get("author_id"),
        title: row.get("title"),
        body: row.get("body"),
        created_at: row.get("created_at"),
    }
}
