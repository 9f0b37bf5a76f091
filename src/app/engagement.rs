use anyhow::Result;
use serde_json::json;
use sqlx::postgres::PgRow;
use sqlx::{Postgres, Row, Transaction};
use uuid::Uuid;

use crate::app::notifications::NotificationService;
use crate::app::posts::{post_from_row, POST_COLUMNS};
use crate::domain::engagement::{Comment, LikeSet, LikeTarget, LikeToggle};
use crate::domain::post::Post;
use crate::infra::db::Db;

const COMMENT_COLUMNS: &str = "id, post_id, author_id, body, likes, created_at";

#[derive(Clone)]
pub struct EngagementService {
    db: Db,
}

/// Likes and author of a row locked for the duration of a toggle.
struct LockedLikes {
    author_id: Uuid,
    likes: LikeSet,
}

impl EngagementService {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Flips `user_id`'s membership in the post's likes. `None` when the post
    /// does not exist; nothing is written in that case.
    pub async fn toggle_post_like(
        &self,
        post_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<LikeToggle<Post>>> {
        let mut tx = self.db.pool().begin().await?;

        let Some(mut locked) = lock_likes(&mut tx, LikeTarget::Post, post_id).await? else {
            tx.rollback().await?;
            return Ok(None);
        };
        let liked = locked.likes.toggle(user_id);

        let row = sqlx::query(&format!(
            "UPDATE posts SET likes = $2 WHERE id = $1 RETURNING {POST_COLUMNS}"
        ))
        .bind(post_id)
        .bind(locked.likes.as_slice())
        .fetch_one(&mut *tx)
        .await?;
        let post = post_from_row(&row);

        if liked && locked.author_id != user_id {
            NotificationService::create_with_tx(
                &mut tx,
                locked.author_id,
                LikeTarget::Post.notification_kind(),
                json!({ "post_id": post_id, "liked_by": user_id }),
            )
            .await?;
        }

        tx.commit().await?;
        Ok(Some(LikeToggle { entity: post, liked }))
    }

    pub async fn toggle_comment_like(
        &self,
        comment_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<LikeToggle<Comment>>> {
        let mut tx = self.db.pool().begin().await?;

        let Some(mut locked) = lock_likes(&mut tx, LikeTarget::Comment, comment_id).await? else {
            tx.rollback().await?;
            return Ok(None);
        };
        let liked = locked.likes.toggle(user_id);

        let row = sqlx::query(&format!(
            "UPDATE comments SET likes = $2 WHERE id = $1 RETURNING {COMMENT_COLUMNS}"
        ))
        .bind(comment_id)
        .bind(locked.likes.as_slice())
        .fetch_one(&mut *tx)
        .await?;
        let comment = comment_from_row(&row);

        if liked && locked.author_id != user_id {
            NotificationService::create_with_tx(
                &mut tx,
                locked.author_id,
                LikeTarget::Comment.notification_kind(),
                json!({
                    "comment_id": comment_id,
                    "post_id": comment.post_id,
                    "liked_by": user_id,
                }),
            )
            .await?;
        }

        tx.commit().await?;
        Ok(Some(LikeToggle {
            entity: comment,
            liked,
        }))
    }

    /// `None` when the post does not exist.
    pub async fn comment_post(
        &self,
        post_id: Uuid,
        author_id: Uuid,
        body: String,
    ) -> Result<Option<Comment>> {
        let row = sqlx::query(&format!(
            "INSERT INTO comments (post_id, author_id, body) \
             SELECT id, $2, $3 FROM posts WHERE id = $1 \
             RETURNING {COMMENT_COLUMNS}"
        ))
        .bind(post_id)
        .bind(author_id)
        .bind(body)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.as_ref().map(comment_from_row))
    }

    /// Oldest first. `None` when the post does not exist.
    pub async fn list_comments(&self, post_id: Uuid, limit: i64) -> Result<Option<Vec<Comment>>> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM posts WHERE id = $1)")
            .bind(post_id)
            .fetch_one(self.db.pool())
            .await?;
        if !exists {
            return Ok(None);
        }

        let rows = sqlx::query(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments \
             WHERE post_id = $1 \
             ORDER BY created_at ASC, id ASC \
             LIMIT $2"
        ))
        .bind(post_id)
        .bind(limit)
        .fetch_all(self.db.pool())
        .await?;

        Ok(Some(rows.iter().map(comment_from_row).collect()))
    }
}

/// Reads the likes column with a row lock so concurrent toggles on the same
/// row serialize instead of overwriting each other.
async fn lock_likes(
    tx: &mut Transaction<'_, Postgres>,
    target: LikeTarget,
    id: Uuid,
) -> Result<Option<LockedLikes>> {
    let sql = match target {
        LikeTarget::Post => "SELECT author_id, likes FROM posts WHERE id = $1 FOR UPDATE",
        LikeTarget::Comment => "SELECT author_id, likes FROM comments WHERE id = $1 FOR UPDATE",
    };
    let row = sqlx::query(sql).bind(id).fetch_optional(&mut **tx).await?;

    Ok(row.map(|row| LockedLikes {
        author_id: row.get("author_id"),
        likes: LikeSet::from(row.get::<Vec<Uuid>, _>("likes")),
    }))
}

fn comment_from_row(row: &PgRow) -> Comment {
    Comment {
        id: row.get("id"),
        post_id: row.get("post_id"),
        author_id: row.get("author_id"),
        body: row.get("body"),
        likes: LikeSet::from(row.get::<Vec<Uuid>, _>("likes")),
        created_at: row.get("created_at"),
    }
}
