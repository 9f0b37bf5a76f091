use anyhow::Result;
use serde_json::Value;
use sqlx::postgres::PgRow;
use sqlx::{Postgres, Row, Transaction};
use uuid::Uuid;

use crate::domain::notification::Notification;
use crate::infra::db::Db;

#[derive(Clone)]
pub struct NotificationService {
    db: Db,
}

impl NotificationService {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Inserts a notification as part of a caller's transaction.
    pub async fn create_with_tx(
        tx: &mut Transaction<'_, Postgres>,
        user_id: Uuid,
        kind: &str,
        payload: Value,
    ) -> Result<()> {
        sqlx::query("INSERT INTO notifications (user_id, kind, payload) VALUES ($1, $2, $3)")
            .bind(user_id)
            .bind(kind)
            .bind(payload)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    pub async fn list(&self, user_id: Uuid, unread_only: bool, limit: i64) -> Result<Vec<Notification>> {
        let rows = sqlx::query(
            "SELECT id, user_id, kind, payload, read_at, created_at \
             FROM notifications \
             WHERE user_id = $1 AND (NOT $2 OR read_at IS NULL) \
             ORDER BY created_at DESC, id DESC \
             LIMIT $3",
        )
        .bind(user_id)
        .bind(unread_only)
        .bind(limit)
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows.iter().map(notification_from_row).collect())
    }

    /// Returns the updated notification, or `None` if it does not belong to
    /// `user_id` or was already read.
    pub async fn mark_read(&self, notification_id: Uuid, user_id: Uuid) -> Result<Option<Notification>> {
        let row = sqlx::query(
            "UPDATE notifications \
             SET read_at = now() \
             WHERE id = $1 AND user_id = $2 AND read_at IS NULL \
             RETURNING id, user_id, kind, payload, read_at, created_at",
        )
        .bind(notification_id)
        .bind(user_id)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.as_ref().map(notification_from_row))
    }
}

fn notification_from_row(row: &PgRow) -> Notification {
    Notification {
        id: row.get("id"),
        user_id: row.get("user_id"),
        kind: row.get("kind"),
        payload: row.get("payload"),
        read_at: row.get("read_at"),
        created_at: row.get("created_at"),
    }
}
