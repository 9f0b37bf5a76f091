use anyhow::Result;
use sqlx::postgres::PgRow;
use sqlx::Row;
use uuid::Uuid;

use crate::app::search::optional_pattern;
use crate::domain::listing::{Event, ListingFilter, NewEvent};
use crate::infra::db::Db;

const EVENT_COLUMNS: &str =
    "id, organizer_id, title, description, category, location, starts_at, created_at";

#[derive(Clone)]
pub struct EventService {
    db: Db,
}

impl EventService {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    pub async fn create(&self, organizer_id: Uuid, event: NewEvent) -> Result<Event> {
        let row = sqlx::query(&format!(
            "INSERT INTO events (organizer_id, title, description, category, location, starts_at) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {EVENT_COLUMNS}"
        ))
        .bind(organizer_id)
        .bind(event.title)
        .bind(event.description)
        .bind(event.category)
        .bind(event.location)
        .bind(event.starts_at)
        .fetch_one(self.db.pool())
        .await?;

        Ok(event_from_row(&row))
    }

    pub async fn get(&self, event_id: Uuid) -> Result<Option<Event>> {
        let row = sqlx::query(&format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1"))
            .bind(event_id)
            .fetch_optional(self.db.pool())
            .await?;

        Ok(row.as_ref().map(event_from_row))
    }

    /// Soonest first. With `upcoming_only`, events that already started are
    /// skipped.
    pub async fn list(&self, filter: &ListingFilter, upcoming_only: bool) -> Result<Vec<Event>> {
        let rows = sqlx::query(&format!(
            "SELECT {EVENT_COLUMNS} FROM events \
             WHERE ($1::text IS NULL OR category = $1) \
               AND ($2::text IS NULL \
                    OR title ILIKE $2 ESCAPE '\\' \
                    OR description ILIKE $2 ESCAPE '\\' \
                    OR location ILIKE $2 ESCAPE '\\') \
               AND (NOT $3 OR starts_at >= now()) \
             ORDER BY starts_at ASC, id ASC \
             LIMIT $4"
        ))
        .bind(filter.category.as_deref())
        .bind(optional_pattern(filter.search.as_deref()))
        .bind(upcoming_only)
        .bind(filter.limit)
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows.iter().map(event_from_row).collect())
    }
}

fn event_from_row(row: &PgRow) -> Event {
    Event {
        id: row.get("id"),
        organizer_id: row.get("organizer_id"),
        title: row.get("title"),
        description: row.get("description"),
        category: row.get("category"),
        location: row.get("location"),
        starts_at: row.get("starts_at"),
        created_at: row.get("created_at"),
    }
}
