use anyhow::Result;
use sqlx::postgres::PgRow;
use sqlx::Row;
use uuid::Uuid;

use crate::app::search::optional_pattern;
use crate::domain::listing::{ListingFilter, NewProperty, Property};
use crate::infra::db::Db;

const PROPERTY_COLUMNS: &str =
    "id, owner_id, name, description, category, location, price, created_at";

#[derive(Clone)]
pub struct PropertyService {
    db: Db,
}

impl PropertyService {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    pub async fn create(&self, owner_id: Uuid, property: NewProperty) -> Result<Property> {
        let row = sqlx::query(&format!(
            "INSERT INTO properties (owner_id, name, description, category, location, price) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {PROPERTY_COLUMNS}"
        ))
        .bind(owner_id)
        .bind(property.name)
        .bind(property.description)
        .bind(property.category)
        .bind(property.location)
        .bind(property.price)
        .fetch_one(self.db.pool())
        .await?;

        Ok(property_from_row(&row))
    }

    pub async fn get(&self, property_id: Uuid) -> Result<Option<Property>> {
        let row = sqlx::query(&format!(
            "SELECT {PROPERTY_COLUMNS} FROM properties WHERE id = $1"
        ))
        .bind(property_id)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.as_ref().map(property_from_row))
    }

    /// Newest first.
    pub async fn list(&self, filter: &ListingFilter) -> Result<Vec<Property>> {
        let rows = sqlx::query(&format!(
            "SELECT {PROPERTY_COLUMNS} FROM properties \
             WHERE ($1::text IS NULL OR category = $1) \
               AND ($2::text IS NULL \
                    OR name ILIKE $2 ESCAPE '\\' \
                    OR description ILIKE $2 ESCAPE '\\' \
                    OR location ILIKE $2 ESCAPE '\\') \
             ORDER BY created_at DESC, id DESC \
             LIMIT $3"
        ))
        .bind(filter.category.as_deref())
        .bind(optional_pattern(filter.search.as_deref()))
        .bind(filter.limit)
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows.iter().map(property_from_row).collect())
    }
}

fn property_from_row(row: &PgRow) -> Property {
    Property {
        id: row.get("id"),
        owner_id: row.get("owner_id"),
        name: row.get("name"),
        description: row.get("description"),
        category: row.get("category"),
        location: row.get("location"),
        price: row.get("price"),
        created_at: row.get("created_at"),
    }
}
