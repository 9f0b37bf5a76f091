use anyhow::Result;
use sqlx::postgres::PgRow;
use sqlx::Row;
use uuid::Uuid;

use crate::app::search::optional_pattern;
use crate::domain::listing::{ListingFilter, NewServiceListing, ServiceListing};
use crate::infra::db::Db;

const SERVICE_COLUMNS: &str =
    "id, provider_id, name, description, category, location, rating, created_at";

#[derive(Clone)]
pub struct ServiceListingService {
    db: Db,
}

impl ServiceListingService {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    pub async fn create(
        &self,
        provider_id: Uuid,
        service: NewServiceListing,
    ) -> Result<ServiceListing> {
        let row = sqlx::query(&format!(
            "INSERT INTO services (provider_id, name, description, category, location, rating) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {SERVICE_COLUMNS}"
        ))
        .bind(provider_id)
        .bind(service.name)
        .bind(service.description)
        .bind(service.category)
        .bind(service.location)
        .bind(service.rating)
        .fetch_one(self.db.pool())
        .await?;

        Ok(service_from_row(&row))
    }

    pub async fn get(&self, service_id: Uuid) -> Result<Option<ServiceListing>> {
        let row = sqlx::query(&format!("SELECT {SERVICE_COLUMNS} FROM services WHERE id = $1"))
            .bind(service_id)
            .fetch_optional(self.db.pool())
            .await?;

        Ok(row.as_ref().map(service_from_row))
    }

    /// Highest rated first.
    pub async fn list(&self, filter: &ListingFilter) -> Result<Vec<ServiceListing>> {
        let rows = sqlx::query(&format!(
            "SELECT {SERVICE_COLUMNS} FROM services \
             WHERE ($1::text IS NULL OR category = $1) \
               AND ($2::text IS NULL \
                    OR name ILIKE $2 ESCAPE '\\' \
                    OR description ILIKE $2 ESCAPE '\\' \
                    OR location ILIKE $2 ESCAPE '\\') \
             ORDER BY rating DESC, created_at DESC, id DESC \
             LIMIT $3"
        ))
        .bind(filter.category.as_deref())
        .bind(optional_pattern(filter.search.as_deref()))
        .bind(filter.limit)
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows.iter().map(service_from_row).collect())
    }
}

fn service_from_row(row: &PgRow) -> ServiceListing {
    ServiceListing {
        id: row.get("id"),
        provider_id: row.get("provider_id"),
        name: row.get("name"),
        description: row.get("description"),
        category: row.get("category"),
        location: row.get("location"),
        rating: row.get("rating"),
        created_at: row.get("created_at"),
    }
}
