use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::validation::{
    normalize_category, optional_text, required_text, FieldError, FieldErrors,
};

pub const DEFAULT_LIST_LIMIT: i64 = 50;
pub const MAX_LIST_LIMIT: i64 = 100;

const MAX_NAME_LEN: usize = 200;
const MAX_DESCRIPTION_LEN: usize = 5_000;
const MAX_CATEGORY_LEN: usize = 50;
const MAX_LOCATION_LEN: usize = 200;
const MAX_BLOG_BODY_LEN: usize = 50_000;

/// Optional narrowing applied to a listing read. Blank values are absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingFilter {
    pub category: Option<String>,
    pub search: Option<String>,
    pub limit: i64,
}

impl ListingFilter {
    pub fn new(
        category: Option<String>,
        search: Option<String>,
        limit: Option<i64>,
    ) -> Result<Self, FieldError> {
        let limit = limit.unwrap_or(DEFAULT_LIST_LIMIT);
        if !(1..=MAX_LIST_LIMIT).contains(&limit) {
            return Err(FieldError::new(
                "limit",
                format!("must be between 1 and {}", MAX_LIST_LIMIT),
            ));
        }
        Ok(Self {
            category: category
                .map(|c| normalize_category(&c))
                .filter(|c| !c.is_empty()),
            search: search
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            limit,
        })
    }
}

impl Default for ListingFilter {
    fn default() -> Self {
        Self {
            category: None,
            search: None,
            limit: DEFAULT_LIST_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Property {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub description: String,
    pub category: String,
    pub location: String,
    /// Asking price in whole taka.
    pub price: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreatePropertyRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub price: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewProperty {
    pub name: String,
    pub description: String,
    pub category: String,
    pub location: String,
    pub price: i64,
}

impl CreatePropertyRequest {
    pub fn validate(self) -> Result<NewProperty, FieldErrors> {
        let mut errors = Vec::new();
        let name = required_text("name", self.name, MAX_NAME_LEN, &mut errors);
        let description =
            optional_text("description", self.description, MAX_DESCRIPTION_LEN, &mut errors);
        let category = required_text("category", self.category, MAX_CATEGORY_LEN, &mut errors);
        let location = required_text("location", self.location, MAX_LOCATION_LEN, &mut errors);
        let price = match self.price {
            Some(price) if price >= 0 => Some(price),
            Some(_) => {
                errors.push(FieldError::new("price", "must not be negative"));
                None
            }
            None => {
                errors.push(FieldError::new("price", "is required"));
                None
            }
        };

        match (name, category, location, price) {
            (Some(name), Some(category), Some(location), Some(price)) if errors.is_empty() => {
                Ok(NewProperty {
                    name,
                    description: description.unwrap_or_default(),
                    category: normalize_category(&category),
                    location,
                    price,
                })
            }
            _ => Err(FieldErrors(errors)),
        }
    }
}

/// A local service offering (plumber, tutor, movers, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceListing {
    pub id: Uuid,
    pub provider_id: Uuid,
    pub name: String,
    pub description: String,
    pub category: String,
    pub location: String,
    pub rating: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateServiceRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub rating: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewServiceListing {
    pub name: String,
    pub description: String,
    pub category: String,
    pub location: String,
    pub rating: f64,
}

impl CreateServiceRequest {
    pub fn validate(self) -> Result<NewServiceListing, FieldErrors> {
        let mut errors = Vec::new();
        let name = required_text("name", self.name, MAX_NAME_LEN, &mut errors);
        let description =
            optional_text("description", self.description, MAX_DESCRIPTION_LEN, &mut errors);
        let category = required_text("category", self.category, MAX_CATEGORY_LEN, &mut errors);
        let location = required_text("location", self.location, MAX_LOCATION_LEN, &mut errors);
        let rating = self.rating.unwrap_or(0.0);
        if !(0.0..=5.0).contains(&rating) {
            errors.push(FieldError::new("rating", "must be between 0 and 5"));
        }

        match (name, category, location) {
            (Some(name), Some(category), Some(location)) if errors.is_empty() => {
                Ok(NewServiceListing {
                    name,
                    description: description.unwrap_or_default(),
                    category: normalize_category(&category),
                    location,
                    rating,
                })
            }
            _ => Err(FieldErrors(errors)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub organizer_id: Uuid,
    pub title: String,
    pub description: String,
    pub category: String,
    pub location: String,
    #[serde(with = "time::serde::rfc3339")]
    pub starts_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
    /// RFC 3339 timestamp.
    pub starts_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub category: String,
    pub location: String,
    pub starts_at: OffsetDateTime,
}

impl CreateEventRequest {
    pub fn validate(self) -> Result<NewEvent, FieldErrors> {
        let mut errors = Vec::new();
        let title = required_text("title", self.title, MAX_NAME_LEN, &mut errors);
        let description =
            optional_text("description", self.description, MAX_DESCRIPTION_LEN, &mut errors);
        let category = required_text("category", self.category, MAX_CATEGORY_LEN, &mut errors);
        let location = required_text("location", self.location, MAX_LOCATION_LEN, &mut errors);
        let starts_at = match self.starts_at.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => match OffsetDateTime::parse(raw, &Rfc3339) {
                Ok(starts_at) => Some(starts_at),
                Err(_) => {
                    errors.push(FieldError::new("starts_at", "must be an RFC 3339 timestamp"));
                    None
                }
            },
            _ => {
                errors.push(FieldError::new("starts_at", "is required"));
                None
            }
        };

        match (title, category, location, starts_at) {
            (Some(title), Some(category), Some(location), Some(starts_at)) if errors.is_empty() => {
                Ok(NewEvent {
                    title,
                    description: description.unwrap_or_default(),
                    category: normalize_category(&category),
                    location,
                    starts_at,
                })
            }
            _ => Err(FieldErrors(errors)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Blog {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub body: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateBlogRequest {
    pub title: Option<String>,
    pub body: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewBlog {
    pub title: String,
    pub body: String,
}

impl CreateBlogRequest {
    pub fn validate(self) -> Result<NewBlog, FieldErrors> {
        let mut errors = Vec::new();
        let title = required_text("title", self.title, MAX_NAME_LEN, &mut errors);
        let body = required_text("body", self.body, MAX_BLOG_BODY_LEN, &mut errors);
        match (title, body) {
            (Some(title), Some(body)) if errors.is_empty() => Ok(NewBlog { title, body }),
            _ => Err(FieldErrors(errors)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_treats_blank_values_as_absent() {
        let filter = ListingFilter::new(Some("  ".into()), Some("".into()), None).unwrap();
        assert_eq!(filter, ListingFilter::default());
    }

    #[test]
    fn filter_normalizes_category_and_trims_search() {
        let filter =
            ListingFilter::new(Some(" Villa ".into()), Some("  pool ".into()), Some(10)).unwrap();
        assert_eq!(filter.category.as_deref(), Some("villa"));
        assert_eq!(filter.search.as_deref(), Some("pool"));
        assert_eq!(filter.limit, 10);
    }

    #[test]
    fn filter_rejects_out_of_range_limit() {
        assert_eq!(ListingFilter::new(None, None, Some(0)).unwrap_err().field, "limit");
        assert!(ListingFilter::new(None, None, Some(MAX_LIST_LIMIT + 1)).is_err());
        assert!(ListingFilter::new(None, None, Some(MAX_LIST_LIMIT)).is_ok());
    }

    #[test]
    fn property_collects_every_missing_field() {
        let errors = CreatePropertyRequest::default().validate().unwrap_err();
        let fields: Vec<_> = errors.0.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["name", "category", "location", "price"]);
    }

    #[test]
    fn property_rejects_negative_price() {
        let errors = CreatePropertyRequest {
            name: Some("Lake view flat".into()),
            category: Some("apartment".into()),
            location: Some("Gulshan".into()),
            price: Some(-1),
            ..Default::default()
        }
        .validate()
        .unwrap_err();
        assert_eq!(errors.0, vec![FieldError::new("price", "must not be negative")]);
    }

    #[test]
    fn property_category_is_normalized() {
        let property = CreatePropertyRequest {
            name: Some("Lake view flat".into()),
            category: Some("Apartment".into()),
            location: Some("Gulshan".into()),
            price: Some(25_000),
            description: None,
        }
        .validate()
        .unwrap();
        assert_eq!(property.category, "apartment");
        assert_eq!(property.description, "");
    }

    #[test]
    fn service_rating_defaults_and_is_bounded() {
        let request = || CreateServiceRequest {
            name: Some("Rahim Plumbing".into()),
            category: Some("plumbing".into()),
            location: Some("Dhanmondi".into()),
            ..Default::default()
        };
        assert_eq!(request().validate().unwrap().rating, 0.0);

        let mut too_high = request();
        too_high.rating = Some(5.5);
        assert_eq!(too_high.validate().unwrap_err().0[0].field, "rating");
    }

    #[test]
    fn event_requires_rfc3339_start() {
        let request = |starts_at: Option<&str>| CreateEventRequest {
            title: Some("Eid fair".into()),
            category: Some("festival".into()),
            location: Some("Banani field".into()),
            starts_at: starts_at.map(str::to_string),
            ..Default::default()
        };

        assert_eq!(
            request(None).validate().unwrap_err().0,
            vec![FieldError::new("starts_at", "is required")]
        );
        assert_eq!(
            request(Some("next friday")).validate().unwrap_err().0[0].message,
            "must be an RFC 3339 timestamp"
        );
        let event = request(Some("2026-04-10T16:00:00+06:00")).validate().unwrap();
        assert_eq!(event.starts_at.offset().whole_hours(), 6);
    }

    #[test]
    fn blog_requires_title_and_body() {
        assert!(CreateBlogRequest {
            title: Some("Moving tips".into()),
            body: None,
        }
        .validate()
        .is_err());
    }
}
