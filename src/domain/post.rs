use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::engagement::LikeSet;
use crate::domain::validation::{required_text, FieldError, FieldErrors};

pub const MAX_TITLE_LEN: usize = 200;
pub const MAX_BODY_LEN: usize = 10_000;
pub const MAX_COMMENT_LEN: usize = 2_000;

/// Forum post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub body: String,
    pub likes: LikeSet,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreatePostRequest {
    pub title: Option<String>,
    pub body: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewPost {
    pub title: String,
    pub body: String,
}

impl CreatePostRequest {
    pub fn validate(self) -> Result<NewPost, FieldErrors> {
        let mut errors = Vec::new();
        let title = required_text("title", self.title, MAX_TITLE_LEN, &mut errors);
        let body = required_text("body", self.body, MAX_BODY_LEN, &mut errors);
        match (title, body) {
            (Some(title), Some(body)) if errors.is_empty() => Ok(NewPost { title, body }),
            _ => Err(FieldErrors(errors)),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateCommentRequest {
    pub body: Option<String>,
}

impl CreateCommentRequest {
    pub fn validate(self) -> Result<String, FieldErrors> {
        let mut errors: Vec<FieldError> = Vec::new();
        match required_text("body", self.body, MAX_COMMENT_LEN, &mut errors) {
            Some(body) if errors.is_empty() => Ok(body),
            _ => Err(FieldErrors(errors)),
        }
    }
}
