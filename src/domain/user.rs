use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::validation::{required_text, FieldError, FieldErrors};

pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_PASSWORD_LEN: usize = 128;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub handle: String,
    pub email: String,
    pub display_name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Profile as shown to other users; no email.
#[derive(Debug, Clone, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub handle: String,
    pub display_name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            handle: user.handle,
            display_name: user.display_name,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RegisterRequest {
    pub handle: Option<String>,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub handle: String,
    pub email: String,
    pub display_name: String,
    pub password: String,
}

impl RegisterRequest {
    pub fn validate(self) -> Result<NewUser, FieldErrors> {
        let mut errors = Vec::new();

        let handle = required_text("handle", self.handle, 30, &mut errors).and_then(|handle| {
            let valid = handle.len() >= 3
                && handle
                    .chars()
                    .all(|ch| ch.is_ascii_alphanumeric() || ch == '_');
            if valid {
                Some(handle.to_lowercase())
            } else {
                errors.push(FieldError::new(
                    "handle",
                    "must be 3-30 letters, digits or underscores",
                ));
                None
            }
        });

        let email = required_text("email", self.email, 254, &mut errors).and_then(|email| {
            match email.split_once('@') {
                Some((local, domain)) if !local.is_empty() && domain.contains('.') => {
                    Some(email.to_lowercase())
                }
                _ => {
                    errors.push(FieldError::new("email", "must be a valid email address"));
                    None
                }
            }
        });

        let display_name = required_text("display_name", self.display_name, 100, &mut errors);

        // Passwords are not trimmed; only length is checked.
        let password = match self.password {
            Some(password) if password.trim().is_empty() => {
                errors.push(FieldError::new("password", "is required"));
                None
            }
            Some(password) if password.chars().count() < MIN_PASSWORD_LEN => {
                errors.push(FieldError::new(
                    "password",
                    format!("must be at least {} characters", MIN_PASSWORD_LEN),
                ));
                None
            }
            Some(password) if password.chars().count() > MAX_PASSWORD_LEN => {
                errors.push(FieldError::new(
                    "password",
                    format!("must be at most {} characters", MAX_PASSWORD_LEN),
                ));
                None
            }
            Some(password) => Some(password),
            None => {
                errors.push(FieldError::new("password", "is required"));
                None
            }
        };

        match (handle, email, display_name, password) {
            (Some(handle), Some(email), Some(display_name), Some(password))
                if errors.is_empty() =>
            {
                Ok(NewUser {
                    handle,
                    email,
                    display_name,
                    password,
                })
            }
            _ => Err(FieldErrors(errors)),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    /// Email or handle.
    pub identifier: Option<String>,
    pub password: Option<String>,
}
