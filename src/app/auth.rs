use anyhow::{anyhow, Result};
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use pasetors::claims::{Claims, ClaimsValidationRules};
use pasetors::keys::SymmetricKey;
use pasetors::token::UntrustedToken;
use pasetors::{local, version4::V4, Local};
use sqlx::Row;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::app::users::user_from_row;
use crate::domain::user::{NewUser, User};
use crate::infra::db::Db;

const TOKEN_ISSUER: &str = "thikana";

#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user_id: Uuid,
}

#[derive(Debug, Clone)]
pub struct AccessToken {
    pub token: String,
    pub expires_at: OffsetDateTime,
}

pub enum RegisterOutcome {
    Created(User),
    HandleTaken,
    EmailTaken,
}

#[derive(Clone)]
pub struct AuthService {
    db: Db,
    access_key: [u8; 32],
    access_ttl_minutes: u64,
}

impl AuthService {
    pub fn new(db: Db, access_key: [u8; 32], access_ttl_minutes: u64) -> Self {
        Self {
            db,
            access_key,
            access_ttl_minutes,
        }
    }

    pub async fn register(&self, user: NewUser) -> Result<RegisterOutcome> {
        let password_hash = hash_password(&user.password)?;
        let result = sqlx::query(
            "INSERT INTO users (handle, email, display_name, password_hash) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id, handle, email, display_name, created_at",
        )
        .bind(user.handle)
        .bind(user.email)
        .bind(user.display_name)
        .bind(password_hash)
        .fetch_one(self.db.pool())
        .await;

        match result {
            Ok(row) => Ok(RegisterOutcome::Created(user_from_row(&row))),
            Err(sqlx::Error::Database(db_err)) if db_err.code().as_deref() == Some("23505") => {
                let constraint = db_err.constraint().unwrap_or_default();
                if constraint.contains("handle") {
                    Ok(RegisterOutcome::HandleTaken)
                } else if constraint.contains("email") {
                    Ok(RegisterOutcome::EmailTaken)
                } else {
                    Err(sqlx::Error::Database(db_err).into())
                }
            }
            Err(err) => Err(err.into()),
        }
    }

    /// `None` on unknown identifier or wrong password.
    pub async fn login(&self, identifier: &str, password: &str) -> Result<Option<AccessToken>> {
        let identifier = identifier.trim().to_lowercase();
        let row = sqlx::query("SELECT id, password_hash FROM users WHERE email = $1 OR handle = $1")
            .bind(&identifier)
            .fetch_optional(self.db.pool())
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let user_id: Uuid = row.get("id");
        let password_hash: String = row.get("password_hash");

        if !verify_password(password, &password_hash)? {
            return Ok(None);
        }

        Ok(Some(self.issue_access_token(user_id)?))
    }

    pub fn issue_access_token(&self, user_id: Uuid) -> Result<AccessToken> {
        let duration = std::time::Duration::from_secs(self.access_ttl_minutes * 60);
        let mut claims = Claims::new_expires_in(&duration)?;
        claims.issuer(TOKEN_ISSUER)?;
        claims.audience(TOKEN_ISSUER)?;
        claims.subject(&user_id.to_string())?;
        claims.add_additional("typ", "access")?;

        let key = SymmetricKey::<V4>::from(&self.access_key)?;
        let token = local::encrypt(&key, &claims, None, None)?;
        let expires_at =
            OffsetDateTime::now_utc() + Duration::minutes(self.access_ttl_minutes as i64);

        Ok(AccessToken { token, expires_at })
    }

    /// `None` for tokens that fail to decrypt, are expired, or are not
    /// access tokens.
    pub fn authenticate_access_token(&self, token: &str) -> Result<Option<AuthSession>> {
        let key = SymmetricKey::<V4>::from(&self.access_key)?;
        let mut rules = ClaimsValidationRules::new();
        rules.validate_issuer_with(TOKEN_ISSUER);
        rules.validate_audience_with(TOKEN_ISSUER);

        let Ok(untrusted) = UntrustedToken::<Local, V4>::try_from(token) else {
            return Ok(None);
        };
        let Ok(trusted) = local::decrypt(&key, &untrusted, &rules, None, None) else {
            return Ok(None);
        };
        let Some(claims) = trusted.payload_claims() else {
            return Ok(None);
        };

        let is_access = claims
            .get_claim("typ")
            .and_then(|value| value.as_str())
            .map(|value| value == "access")
            .unwrap_or(false);
        if !is_access {
            return Ok(None);
        }

        let user_id = claims
            .get_claim("sub")
            .and_then(|value| value.as_str())
            .ok_or_else(|| anyhow!("missing sub claim"))?;
        Ok(Some(AuthSession {
            user_id: Uuid::parse_str(user_id)?,
        }))
    }
}

fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut argon2::password_hash::rand_core::OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| anyhow!("failed to hash password: {}", err))?;
    Ok(hash.to_string())
}

fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|err| anyhow!("failed to parse password hash: {}", err))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}
