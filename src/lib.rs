pub mod app;
pub mod config;
pub mod domain;
pub mod http;
pub mod infra;

use crate::app::auth::AuthService;
use crate::app::leaderboard::LeaderboardService;
use crate::config::AppConfig;
use crate::infra::{cache::RedisCache, db::Db};

/// Everything a handler needs; cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub cache: RedisCache,
    pub admin_token: Option<String>,
    pub paseto_access_key: [u8; 32],
    pub access_ttl_minutes: u64,
    pub leaderboard_cache_ttl_seconds: u64,
}

impl AppState {
    pub fn new(config: &AppConfig, db: Db, cache: RedisCache) -> Self {
        Self {
            db,
            cache,
            admin_token: config.admin_token.clone(),
            paseto_access_key: config.paseto_access_key,
            access_ttl_minutes: config.access_ttl_minutes,
            leaderboard_cache_ttl_seconds: config.leaderboard_cache_ttl_seconds,
        }
    }

    pub fn auth_service(&self) -> AuthService {
        AuthService::new(
            self.db.clone(),
            self.paseto_access_key,
            self.access_ttl_minutes,
        )
    }

    pub fn leaderboard_service(&self) -> LeaderboardService {
        LeaderboardService::new(
            self.db.clone(),
            self.cache.clone(),
            self.leaderboard_cache_ttl_seconds,
        )
    }
}
