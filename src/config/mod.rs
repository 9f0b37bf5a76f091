use anyhow::{anyhow, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::net::SocketAddr;
use std::str::FromStr;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub http_addr: String,
    pub database_url: String,
    pub redis_url: String,
    pub db_max_connections: u32,
    pub db_connect_timeout_seconds: u64,
    pub db_idle_timeout_seconds: u64,
    pub db_max_lifetime_seconds: u64,
    pub admin_token: Option<String>,
    pub paseto_access_key: [u8; 32],
    pub access_ttl_minutes: u64,
    pub leaderboard_cache_ttl_seconds: u64,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup so parsing can be
    /// exercised without touching the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars { lookup };

        let http_addr = vars.or("HTTP_ADDR", "0.0.0.0:8080");
        SocketAddr::from_str(&http_addr).map_err(|err| anyhow!("invalid HTTP_ADDR: {}", err))?;

        Ok(Self {
            http_addr,
            database_url: vars.required("DATABASE_URL")?,
            redis_url: vars.or("REDIS_URL", "redis://127.0.0.1/"),
            db_max_connections: vars.parse("DB_MAX_CONNECTIONS", "25")?,
            db_connect_timeout_seconds: vars.parse("DB_CONNECT_TIMEOUT_SECONDS", "5")?,
            db_idle_timeout_seconds: vars.parse("DB_IDLE_TIMEOUT_SECONDS", "300")?,
            db_max_lifetime_seconds: vars.parse("DB_MAX_LIFETIME_SECONDS", "1800")?,
            admin_token: (vars.lookup)("ADMIN_TOKEN").filter(|token| !token.trim().is_empty()),
            paseto_access_key: vars.key_32("PASETO_ACCESS_KEY")?,
            access_ttl_minutes: vars.parse("ACCESS_TTL_MINUTES", "60")?,
            leaderboard_cache_ttl_seconds: vars.parse("LEADERBOARD_CACHE_TTL_SECONDS", "30")?,
        })
    }
}

struct Vars<F> {
    lookup: F,
}

impl<F> Vars<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn or(&self, key: &str, default: &str) -> String {
        (self.lookup)(key).unwrap_or_else(|| default.to_string())
    }

    fn required(&self, key: &str) -> Result<String> {
        (self.lookup)(key).ok_or_else(|| anyhow!("missing required env var: {}", key))
    }

    fn parse<T>(&self, key: &str, default: &str) -> Result<T>
    where
        T: FromStr,
        <T as FromStr>::Err: std::fmt::Display,
    {
        self.or(key, default)
            .parse::<T>()
            .map_err(|err| anyhow!("invalid {}: {}", key, err))
    }

    fn key_32(&self, key: &str) -> Result<[u8; 32]> {
        let value = self.required(key)?;
        let decoded = STANDARD
            .decode(value.as_bytes())
            .map_err(|err| anyhow!("invalid {}: {}", key, err))?;
        if decoded.len() != 32 {
            return Err(anyhow!("invalid {}: expected 32 bytes", key));
        }
        let mut key_bytes = [0u8; 32];
        key_bytes.copy_from_slice(&decoded);
        Ok(key_bytes)
    }
}
