use anyhow::Result;
use sqlx::Row;
use uuid::Uuid;

use crate::domain::leaderboard::{rank_by_score, LeaderboardEntry, ScoreRow};
use crate::infra::cache::RedisCache;
use crate::infra::db::Db;

/// Size of the public board.
pub const LEADERBOARD_LIMIT: usize = 20;

const CACHE_KEY_PREFIX: &str = "leaderboard:top:";

/// Bumped on every score write. Cached boards are keyed by generation, so a
/// board read before a write can never be stored where readers look after it.
const GENERATION_KEY: &str = "leaderboard:gen";

fn cache_key(generation: u64, limit: usize) -> String {
    format!("{CACHE_KEY_PREFIX}{generation}:{limit}")
}

#[derive(Clone)]
pub struct LeaderboardService {
    db: Db,
    cache: RedisCache,
    cache_ttl_seconds: u64,
}

impl LeaderboardService {
    pub fn new(db: Db, cache: RedisCache, cache_ttl_seconds: u64) -> Self {
        Self {
            db,
            cache,
            cache_ttl_seconds,
        }
    }

    /// Cache key a board of `limit` entries is stored under right now.
    /// `None` when the generation counter cannot be read.
    pub async fn current_cache_key(&self, limit: usize) -> Option<String> {
        match self.cache.get_counter(GENERATION_KEY).await {
            Ok(generation) => Some(cache_key(generation, limit)),
            Err(err) => {
                tracing::warn!(error = ?err, "leaderboard generation read failed");
                None
            }
        }
    }

    /// Top `limit` users by score. Served from Redis when possible; cache
    /// errors only cost a database read.
    pub async fn get_leaderboard(&self, limit: usize) -> Result<Vec<LeaderboardEntry>> {
        // Generation is read before the rows so a concurrent write moves
        // readers off whatever this call caches.
        let key = self.current_cache_key(limit).await;
        if let Some(key) = &key {
            match self.cache.get_json::<Vec<LeaderboardEntry>>(key).await {
                Ok(Some(entries)) => return Ok(entries),
                Ok(None) => {}
                Err(err) => tracing::warn!(error = ?err, "leaderboard cache read failed"),
            }
        }

        // Equal scores: earlier update first, then user id.
        let rows = sqlx::query(
            "SELECT s.user_id, u.display_name, s.score \
             FROM leaderboard_scores s \
             JOIN users u ON u.id = s.user_id \
             ORDER BY s.score DESC, s.updated_at ASC, s.user_id ASC \
             LIMIT $1",
        )
        .bind(limit as i64)
        .fetch_all(self.db.pool())
        .await?;

        let rows = rows
            .into_iter()
            .map(|row| ScoreRow {
                user_id: row.get("user_id"),
                display_name: row.get("display_name"),
                score: row.get("score"),
            })
            .collect();
        let entries = rank_by_score(rows, limit);

        if let Some(key) = &key {
            if let Err(err) = self
                .cache
                .set_json(key, &entries, self.cache_ttl_seconds)
                .await
            {
                tracing::warn!(error = ?err, "leaderboard cache write failed");
            }
        }

        Ok(entries)
    }

    /// Sets a user's score. Returns `false` when the user does not exist.
    pub async fn set_score(&self, user_id: Uuid, score: i64) -> Result<bool> {
        let result = sqlx::query(
            "INSERT INTO leaderboard_scores (user_id, score) \
             SELECT id, $2 FROM users WHERE id = $1 \
             ON CONFLICT (user_id) DO UPDATE SET score = EXCLUDED.score, updated_at = now()",
        )
        .bind(user_id)
        .bind(score)
        .execute(self.db.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Ok(false);
        }

        if let Err(err) = self.cache.incr(GENERATION_KEY).await {
            tracing::warn!(error = ?err, user_id = %user_id, "leaderboard generation bump failed");
        }
        // Older generations are unreachable now; drop them instead of
        // waiting for their TTL.
        if let Err(err) = self
            .cache
            .delete_matching(&format!("{CACHE_KEY_PREFIX}*"))
            .await
        {
            tracing::warn!(error = ?err, user_id = %user_id, "leaderboard cache invalidation failed");
        }

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_key_changes_with_generation() {
        assert_eq!(cache_key(0, LEADERBOARD_LIMIT), "leaderboard:top:0:20");
        assert_ne!(cache_key(3, 20), cache_key(4, 20));
        assert!(!GENERATION_KEY.starts_with(CACHE_KEY_PREFIX));
    }
}
