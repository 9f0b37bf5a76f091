use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stored score for one user, before ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreRow {
    pub user_id: Uuid,
    pub display_name: String,
    pub score: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub user_id: Uuid,
    pub display_name: String,
    pub score: i64,
}

/// Orders rows by score descending, keeps the first `limit`, and assigns
/// 1-based ranks by position. The sort is stable, so rows with equal scores
/// keep their incoming order and still get distinct ranks.
pub fn rank_by_score(mut rows: Vec<ScoreRow>, limit: usize) -> Vec<LeaderboardEntry> {
    rows.sort_by(|a, b| b.score.cmp(&a.score));
    rows.truncate(limit);
    rows.into_iter()
        .zip(1u32..)
        .map(|(row, rank)| LeaderboardEntry {
            rank,
            user_id: row.user_id,
            display_name: row.display_name,
            score: row.score,
        })
        .collect()
}
