use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Set of user ids that liked an entity.
///
/// Backed by a `Vec` because it is stored as a `UUID[]` column, but every
/// constructor removes duplicates so a user id appears at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Uuid>", into = "Vec<Uuid>")]
pub struct LikeSet(Vec<Uuid>);

impl LikeSet {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn contains(&self, user_id: Uuid) -> bool {
        self.0.contains(&user_id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[Uuid] {
        &self.0
    }

    /// Removes `user_id` if present, adds it otherwise. Returns whether the
    /// user is a member after the flip.
    pub fn toggle(&mut self, user_id: Uuid) -> bool {
        match self.0.iter().position(|id| *id == user_id) {
            Some(index) => {
                self.0.remove(index);
                false
            }
            None => {
                self.0.push(user_id);
                true
            }
        }
    }
}

impl From<Vec<Uuid>> for LikeSet {
    fn from(ids: Vec<Uuid>) -> Self {
        let mut seen = HashSet::with_capacity(ids.len());
        let mut unique = ids;
        unique.retain(|id| seen.insert(*id));
        Self(unique)
    }
}

impl From<LikeSet> for Vec<Uuid> {
    fn from(set: LikeSet) -> Self {
        set.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeTarget {
    Post,
    Comment,
}

impl LikeTarget {
    pub fn notification_kind(&self) -> &'static str {
        match self {
            Self::Post => "post_liked",
            Self::Comment => "comment_liked",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Post => "post",
            Self::Comment => "comment",
        }
    }
}

/// Outcome of a toggle: the entity as persisted and the caller's new
/// membership state.
#[derive(Debug, Clone)]
pub struct LikeToggle<T> {
    pub entity: T,
    pub liked: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub body: String,
    pub likes: LikeSet,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_adds_then_removes() {
        let user = Uuid::new_v4();
        let mut likes = LikeSet::new();

        assert!(likes.toggle(user));
        assert!(likes.contains(user));
        assert_eq!(likes.len(), 1);

        assert!(!likes.toggle(user));
        assert!(!likes.contains(user));
        assert!(likes.is_empty());
    }

    #[test]
    fn double_toggle_restores_original_membership() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let original = LikeSet::from(vec![a, b]);

        let mut likes = original.clone();
        likes.toggle(c);
        likes.toggle(c);
        assert_eq!(likes, original);

        let mut likes = original.clone();
        assert!(!likes.toggle(a));
        assert!(likes.toggle(a));
        let mut restored: Vec<Uuid> = likes.into();
        let mut expected: Vec<Uuid> = original.into();
        restored.sort();
        expected.sort();
        assert_eq!(restored, expected);
    }

    #[test]
    fn user_appears_at_most_once_after_any_sequence() {
        let users = [Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4()];
        let mut likes = LikeSet::new();
        for step in 0..50usize {
            let user = users[(step * 7 + step / 3) % users.len()];
            likes.toggle(user);
            for user in users {
                let count = likes.as_slice().iter().filter(|id| **id == user).count();
                assert!(count <= 1);
            }
        }
    }

    #[test]
    fn loading_deduplicates_stored_ids() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let likes = LikeSet::from(vec![a, b, a, a]);
        assert_eq!(likes.as_slice(), &[a, b]);

        let likes: LikeSet = serde_json::from_value(serde_json::json!([a, a])).unwrap();
        assert_eq!(likes.len(), 1);
    }

    #[test]
    fn serializes_as_plain_array() {
        let a = Uuid::new_v4();
        let value = serde_json::to_value(LikeSet::from(vec![a])).unwrap();
        assert_eq!(value, serde_json::json!([a.to_string()]));
    }

    #[test]
    fn loading_large_array_is_linear() {
        let ids: Vec<Uuid> = (0..100_000).map(|_| Uuid::new_v4()).collect();
        let mut stored = ids.clone();
        stored.extend_from_slice(&ids[..1_000]);

        let started = std::time::Instant::now();
        let likes = LikeSet::from(stored);
        let elapsed = started.elapsed();

        assert_eq!(likes.len(), ids.len());
        assert_eq!(likes.as_slice(), ids.as_slice());
        assert!(elapsed < std::time::Duration::from_secs(2), "load took {:?}", elapsed);
    }
}
