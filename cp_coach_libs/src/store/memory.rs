use crate::{
    models::{AnalyticsCacheEntry, Platform, PracticeSolve, RatingChangeEvent},
    store::{AnalyticsCacheStore, HistoryStore, Result, SolveQuery},
};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

type RecordKey = (Platform, String, String);

/// Process-local store backing tests and in-crate fakes.
#[derive(Debug, Default)]
pub struct MemoryStore {
    solves: RwLock<HashMap<RecordKey, PracticeSolve>>,
    ratings: RwLock<HashMap<RecordKey, RatingChangeEvent>>,
    cache: RwLock<HashMap<String, AnalyticsCacheEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HistoryStore for MemoryStore {
    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn get_solves(&self, user_id: &str, query: &SolveQuery) -> Result<Vec<PracticeSolve>> {
        let solves = self.solves.read().await;
        let mut result: Vec<PracticeSolve> = solves
            .values()
            .filter(|solve| solve.user_id == user_id && query.matches(solve))
            .cloned()
            .collect();
        result.sort_by(|a, b| {
            b.solved_at
                .cmp(&a.solved_at)
                .then_with(|| a.platform.cmp(&b.platform))
                .then_with(|| a.problem_id.cmp(&b.problem_id))
        });

        Ok(result)
    }

    async fn get_rating_history(
        &self,
        user_id: &str,
        platform: Option<Platform>,
        limit: usize,
    ) -> Result<Vec<RatingChangeEvent>> {
        let ratings = self.ratings.read().await;
        let mut result: Vec<RatingChangeEvent> = ratings
            .values()
            .filter(|event| event.user_id == user_id)
            .filter(|event| platform.map_or(true, |platform| event.platform == platform))
            .cloned()
            .collect();
        result.sort_by(|a, b| {
            b.timestamp
                .cmp(&a.timestamp)
                .then_with(|| a.contest_id.cmp(&b.contest_id))
        });
        result.truncate(limit);

        Ok(result)
    }

    async fn upsert_solve(&self, solve: &PracticeSolve) -> Result<()> {
        let key = (
            solve.platform,
            solve.user_id.clone(),
            solve.problem_id.clone(),
        );
        self.solves.write().await.insert(key, solve.clone());
        Ok(())
    }

    async fn add_rating_change(&self, event: &RatingChangeEvent) -> Result<()> {
        let key = (
            event.platform,
            event.user_id.clone(),
            event.contest_id.clone(),
        );
        self.ratings.write().await.insert(key, event.clone());
        Ok(())
    }
}

#[async_trait]
impl AnalyticsCacheStore for MemoryStore {
    async fn get(&self, user_id: &str) -> Result<Option<AnalyticsCacheEntry>> {
        Ok(self.cache.read().await.get(user_id).cloned())
    }

    async fn set(&self, entry: &AnalyticsCacheEntry) -> Result<()> {
        self.cache
            .write()
            .await
            .insert(entry.user_id.clone(), entry.clone());
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::models::WeakStrongResult;
    use chrono::{TimeZone, Utc};

    fn solve(platform: Platform, problem_id: &str, day: u32) -> PracticeSolve {
        PracticeSolve {
            platform,
            user_id: String::from("alice"),
            problem_id: String::from(problem_id),
            name: String::from(problem_id),
            difficulty: String::from("1200"),
            tags: vec![String::from("dp")],
            solved_at: Utc.with_ymd_and_hms(2024, 3, day, 0, 0, 0).unwrap(),
            time_seconds: None,
            submission_id: None,
        }
    }

    #[tokio::test]
    async fn resolving_again_updates_instead_of_duplicating() {
        let store = MemoryStore::new();
        store
            .upsert_solve(&solve(Platform::Codeforces, "1_A", 1))
            .await
            .unwrap();
        store
            .upsert_solve(&solve(Platform::Codeforces, "1_A", 5))
            .await
            .unwrap();
        // same id on another platform is a different record
        store
            .upsert_solve(&solve(Platform::LeetCode, "1_A", 2))
            .await
            .unwrap();

        let solves = store
            .get_solves("alice", &SolveQuery::default())
            .await
            .unwrap();
        assert_eq!(solves.len(), 2);
        assert_eq!(solves[0].platform, Platform::Codeforces);
        assert_eq!(
            solves[0].solved_at,
            Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap()
        );
    }

    #[tokio::test]
    async fn solves_are_filtered_by_range_and_platform() {
        let store = MemoryStore::new();
        for (platform, id, day) in [
            (Platform::Codeforces, "1_A", 1),
            (Platform::Codeforces, "2_B", 10),
            (Platform::LeetCode, "two-sum", 20),
        ] {
            store.upsert_solve(&solve(platform, id, day)).await.unwrap();
        }

        let query = SolveQuery {
            from: Some(Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap()),
            to: None,
            platform: None,
        };
        let ids: Vec<String> = store
            .get_solves("alice", &query)
            .await
            .unwrap()
            .into_iter()
            .map(|solve| solve.problem_id)
            .collect();
        assert_eq!(ids, vec!["two-sum", "2_B"]);

        let leetcode = store
            .get_solves("alice", &SolveQuery::platform(Platform::LeetCode))
            .await
            .unwrap();
        assert_eq!(leetcode.len(), 1);
        assert!(store
            .get_solves("bob", &SolveQuery::default())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn rating_history_is_recent_first_and_limited() {
        let store = MemoryStore::new();
        for (i, rating) in [1200, 1350, 1280].into_iter().enumerate() {
            store
                .add_rating_change(&RatingChangeEvent {
                    platform: Platform::Codeforces,
                    user_id: String::from("alice"),
                    contest_id: format!("{}", 100 + i),
                    old_rating: 0,
                    new_rating: rating,
                    timestamp: Utc.with_ymd_and_hms(2024, 1, 1 + i as u32, 0, 0, 0).unwrap(),
                })
                .await
                .unwrap();
        }

        let history = store.get_rating_history("alice", None, 2).await.unwrap();
        let ratings: Vec<i32> = history.iter().map(|event| event.new_rating).collect();
        assert_eq!(ratings, vec![1280, 1350]);

        let leetcode = store
            .get_rating_history("alice", Some(Platform::LeetCode), 10)
            .await
            .unwrap();
        assert!(leetcode.is_empty());
    }

    #[tokio::test]
    async fn cache_last_write_wins() {
        let store = MemoryStore::new();
        assert!(store.get("alice").await.unwrap().is_none());

        for total_solved in [1, 2] {
            store
                .set(&AnalyticsCacheEntry {
                    user_id: String::from("alice"),
                    result: WeakStrongResult {
                        total_solved,
                        ..Default::default()
                    },
                    last_updated: Utc::now(),
                })
                .await
                .unwrap();
        }

        let entry = store.get("alice").await.unwrap().unwrap();
        assert_eq!(entry.result.total_solved, 2);
    }
}
