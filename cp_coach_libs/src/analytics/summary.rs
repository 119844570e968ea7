use crate::{
    clock::Clock,
    models::{Platform, PracticeSummary, RatingChangeEvent},
    store::{HistoryStore, SolveQuery},
};
use chrono::Duration;
use std::collections::BTreeMap;

pub const RECENT_SOLVES_LIMIT: usize = 100;
pub const DEFAULT_RATING_HISTORY_LIMIT: usize = 50;

/// Solves of the last `days` days: totals per platform and the most recent solves.
pub async fn summarize_practice(
    history: &dyn HistoryStore,
    clock: &dyn Clock,
    user_id: &str,
    days: u32,
) -> PracticeSummary {
    let to = clock.now();
    let query = SolveQuery {
        from: Some(to - Duration::days(i64::from(days))),
        to: Some(to),
        platform: None,
    };

    let solves = match history.get_solves(user_id, &query).await {
        Ok(solves) => solves,
        Err(e) => {
            tracing::warn!("failed to load practice summary of {}: {}", user_id, e);
            return PracticeSummary {
                days,
                ..Default::default()
            };
        }
    };

    let mut by_platform: BTreeMap<Platform, usize> = BTreeMap::new();
    for solve in solves.iter() {
        *by_platform.entry(solve.platform).or_insert(0) += 1;
    }

    PracticeSummary {
        days,
        total: solves.len(),
        by_platform,
        solves: solves.into_iter().take(RECENT_SOLVES_LIMIT).collect(),
    }
}

/// Latest rating changes, most recent first. Store failures give an empty list.
pub async fn rating_history(
    history: &dyn HistoryStore,
    user_id: &str,
    platform: Option<Platform>,
    limit: usize,
) -> Vec<RatingChangeEvent> {
    history
        .get_rating_history(user_id, platform, limit)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!("failed to load rating history of {}: {}", user_id, e);
            Vec::new()
        })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        clock::FixedClock,
        fixtures::{base_time, rating_change, solve, FailingStore},
        store::MemoryStore,
    };

    #[tokio::test]
    async fn summary_counts_recent_window() {
        let store = MemoryStore::new();
        for (id, platform, day) in [
            ("1_A", Platform::Codeforces, 0),
            ("1_B", Platform::Codeforces, 20),
            ("two-sum", Platform::LeetCode, 25),
            ("3sum", Platform::LeetCode, 29),
        ] {
            store
                .upsert_solve(&solve(platform, id, "", &[], day))
                .await
                .unwrap();
        }
        let clock = FixedClock::new(base_time() + Duration::days(30));

        let summary = summarize_practice(&store, &clock, "default", 7).await;

        assert_eq!(summary.days, 7);
        assert_eq!(summary.total, 2);
        assert_eq!(summary.by_platform.get(&Platform::LeetCode), Some(&2));
        assert_eq!(summary.by_platform.get(&Platform::Codeforces), None);
        assert_eq!(summary.solves[0].problem_id, "3sum");
    }

    #[tokio::test]
    async fn summary_keeps_latest_hundred() {
        let store = MemoryStore::new();
        for i in 0..120 {
            store
                .upsert_solve(&solve(Platform::Codeforces, &format!("{}_A", i), "", &[], i % 20))
                .await
                .unwrap();
        }
        let clock = FixedClock::new(base_time() + Duration::days(20));

        let summary = summarize_practice(&store, &clock, "default", 30).await;

        assert_eq!(summary.total, 120);
        assert_eq!(summary.solves.len(), RECENT_SOLVES_LIMIT);
    }

    #[tokio::test]
    async fn failures_degrade_to_empty() {
        let clock = FixedClock::new(base_time());

        let summary = summarize_practice(&FailingStore, &clock, "default", 30).await;
        assert_eq!(summary.total, 0);
        assert_eq!(summary.days, 30);
        assert!(summary.solves.is_empty());

        assert!(rating_history(&FailingStore, "default", None, 50)
            .await
            .is_empty());
    }

    #[tokio::test]
    async fn rating_history_filters_platform() {
        let store = MemoryStore::new();
        store
            .add_rating_change(&rating_change(Platform::Codeforces, "1", 1400, 0))
            .await
            .unwrap();
        store
            .add_rating_change(&rating_change(Platform::LeetCode, "Weekly Contest 1", 1600, 1))
            .await
            .unwrap();

        let events = rating_history(&store, "default", Some(Platform::Codeforces), 50).await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].new_rating, 1400);

        assert_eq!(rating_history(&store, "default", None, 1).await.len(), 1);
    }
}
