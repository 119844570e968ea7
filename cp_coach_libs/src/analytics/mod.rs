pub mod classifier;
pub mod plan;
pub mod summary;

use crate::store::HistoryStore;

/// Number of latest rating changes consulted to estimate the current skill.
pub const RECENT_RATING_EVENTS: usize = 5;

/// Highest `new_rating` among the latest rating changes over all platforms.
///
/// Returns 0 when there is no rating history or the store cannot be read.
pub async fn max_recent_rating(history: &dyn HistoryStore, user_id: &str) -> i32 {
    match history
        .get_rating_history(user_id, None, RECENT_RATING_EVENTS)
        .await
    {
        Ok(events) => events
            .iter()
            .map(|event| event.new_rating)
            .max()
            .unwrap_or(0)
            .max(0),
        Err(e) => {
            tracing::warn!("failed to load rating history of {}: {}", user_id, e);
            0
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        fixtures::{rating_change, FailingStore},
        models::Platform,
        store::MemoryStore,
    };

    #[tokio::test]
    async fn max_of_latest_five_events() {
        let store = MemoryStore::new();
        // the oldest event has the highest rating but falls outside the latest five
        store
            .add_rating_change(&rating_change(Platform::Codeforces, "1", 1900, 0))
            .await
            .unwrap();
        for (day, rating) in [(1, 1300), (2, 1350), (3, 1420), (4, 1380), (5, 1400)] {
            store
                .add_rating_change(&rating_change(
                    Platform::Codeforces,
                    &format!("{}", day + 1),
                    rating,
                    day,
                ))
                .await
                .unwrap();
        }

        assert_eq!(max_recent_rating(&store, "default").await, 1420);
    }

    #[tokio::test]
    async fn zero_without_history_or_store() {
        assert_eq!(max_recent_rating(&MemoryStore::new(), "default").await, 0);
        assert_eq!(max_recent_rating(&FailingStore, "default").await, 0);
    }
}
