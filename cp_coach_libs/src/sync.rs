use crate::{
    catalog::{ActivitySource, UserActivity},
    models::Platform,
    store::{self, HistoryStore},
};
use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;

/// Account names of one user on each platform. Empty names count as unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlatformHandles {
    pub codeforces: Option<String>,
    pub leetcode: Option<String>,
}

impl PlatformHandles {
    pub fn handle(&self, platform: Platform) -> Option<&str> {
        let handle = match platform {
            Platform::Codeforces => self.codeforces.as_deref(),
            Platform::LeetCode => self.leetcode.as_deref(),
        };
        handle.map(str::trim).filter(|handle| !handle.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub synced: Vec<Platform>,
    pub failed: Vec<Platform>,
    pub skipped: Vec<Platform>,
    pub solves: usize,
    pub rating_changes: usize,
}

enum Outcome {
    Skipped,
    Synced(usize, usize),
    Failed,
}

/// Copies accepted submissions and rating changes from each platform into the history store.
pub struct PracticeSync {
    history: Arc<dyn HistoryStore>,
    sources: Vec<Arc<dyn ActivitySource>>,
}

impl PracticeSync {
    pub fn new(history: Arc<dyn HistoryStore>, sources: Vec<Arc<dyn ActivitySource>>) -> Self {
        Self { history, sources }
    }

    async fn save(&self, activity: &UserActivity) -> store::Result<(usize, usize)> {
        for solve in activity.solves.iter() {
            self.history.upsert_solve(solve).await?;
        }
        for event in activity.rating_changes.iter() {
            self.history.add_rating_change(event).await?;
        }
        Ok((activity.solves.len(), activity.rating_changes.len()))
    }

    async fn sync_platform(
        &self,
        source: &dyn ActivitySource,
        user_id: &str,
        handles: &PlatformHandles,
    ) -> Outcome {
        let platform = source.platform();
        let Some(handle) = handles.handle(platform) else {
            tracing::info!("no {} handle configured, skipping", platform);
            return Outcome::Skipped;
        };

        tracing::info!("Start to sync {} activity of {}", platform, handle);
        let activity = match source.fetch_activity(user_id, handle).await {
            Ok(activity) => activity,
            Err(e) => {
                tracing::error!("{} practice sync failed: {}", platform, e);
                return Outcome::Failed;
            }
        };

        match self.save(&activity).await {
            Ok((solves, rating_changes)) => {
                tracing::info!(
                    "{} sync finished: {} solves, {} rating changes",
                    platform,
                    solves,
                    rating_changes
                );
                Outcome::Synced(solves, rating_changes)
            }
            Err(e) => {
                tracing::error!("failed to store {} activity: {}", platform, e);
                Outcome::Failed
            }
        }
    }

    /// Syncs every platform with a configured handle. Platforms run concurrently and a failure
    /// on one leaves the others untouched.
    pub async fn run(&self, user_id: &str, handles: &PlatformHandles) -> SyncReport {
        let outcomes = join_all(
            self.sources
                .iter()
                .map(|source| self.sync_platform(source.as_ref(), user_id, handles)),
        )
        .await;

        let mut report = SyncReport::default();
        for (source, outcome) in self.sources.iter().zip(outcomes) {
            match outcome {
                Outcome::Skipped => report.skipped.push(source.platform()),
                Outcome::Failed => report.failed.push(source.platform()),
                Outcome::Synced(solves, rating_changes) => {
                    report.synced.push(source.platform());
                    report.solves += solves;
                    report.rating_changes += rating_changes;
                }
            }
        }

        report
    }
}
