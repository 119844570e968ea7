pub mod memory;
pub mod postgres;

use crate::models::{AnalyticsCacheEntry, Platform, PracticeSolve, RatingChangeEvent};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

pub use memory::MemoryStore;
pub use postgres::PgStore;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database operation failed")]
    DatabaseError(#[from] sqlx::Error),
    #[error("failed to run database migration")]
    MigrateError(#[from] sqlx::migrate::MigrateError),
    #[error("failed to (de)serialize stored document")]
    SerializeError(#[from] serde_json::Error),
    #[error("invalid stored value: {0}")]
    InvalidValueError(String),
}

/// Filter for [`HistoryStore::get_solves`]. Bounds are inclusive and optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SolveQuery {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub platform: Option<Platform>,
}

impl SolveQuery {
    pub fn platform(platform: Platform) -> Self {
        Self {
            platform: Some(platform),
            ..Default::default()
        }
    }

    pub fn matches(&self, solve: &PracticeSolve) -> bool {
        self.from.map_or(true, |from| solve.solved_at >= from)
            && self.to.map_or(true, |to| solve.solved_at <= to)
            && self.platform.map_or(true, |platform| solve.platform == platform)
    }
}

/// Per-user record of solved problems and rating changes.
///
/// Every listing is ordered most recent first.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn ping(&self) -> Result<()>;
    async fn get_solves(&self, user_id: &str, query: &SolveQuery) -> Result<Vec<PracticeSolve>>;
    async fn get_rating_history(
        &self,
        user_id: &str,
        platform: Option<Platform>,
        limit: usize,
    ) -> Result<Vec<RatingChangeEvent>>;
    async fn upsert_solve(&self, solve: &PracticeSolve) -> Result<()>;
    async fn add_rating_change(&self, event: &RatingChangeEvent) -> Result<()>;
}

/// Last-write-wins snapshot of the tag classification per user. Nothing expires on its own.
#[async_trait]
pub trait AnalyticsCacheStore: Send + Sync {
    async fn get(&self, user_id: &str) -> Result<Option<AnalyticsCacheEntry>>;
    async fn set(&self, entry: &AnalyticsCacheEntry) -> Result<()>;
}
