pub mod codeforces;
pub mod leetcode;
pub mod rate_limit;
pub mod ttl_cache;

use crate::models::{Platform, PracticeSolve, RatingChangeEvent, RecommendedProblem};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use codeforces::{CodeforcesClient, CodeforcesConfig};
pub use leetcode::{LeetCodeClient, LeetCodeConfig};

pub type Result<T> = std::result::Result<T, CatalogError>;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to request to catalog")]
    RequestError(#[from] reqwest::Error),
    #[error("failed to deserialize JSON data")]
    DeserializeError(#[from] serde_json::Error),
    #[error("invalid catalog url given")]
    InvalidUrlError(#[from] url::ParseError),
    #[error("catalog responded with status {0}")]
    StatusError(StatusCode),
    #[error("catalog rejected the request: {0}")]
    UpstreamError(String),
}

/// A problem as listed by an external catalog.
///
/// `rating` is only present when the catalog publishes a numeric difficulty; `difficulty`
/// keeps the platform's own representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogProblem {
    pub problem_id: String,
    pub name: String,
    pub url: String,
    pub difficulty: String,
    pub rating: Option<i32>,
    pub tags: Vec<String>,
}

impl CatalogProblem {
    pub fn into_recommendation(self, platform: Platform) -> RecommendedProblem {
        RecommendedProblem {
            problem_id: self.problem_id,
            name: self.name,
            url: self.url,
            difficulty: self.difficulty,
            tags: self.tags,
            platform,
        }
    }
}

/// Source of candidate problems for recommendation.
#[async_trait]
pub trait ProblemCatalog: Send + Sync {
    fn platform(&self) -> Platform;
    async fn fetch_problems(&self) -> Result<Vec<CatalogProblem>>;
}

/// Accepted solves and rating changes of one account, already mapped to history records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserActivity {
    pub solves: Vec<PracticeSolve>,
    pub rating_changes: Vec<RatingChangeEvent>,
}

#[async_trait]
pub trait ActivitySource: Send + Sync {
    fn platform(&self) -> Platform;
    async fn fetch_activity(&self, user_id: &str, handle: &str) -> Result<UserActivity>;
}

pub(crate) fn from_epoch(seconds: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_opt(seconds, 0).single()
}

pub(crate) fn base_url(url: &str) -> Result<url::Url> {
    let mut url = url::Url::parse(url)?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn base_url_always_ends_with_slash() {
        assert_eq!(
            base_url("https://codeforces.com/api").unwrap().as_str(),
            "https://codeforces.com/api/"
        );
        assert_eq!(
            base_url("https://codeforces.com/api/")
                .unwrap()
                .join("problemset.problems")
                .unwrap()
                .as_str(),
            "https://codeforces.com/api/problemset.problems"
        );
        assert!(base_url("not a url").is_err());
    }
}
