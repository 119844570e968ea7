//! Fakes and record builders shared by the unit tests of this crate.

use crate::{
    catalog::{self, CatalogError, CatalogProblem, ProblemCatalog},
    models::{AnalyticsCacheEntry, Platform, PracticeSolve, RatingChangeEvent},
    store::{self, AnalyticsCacheStore, HistoryStore, SolveQuery, StoreError},
};
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use reqwest::StatusCode;

pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
}

pub fn solve(
    platform: Platform,
    problem_id: &str,
    difficulty: &str,
    tags: &[&str],
    day: i64,
) -> PracticeSolve {
    PracticeSolve {
        platform,
        user_id: String::from("default"),
        problem_id: problem_id.to_string(),
        name: problem_id.to_string(),
        difficulty: difficulty.to_string(),
        tags: tags.iter().map(|tag| tag.to_string()).collect(),
        solved_at: base_time() + Duration::days(day),
        time_seconds: None,
        submission_id: None,
    }
}

pub fn rating_change(platform: Platform, contest_id: &str, new_rating: i32, day: i64) -> RatingChangeEvent {
    RatingChangeEvent {
        platform,
        user_id: String::from("default"),
        contest_id: contest_id.to_string(),
        old_rating: new_rating - 50,
        new_rating,
        timestamp: base_time() + Duration::days(day),
    }
}

pub fn cf_problem(contest_id: i64, index: &str, rating: Option<i32>, tags: &[&str]) -> CatalogProblem {
    CatalogProblem {
        problem_id: format!("{}_{}", contest_id, index),
        name: format!("Problem {}{}", contest_id, index),
        url: format!(
            "https://codeforces.com/problemset/problem/{}/{}",
            contest_id, index
        ),
        difficulty: rating.map(|r| r.to_string()).unwrap_or_default(),
        rating,
        tags: tags.iter().map(|tag| tag.to_string()).collect(),
    }
}

pub fn lc_problem(slug: &str, difficulty: &str) -> CatalogProblem {
    CatalogProblem {
        problem_id: slug.to_string(),
        name: slug.replace('-', " "),
        url: format!("https://leetcode.com/problems/{}/", slug),
        difficulty: difficulty.to_string(),
        rating: None,
        tags: Vec::new(),
    }
}

/// Store whose every operation fails.
pub struct FailingStore;

fn unavailable() -> StoreError {
    StoreError::InvalidValueError(String::from("store unavailable"))
}

#[async_trait]
impl HistoryStore for FailingStore {
    async fn ping(&self) -> store::Result<()> {
        Err(unavailable())
    }

    async fn get_solves(&self, _: &str, _: &SolveQuery) -> store::Result<Vec<PracticeSolve>> {
        Err(unavailable())
    }

    async fn get_rating_history(
        &self,
        _: &str,
        _: Option<Platform>,
        _: usize,
    ) -> store::Result<Vec<RatingChangeEvent>> {
        Err(unavailable())
    }

    async fn upsert_solve(&self, _: &PracticeSolve) -> store::Result<()> {
        Err(unavailable())
    }

    async fn add_rating_change(&self, _: &RatingChangeEvent) -> store::Result<()> {
        Err(unavailable())
    }
}

#[async_trait]
impl AnalyticsCacheStore for FailingStore {
    async fn get(&self, _: &str) -> store::Result<Option<AnalyticsCacheEntry>> {
        Err(unavailable())
    }

    async fn set(&self, _: &AnalyticsCacheEntry) -> store::Result<()> {
        Err(unavailable())
    }
}

pub struct StaticCatalog {
    pub platform: Platform,
    pub problems: Vec<CatalogProblem>,
}

#[async_trait]
impl ProblemCatalog for StaticCatalog {
    fn platform(&self) -> Platform {
        self.platform
    }

    async fn fetch_problems(&self) -> catalog::Result<Vec<CatalogProblem>> {
        Ok(self.problems.clone())
    }
}

pub struct FailingCatalog(pub Platform);

#[async_trait]
impl ProblemCatalog for FailingCatalog {
    fn platform(&self) -> Platform {
        self.0
    }

    async fn fetch_problems(&self) -> catalog::Result<Vec<CatalogProblem>> {
        Err(CatalogError::StatusError(StatusCode::SERVICE_UNAVAILABLE))
    }
}
