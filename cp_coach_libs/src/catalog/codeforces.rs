use crate::{
    catalog::{
        base_url, from_epoch, rate_limit::RateLimiter, ActivitySource, CatalogError,
        CatalogProblem, ProblemCatalog, Result, UserActivity,
    },
    clock::Clock,
    models::{Platform, PracticeSolve, RatingChangeEvent},
};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{de::DeserializeOwned, Deserialize};
use std::{sync::Arc, time::Duration};

#[derive(Debug, Clone)]
pub struct CodeforcesConfig {
    pub base_url: String,
    pub min_interval: Duration,
    pub timeout: Duration,
    pub submission_count: usize,
}

impl Default for CodeforcesConfig {
    fn default() -> Self {
        Self {
            base_url: String::from("https://codeforces.com/api"),
            min_interval: Duration::from_secs(2),
            timeout: Duration::from_secs(15),
            submission_count: 200,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    status: String,
    comment: Option<String>,
    result: Option<T>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CfProblem {
    pub contest_id: Option<i64>,
    pub index: String,
    pub name: String,
    pub rating: Option<i32>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl CfProblem {
    pub fn problem_id(&self) -> Option<String> {
        self.contest_id
            .map(|contest_id| format!("{}_{}", contest_id, self.index))
    }

    pub fn url(&self) -> Option<String> {
        self.contest_id.map(|contest_id| {
            format!(
                "https://codeforces.com/problemset/problem/{}/{}",
                contest_id, self.index
            )
        })
    }

    pub fn into_catalog_problem(self) -> Option<CatalogProblem> {
        let problem_id = self.problem_id()?;
        let url = self.url()?;
        Some(CatalogProblem {
            problem_id,
            name: self.name,
            url,
            difficulty: self
                .rating
                .map(|rating| rating.to_string())
                .unwrap_or_default(),
            rating: self.rating,
            tags: self.tags,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct CfProblemset {
    pub problems: Vec<CfProblem>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CfRatingChange {
    pub contest_id: i64,
    pub old_rating: i32,
    pub new_rating: i32,
    pub rating_update_time_seconds: i64,
}

impl CfRatingChange {
    pub fn to_event(&self, user_id: &str) -> Option<RatingChangeEvent> {
        Some(RatingChangeEvent {
            platform: Platform::Codeforces,
            user_id: user_id.to_string(),
            contest_id: self.contest_id.to_string(),
            old_rating: self.old_rating,
            new_rating: self.new_rating,
            timestamp: from_epoch(self.rating_update_time_seconds)?,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CfSubmission {
    pub id: i64,
    pub creation_time_seconds: i64,
    pub problem: CfProblem,
    pub verdict: Option<String>,
}

impl CfSubmission {
    /// Maps an accepted submission to a solve. Other verdicts yield `None`.
    pub fn to_solve(&self, user_id: &str) -> Option<PracticeSolve> {
        if self.verdict.as_deref() != Some("OK") {
            return None;
        }
        let problem_id = self.problem.problem_id()?;

        Some(PracticeSolve {
            platform: Platform::Codeforces,
            user_id: user_id.to_string(),
            name: if self.problem.name.is_empty() {
                problem_id.clone()
            } else {
                self.problem.name.clone()
            },
            problem_id,
            difficulty: self
                .problem
                .rating
                .map(|rating| rating.to_string())
                .unwrap_or_default(),
            tags: self.problem.tags.clone(),
            solved_at: from_epoch(self.creation_time_seconds)?,
            time_seconds: None,
            submission_id: Some(self.id.to_string()),
        })
    }
}

/// Unwraps the `{"status": ..., "result": ...}` envelope of the Codeforces API.
pub fn parse_response<T: DeserializeOwned>(body: &str) -> Result<T> {
    let response: ApiResponse<T> = serde_json::from_str(body)?;
    match (response.status.as_str(), response.result) {
        ("OK", Some(result)) => Ok(result),
        _ => Err(CatalogError::UpstreamError(
            response
                .comment
                .unwrap_or_else(|| String::from("Unknown error")),
        )),
    }
}

/// Client of the official Codeforces API.
///
/// Codeforces allows about one call per two seconds, so every call goes through a
/// [`RateLimiter`].
pub struct CodeforcesClient {
    base_url: Url,
    client: Client,
    limiter: RateLimiter,
    submission_count: usize,
}

impl CodeforcesClient {
    pub fn new(config: CodeforcesConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        let client = Client::builder()
            .gzip(true)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            base_url: base_url(&config.base_url)?,
            client,
            limiter: RateLimiter::new(config.min_interval, clock),
            submission_count: config.submission_count,
        })
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: &[(&str, String)]) -> Result<T> {
        self.limiter.acquire().await;

        let url = self.base_url.join(method)?;
        let res = self.client.get(url).query(params).send().await?;
        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            let error = match parse_response::<serde_json::Value>(&body) {
                Err(CatalogError::UpstreamError(comment)) => CatalogError::UpstreamError(comment),
                _ => CatalogError::StatusError(status),
            };
            tracing::warn!("Codeforces API {} failed: {}", method, error);
            return Err(error);
        }

        parse_response(&body).map_err(|e| {
            tracing::warn!("Codeforces API {} failed: {}", method, e);
            e
        })
    }

    /// Whole problemset with tags and ratings.
    pub async fn problemset_problems(&self) -> Result<CfProblemset> {
        self.call("problemset.problems", &[]).await
    }

    pub async fn user_rating(&self, handle: &str) -> Result<Vec<CfRatingChange>> {
        self.call("user.rating", &[("handle", handle.to_string())])
            .await
    }

    pub async fn user_status(&self, handle: &str, from: usize, count: usize) -> Result<Vec<CfSubmission>> {
        self.call(
            "user.status",
            &[
                ("handle", handle.to_string()),
                ("from", from.to_string()),
                ("count", count.to_string()),
            ],
        )
        .await
    }
}

#[async_trait]
impl ProblemCatalog for CodeforcesClient {
    fn platform(&self) -> Platform {
        Platform::Codeforces
    }

    async fn fetch_problems(&self) -> Result<Vec<CatalogProblem>> {
        tracing::info!("Attempting to get problem list from Codeforces...");
        let problemset = self.problemset_problems().await?;
        let problems: Vec<CatalogProblem> = problemset
            .problems
            .into_iter()
            .filter_map(CfProblem::into_catalog_problem)
            .collect();
        tracing::info!("{} Codeforces problems collected.", problems.len());

        Ok(problems)
    }
}

#[async_trait]
impl ActivitySource for CodeforcesClient {
    fn platform(&self) -> Platform {
        Platform::Codeforces
    }

    async fn fetch_activity(&self, user_id: &str, handle: &str) -> Result<UserActivity> {
        let rating_changes = self
            .user_rating(handle)
            .await?
            .iter()
            .filter_map(|change| change.to_event(user_id))
            .collect();
        let solves = self
            .user_status(handle, 1, self.submission_count)
            .await?
            .iter()
            .filter_map(|submission| submission.to_solve(user_id))
            .collect();

        Ok(UserActivity {
            solves,
            rating_changes,
        })
    }
}
