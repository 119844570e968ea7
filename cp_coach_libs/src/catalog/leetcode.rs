use crate::{
    catalog::{
        base_url, from_epoch, ttl_cache::TtlCache, ActivitySource, CatalogError, CatalogProblem,
        ProblemCatalog, Result, UserActivity,
    },
    clock::Clock,
    models::{Platform, PracticeSolve, RatingChangeEvent},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use itertools::Itertools;
use reqwest::{Client, StatusCode, Url};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;
use serde_with::{serde_as, DisplayFromStr, PickFirst};
use std::{sync::Arc, time::Duration};

#[derive(Debug, Clone)]
pub struct LeetCodeConfig {
    pub base_url: String,
    pub cache_ttl: Duration,
    pub timeout: Duration,
    pub problem_limit: usize,
    pub submission_limit: usize,
}

impl Default for LeetCodeConfig {
    fn default() -> Self {
        Self {
            base_url: String::from("https://alfa-leetcode-api.onrender.com"),
            cache_ttl: Duration::from_secs(300),
            timeout: Duration::from_secs(30),
            problem_limit: 100,
            submission_limit: 200,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TopicTag {
    Named { name: String },
    Plain(String),
}

impl TopicTag {
    pub fn into_name(self) -> String {
        match self {
            TopicTag::Named { name } => name,
            TopicTag::Plain(name) => name,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LcProblem {
    pub title: Option<String>,
    #[serde(default)]
    pub title_slug: String,
    pub difficulty: Option<String>,
    #[serde(default)]
    pub topic_tags: Option<Vec<TopicTag>>,
}

impl LcProblem {
    pub fn into_catalog_problem(self) -> Option<CatalogProblem> {
        if self.title_slug.is_empty() {
            return None;
        }

        Some(CatalogProblem {
            name: self.title.unwrap_or_else(|| self.title_slug.clone()),
            url: format!("https://leetcode.com/problems/{}/", self.title_slug),
            difficulty: capitalize(self.difficulty.as_deref().unwrap_or_default()),
            rating: None,
            tags: self
                .topic_tags
                .unwrap_or_default()
                .into_iter()
                .map(TopicTag::into_name)
                .collect(),
            problem_id: self.title_slug,
        })
    }
}

#[serde_as]
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LcAcSubmission {
    pub id: Option<Value>,
    pub title: Option<String>,
    pub title_slug: Option<String>,
    pub difficulty: Option<String>,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub timestamp: Option<i64>,
}

impl LcAcSubmission {
    /// `now` stands in for a missing submission timestamp.
    pub fn to_solve(&self, user_id: &str, now: DateTime<Utc>) -> Option<PracticeSolve> {
        let title = self.title.clone().unwrap_or_default();
        let problem_id = match self.title_slug.as_deref() {
            Some(slug) if !slug.is_empty() => slug.to_string(),
            _ => title.to_lowercase().replace(' ', "-"),
        };
        if problem_id.is_empty() {
            return None;
        }

        let difficulty = match self.difficulty.as_deref() {
            Some(difficulty) if !difficulty.is_empty() => capitalize(difficulty),
            _ => String::from("Unknown"),
        };
        let solved_at = match self.timestamp {
            Some(timestamp) => from_epoch(timestamp)?,
            None => now,
        };
        let submission_id = self.id.as_ref().and_then(|id| match id {
            Value::String(id) => Some(id.clone()),
            Value::Number(id) => Some(id.to_string()),
            _ => None,
        });

        Some(PracticeSolve {
            platform: Platform::LeetCode,
            user_id: user_id.to_string(),
            name: if title.is_empty() {
                problem_id.clone()
            } else {
                title
            },
            problem_id,
            difficulty,
            tags: Vec::new(),
            solved_at,
            time_seconds: None,
            submission_id,
        })
    }
}

#[serde_as]
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LcContest {
    pub title: Option<String>,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub start_time: Option<i64>,
}

#[serde_as]
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LcContestEntry {
    #[serde(default = "attended_by_default")]
    pub attended: bool,
    pub rating: Option<f64>,
    pub title_slug: Option<String>,
    pub contest: Option<LcContest>,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub finish_time: Option<i64>,
}

fn attended_by_default() -> bool {
    true
}

impl LcContestEntry {
    /// LeetCode only reports the rating after each contest, so the event carries it as both
    /// the old and the new rating.
    pub fn to_event(&self, user_id: &str, now: DateTime<Utc>) -> Option<RatingChangeEvent> {
        if !self.attended {
            return None;
        }
        let contest_id = self
            .title_slug
            .clone()
            .or_else(|| self.contest.as_ref().and_then(|c| c.title.clone()))?;
        let rating = self.rating.unwrap_or(0.0).round() as i32;
        let timestamp = match self
            .finish_time
            .or_else(|| self.contest.as_ref().and_then(|c| c.start_time))
        {
            Some(timestamp) => from_epoch(timestamp)?,
            None => now,
        };

        Some(RatingChangeEvent {
            platform: Platform::LeetCode,
            user_id: user_id.to_string(),
            contest_id,
            old_rating: rating,
            new_rating: rating,
            timestamp,
        })
    }
}

/// "EASY" and "easy" both become "Easy".
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Reads a list that the API returns either bare or wrapped in an object under `key`.
pub fn list_payload<T: DeserializeOwned>(payload: Value, key: &str) -> Result<Vec<T>> {
    let list = match payload {
        list @ Value::Array(_) => list,
        Value::Object(mut map) => match map.remove(key) {
            Some(list @ Value::Array(_)) => list,
            _ => return Ok(Vec::new()),
        },
        _ => return Ok(Vec::new()),
    };

    Ok(serde_json::from_value(list)?)
}

/// Client of the community LeetCode API.
///
/// The API is heavily rate limited, so every response is cached for `cache_ttl`. A 429 answer
/// is cached as an empty object and reported as "no data" instead of an error.
pub struct LeetCodeClient {
    base_url: Url,
    client: Client,
    clock: Arc<dyn Clock>,
    cache: TtlCache<Value>,
    problem_limit: usize,
    submission_limit: usize,
}

impl LeetCodeClient {
    pub fn new(config: LeetCodeConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        let client = Client::builder()
            .gzip(true)
            .timeout(config.timeout)
            .build()?;
        let ttl = chrono::Duration::from_std(config.cache_ttl)
            .unwrap_or_else(|_| chrono::Duration::seconds(300));

        Ok(Self {
            base_url: base_url(&config.base_url)?,
            client,
            cache: TtlCache::new(ttl, clock.clone()),
            clock,
            problem_limit: config.problem_limit,
            submission_limit: config.submission_limit,
        })
    }

    fn cache_key(path: &str, params: &[(&str, String)]) -> String {
        if params.is_empty() {
            return path.to_string();
        }
        let query = params
            .iter()
            .sorted()
            .map(|(key, value)| format!("{}={}", key, value))
            .join("&");
        format!("{}?{}", path, query)
    }

    async fn get(&self, path: &str, params: &[(&str, String)]) -> Result<Value> {
        let key = Self::cache_key(path, params);
        if let Some(cached) = self.cache.get(&key) {
            tracing::debug!("LeetCode API cache hit: {}", key);
            return Ok(cached);
        }

        let url = self.base_url.join(path)?;
        let res = self.client.get(url).query(params).send().await?;
        match res.status() {
            StatusCode::TOO_MANY_REQUESTS => {
                tracing::warn!(
                    "LeetCode API rate limited (429) on {}. Using empty data, try again in a few minutes.",
                    path
                );
                let empty = Value::Object(Default::default());
                self.cache.insert(key, empty.clone());
                return Ok(empty);
            }
            status if !status.is_success() => {
                tracing::warn!("LeetCode API {} failed with status {}", path, status);
                return Err(CatalogError::StatusError(status));
            }
            _ => {}
        }

        let body = res.text().await?;
        let payload: Value = serde_json::from_str(&body).map_err(|e| {
            tracing::warn!("LeetCode API {} returned malformed JSON: {}", path, e);
            e
        })?;
        self.cache.insert(key, payload.clone());

        Ok(payload)
    }

    pub async fn problems(&self) -> Result<Vec<LcProblem>> {
        let payload = self
            .get("problems", &[("limit", self.problem_limit.to_string())])
            .await?;
        list_payload(payload, "problemsetQuestionList")
    }

    pub async fn ac_submissions(&self, username: &str) -> Result<Vec<LcAcSubmission>> {
        let payload = self
            .get(
                &format!("{}/acSubmission", username),
                &[("limit", self.submission_limit.to_string())],
            )
            .await?;
        list_payload(payload, "submission")
    }

    pub async fn contest_history(&self, username: &str) -> Result<Vec<LcContestEntry>> {
        let payload = self
            .get(&format!("{}/contest/history", username), &[])
            .await?;
        list_payload(payload, "contestHistory")
    }
}

#[async_trait]
impl ProblemCatalog for LeetCodeClient {
    fn platform(&self) -> Platform {
        Platform::LeetCode
    }

    async fn fetch_problems(&self) -> Result<Vec<CatalogProblem>> {
        tracing::info!("Attempting to get problem list from LeetCode...");
        let problems: Vec<CatalogProblem> = self
            .problems()
            .await?
            .into_iter()
            .filter_map(LcProblem::into_catalog_problem)
            .collect();
        tracing::info!("{} LeetCode problems collected.", problems.len());

        Ok(problems)
    }
}

#[async_trait]
impl ActivitySource for LeetCodeClient {
    fn platform(&self) -> Platform {
        Platform::LeetCode
    }

    async fn fetch_activity(&self, user_id: &str, handle: &str) -> Result<UserActivity> {
        let now = self.clock.now();
        let solves = self
            .ac_submissions(handle)
            .await?
            .iter()
            .filter_map(|submission| submission.to_solve(user_id, now))
            .collect();

        let rating_changes = match self.contest_history(handle).await {
            Ok(history) => history
                .iter()
                .filter_map(|entry| entry.to_event(user_id, now))
                .collect(),
            Err(e) => {
                tracing::warn!("LeetCode contest history of {} unavailable: {}", handle, e);
                Vec::new()
            }
        };

        Ok(UserActivity {
            solves,
            rating_changes,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn capitalize_difficulty() {
        assert_eq!(capitalize("EASY"), "Easy");
        assert_eq!(capitalize("medium"), "Medium");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn problems_from_wrapped_payload() {
        let payload = json!({
            "totalQuestions": 3000,
            "count": 2,
            "problemsetQuestionList": [
                {"title": "Two Sum", "titleSlug": "two-sum", "difficulty": "EASY", "topicTags": [{"name": "Array", "slug": "array"}, {"name": "Hash Table", "slug": "hash-table"}]},
                {"title": "Add Two Numbers", "titleSlug": "add-two-numbers", "difficulty": "Medium", "topicTags": ["Linked List", "Math"]}
            ]
        });

        let problems: Vec<CatalogProblem> = list_payload::<LcProblem>(payload, "problemsetQuestionList")
            .unwrap()
            .into_iter()
            .filter_map(LcProblem::into_catalog_problem)
            .collect();

        assert_eq!(problems.len(), 2);
        assert_eq!(
            problems[0],
            CatalogProblem {
                problem_id: String::from("two-sum"),
                name: String::from("Two Sum"),
                url: String::from("https://leetcode.com/problems/two-sum/"),
                difficulty: String::from("Easy"),
                rating: None,
                tags: vec![String::from("Array"), String::from("Hash Table")],
            }
        );
        assert_eq!(problems[1].tags, vec!["Linked List", "Math"]);
    }

    #[test]
    fn empty_object_is_empty_list() {
        let problems = list_payload::<LcProblem>(json!({}), "problemsetQuestionList").unwrap();
        assert!(problems.is_empty());

        let bare = list_payload::<LcProblem>(
            json!([{"title": "Two Sum", "titleSlug": "two-sum"}]),
            "problemsetQuestionList",
        )
        .unwrap();
        assert_eq!(bare.len(), 1);
    }

    #[test]
    fn ac_submissions_become_solves() {
        let payload = json!({
            "count": 3,
            "submission": [
                {"title": "Two Sum", "titleSlug": "two-sum", "timestamp": "1709290000", "statusDisplay": "Accepted", "lang": "rust"},
                {"title": "Valid Parentheses", "timestamp": 1709280000},
                {"title": "", "titleSlug": ""}
            ]
        });

        let solves: Vec<PracticeSolve> = list_payload::<LcAcSubmission>(payload, "submission")
            .unwrap()
            .iter()
            .filter_map(|submission| submission.to_solve("default", now()))
            .collect();

        assert_eq!(solves.len(), 2);
        assert_eq!(solves[0].problem_id, "two-sum");
        assert_eq!(solves[0].difficulty, "Unknown");
        assert_eq!(solves[0].solved_at, Utc.timestamp_opt(1709290000, 0).unwrap());
        assert!(solves[0].tags.is_empty());
        assert_eq!(solves[1].problem_id, "valid-parentheses");
    }

    #[test]
    fn missing_timestamp_falls_back_to_now() {
        let submission: LcAcSubmission =
            serde_json::from_value(json!({"title": "Two Sum", "titleSlug": "two-sum", "difficulty": "easy"}))
                .unwrap();
        let solve = submission.to_solve("default", now()).unwrap();

        assert_eq!(solve.solved_at, now());
        assert_eq!(solve.difficulty, "Easy");
    }

    #[test]
    fn contest_history_skips_unattended() {
        let payload = json!({
            "count": 2,
            "contestHistory": [
                {"attended": true, "rating": 1523.61, "ranking": 2000, "contest": {"title": "Weekly Contest 380", "startTime": 1705199400}},
                {"attended": false, "rating": 1500.0, "contest": {"title": "Weekly Contest 381", "startTime": 1705804200}}
            ]
        });

        let events: Vec<RatingChangeEvent> = list_payload::<LcContestEntry>(payload, "contestHistory")
            .unwrap()
            .iter()
            .filter_map(|entry| entry.to_event("default", now()))
            .collect();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].contest_id, "Weekly Contest 380");
        assert_eq!((events[0].old_rating, events[0].new_rating), (1524, 1524));
        assert_eq!(events[0].timestamp, Utc.timestamp_opt(1705199400, 0).unwrap());
    }

    #[test]
    fn cache_key_sorts_params() {
        let key = LeetCodeClient::cache_key(
            "problems",
            &[("tags", String::from("array")), ("limit", String::from("100"))],
        );
        assert_eq!(key, "problems?limit=100&tags=array");
        assert_eq!(LeetCodeClient::cache_key("alice/contest/history", &[]), "alice/contest/history");
    }

    /// Live call against the community LeetCode API.
    #[tokio::test]
    #[ignore]
    async fn test_fetch_problems() {
        let client =
            LeetCodeClient::new(LeetCodeConfig::default(), Arc::new(crate::clock::SystemClock))
                .unwrap();
        let problems = client.fetch_problems().await.unwrap();

        assert!(!problems.is_empty());
    }
}
