use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use std::{collections::BTreeMap, fmt, str::FromStr};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Codeforces,
    LeetCode,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Codeforces => "codeforces",
            Platform::LeetCode => "leetcode",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown platform: {0}")]
pub struct ParsePlatformError(String);

impl FromStr for Platform {
    type Err = ParsePlatformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "codeforces" => Ok(Platform::Codeforces),
            "leetcode" => Ok(Platform::LeetCode),
            _ => Err(ParsePlatformError(s.to_string())),
        }
    }
}

/// One accepted problem of a user on one platform.
///
/// `(platform, user_id, problem_id)` identifies a solve; storing the same key again
/// overwrites the previous record.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PracticeSolve {
    pub platform: Platform,
    pub user_id: String,
    pub problem_id: String,
    #[serde(default)]
    pub name: String,
    /// Platform-native difficulty: a numeric rating such as `"1400"` or a tier such as `"Medium"`.
    #[serde(default)]
    pub difficulty: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub solved_at: DateTime<Utc>,
    #[serde(default)]
    pub time_seconds: Option<i64>,
    #[serde(default)]
    pub submission_id: Option<String>,
}

/// Rating delta of one rated contest. Unique per `(platform, user_id, contest_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingChangeEvent {
    pub platform: Platform,
    pub user_id: String,
    pub contest_id: String,
    pub old_rating: i32,
    pub new_rating: i32,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeakStrongResult {
    pub weak_tags: Vec<String>,
    pub strong_tags: Vec<String>,
    pub tag_counts: BTreeMap<String, u32>,
    pub tag_avg_difficulty: BTreeMap<String, i64>,
    pub total_solved: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsCacheEntry {
    pub user_id: String,
    #[serde(flatten)]
    pub result: WeakStrongResult,
    pub last_updated: DateTime<Utc>,
}

/// Inclusive difficulty bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyWindow {
    pub low: i32,
    pub high: i32,
}

impl DifficultyWindow {
    pub fn contains(&self, difficulty: i32) -> bool {
        self.low <= difficulty && difficulty <= self.high
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingPlan {
    pub weak_tags: Vec<String>,
    pub strong_tags: Vec<String>,
    pub difficulty_range: [i32; 2],
    pub suggested_per_tag: BTreeMap<String, u32>,
    pub problems_today: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendedProblem {
    pub problem_id: String,
    pub name: String,
    pub url: String,
    pub difficulty: String,
    pub tags: Vec<String>,
    pub platform: Platform,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PracticeSummary {
    pub days: u32,
    pub total: usize,
    pub by_platform: BTreeMap<Platform, usize>,
    pub solves: Vec<PracticeSolve>,
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parse_platform() {
        assert_eq!("codeforces".parse::<Platform>().unwrap(), Platform::Codeforces);
        assert_eq!(" LeetCode ".parse::<Platform>().unwrap(), Platform::LeetCode);
        assert!("atcoder".parse::<Platform>().is_err());
    }

    #[test]
    fn solve_defaults_missing_optional_fields() {
        let solve: PracticeSolve = serde_json::from_value(serde_json::json!({
            "platform": "leetcode",
            "user_id": "default",
            "problem_id": "two-sum",
            "solved_at": "2024-01-01T00:00:00Z"
        }))
        .unwrap();

        assert_eq!(solve.name, "");
        assert_eq!(solve.difficulty, "");
        assert!(solve.tags.is_empty());
        assert_eq!(solve.time_seconds, None);
        assert_eq!(solve.submission_id, None);
        assert_eq!(solve.solved_at, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn cache_entry_is_flat_json() {
        let entry = AnalyticsCacheEntry {
            user_id: String::from("default"),
            result: WeakStrongResult {
                total_solved: 3,
                ..Default::default()
            },
            last_updated: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        };
        let value = serde_json::to_value(&entry).unwrap();

        assert_eq!(value["total_solved"], 3);
        assert_eq!(value["weak_tags"], serde_json::json!([]));
        assert_eq!(value["user_id"], "default");
    }

    #[test]
    fn summary_keys_platforms_by_name() {
        let summary = PracticeSummary {
            days: 30,
            total: 2,
            by_platform: BTreeMap::from([(Platform::Codeforces, 1), (Platform::LeetCode, 1)]),
            solves: Vec::new(),
        };

        assert_eq!(
            serde_json::to_string(&summary.by_platform).unwrap(),
            r#"{"codeforces":1,"leetcode":1}"#
        );
    }
}
