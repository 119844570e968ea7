use crate::{
    clock::Clock,
    models::{AnalyticsCacheEntry, PracticeSolve, WeakStrongResult},
    store::{AnalyticsCacheStore, HistoryStore, SolveQuery},
};
use itertools::Itertools;
use std::{cmp::Reverse, collections::HashMap, sync::Arc};

/// Canonical competitive-programming topics. Any of them the user never solved counts as weak.
pub const REFERENCE_TAGS: [&str; 22] = [
    "dp",
    "greedy",
    "math",
    "graphs",
    "binary search",
    "sorting",
    "trees",
    "strings",
    "number theory",
    "geometry",
    "data structures",
    "implementation",
    "brute force",
    "constructive algorithms",
    "two pointers",
    "dfs and similar",
    "bitmasks",
    "combinatorics",
    "dsu",
    "shortest paths",
    "hashing",
    "divide and conquer",
];

const MAX_TAGS: usize = 5;
const MAX_NEVER_TRIED: usize = 3;

/// Resolves a platform-native difficulty to the common numeric scale.
///
/// Numbers within the `i32` range of platform ratings are taken as they are. Text tiers map
/// easy/medium/hard to 800/1200/1600 and anything else to 0, which means unknown.
pub fn normalize_difficulty(raw: &str) -> i64 {
    let raw = raw.trim();
    if let Ok(value) = raw.parse::<i32>() {
        return i64::from(value);
    }
    match raw.to_lowercase().as_str() {
        "easy" => 800,
        "medium" => 1200,
        "hard" => 1600,
        _ => 0,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagStat {
    pub tag: String,
    pub count: u32,
    difficulty_sum: i64,
    difficulty_count: i64,
}

impl TagStat {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            count: 0,
            difficulty_sum: 0,
            difficulty_count: 0,
        }
    }

    /// Mean of the positive normalized difficulties, `None` when no solve had one.
    pub fn avg_difficulty(&self) -> Option<i64> {
        if self.difficulty_count == 0 {
            None
        } else {
            Some(self.difficulty_sum / self.difficulty_count)
        }
    }
}

/// Per-tag counters in first-seen order. A tag repeated on one solve is counted once.
pub fn compute_tag_statistics(solves: &[PracticeSolve]) -> Vec<TagStat> {
    let mut stats: Vec<TagStat> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for solve in solves {
        let difficulty = normalize_difficulty(&solve.difficulty);
        for tag in solve.tags.iter().unique() {
            let i = *index.entry(tag.as_str()).or_insert_with(|| {
                stats.push(TagStat::new(tag));
                stats.len() - 1
            });
            let stat = &mut stats[i];
            stat.count += 1;
            if difficulty > 0 {
                stat.difficulty_sum = stat.difficulty_sum.saturating_add(difficulty);
                stat.difficulty_count += 1;
            }
        }
    }

    stats
}

/// Pure classification of a solve history.
pub fn classify(solves: &[PracticeSolve]) -> WeakStrongResult {
    if solves.is_empty() {
        return WeakStrongResult::default();
    }

    let stats = compute_tag_statistics(solves);
    let avg = |stat: &TagStat| stat.avg_difficulty().unwrap_or(0);

    let strong_tags: Vec<String> = stats
        .iter()
        .sorted_by_key(|stat| (Reverse(stat.count), Reverse(avg(stat))))
        .take(MAX_TAGS)
        .map(|stat| stat.tag.clone())
        .collect();

    let never_tried = REFERENCE_TAGS
        .iter()
        .filter(|tag| stats.iter().all(|stat| stat.tag != **tag))
        .take(MAX_NEVER_TRIED)
        .map(|tag| tag.to_string());
    let least_practiced = stats
        .iter()
        .sorted_by_key(|stat| (stat.count, avg(stat)))
        .filter(|stat| !strong_tags.contains(&stat.tag))
        .take(MAX_TAGS)
        .map(|stat| stat.tag.clone());
    let weak_tags: Vec<String> = never_tried.chain(least_practiced).take(MAX_TAGS).collect();

    WeakStrongResult {
        weak_tags,
        strong_tags,
        tag_counts: stats
            .iter()
            .map(|stat| (stat.tag.clone(), stat.count))
            .collect(),
        tag_avg_difficulty: stats
            .iter()
            .filter_map(|stat| Some((stat.tag.clone(), stat.avg_difficulty()?)))
            .collect(),
        total_solved: solves.len(),
    }
}

/// Weak/strong tag classification of a user's history with a write-through snapshot cache.
#[derive(Clone)]
pub struct TagClassifier {
    history: Arc<dyn HistoryStore>,
    cache: Arc<dyn AnalyticsCacheStore>,
    clock: Arc<dyn Clock>,
}

impl TagClassifier {
    pub fn new(
        history: Arc<dyn HistoryStore>,
        cache: Arc<dyn AnalyticsCacheStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            history,
            cache,
            clock,
        }
    }

    /// Classifies the whole solve history of `user_id`.
    ///
    /// With `use_cache`, an existing snapshot is returned as stored, however old. Every fresh
    /// computation over a non-empty history overwrites the snapshot. An empty history or a
    /// history store failure yields the empty result and leaves the snapshot alone.
    pub async fn classify_tags(&self, user_id: &str, use_cache: bool) -> WeakStrongResult {
        if use_cache {
            match self.cache.get(user_id).await {
                Ok(Some(entry)) => return entry.result,
                Ok(None) => {}
                Err(e) => tracing::warn!("failed to read analytics cache of {}: {}", user_id, e),
            }
        }

        let solves = match self
            .history
            .get_solves(user_id, &SolveQuery::default())
            .await
        {
            Ok(solves) => solves,
            Err(e) => {
                tracing::warn!("failed to load practice solves of {}: {}", user_id, e);
                return WeakStrongResult::default();
            }
        };
        if solves.is_empty() {
            return WeakStrongResult::default();
        }

        let result = classify(&solves);
        tracing::debug!(
            user_id,
            total_solved = result.total_solved,
            "tag classification computed"
        );

        let entry = AnalyticsCacheEntry {
            user_id: user_id.to_string(),
            result,
            last_updated: self.clock.now(),
        };
        if let Err(e) = self.cache.set(&entry).await {
            tracing::warn!("failed to write analytics cache of {}: {}", user_id, e);
        }

        entry.result
    }
}
