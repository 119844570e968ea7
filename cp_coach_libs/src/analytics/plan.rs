use crate::{
    analytics::{classifier::TagClassifier, max_recent_rating},
    models::{DifficultyWindow, TrainingPlan, WeakStrongResult},
    store::HistoryStore,
};
use std::{collections::BTreeMap, sync::Arc};

const DEFAULT_CEILING: i32 = 1400;
const PROBLEMS_PER_WEAK_TAG: u32 = 2;

/// Daily practice window: `rating + 200` clamped to [1200, 1800], and 300 below that but not
/// under 800. Without a rating the ceiling is 1400.
pub fn plan_window(max_rating: i32) -> DifficultyWindow {
    let high = if max_rating > 0 {
        (max_rating + 200).clamp(1200, 1800)
    } else {
        DEFAULT_CEILING
    };

    DifficultyWindow {
        low: (high - 300).max(800),
        high,
    }
}

pub fn make_plan(tags: WeakStrongResult, window: DifficultyWindow) -> TrainingPlan {
    let mut problems_today = vec![format!(
        "2 problems in {}-{} range",
        window.low, window.high
    )];
    problems_today.extend(
        tags.weak_tags
            .iter()
            .take(2)
            .map(|tag| format!("1 {} problem", tag)),
    );
    problems_today.push(String::from("Focus on solving within 25 minutes"));

    TrainingPlan {
        suggested_per_tag: tags
            .weak_tags
            .iter()
            .map(|tag| (tag.clone(), PROBLEMS_PER_WEAK_TAG))
            .collect::<BTreeMap<_, _>>(),
        weak_tags: tags.weak_tags,
        strong_tags: tags.strong_tags,
        difficulty_range: [window.low, window.high],
        problems_today,
    }
}

#[derive(Clone)]
pub struct PlanBuilder {
    classifier: TagClassifier,
    history: Arc<dyn HistoryStore>,
}

impl PlanBuilder {
    pub fn new(classifier: TagClassifier, history: Arc<dyn HistoryStore>) -> Self {
        Self {
            classifier,
            history,
        }
    }

    /// Training plan from the cached tag classification and the latest contest ratings.
    pub async fn build_plan(&self, user_id: &str) -> TrainingPlan {
        let tags = self.classifier.classify_tags(user_id, true).await;
        let max_rating = max_recent_rating(self.history.as_ref(), user_id).await;
        let window = plan_window(max_rating);
        tracing::debug!(
            user_id,
            max_rating,
            low = window.low,
            high = window.high,
            "training window computed"
        );

        make_plan(tags, window)
    }
}
