use crate::{
    analytics::{classifier::TagClassifier, max_recent_rating},
    catalog::{CatalogProblem, ProblemCatalog},
    models::{DifficultyWindow, Platform, RecommendedProblem},
    store::{HistoryStore, SolveQuery},
};
use itertools::Itertools;
use rand::{seq::SliceRandom, Rng};
use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

/// Upper bound of the primary platform's share of a recommendation list.
pub const PRIMARY_SHARE: usize = 7;

/// Negative counts ask for nothing.
pub fn clamp_count(count: i64) -> usize {
    usize::try_from(count).unwrap_or(0)
}

/// Window for recommended problems: `rating + 200` clamped to [1200, 2000] and 400 below that
/// but not under 800. Without a rating the window is [800, 1400].
pub fn recommendation_window(max_rating: i32) -> DifficultyWindow {
    if max_rating <= 0 {
        return DifficultyWindow {
            low: 800,
            high: 1400,
        };
    }
    let high = (max_rating + 200).clamp(1200, 2000);

    DifficultyWindow {
        low: (high - 400).max(800),
        high,
    }
}

/// Samples up to `target` unsolved problems rated inside `window`.
///
/// About half of the picks (`target / 2 + 1`) come from problems sharing a tag with
/// `weak_tags` when there are enough of them; the rest is filled from the other candidates.
pub fn select_primary<R: Rng + ?Sized>(
    candidates: Vec<CatalogProblem>,
    solved: &HashSet<String>,
    weak_tags: &[String],
    window: DifficultyWindow,
    target: usize,
    rng: &mut R,
) -> Vec<CatalogProblem> {
    let weak: HashSet<&str> = weak_tags.iter().map(String::as_str).collect();
    let (matches, others): (Vec<CatalogProblem>, Vec<CatalogProblem>) = candidates
        .into_iter()
        .filter(|problem| !solved.contains(&problem.problem_id))
        .filter(|problem| {
            problem
                .rating
                .map_or(false, |rating| window.contains(rating))
        })
        .unique_by(|problem| problem.problem_id.clone())
        .partition(|problem| problem.tags.iter().any(|tag| weak.contains(tag.as_str())));

    let weak_pick = matches.len().min(target / 2 + 1).min(target);
    let mut picked: Vec<CatalogProblem> = matches
        .choose_multiple(rng, weak_pick)
        .cloned()
        .collect();

    let remaining = target - picked.len();
    picked.extend(others.choose_multiple(rng, remaining).cloned());

    picked
}

/// Samples up to `target` unsolved problems with no difficulty or tag preference.
pub fn select_secondary<R: Rng + ?Sized>(
    candidates: Vec<CatalogProblem>,
    solved: &HashSet<String>,
    target: usize,
    rng: &mut R,
) -> Vec<CatalogProblem> {
    let candidates: Vec<CatalogProblem> = candidates
        .into_iter()
        .filter(|problem| !solved.contains(&problem.problem_id))
        .unique_by(|problem| problem.problem_id.clone())
        .collect();

    candidates.choose_multiple(rng, target).cloned().collect()
}

/// Picks practice problems from two catalogs for one user.
///
/// The primary catalog contributes up to seven problems biased toward weak tags and bounded by
/// the user's rating; the secondary catalog fills the rest. A catalog that cannot be fetched
/// contributes nothing.
#[derive(Clone)]
pub struct ProblemSelector {
    classifier: TagClassifier,
    history: Arc<dyn HistoryStore>,
    primary: Arc<dyn ProblemCatalog>,
    secondary: Arc<dyn ProblemCatalog>,
}

impl ProblemSelector {
    pub fn new(
        classifier: TagClassifier,
        history: Arc<dyn HistoryStore>,
        primary: Arc<dyn ProblemCatalog>,
        secondary: Arc<dyn ProblemCatalog>,
    ) -> Self {
        Self {
            classifier,
            history,
            primary,
            secondary,
        }
    }

    async fn solved_ids(&self, user_id: &str) -> HashMap<Platform, HashSet<String>> {
        let solves = match self
            .history
            .get_solves(user_id, &SolveQuery::default())
            .await
        {
            Ok(solves) => solves,
            Err(e) => {
                tracing::warn!("could not load practice solves of {}: {}", user_id, e);
                return HashMap::new();
            }
        };

        let mut solved: HashMap<Platform, HashSet<String>> = HashMap::new();
        for solve in solves {
            solved
                .entry(solve.platform)
                .or_default()
                .insert(solve.problem_id);
        }
        solved
    }

    async fn candidates(catalog: &dyn ProblemCatalog) -> Vec<CatalogProblem> {
        match catalog.fetch_problems().await {
            Ok(problems) => problems,
            Err(e) => {
                tracing::warn!(
                    "{} problem recommendation failed: {}",
                    catalog.platform(),
                    e
                );
                Vec::new()
            }
        }
    }

    /// Up to `count` unsolved problems, primary catalog first. Never fails; degraded inputs
    /// only shorten the list.
    pub async fn recommend(&self, user_id: &str, count: i64) -> Vec<RecommendedProblem> {
        let count = clamp_count(count);
        if count == 0 {
            return Vec::new();
        }

        let solved = self.solved_ids(user_id).await;
        let weak_tags = self.classifier.classify_tags(user_id, true).await.weak_tags;
        let window =
            recommendation_window(max_recent_rating(self.history.as_ref(), user_id).await);

        let (primary, secondary) = tokio::join!(
            Self::candidates(self.primary.as_ref()),
            Self::candidates(self.secondary.as_ref())
        );

        self.pick(primary, secondary, &solved, &weak_tags, window, count)
    }

    fn pick(
        &self,
        primary: Vec<CatalogProblem>,
        secondary: Vec<CatalogProblem>,
        solved: &HashMap<Platform, HashSet<String>>,
        weak_tags: &[String],
        window: DifficultyWindow,
        count: usize,
    ) -> Vec<RecommendedProblem> {
        let empty = HashSet::new();
        let primary_platform = self.primary.platform();
        let secondary_platform = self.secondary.platform();
        let mut rng = rand::thread_rng();

        let primary = select_primary(
            primary,
            solved.get(&primary_platform).unwrap_or(&empty),
            weak_tags,
            window,
            PRIMARY_SHARE.min(count),
            &mut rng,
        );
        let secondary = select_secondary(
            secondary,
            solved.get(&secondary_platform).unwrap_or(&empty),
            count - primary.len(),
            &mut rng,
        );

        primary
            .into_iter()
            .map(|problem| problem.into_recommendation(primary_platform))
            .chain(
                secondary
                    .into_iter()
                    .map(|problem| problem.into_recommendation(secondary_platform)),
            )
            .take(count)
            .collect()
    }
}
