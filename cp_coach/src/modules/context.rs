use crate::modules::settings::Settings;
use anyhow::{Context as _, Result};
use cp_coach_libs::{
    catalog::{ActivitySource, CodeforcesClient, LeetCodeClient, ProblemCatalog},
    store::{AnalyticsCacheStore, HistoryStore, PgStore},
    sync::PlatformHandles,
    Clock, PlanBuilder, PracticeSync, ProblemSelector, SystemClock, TagClassifier,
};
use std::sync::Arc;

/// Engine components wired for one configured user. Shared by the CLI commands and the API.
pub struct Context {
    pub history: Arc<dyn HistoryStore>,
    pub classifier: TagClassifier,
    pub planner: PlanBuilder,
    pub selector: ProblemSelector,
    pub sync: PracticeSync,
    pub clock: Arc<dyn Clock>,
    pub user_id: String,
    pub handles: PlatformHandles,
}

impl Context {
    pub fn new<S>(
        store: Arc<S>,
        primary: Arc<dyn ProblemCatalog>,
        secondary: Arc<dyn ProblemCatalog>,
        sources: Vec<Arc<dyn ActivitySource>>,
        clock: Arc<dyn Clock>,
        user_id: String,
        handles: PlatformHandles,
    ) -> Self
    where
        S: HistoryStore + AnalyticsCacheStore + 'static,
    {
        let history: Arc<dyn HistoryStore> = store.clone();
        let cache: Arc<dyn AnalyticsCacheStore> = store;
        let classifier = TagClassifier::new(history.clone(), cache, clock.clone());

        Self {
            planner: PlanBuilder::new(classifier.clone(), history.clone()),
            selector: ProblemSelector::new(classifier.clone(), history.clone(), primary, secondary),
            sync: PracticeSync::new(history.clone(), sources),
            classifier,
            history,
            clock,
            user_id,
            handles,
        }
    }

    /// Connects to PostgreSQL, applies migrations and builds both catalog clients.
    pub async fn connect(settings: &Settings) -> Result<Self> {
        let database_url = settings.database_url()?;
        let store = PgStore::connect(database_url, settings.max_connections)
            .await
            .with_context(|| {
                let message = "Failed to create database connection pool.";
                tracing::error!(message);
                message
            })?;
        store.migrate().await.with_context(|| {
            let message = "Failed to migrate database.";
            tracing::error!(message);
            message
        })?;

        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let codeforces = Arc::new(
            CodeforcesClient::new(settings.codeforces.clone(), clock.clone()).with_context(
                || {
                    let message = format!(
                        "couldn't create Codeforces client for {}",
                        settings.codeforces.base_url
                    );
                    tracing::error!(message);
                    message
                },
            )?,
        );
        let leetcode = Arc::new(
            LeetCodeClient::new(settings.leetcode.clone(), clock.clone()).with_context(|| {
                let message = format!(
                    "couldn't create LeetCode client for {}",
                    settings.leetcode.base_url
                );
                tracing::error!(message);
                message
            })?,
        );

        let sources: Vec<Arc<dyn ActivitySource>> = vec![codeforces.clone(), leetcode.clone()];

        Ok(Self::new(
            Arc::new(store),
            codeforces,
            leetcode,
            sources,
            clock,
            settings.user_id.clone(),
            settings.handles.clone(),
        ))
    }

    /// `user` when given, the configured user otherwise.
    pub fn user<'a>(&'a self, user: &'a Option<String>) -> &'a str {
        user.as_deref().unwrap_or(&self.user_id)
    }
}
