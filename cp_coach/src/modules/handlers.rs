use crate::modules::{
    context::Context,
    request::{RatingHistoryParameters, RecommendParameters, SummaryParameters, ValidatedQuery},
    response::UpdateResponse,
};
use axum::{extract::Extension, http::StatusCode, Json};
use cp_coach_libs::{
    analytics::summary::{self, DEFAULT_RATING_HISTORY_LIMIT},
    models::{PracticeSummary, RatingChangeEvent, RecommendedProblem, TrainingPlan, WeakStrongResult},
    store::HistoryStore,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::time::Instant;

const DEFAULT_RECOMMEND_COUNT: i64 = 10;
const DEFAULT_SUMMARY_DAYS: u32 = 30;

pub async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

pub async fn liveness(Extension(context): Extension<Arc<Context>>) -> StatusCode {
    match context.history.ping().await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::error!("database is not available: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Always recomputed; the cached snapshot is refreshed as a side effect.
pub async fn weak_strong_tags(Extension(context): Extension<Arc<Context>>) -> Json<WeakStrongResult> {
    Json(context.classifier.classify_tags(&context.user_id, false).await)
}

pub async fn training_plan(Extension(context): Extension<Arc<Context>>) -> Json<TrainingPlan> {
    Json(context.planner.build_plan(&context.user_id).await)
}

pub async fn recommended(
    ValidatedQuery(params): ValidatedQuery<RecommendParameters>,
    Extension(context): Extension<Arc<Context>>,
) -> Json<Vec<RecommendedProblem>> {
    let start_process = Instant::now();
    let count = params.count.unwrap_or(DEFAULT_RECOMMEND_COUNT);

    let problems = context.selector.recommend(&context.user_id, count).await;

    let time: u32 = Instant::now().duration_since(start_process).as_millis() as u32;
    tracing::info!(
        target: "querylog",
        "elapsed_time={} hits={} params={}",
        time, problems.len(), serde_json::to_string(&params).unwrap_or(String::from(""))
    );

    Json(problems)
}

pub async fn practice_summary(
    ValidatedQuery(params): ValidatedQuery<SummaryParameters>,
    Extension(context): Extension<Arc<Context>>,
) -> Json<PracticeSummary> {
    let days = params.days.unwrap_or(DEFAULT_SUMMARY_DAYS);
    Json(
        summary::summarize_practice(
            context.history.as_ref(),
            context.clock.as_ref(),
            &context.user_id,
            days,
        )
        .await,
    )
}

pub async fn rating_history(
    ValidatedQuery(params): ValidatedQuery<RatingHistoryParameters>,
    Extension(context): Extension<Arc<Context>>,
) -> Json<Vec<RatingChangeEvent>> {
    Json(
        summary::rating_history(
            context.history.as_ref(),
            &context.user_id,
            params.platform,
            params.limit.unwrap_or(DEFAULT_RATING_HISTORY_LIMIT),
        )
        .await,
    )
}

/// Runs the practice sync in the request. Failures are reported in the body, never as a status.
pub async fn update_data(Extension(context): Extension<Arc<Context>>) -> (StatusCode, Json<UpdateResponse>) {
    let report = context.sync.run(&context.user_id, &context.handles).await;
    (StatusCode::OK, Json(UpdateResponse::from(report)))
}
