use crate::{
    models::{AnalyticsCacheEntry, Platform, PracticeSolve, RatingChangeEvent, WeakStrongResult},
    store::{AnalyticsCacheStore, HistoryStore, Result, SolveQuery, StoreError},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{
    migrate::Migrator,
    postgres::{PgPoolOptions, Postgres},
    types::Json,
    FromRow, Pool,
};

pub static MIGRATOR: Migrator = sqlx::migrate!();

#[derive(Debug, FromRow)]
struct SolveRow {
    platform: String,
    user_id: String,
    problem_id: String,
    name: String,
    difficulty: String,
    tags: Vec<String>,
    solved_at: DateTime<Utc>,
    time_seconds: Option<i64>,
    submission_id: Option<String>,
}

impl TryFrom<SolveRow> for PracticeSolve {
    type Error = StoreError;

    fn try_from(row: SolveRow) -> Result<Self> {
        Ok(PracticeSolve {
            platform: parse_platform(&row.platform)?,
            user_id: row.user_id,
            problem_id: row.problem_id,
            name: row.name,
            difficulty: row.difficulty,
            tags: row.tags,
            solved_at: row.solved_at,
            time_seconds: row.time_seconds,
            submission_id: row.submission_id,
        })
    }
}

#[derive(Debug, FromRow)]
struct RatingRow {
    platform: String,
    user_id: String,
    contest_id: String,
    old_rating: i32,
    new_rating: i32,
    timestamp: DateTime<Utc>,
}

impl TryFrom<RatingRow> for RatingChangeEvent {
    type Error = StoreError;

    fn try_from(row: RatingRow) -> Result<Self> {
        Ok(RatingChangeEvent {
            platform: parse_platform(&row.platform)?,
            user_id: row.user_id,
            contest_id: row.contest_id,
            old_rating: row.old_rating,
            new_rating: row.new_rating,
            timestamp: row.timestamp,
        })
    }
}

#[derive(Debug, FromRow)]
struct CacheRow {
    user_id: String,
    payload: Json<WeakStrongResult>,
    last_updated: DateTime<Utc>,
}

fn parse_platform(value: &str) -> Result<Platform> {
    value
        .parse::<Platform>()
        .map_err(|e| StoreError::InvalidValueError(e.to_string()))
}

/// History store and analytics cache backed by PostgreSQL (15 or later, for `MERGE`).
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: Pool<Postgres>,
}

impl PgStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        Ok(Self::new(pool))
    }

    pub async fn migrate(&self) -> Result<()> {
        MIGRATOR.run(&self.pool).await?;
        tracing::info!("database migration finished");
        Ok(())
    }
}

#[async_trait]
impl HistoryStore for PgStore {
    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn get_solves(&self, user_id: &str, query: &SolveQuery) -> Result<Vec<PracticeSolve>> {
        let rows: Vec<SolveRow> = sqlx::query_as(
            r#"
            SELECT
                "platform",
                "user_id",
                "problem_id",
                "name",
                "difficulty",
                "tags",
                "solved_at",
                "time_seconds",
                "submission_id"
            FROM
                "practice_solves"
            WHERE
                "user_id" = $1::text
                AND ($2::timestamptz IS NULL OR "solved_at" >= $2::timestamptz)
                AND ($3::timestamptz IS NULL OR "solved_at" <= $3::timestamptz)
                AND ($4::text IS NULL OR "platform" = $4::text)
            ORDER BY
                "solved_at" DESC,
                "platform" ASC,
                "problem_id" ASC
            "#,
        )
        .bind(user_id)
        .bind(query.from)
        .bind(query.to)
        .bind(query.platform.map(|platform| platform.as_str()))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(PracticeSolve::try_from).collect()
    }

    async fn get_rating_history(
        &self,
        user_id: &str,
        platform: Option<Platform>,
        limit: usize,
    ) -> Result<Vec<RatingChangeEvent>> {
        let rows: Vec<RatingRow> = sqlx::query_as(
            r#"
            SELECT
                "platform",
                "user_id",
                "contest_id",
                "old_rating",
                "new_rating",
                "timestamp"
            FROM
                "rating_history"
            WHERE
                "user_id" = $1::text
                AND ($2::text IS NULL OR "platform" = $2::text)
            ORDER BY
                "timestamp" DESC,
                "contest_id" ASC
            LIMIT
                $3::bigint
            "#,
        )
        .bind(user_id)
        .bind(platform.map(|platform| platform.as_str()))
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(RatingChangeEvent::try_from).collect()
    }

    async fn upsert_solve(&self, solve: &PracticeSolve) -> Result<()> {
        sqlx::query(
            r#"
            MERGE INTO "practice_solves"
            USING
                (
                    VALUES ($1::text, $2::text, $3::text, $4::text, $5::text, $6::text[], $7::timestamptz, $8::bigint, $9::text)
                ) AS "solve"(
                    "platform", "user_id", "problem_id", "name", "difficulty", "tags", "solved_at", "time_seconds", "submission_id"
                )
            ON
                "practice_solves"."platform" = "solve"."platform"
                AND "practice_solves"."user_id" = "solve"."user_id"
                AND "practice_solves"."problem_id" = "solve"."problem_id"
            WHEN MATCHED THEN
                UPDATE SET (
                    "name", "difficulty", "tags", "solved_at", "time_seconds", "submission_id", "updated_at"
                ) = (
                    "solve"."name",
                    "solve"."difficulty",
                    "solve"."tags",
                    "solve"."solved_at",
                    "solve"."time_seconds",
                    "solve"."submission_id",
                    CURRENT_TIMESTAMP
                )
            WHEN NOT MATCHED THEN
                INSERT (
                    "platform", "user_id", "problem_id", "name", "difficulty", "tags", "solved_at", "time_seconds", "submission_id"
                )
                VALUES (
                    "solve"."platform",
                    "solve"."user_id",
                    "solve"."problem_id",
                    "solve"."name",
                    "solve"."difficulty",
                    "solve"."tags",
                    "solve"."solved_at",
                    "solve"."time_seconds",
                    "solve"."submission_id"
                );
            "#,
        )
        .bind(solve.platform.as_str())
        .bind(&solve.user_id)
        .bind(&solve.problem_id)
        .bind(&solve.name)
        .bind(&solve.difficulty)
        .bind(&solve.tags)
        .bind(solve.solved_at)
        .bind(solve.time_seconds)
        .bind(&solve.submission_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(
                "an error occurred at saving solve {} of {}: {:?}",
                solve.problem_id,
                solve.user_id,
                e
            );
            e
        })?;

        Ok(())
    }

    async fn add_rating_change(&self, event: &RatingChangeEvent) -> Result<()> {
        sqlx::query(
            r#"
            MERGE INTO "rating_history"
            USING
                (
                    VALUES ($1::text, $2::text, $3::text, $4::integer, $5::integer, $6::timestamptz)
                ) AS "event"("platform", "user_id", "contest_id", "old_rating", "new_rating", "timestamp")
            ON
                "rating_history"."platform" = "event"."platform"
                AND "rating_history"."user_id" = "event"."user_id"
                AND "rating_history"."contest_id" = "event"."contest_id"
            WHEN MATCHED THEN
                UPDATE SET ("old_rating", "new_rating", "timestamp") = ("event"."old_rating", "event"."new_rating", "event"."timestamp")
            WHEN NOT MATCHED THEN
                INSERT ("platform", "user_id", "contest_id", "old_rating", "new_rating", "timestamp")
                VALUES ("event"."platform", "event"."user_id", "event"."contest_id", "event"."old_rating", "event"."new_rating", "event"."timestamp");
            "#,
        )
        .bind(event.platform.as_str())
        .bind(&event.user_id)
        .bind(&event.contest_id)
        .bind(event.old_rating)
        .bind(event.new_rating)
        .bind(event.timestamp)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl AnalyticsCacheStore for PgStore {
    async fn get(&self, user_id: &str) -> Result<Option<AnalyticsCacheEntry>> {
        let row: Option<CacheRow> = sqlx::query_as(
            r#"
            SELECT "user_id", "payload", "last_updated" FROM "analytics_cache" WHERE "user_id" = $1::text
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| AnalyticsCacheEntry {
            user_id: row.user_id,
            result: row.payload.0,
            last_updated: row.last_updated,
        }))
    }

    async fn set(&self, entry: &AnalyticsCacheEntry) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO "analytics_cache" ("user_id", "payload", "last_updated")
            VALUES ($1::text, $2::jsonb, $3::timestamptz)
            ON CONFLICT ("user_id") DO UPDATE
            SET "payload" = EXCLUDED."payload", "last_updated" = EXCLUDED."last_updated"
            "#,
        )
        .bind(&entry.user_id)
        .bind(Json(&entry.result))
        .bind(entry.last_updated)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
