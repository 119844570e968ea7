use anyhow::{Context, Result};
use cp_coach_libs::{
    catalog::{CodeforcesConfig, LeetCodeConfig},
    sync::PlatformHandles,
};
use std::{env, str::FromStr, time::Duration};

#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub user_id: String,
    pub handles: PlatformHandles,
    pub codeforces: CodeforcesConfig,
    pub leetcode: LeetCodeConfig,
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_vars(|key| env::var(key).ok())
    }

    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| var(key).filter(|value| !value.trim().is_empty());

        let user_id = var("CP_COACH_USER").unwrap_or_else(|| {
            tracing::info!("CP_COACH_USER is not set. Default user `default` will be used.");
            String::from("default")
        });

        let mut codeforces = CodeforcesConfig::default();
        if let Some(url) = var("CODEFORCES_API_URL") {
            codeforces.base_url = url;
        }
        codeforces.min_interval = Duration::from_millis(parse_or(
            "CODEFORCES_MIN_INTERVAL_MS",
            var("CODEFORCES_MIN_INTERVAL_MS"),
            2000,
        ));

        let mut leetcode = LeetCodeConfig::default();
        if let Some(url) = var("LEETCODE_API_URL") {
            leetcode.base_url = url;
        }
        leetcode.cache_ttl = Duration::from_secs(parse_or(
            "LEETCODE_CACHE_TTL_SECS",
            var("LEETCODE_CACHE_TTL_SECS"),
            300,
        ));

        Self {
            database_url: var("DATABASE_URL"),
            max_connections: parse_or(
                "DATABASE_MAX_CONNECTIONS",
                var("DATABASE_MAX_CONNECTIONS"),
                5,
            ),
            user_id,
            handles: PlatformHandles {
                codeforces: var("CODEFORCES_HANDLE"),
                leetcode: var("LEETCODE_USERNAME"),
            },
            codeforces,
            leetcode,
        }
    }

    pub fn database_url(&self) -> Result<&str> {
        self.database_url.as_deref().with_context(|| {
            let message = "DATABASE_URL must be configured.";
            tracing::error!(message);
            message
        })
    }
}

fn parse_or<T: FromStr + std::fmt::Display>(key: &str, value: Option<String>, default: T) -> T {
    match value {
        None => default,
        Some(value) => value.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(
                "{} has invalid value `{}`. Default value `{}` will be used.",
                key,
                value,
                default
            );
            default
        }),
    }
}
