use crate::modules::response::ErrorResponse;
use axum::{async_trait, extract::FromRequestParts, http::StatusCode, Json};
use cp_coach_libs::models::Platform;
use http::request::Parts;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate, PartialEq, Eq)]
pub struct RecommendParameters {
    #[validate(range(max = 100))]
    pub count: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, Validate, PartialEq, Eq)]
pub struct SummaryParameters {
    #[validate(range(min = 1, max = 3650))]
    pub days: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize, Validate, PartialEq, Eq)]
pub struct RatingHistoryParameters {
    pub platform: Option<Platform>,
    #[validate(range(min = 1, max = 500))]
    pub limit: Option<usize>,
}

/// Query string deserialized with `serde_urlencoded` and checked with `validator`.
pub struct ValidatedQuery<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let query = parts.uri.query().unwrap_or_default();
        let value: T = serde_urlencoded::from_str(query).map_err(|rejection| {
            tracing::error!("Parsing error: {}", rejection);
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new(format!(
                    "invalid format query string: [{}]",
                    rejection
                ))),
            )
        })?;

        value.validate().map_err(|rejection| {
            tracing::error!("Validation error: {}", rejection);
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new(
                    format!("Validation error: [{}]", rejection).replace('\n', ", "),
                )),
            )
        })?;

        Ok(ValidatedQuery(value))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_rating_history_parameters() {
        let params: RatingHistoryParameters =
            serde_urlencoded::from_str("platform=leetcode&limit=20").unwrap();
        assert_eq!(
            params,
            RatingHistoryParameters {
                platform: Some(Platform::LeetCode),
                limit: Some(20)
            }
        );
        assert!(params.validate().is_ok());

        let params: RatingHistoryParameters = serde_urlencoded::from_str("").unwrap();
        assert_eq!(params.platform, None);
        assert_eq!(params.limit, None);

        assert!(serde_urlencoded::from_str::<RatingHistoryParameters>("platform=atcoder").is_err());
    }

    #[test]
    fn negative_count_passes_validation() {
        let params: RecommendParameters = serde_urlencoded::from_str("count=-3").unwrap();
        assert_eq!(params.count, Some(-3));
        assert!(params.validate().is_ok());

        let params: RecommendParameters = serde_urlencoded::from_str("count=1000").unwrap();
        assert!(params.validate().is_err());
    }

    #[test]
    fn summary_days_must_be_positive() {
        let params: SummaryParameters = serde_urlencoded::from_str("days=0").unwrap();
        assert!(params.validate().is_err());

        let params: SummaryParameters = serde_urlencoded::from_str("days=7").unwrap();
        assert!(params.validate().is_ok());
    }
}
