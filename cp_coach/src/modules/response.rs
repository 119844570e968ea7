use cp_coach_libs::sync::SyncReport;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
}

impl ErrorResponse {
    pub fn new(message: impl ToString) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UpdateResponse {
    pub status: String,
    pub message: String,
    pub report: SyncReport,
}

impl From<SyncReport> for UpdateResponse {
    fn from(report: SyncReport) -> Self {
        let failed = report
            .failed
            .iter()
            .map(|platform| platform.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        let (status, message) = match (report.synced.is_empty(), report.failed.is_empty()) {
            (true, true) => (
                "skipped",
                String::from("No platform handle configured; nothing was synced."),
            ),
            (false, true) => (
                "ok",
                format!(
                    "Practice data updated: {} solves, {} rating changes.",
                    report.solves, report.rating_changes
                ),
            ),
            (false, false) => (
                "partial",
                format!("Practice data partially updated; failed platforms: {}.", failed),
            ),
            (true, false) => (
                "error",
                format!("Practice sync failed for {}; check the server logs.", failed),
            ),
        };

        Self {
            status: status.to_string(),
            message,
            report,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use cp_coach_libs::models::Platform;

    #[test]
    fn status_follows_report() {
        let ok = UpdateResponse::from(SyncReport {
            synced: vec![Platform::Codeforces, Platform::LeetCode],
            solves: 12,
            rating_changes: 3,
            ..Default::default()
        });
        assert_eq!(ok.status, "ok");
        assert_eq!(ok.message, "Practice data updated: 12 solves, 3 rating changes.");

        let partial = UpdateResponse::from(SyncReport {
            synced: vec![Platform::Codeforces],
            failed: vec![Platform::LeetCode],
            ..Default::default()
        });
        assert_eq!(partial.status, "partial");
        assert!(partial.message.contains("leetcode"));

        let failed = UpdateResponse::from(SyncReport {
            failed: vec![Platform::Codeforces],
            ..Default::default()
        });
        assert_eq!(failed.status, "error");

        let skipped = UpdateResponse::from(SyncReport {
            skipped: vec![Platform::Codeforces, Platform::LeetCode],
            ..Default::default()
        });
        assert_eq!(skipped.status, "skipped");
    }
}
