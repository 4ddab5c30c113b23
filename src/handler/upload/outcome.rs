//! Per-file upload outcomes and the aggregated report

use hyper::StatusCode;
use serde::Serialize;
use std::fmt::Write;

use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::handler::html::{file_href, page};
use crate::handler::LISTING_PATH;

/// Why a single file was not stored, ordered by severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    BadRequest,
    Conflict,
    ServerError,
}

impl FailureKind {
    pub const fn status(self) -> StatusCode {
        match self {
            Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::Conflict => StatusCode::CONFLICT,
            Self::ServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum PartResult {
    Saved { bytes: u64 },
    Failed { kind: FailureKind, reason: String },
}

impl PartResult {
    pub fn failed(kind: FailureKind, reason: impl Into<String>) -> Self {
        Self::Failed {
            kind,
            reason: reason.into(),
        }
    }
}

/// What happened to one uploaded file
#[derive(Debug, Clone, Serialize)]
pub struct UploadOutcome {
    pub index: usize,
    pub field_name: String,
    pub file_name: String,
    #[serde(flatten)]
    pub result: PartResult,
}

/// All outcomes of one upload request, in request order
#[derive(Debug, Default)]
pub struct UploadReport {
    outcomes: Vec<UploadOutcome>,
}

#[derive(Serialize)]
struct ReportJson<'a> {
    saved: usize,
    failed: usize,
    files: &'a [UploadOutcome],
}

impl UploadReport {
    pub fn new(mut outcomes: Vec<UploadOutcome>) -> Self {
        outcomes.sort_by_key(|o| o.index);
        Self { outcomes }
    }

    pub fn outcomes(&self) -> &[UploadOutcome] {
        &self.outcomes
    }

    pub fn saved_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.result, PartResult::Saved { .. }))
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.len() - self.saved_count()
    }

    /// Status to answer with, or `None` when every file was stored
    ///
    /// Mixed results give 207; when nothing was stored the most severe
    /// failure decides.
    pub fn failure_status(&self) -> Option<StatusCode> {
        let worst = self
            .outcomes
            .iter()
            .filter_map(|o| match o.result {
                PartResult::Failed { kind, .. } => Some(kind),
                PartResult::Saved { .. } => None,
            })
            .max()?;

        if self.saved_count() > 0 {
            Some(StatusCode::MULTI_STATUS)
        } else {
            Some(worst.status())
        }
    }

    pub fn to_json(&self) -> String {
        let report = ReportJson {
            saved: self.saved_count(),
            failed: self.failed_count(),
            files: self.outcomes(),
        };
        serde_json::to_string(&report).unwrap_or_else(|e| format!(r#"{{"error":"{e}"}}"#))
    }

    pub fn to_html(&self) -> String {
        let mut body = format!(
            "<h1>Upload results</h1>\n<p>{} saved, {} failed</p>\n<ul>\n",
            self.saved_count(),
            self.failed_count()
        );

        for outcome in self.outcomes() {
            let name = encode_text(&outcome.file_name);
            let _ = match &outcome.result {
                PartResult::Saved { bytes } => writeln!(
                    body,
                    "<li><a href=\"{}\">{name}</a>: saved ({bytes} bytes)</li>",
                    encode_double_quoted_attribute(&file_href(&outcome.file_name))
                ),
                PartResult::Failed { kind, reason } => writeln!(
                    body,
                    "<li>{}: failed ({}): {}</li>",
                    if name.is_empty() { "(no name)" } else { name.as_ref() },
                    kind.status(),
                    encode_text(reason)
                ),
            };
        }

        let _ = writeln!(body, "</ul>\n<p><a href=\"{LISTING_PATH}\">Back to files</a></p>");
        page("Upload results", &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn saved(index: usize, name: &str) -> UploadOutcome {
        UploadOutcome {
            index,
            field_name: "file".to_string(),
            file_name: name.to_string(),
            result: PartResult::Saved { bytes: 3 },
        }
    }

    fn failed(index: usize, name: &str, kind: FailureKind) -> UploadOutcome {
        UploadOutcome {
            index,
            field_name: "file".to_string(),
            file_name: name.to_string(),
            result: PartResult::failed(kind, "nope"),
        }
    }

    #[test]
    fn test_all_saved_has_no_failure_status() {
        let report = UploadReport::new(vec![saved(1, "b"), saved(0, "a")]);
        assert_eq!(report.failure_status(), None);
        assert_eq!(report.outcomes()[0].file_name, "a");
    }

    #[test]
    fn test_empty_report_has_no_failure_status() {
        assert_eq!(UploadReport::default().failure_status(), None);
    }

    #[test]
    fn test_mixed_is_multi_status() {
        let report = UploadReport::new(vec![
            saved(0, "a"),
            failed(1, "b", FailureKind::ServerError),
        ]);
        assert_eq!(report.failure_status(), Some(StatusCode::MULTI_STATUS));
    }

    #[test]
    fn test_all_failed_uses_most_severe() {
        let report = UploadReport::new(vec![
            failed(0, "", FailureKind::BadRequest),
            failed(1, "b", FailureKind::Conflict),
        ]);
        assert_eq!(report.failure_status(), Some(StatusCode::CONFLICT));

        let report = UploadReport::new(vec![
            failed(0, "a", FailureKind::ServerError),
            failed(1, "", FailureKind::BadRequest),
        ]);
        assert_eq!(
            report.failure_status(),
            Some(StatusCode::INTERNAL_SERVER_ERROR)
        );
    }

    #[test]
    fn test_json_shape() {
        let report = UploadReport::new(vec![
            saved(0, "a.txt"),
            failed(1, "b.txt", FailureKind::Conflict),
        ]);
        let value: serde_json::Value = serde_json::from_str(&report.to_json()).unwrap();

        assert_eq!(value["saved"], 1);
        assert_eq!(value["failed"], 1);
        assert_eq!(value["files"][0]["result"], "saved");
        assert_eq!(value["files"][0]["bytes"], 3);
        assert_eq!(value["files"][1]["result"], "failed");
        assert_eq!(value["files"][1]["kind"], "conflict");
        assert_eq!(value["files"][1]["file_name"], "b.txt");
    }

    #[test]
    fn test_html_lists_each_file() {
        let report = UploadReport::new(vec![
            saved(0, "a.txt"),
            failed(1, "", FailureKind::BadRequest),
        ]);
        let html = report.to_html();
        assert!(html.contains("1 saved, 1 failed"));
        assert!(html.contains("<a href=\"/a.txt\">a.txt</a>: saved (3 bytes)"));
        assert!(html.contains("(no name): failed (400 Bad Request): nope"));
        assert!(html.contains("href=\"/files\""));
    }
}
