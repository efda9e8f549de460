use serde::Serialize;
use serde_json::{Number, Value};

use crate::core::constants::{DEFAULT_TITLE, TIMEOUT_SENTINEL};

/// Document metadata reported by the converter's internal API.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapturedMetadata {
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_count: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub views: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Status-check URL polled until the converted file is ready
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_url: Option<String>,
}

impl CapturedMetadata {
    /// Accepts any JSON object carrying a truthy `id`. Fields of the wrong
    /// type are treated as absent.
    pub fn from_json(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let id = obj.get("id").filter(|id| is_truthy(id))?.clone();

        let text = |key: &str| obj.get(key).and_then(Value::as_str).map(str::to_string);
        let number = |key: &str| match obj.get(key) {
            Some(Value::Number(n)) => Some(n.clone()),
            _ => None,
        };

        Some(Self {
            id,
            title: text("title"),
            author: text("author"),
            desc: text("desc"),
            page_count: number("pageCount"),
            views: number("views"),
            image_url: text("imageUrl"),
            pdf_url: text("pdfUrl"),
        })
    }

    pub fn status_url(&self) -> Option<&str> {
        self.pdf_url.as_deref().filter(|u| !u.is_empty())
    }

    /// Trimmed title, or the placeholder when missing or blank.
    pub fn display_title(&self) -> String {
        match self.title.as_deref().map(str::trim) {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => DEFAULT_TITLE.to_string(),
        }
    }
}

/// JSON truthiness as the converter's own client understands it.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// One status-check answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollResult {
    Pending,
    Done(String),
}

impl PollResult {
    /// Interprets a status response body. Anything other than
    /// `{"status":"done","url":"<non-empty>"}` is still pending.
    pub fn from_body(body: &str) -> Self {
        let value: Value = match serde_json::from_str(body) {
            Ok(v) => v,
            Err(_) => return PollResult::Pending,
        };
        let done = value.get("status").and_then(Value::as_str) == Some("done");
        match value.get("url").and_then(Value::as_str) {
            Some(url) if done && !url.is_empty() => PollResult::Done(url.to_string()),
            _ => PollResult::Pending,
        }
    }
}

/// Final state of the completion poller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    Ready(String),
    TimedOut { attempts: u32 },
}

impl PollOutcome {
    pub fn download_url(&self) -> &str {
        match self {
            PollOutcome::Ready(url) => url,
            PollOutcome::TimedOut { .. } => TIMEOUT_SENTINEL,
        }
    }
}

/// Body of a successful extraction.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponsePayload {
    pub status: bool,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_count: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub views: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(rename = "download_url")]
    pub download_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn metadata_requires_truthy_id() {
        assert!(CapturedMetadata::from_json(&json!({"title": "x"})).is_none());
        assert!(CapturedMetadata::from_json(&json!({"id": 0})).is_none());
        assert!(CapturedMetadata::from_json(&json!({"id": ""})).is_none());
        assert!(CapturedMetadata::from_json(&json!({"id": null})).is_none());
        assert!(CapturedMetadata::from_json(&json!([1, 2])).is_none());
        assert!(CapturedMetadata::from_json(&json!({"id": "abc"})).is_some());
        assert!(CapturedMetadata::from_json(&json!({"id": 42})).is_some());
    }

    #[test]
    fn metadata_reads_known_fields() {
        let meta = CapturedMetadata::from_json(&json!({
            "id": 123,
            "title": "  Kalkulus Dasar ",
            "author": "Budi",
            "desc": "catatan",
            "pageCount": 12,
            "views": "lots",
            "imageUrl": "https://img/1.jpg",
            "pdfUrl": "https://scribd-downloader.co/api/status/123"
        }))
        .unwrap();

        assert_eq!(meta.display_title(), "Kalkulus Dasar");
        assert_eq!(meta.author.as_deref(), Some("Budi"));
        assert_eq!(meta.page_count, Some(Number::from(12)));
        assert_eq!(meta.views, None);
        assert_eq!(
            meta.status_url(),
            Some("https://scribd-downloader.co/api/status/123")
        );
    }

    #[test]
    fn blank_title_and_status_url_are_absent() {
        let meta = CapturedMetadata::from_json(&json!({"id": 1, "title": "   ", "pdfUrl": ""})).unwrap();
        assert_eq!(meta.display_title(), "No Title");
        assert_eq!(meta.status_url(), None);
    }

    #[test]
    fn poll_body_interpretation() {
        assert_eq!(
            PollResult::from_body(r#"{"status":"done","url":"https://cdn/x.pdf"}"#),
            PollResult::Done("https://cdn/x.pdf".into())
        );
        assert_eq!(PollResult::from_body(r#"{"status":"done"}"#), PollResult::Pending);
        assert_eq!(PollResult::from_body(r#"{"status":"done","url":""}"#), PollResult::Pending);
        assert_eq!(
            PollResult::from_body(r#"{"status":"processing","url":"https://cdn/x.pdf"}"#),
            PollResult::Pending
        );
        assert_eq!(PollResult::from_body("<html>busy</html>"), PollResult::Pending);
    }

    #[test]
    fn timed_out_outcome_uses_sentinel() {
        assert_eq!(PollOutcome::TimedOut { attempts: 20 }.download_url(), "Process timeout");
        assert_eq!(PollOutcome::Ready("u".into()).download_url(), "u");
    }

    #[test]
    fn payload_omits_absent_fields() {
        let payload = ResponsePayload {
            status: true,
            title: "No Title".into(),
            author: None,
            desc: None,
            page_count: Some(Number::from(3)),
            views: None,
            image_url: None,
            download_url: "Process timeout".into(),
        };
        let text = serde_json::to_string(&payload).unwrap();
        assert_eq!(
            text,
            r#"{"status":true,"title":"No Title","pageCount":3,"download_url":"Process timeout"}"#
        );
    }
}
