use shared::types::{CapturedMetadata, PollOutcome, ResponsePayload};

/// Builds the success payload. `status` is always true here; an unresolved
/// download shows up only as the timeout sentinel in `download_url`.
pub fn format_payload(meta: &CapturedMetadata, outcome: &PollOutcome) -> ResponsePayload {
    ResponsePayload {
        status: true,
        title: meta.display_title(),
        author: meta.author.clone(),
        desc: meta.desc.clone(),
        page_count: meta.page_count.clone(),
        views: meta.views.clone(),
        image_url: meta.image_url.clone(),
        download_url: outcome.download_url().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn copies_metadata_and_download_url() {
        let meta = CapturedMetadata::from_json(&json!({
            "id": 9,
            "title": "\tLaporan Keuangan\n",
            "author": "PT Contoh",
            "desc": "Q3",
            "pageCount": 40,
            "views": 1200,
            "imageUrl": "https://img/9.jpg",
            "pdfUrl": "https://status/9"
        }))
        .unwrap();

        let payload = format_payload(&meta, &PollOutcome::Ready("https://cdn/9.pdf".into()));

        assert!(payload.status);
        assert_eq!(payload.title, "Laporan Keuangan");
        assert_eq!(payload.author.as_deref(), Some("PT Contoh"));
        assert_eq!(payload.page_count, Some(40.into()));
        assert_eq!(payload.views, Some(1200.into()));
        assert_eq!(payload.download_url, "https://cdn/9.pdf");
    }

    #[test]
    fn timeout_still_reports_success() {
        let meta = CapturedMetadata::from_json(&json!({"id": 1, "pdfUrl": "https://status/1"})).unwrap();

        let payload = format_payload(&meta, &PollOutcome::TimedOut { attempts: 20 });

        assert!(payload.status);
        assert_eq!(payload.title, "No Title");
        assert_eq!(payload.download_url, "Process timeout");
    }
}
