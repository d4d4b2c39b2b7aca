//! Pushing the collection to a Google Sheets Apps Script webhook.

use reqwest::{header::CONTENT_TYPE, StatusCode, Url};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::{
    error::{Error, Result},
    types::book::BookRecord,
};

const LOCAL_HOSTS: [&str; 4] = ["localhost", "127.0.0.1", "::1", "[::1]"];
const MAX_DETAIL_CHARS: usize = 140;

/// Checks a user-entered webhook URL and returns it normalized. The error
/// message is meant to be shown as is.
pub fn validate_webhook_url(input: &str) -> Result<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(Error::Webhook("Please enter a webhook URL".into()));
    }
    let url = Url::parse(trimmed).map_err(|_| Error::Webhook("Webhook URL is not valid".into()))?;
    if url.scheme() != "https" {
        return Err(Error::Webhook("Webhook URL must start with https://".into()));
    }
    let Some(host) = url.host_str().filter(|h| !h.is_empty()) else {
        return Err(Error::Webhook("Webhook URL must include a hostname".into()));
    };
    if !url.username().is_empty() || url.password().is_some() {
        return Err(Error::Webhook(
            "Webhook URL must not include username/password".into(),
        ));
    }
    if LOCAL_HOSTS.contains(&host) || host.ends_with(".local") {
        return Err(Error::Webhook(
            "Webhook URL must be publicly reachable (not local)".into(),
        ));
    }
    Ok(url.to_string())
}

/// `host[:port]` of `url`, for display.
pub fn webhook_host(url: &str) -> String {
    match Url::parse(url) {
        Ok(url) => match (url.host_str(), url.port()) {
            (Some(host), Some(port)) => format!("{host}:{port}"),
            (Some(host), None) => host.to_string(),
            (None, _) => "unknown host".into(),
        },
        Err(_) => "unknown host".into(),
    }
}

/// One line describing a failed push: the status, then whatever the remote
/// said about it, cut to a readable length.
pub fn summarize_failure(status: StatusCode, content_type: &str, body: &str) -> String {
    let base = format!(
        "Export failed ({} {})",
        status.as_u16(),
        status.canonical_reason().unwrap_or_default()
    );
    let detail = if content_type.contains("application/json") {
        match serde_json::from_str::<Value>(body) {
            Ok(json) => json
                .get("message")
                .and_then(Value::as_str)
                .or_else(|| json.get("error").and_then(Value::as_str))
                .map(str::to_string)
                .unwrap_or_else(|| json.to_string()),
            Err(_) => return base,
        }
    } else {
        body.trim().to_string()
    };

    if detail.is_empty() {
        return base;
    }
    if detail.chars().count() > MAX_DETAIL_CHARS {
        let short: String = detail.chars().take(MAX_DETAIL_CHARS).collect();
        format!("{base}: {short}...")
    } else {
        format!("{base}: {detail}")
    }
}

#[derive(Serialize)]
struct Payload<'a> {
    books: &'a [BookRecord],
}

/// POSTs `{"books": [...]}` to `url` and returns how many books were sent.
pub async fn push_books(client: &reqwest::Client, url: &str, books: &[BookRecord]) -> Result<usize> {
    let url = validate_webhook_url(url)?;
    let resp = client.post(&url).json(&Payload { books }).send().await?;

    let status = resp.status();
    if !status.is_success() {
        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let body = resp.text().await.unwrap_or_default();
        let summary = summarize_failure(status, &content_type, &body);
        warn!(host = %webhook_host(&url), %summary, "Webhook push failed");
        return Err(Error::Webhook(summary));
    }

    info!(host = %webhook_host(&url), count = books.len(), "Pushed books to webhook");
    Ok(books.len())
}
