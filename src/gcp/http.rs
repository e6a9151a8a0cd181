//! HTTP utilities for GCP REST API calls

use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use thiserror::Error;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Sanitize response body for logging
/// Truncates long responses and strips control characters
fn sanitize_for_log(body: &str) -> String {
    let truncated = match body.char_indices().nth(MAX_LOG_BODY_LENGTH) {
        Some((idx, _)) => {
            format!("{}... [truncated, {} bytes total]", &body[..idx], body.len())
        },
        None => body.to_string(),
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// Append query parameters to a URL, skipping empty values
pub fn add_query_params(url: &str, params: &[(&str, String)]) -> String {
    let query_parts: Vec<String> = params
        .iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
        .collect();

    if query_parts.is_empty() {
        url.to_string()
    } else if url.contains('?') {
        format!("{}&{}", url, query_parts.join("&"))
    } else {
        format!("{}?{}", url, query_parts.join("&"))
    }
}

/// Non-success response from a GCP API
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("API request failed: {status}")]
pub struct ApiError {
    pub status: StatusCode,
}

/// HTTP client wrapper for GCP API calls
#[derive(Clone)]
pub struct GcpHttpClient {
    client: Client,
}

impl GcpHttpClient {
    /// Create a new HTTP client
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(format!("cloudrun-import/{}", crate::VERSION))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    /// Make a GET request to a GCP API
    pub async fn get(&self, url: &str, token: &str) -> Result<Value> {
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .context("Failed to send request")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("Failed to read response body")?;

        if !status.is_success() {
            // Security: Only log sanitized/truncated error body to avoid leaking sensitive data
            tracing::error!("API error: {} - {}", status, sanitize_for_log(&body));
            return Err(ApiError { status }.into());
        }

        if body.is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&body).context("Failed to parse response JSON")
    }
}

/// Format a GCP API error for display
/// Security: Sanitizes error messages to avoid leaking sensitive API details
///
/// HTTP failures are classified by the status carried in the error chain,
/// never by the text of the message (which may contain project IDs or ports).
pub fn format_gcp_error(error: &anyhow::Error) -> String {
    if let Some(api_error) = error.chain().find_map(|e| e.downcast_ref::<ApiError>()) {
        return describe_status(api_error.status).to_string();
    }

    let root = error.root_cause().to_string();
    let sanitized = root
        .chars()
        .filter(|c| c.is_ascii_graphic() || *c == ' ')
        .take(80)
        .collect::<String>();

    if sanitized.len() < root.len() {
        format!("{}...", sanitized)
    } else {
        sanitized
    }
}

fn describe_status(status: StatusCode) -> &'static str {
    match status.as_u16() {
        400 => "Invalid request. Check your parameters.",
        401 => "Authentication failed. Run 'gcloud auth application-default login'.",
        403 => {
            "Permission denied. Check your GCP IAM permissions (run.services.list, run.jobs.list)."
        },
        404 => "Location not found. Check the project and region.",
        429 => "Rate limit exceeded. Please try again later.",
        500 | 503 => "GCP service temporarily unavailable. Please try again.",
        _ => "Request failed. Check your network connection and try again.",
    }
}
