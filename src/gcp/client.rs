//! GCP Client
//!
//! Main client for interacting with the Cloud Run Admin API, combining
//! authentication and HTTP functionality.

use super::auth::GcpCredentials;
use super::http::GcpHttpClient;
use anyhow::{Context, Result};
use serde_json::Value;

/// Public Cloud Run Admin API endpoint
pub const DEFAULT_RUN_ENDPOINT: &str = "https://run.googleapis.com";

/// Options used to construct a [`GcpClient`]
#[derive(Debug, Clone, Default)]
pub struct ClientOptions {
    /// API endpoint override (defaults to [`DEFAULT_RUN_ENDPOINT`])
    pub endpoint: Option<String>,
    /// Pre-issued OAuth access token; skips Application Default Credentials
    pub access_token: Option<String>,
}

/// Main GCP client
#[derive(Clone)]
pub struct GcpClient {
    pub credentials: GcpCredentials,
    pub http: GcpHttpClient,
    /// API endpoint without trailing slash
    pub endpoint: String,
}

impl GcpClient {
    /// Create a new GCP client
    pub async fn new(options: &ClientOptions) -> Result<Self> {
        let endpoint = match options.endpoint.as_deref() {
            Some(endpoint) => parse_endpoint(endpoint)?,
            None => DEFAULT_RUN_ENDPOINT.to_string(),
        };

        let credentials = match options.access_token.as_deref() {
            Some(token) if !token.trim().is_empty() => {
                tracing::debug!("Using access token supplied by the caller");
                GcpCredentials::from_access_token(token.trim())
            },
            _ => GcpCredentials::new()
                .await
                .context("Failed to initialize GCP credentials")?,
        };

        let http = GcpHttpClient::new()?;

        tracing::debug!("GCP client ready for {}", endpoint);

        Ok(Self {
            credentials,
            http,
            endpoint,
        })
    }

    /// Get the current access token
    pub async fn get_token(&self) -> Result<String> {
        self.credentials.get_token().await
    }

    /// Make a GET request to a GCP API
    pub async fn get(&self, url: &str) -> Result<Value> {
        let token = self.get_token().await?;
        self.http.get(url, &token).await
    }

    // =========================================================================
    // Cloud Run API helpers
    // =========================================================================

    /// Build Cloud Run v2 API URL
    pub fn run_url(&self, path: &str) -> String {
        format!("{}/v2/{}", self.endpoint, path)
    }

    /// Build a Cloud Run collection URL under a project/location parent
    pub fn run_location_url(&self, project: &str, location: &str, collection: &str) -> String {
        self.run_url(&format!(
            "{}/{}",
            location_parent(project, location),
            collection
        ))
    }
}

/// `projects/{project}/locations/{location}`
///
/// Each segment is percent-encoded, so `/`, `?` or `#` in an input cannot
/// change the request path.
pub fn location_parent(project: &str, location: &str) -> String {
    format!(
        "projects/{}/locations/{}",
        urlencoding::encode(project),
        urlencoding::encode(location)
    )
}

/// Validate an endpoint override and strip any trailing slash
fn parse_endpoint(endpoint: &str) -> Result<String> {
    let url = url::Url::parse(endpoint)
        .with_context(|| format!("Invalid API endpoint: {}", endpoint))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(anyhow::anyhow!(
            "Unsupported API endpoint scheme '{}': {}",
            url.scheme(),
            endpoint
        ));
    }
    if url.host_str().is_none() {
        return Err(anyhow::anyhow!("API endpoint has no host: {}", endpoint));
    }

    Ok(url.as_str().trim_end_matches('/').to_string())
}
