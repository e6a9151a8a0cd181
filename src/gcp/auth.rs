//! GCP Authentication
//!
//! Handles authentication using Application Default Credentials (ADC) or a
//! caller-supplied OAuth access token, and resolves the default project and
//! region from the environment or the gcloud CLI configuration.

use anyhow::{Context, Result};
use gcp_auth::TokenProvider;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Default scopes for GCP API access
pub const DEFAULT_SCOPES: &[&str] = &["https://www.googleapis.com/auth/cloud-platform"];

/// Refresh tokens this much before they actually expire
const TOKEN_EXPIRY_BUFFER: Duration = Duration::from_secs(60);

/// Token TTL assumed for ADC tokens (conservative: 30 minutes)
const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(30 * 60);

/// GCP credentials holder with token caching
#[derive(Clone)]
pub struct GcpCredentials {
    /// `None` when the credentials wrap a static access token
    provider: Option<Arc<dyn TokenProvider>>,
    token_cache: Arc<RwLock<Option<CachedToken>>>,
}

#[derive(Clone)]
struct CachedToken {
    token: String,
    /// When this token expires (with buffer applied); `None` never expires
    expires_at: Option<Instant>,
}

impl CachedToken {
    fn is_valid(&self) -> bool {
        self.expires_at.map_or(true, |at| Instant::now() < at)
    }
}

impl GcpCredentials {
    /// Create new GCP credentials using Application Default Credentials
    pub async fn new() -> Result<Self> {
        let provider = gcp_auth::provider().await.context(
            "Failed to initialize GCP authentication. Run 'gcloud auth application-default login'",
        )?;

        Ok(Self {
            provider: Some(provider),
            token_cache: Arc::new(RwLock::new(None)),
        })
    }

    /// Wrap an already-issued OAuth access token.
    ///
    /// The token is handed out as-is and never refreshed.
    pub fn from_access_token(token: &str) -> Self {
        Self {
            provider: None,
            token_cache: Arc::new(RwLock::new(Some(CachedToken {
                token: token.to_string(),
                expires_at: None,
            }))),
        }
    }

    /// Get an access token for API calls
    pub async fn get_token(&self) -> Result<String> {
        {
            let cache = self.token_cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.is_valid() {
                    return Ok(cached.token.clone());
                }
                tracing::debug!("Cached token expired, fetching new token");
            }
        }

        let Some(provider) = self.provider.as_ref() else {
            return Err(anyhow::anyhow!("No token provider configured"));
        };

        let token = provider
            .token(DEFAULT_SCOPES)
            .await
            .context("Failed to get access token")?;

        let token_str = token.as_str().to_string();
        let expires_at = Instant::now() + DEFAULT_TOKEN_TTL - TOKEN_EXPIRY_BUFFER;

        {
            let mut cache = self.token_cache.write().await;
            *cache = Some(CachedToken {
                token: token_str.clone(),
                expires_at: Some(expires_at),
            });
        }

        tracing::debug!(
            "New token cached, expires in ~{} minutes",
            (DEFAULT_TOKEN_TTL - TOKEN_EXPIRY_BUFFER).as_secs() / 60
        );

        Ok(token_str)
    }
}

/// Environment variable lookup, replaced by a fixed map in tests
pub type EnvLookup<'a> = &'a dyn Fn(&str) -> Option<String>;

/// Look up a variable in the process environment
pub fn process_env(var: &str) -> Option<String> {
    std::env::var(var).ok()
}

/// Get the gcloud configuration directory
pub fn get_gcloud_config_dir() -> Option<PathBuf> {
    gcloud_config_dir_with(&process_env)
}

fn gcloud_config_dir_with(env: EnvLookup) -> Option<PathBuf> {
    if let Some(path) = env("CLOUDSDK_CONFIG") {
        return Some(PathBuf::from(path));
    }

    // Default to ~/.config/gcloud on Linux/macOS
    dirs::config_dir().map(|p| p.join("gcloud"))
}

/// Validate a GCP project ID format
/// Project IDs must be 6-30 characters, lowercase letters, digits, and hyphens
/// Must start with a letter and cannot end with a hyphen
pub fn validate_project_id(project: &str) -> bool {
    if project.len() < 6 || project.len() > 30 {
        return false;
    }

    match project.chars().next() {
        Some(c) if c.is_ascii_lowercase() => {},
        _ => return false,
    }

    if project.ends_with('-') {
        return false;
    }

    project
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// Validate a region name such as `us-central1`
pub fn validate_region(region: &str) -> bool {
    matches!(region.chars().next(), Some(c) if c.is_ascii_lowercase())
        && !region.ends_with('-')
        && region
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// Find `key` inside `[section]` of an INI-style gcloud configuration file
pub fn find_config_value(content: &str, section: &str, key: &str) -> Option<String> {
    let header = format!("[{}]", section);
    let mut in_section = false;

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if line.starts_with('[') {
            in_section = line == header;
            continue;
        }
        if !in_section {
            continue;
        }
        let Some((name, value)) = line.split_once('=') else {
            continue;
        };
        if name.trim() == key {
            let value = value.trim();
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }

    None
}

/// Read the gcloud property files, most specific first: the active named
/// configuration (`default` when `active_config` is absent), then the legacy
/// installation-wide `properties` file.
fn read_gcloud_properties(config_dir: &Path) -> Vec<String> {
    let mut files = Vec::new();

    let config_name = std::fs::read_to_string(config_dir.join("active_config"))
        .map(|name| name.trim().to_string())
        .ok()
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "default".to_string());

    // Security: Validate config name to prevent path traversal
    if config_name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        let config_path = config_dir
            .join("configurations")
            .join(format!("config_{}", config_name));
        if let Ok(content) = std::fs::read_to_string(config_path) {
            files.push(content);
        }
    } else {
        tracing::warn!("Invalid characters in active_config name");
    }

    if let Ok(content) = std::fs::read_to_string(config_dir.join("properties")) {
        files.push(content);
    }

    files
}

fn find_property(files: &[String], section: &str, key: &str) -> Option<String> {
    files
        .iter()
        .find_map(|content| find_config_value(content, section, key))
}

/// Read the default project from the environment or gcloud configuration
/// Security: Validates project ID format before returning
pub fn get_default_project() -> Option<String> {
    default_project_with(&process_env)
}

/// [`get_default_project`] with an explicit environment
pub fn default_project_with(env: EnvLookup) -> Option<String> {
    for var in ["CLOUDSDK_CORE_PROJECT", "GOOGLE_CLOUD_PROJECT", "GCLOUD_PROJECT"] {
        if let Some(project) = env(var) {
            if validate_project_id(&project) {
                return Some(project);
            }
            tracing::warn!("Invalid project ID format in {}", var);
        }
    }

    let files = read_gcloud_properties(&gcloud_config_dir_with(env)?);
    files
        .iter()
        .filter_map(|content| find_config_value(content, "core", "project"))
        .find(|project| validate_project_id(project))
}

/// Read the default Cloud Run region from the environment or gcloud configuration
pub fn get_default_region() -> Option<String> {
    default_region_with(&process_env)
}

/// [`get_default_region`] with an explicit environment
pub fn default_region_with(env: EnvLookup) -> Option<String> {
    for var in ["CLOUDSDK_RUN_REGION", "CLOUDSDK_COMPUTE_REGION"] {
        if let Some(region) = env(var) {
            if !region.trim().is_empty() {
                return Some(region.trim().to_string());
            }
        }
    }

    let files = read_gcloud_properties(&gcloud_config_dir_with(env)?);
    find_property(&files, "run", "region").or_else(|| find_property(&files, "compute", "region"))
}
