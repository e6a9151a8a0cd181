//! Configuration Management
//!
//! Handles the optional configuration file and the discovery target.

use crate::gcp::auth::{self, EnvLookup};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Region used when nothing else is configured
pub const DEFAULT_REGION: &str = "us-central1";

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Project to scan
    #[serde(default)]
    pub project_id: Option<String>,
    /// Regions to scan
    #[serde(default)]
    pub regions: Vec<String>,
    /// Cloud Run API endpoint override
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Page size for list calls
    #[serde(default)]
    pub page_size: Option<u32>,
}

impl Config {
    /// Get the default config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("cloudrun-import").join("config.json"))
    }

    /// Load configuration from the default location
    ///
    /// A missing or unreadable default file yields the default configuration.
    pub fn load() -> Self {
        Self::load_or_default(Self::config_path().as_deref())
    }

    fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        match Self::load_from(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Ignoring config file {:?}: {:#}", path, e);
                Self::default()
            },
        }
    }

    /// Load configuration from an explicit path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {:?}", path))
    }

    /// Apply command-line values on top of the file; unset values keep the file's
    pub fn with_overrides(
        mut self,
        project: Option<String>,
        regions: Vec<String>,
        endpoint: Option<String>,
        page_size: Option<u32>,
    ) -> Self {
        if project.is_some() {
            self.project_id = project;
        }
        if !regions.is_empty() {
            self.regions = regions;
        }
        if endpoint.is_some() {
            self.endpoint = endpoint;
        }
        if page_size.is_some() {
            self.page_size = page_size;
        }
        self
    }

    /// Get effective project (config > environment > gcloud default)
    pub fn effective_project(&self) -> String {
        self.effective_project_with(&auth::process_env)
    }

    pub fn effective_project_with(&self, env: EnvLookup) -> String {
        self.project_id
            .clone()
            .filter(|p| !p.trim().is_empty())
            .or_else(|| auth::default_project_with(env))
            .unwrap_or_default()
    }

    /// Get effective regions (config > environment > gcloud default > us-central1)
    pub fn effective_regions(&self) -> Vec<String> {
        self.effective_regions_with(&auth::process_env)
    }

    pub fn effective_regions_with(&self, env: EnvLookup) -> Vec<String> {
        let regions: Vec<String> = self
            .regions
            .iter()
            .map(|r| r.trim())
            .filter(|r| !r.is_empty())
            .map(|r| r.to_string())
            .collect();

        if !regions.is_empty() {
            return regions;
        }

        vec![auth::default_region_with(env).unwrap_or_else(|| DEFAULT_REGION.to_string())]
    }
}

/// Project and region a discovery pass is scoped to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryTarget {
    pub project: String,
    pub region: String,
}

impl DiscoveryTarget {
    pub fn new(project: &str, region: &str) -> Self {
        Self {
            project: project.to_string(),
            region: region.to_string(),
        }
    }

    /// `projects/{project}/locations/{region}`
    pub fn parent(&self) -> String {
        crate::gcp::client::location_parent(&self.project, &self.region)
    }
}
