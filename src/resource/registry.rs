//! Resource Registry
//!
//! Fixed lookup data for the Cloud Run resource kinds this tool imports.

use serde::Serialize;
use std::fmt;

/// Provider tag attached to every descriptor
pub const PROVIDER_NAME: &str = "google";

/// Attribute prefixes allowed to be empty when the descriptor is imported
pub const ALLOW_EMPTY_VALUES: &[&str] = &["labels."];

/// Extra fields merged into the imported resource; Cloud Run needs none
pub const ADDITIONAL_FIELDS: &[(&str, &str)] = &[];

/// Kind of Cloud Run resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ResourceKind {
    #[serde(rename = "google_cloud_run_v2_service")]
    Service,
    #[serde(rename = "google_cloud_run_v2_job")]
    Job,
}

impl ResourceKind {
    /// Terraform resource type
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Service => "google_cloud_run_v2_service",
            Self::Job => "google_cloud_run_v2_job",
        }
    }

    /// Collection name in the Cloud Run v2 API
    pub fn collection(&self) -> &'static str {
        match self {
            Self::Service => "services",
            Self::Job => "jobs",
        }
    }

    /// Human readable name for log messages
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Service => "Cloud Run services",
            Self::Job => "Cloud Run jobs",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
