//! Discover Cloud Run services and jobs in a GCP project and emit
//! descriptors for infrastructure-as-code import.

pub mod config;
pub mod gcp;
pub mod output;
pub mod resource;

/// Version injected at compile time via CLOUDRUN_IMPORT_VERSION env var (set by CI/CD),
/// or "dev" for local builds.
pub const VERSION: &str = match option_env!("CLOUDRUN_IMPORT_VERSION") {
    Some(v) => v,
    None => "dev",
};
