//! Resource discovery layer
//!
//! Turns Cloud Run list responses into import descriptors.
//!
//! # Architecture
//!
//! - [`registry`] - Fixed data: resource kinds, provider tag, allow-empty list
//! - [`descriptor`] - The [`ResourceDescriptor`] record and local-name derivation
//! - [`fetcher`] - Paginated list calls against the Cloud Run v2 API
//! - [`cloud_run`] - Service/job listing and discovery orchestration
//!
//! # Example
//!
//! ```ignore
//! use cloudrun_import::config::DiscoveryTarget;
//! use cloudrun_import::gcp::client::ClientOptions;
//! use cloudrun_import::resource::{discover, ListOptions};
//!
//! async fn import(project: &str) -> anyhow::Result<()> {
//!     let target = DiscoveryTarget::new(project, "us-central1");
//!     let resources = discover(&ClientOptions::default(), &target, ListOptions::default()).await?;
//!     println!("found {} resources", resources.len());
//!     Ok(())
//! }
//! ```

pub mod cloud_run;
pub mod descriptor;
pub mod fetcher;
pub mod registry;

pub use cloud_run::{discover, discover_with_client, list_jobs, list_services, ListOptions};
pub use descriptor::{local_name, ResourceDescriptor};
pub use fetcher::ListCall;
pub use registry::ResourceKind;
