//! GCP API interaction module
//!
//! This module provides the core functionality for talking to the Cloud Run
//! Admin API: authentication, the HTTP client, and URL construction.
//!
//! # Module Structure
//!
//! - [`auth`] - GCP authentication and default project/region lookup
//! - [`client`] - Main GCP client for making API requests
//! - [`http`] - HTTP utilities for REST API calls
//!
//! # Example
//!
//! ```ignore
//! use cloudrun_import::gcp::client::{ClientOptions, GcpClient};
//!
//! async fn example() -> anyhow::Result<()> {
//!     let client = GcpClient::new(&ClientOptions::default()).await?;
//!     let services = client
//!         .get(&client.run_location_url("my-project", "us-central1", "services"))
//!         .await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod http;
