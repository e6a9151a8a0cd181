//! Cloud Run discovery
//!
//! Lists Cloud Run services and jobs for a project/location and turns every
//! entry into a [`ResourceDescriptor`]. Listing is best effort: a failed page
//! is logged and the descriptors gathered before it are kept.

use super::descriptor::ResourceDescriptor;
use super::fetcher::{ListCall, RunObject};
use super::registry::ResourceKind;
use crate::config::DiscoveryTarget;
use crate::gcp::client::{ClientOptions, GcpClient};
use crate::gcp::http::format_gcp_error;
use anyhow::Result;

/// Listing settings shared by both resource kinds
#[derive(Debug, Clone, Copy, Default)]
pub struct ListOptions {
    pub page_size: Option<u32>,
}

/// List all Cloud Run services under `projects/{project}/locations/{location}`
pub async fn list_services(
    client: &GcpClient,
    project: &str,
    location: &str,
    options: ListOptions,
) -> Vec<ResourceDescriptor> {
    let mut resources = Vec::new();

    let result = ListCall::services(client, project, location)
        .page_size(options.page_size)
        .pages(|page| {
            let services = &page.services;
            push_descriptors(&mut resources, ResourceKind::Service, services, project, location);
            Ok(())
        })
        .await;

    finish_listing(ResourceKind::Service, location, result, resources)
}

/// List all Cloud Run jobs under `projects/{project}/locations/{location}`
pub async fn list_jobs(
    client: &GcpClient,
    project: &str,
    location: &str,
    options: ListOptions,
) -> Vec<ResourceDescriptor> {
    let mut resources = Vec::new();

    let result = ListCall::jobs(client, project, location)
        .page_size(options.page_size)
        .pages(|page| {
            push_descriptors(&mut resources, ResourceKind::Job, &page.jobs, project, location);
            Ok(())
        })
        .await;

    finish_listing(ResourceKind::Job, location, result, resources)
}

/// Discover services and jobs for `target`.
///
/// Fails only if the API client cannot be constructed.
pub async fn discover(
    client_options: &ClientOptions,
    target: &DiscoveryTarget,
    options: ListOptions,
) -> Result<Vec<ResourceDescriptor>> {
    let client = GcpClient::new(client_options).await?;
    Ok(discover_with_client(&client, target, options).await)
}

/// Discover services and jobs for `target` with an existing client.
///
/// Services come first, then jobs.
pub async fn discover_with_client(
    client: &GcpClient,
    target: &DiscoveryTarget,
    options: ListOptions,
) -> Vec<ResourceDescriptor> {
    tracing::info!("Discovering Cloud Run resources in {}", target.parent());

    let mut resources = list_services(client, &target.project, &target.region, options).await;
    let jobs = list_jobs(client, &target.project, &target.region, options).await;
    resources.extend(jobs);

    resources
}

fn push_descriptors(
    resources: &mut Vec<ResourceDescriptor>,
    kind: ResourceKind,
    objects: &[RunObject],
    project: &str,
    location: &str,
) {
    tracing::debug!("{} page with {} entries", kind, objects.len());
    resources.extend(
        objects
            .iter()
            .map(|obj| ResourceDescriptor::new(kind, &obj.name, project, location)),
    );
}

/// Log a listing failure and keep whatever was gathered
fn finish_listing(
    kind: ResourceKind,
    location: &str,
    result: Result<()>,
    resources: Vec<ResourceDescriptor>,
) -> Vec<ResourceDescriptor> {
    match result {
        Ok(()) => {
            tracing::info!("Found {} {} in {}", resources.len(), kind.display_name(), location);
        },
        Err(e) => {
            tracing::error!(
                "Failed to list {} in {}: {} ({:#}); keeping {} found so far",
                kind.display_name(),
                location,
                format_gcp_error(&e),
                e,
                resources.len()
            );
        },
    }
    resources
}
