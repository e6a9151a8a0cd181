//! Resource Fetcher
//!
//! Paginated listing against the Cloud Run v2 API. A [`ListCall`] walks
//! `nextPageToken` links and hands every page to a callback.

use super::registry::ResourceKind;
use crate::gcp::client::GcpClient;
use crate::gcp::http::add_query_params;
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::marker::PhantomData;

/// A Cloud Run object as returned in list responses
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunObject {
    /// Fully-qualified name, e.g. `projects/p/locations/l/services/s`
    #[serde(default)]
    pub name: String,
}

/// Response of `projects.locations.services.list`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListServicesResponse {
    #[serde(default)]
    pub services: Vec<RunObject>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// Response of `projects.locations.jobs.list`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListJobsResponse {
    #[serde(default)]
    pub jobs: Vec<RunObject>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// A page of a list response
pub trait ListPage: DeserializeOwned + Default {
    /// Token for the following page; `None` or empty on the last page
    fn next_page_token(&self) -> Option<&str>;
}

impl ListPage for ListServicesResponse {
    fn next_page_token(&self) -> Option<&str> {
        self.next_page_token.as_deref()
    }
}

impl ListPage for ListJobsResponse {
    fn next_page_token(&self) -> Option<&str> {
        self.next_page_token.as_deref()
    }
}

/// A list request scoped to one collection URL, consumed by [`ListCall::pages`]
pub struct ListCall<'a, P> {
    client: &'a GcpClient,
    url: String,
    page_size: Option<u32>,
    _page: PhantomData<P>,
}

impl<'a> ListCall<'a, ListServicesResponse> {
    /// `GET .../projects/{project}/locations/{location}/services`
    pub fn services(client: &'a GcpClient, project: &str, location: &str) -> Self {
        let collection = ResourceKind::Service.collection();
        Self::new(client, client.run_location_url(project, location, collection))
    }
}

impl<'a> ListCall<'a, ListJobsResponse> {
    /// `GET .../projects/{project}/locations/{location}/jobs`
    pub fn jobs(client: &'a GcpClient, project: &str, location: &str) -> Self {
        let collection = ResourceKind::Job.collection();
        Self::new(client, client.run_location_url(project, location, collection))
    }
}

impl<'a, P: ListPage> ListCall<'a, P> {
    pub fn new(client: &'a GcpClient, url: String) -> Self {
        Self {
            client,
            url,
            page_size: None,
            _page: PhantomData,
        }
    }

    /// Maximum number of entries per page; the server default applies otherwise
    pub fn page_size(mut self, page_size: Option<u32>) -> Self {
        self.page_size = page_size.filter(|size| *size > 0);
        self
    }

    /// Invoke `f` once per page, following `nextPageToken` until the last page.
    ///
    /// Stops at the first request, decode, or callback error and returns it;
    /// later pages are not requested.
    pub async fn pages<F>(self, mut f: F) -> Result<()>
    where
        F: FnMut(P) -> Result<()>,
    {
        let mut page_token: Option<String> = None;
        let mut page_number = 1usize;

        loop {
            let page = self
                .fetch_page(page_token.as_deref())
                .await
                .with_context(|| format!("Failed to fetch page {} of {}", page_number, self.url))?;

            let next_token = page
                .next_page_token()
                .filter(|token| !token.is_empty())
                .map(|token| token.to_string());

            f(page)?;

            match next_token {
                Some(token) => {
                    page_token = Some(token);
                    page_number += 1;
                },
                None => return Ok(()),
            }
        }
    }

    async fn fetch_page(&self, page_token: Option<&str>) -> Result<P> {
        let mut params = Vec::new();
        if let Some(size) = self.page_size {
            params.push(("pageSize", size.to_string()));
        }
        if let Some(token) = page_token {
            params.push(("pageToken", token.to_string()));
        }

        let url = add_query_params(&self.url, &params);
        let response = self.client.get(&url).await?;

        if response.is_null() {
            return Ok(P::default());
        }

        serde_json::from_value(response).context("Unexpected list response shape")
    }
}
