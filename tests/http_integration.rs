//! Integration tests for Cloud Run discovery using wiremock
//!
//! These tests run the real client against mocked Cloud Run v2 endpoints,
//! covering pagination, partial results on failure, and descriptor shape.

use cloudrun_import::config::DiscoveryTarget;
use cloudrun_import::gcp::client::{ClientOptions, GcpClient};
use cloudrun_import::gcp::http::format_gcp_error;
use cloudrun_import::resource::{
    discover, discover_with_client, list_jobs, list_services, ListCall, ListOptions, ResourceKind,
};
use serde_json::{json, Value};
use tokio_test::{assert_err, assert_ok};
use wiremock::matchers::{bearer_token, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SERVICES_PATH: &str = "/v2/projects/acme/locations/us-central1/services";
const JOBS_PATH: &str = "/v2/projects/acme/locations/us-central1/jobs";

fn options(server: &MockServer) -> ClientOptions {
    ClientOptions {
        endpoint: Some(server.uri()),
        access_token: Some("test-token".to_string()),
    }
}

fn target() -> DiscoveryTarget {
    DiscoveryTarget::new("acme", "us-central1")
}

fn service(name: &str) -> Value {
    json!({ "name": format!("projects/acme/locations/us-central1/services/{}", name) })
}

fn job(name: &str) -> Value {
    json!({ "name": format!("projects/acme/locations/us-central1/jobs/{}", name) })
}

/// Mount one page; `token` is the pageToken the request must carry (None = first page)
async fn mount_page(server: &MockServer, route: &str, token: Option<&str>, body: Value) {
    let mock = Mock::given(method("GET")).and(path(route));
    let mock = match token {
        Some(token) => mock.and(query_param("pageToken", token)),
        None => mock.and(query_param_is_missing("pageToken")),
    };
    mock.respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn mount_empty(server: &MockServer, route: &str) {
    mount_page(server, route, None, json!({})).await;
}

mod discovery_tests {
    use super::*;

    #[tokio::test]
    async fn test_single_service_example() {
        let server = MockServer::start().await;
        mount_page(&server, SERVICES_PATH, None, json!({ "services": [service("web")] })).await;
        mount_empty(&server, JOBS_PATH).await;

        let resources =
            assert_ok!(discover(&options(&server), &target(), ListOptions::default()).await);

        assert_eq!(resources.len(), 1);
        let web = &resources[0];
        assert_eq!(web.resource_name, "web");
        assert_eq!(web.id, "projects/acme/locations/us-central1/services/web");
        assert_eq!(web.resource_type, ResourceKind::Service);
        assert_eq!(web.resource_type.as_str(), "google_cloud_run_v2_service");
        assert_eq!(web.provider, "google");
        assert_eq!(web.attributes.len(), 3);
        assert_eq!(web.attributes["name"], "web");
        assert_eq!(web.attributes["project"], "acme");
        assert_eq!(web.attributes["location"], "us-central1");
    }

    #[tokio::test]
    async fn test_counts_entries_across_all_pages() {
        let server = MockServer::start().await;
        mount_page(
            &server,
            SERVICES_PATH,
            None,
            json!({ "services": [service("web"), service("api")], "nextPageToken": "svc-2" }),
        )
        .await;
        let second = json!({ "services": [service("worker")] });
        mount_page(&server, SERVICES_PATH, Some("svc-2"), second).await;
        mount_page(
            &server,
            JOBS_PATH,
            None,
            json!({ "jobs": [job("nightly")], "nextPageToken": "job-2" }),
        )
        .await;
        mount_page(
            &server,
            JOBS_PATH,
            Some("job-2"),
            json!({ "jobs": [job("backfill")], "nextPageToken": "" }),
        )
        .await;

        let resources =
            assert_ok!(discover(&options(&server), &target(), ListOptions::default()).await);

        let names: Vec<&str> = resources.iter().map(|r| r.resource_name.as_str()).collect();
        assert_eq!(names, vec!["web", "api", "worker", "nightly", "backfill"]);

        let jobs = resources
            .iter()
            .filter(|r| r.resource_type == ResourceKind::Job)
            .count();
        assert_eq!(jobs, 2);
    }

    #[tokio::test]
    async fn test_failed_second_page_keeps_first_page() {
        let server = MockServer::start().await;
        mount_page(
            &server,
            SERVICES_PATH,
            None,
            json!({ "services": [service("web"), service("api")], "nextPageToken": "svc-2" }),
        )
        .await;
        Mock::given(method("GET"))
            .and(path(SERVICES_PATH))
            .and(query_param("pageToken", "svc-2"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "error": { "code": 500, "message": "Internal error" }
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(SERVICES_PATH))
            .and(query_param("pageToken", "svc-3"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "services": [service("late")] })),
            )
            .expect(0)
            .mount(&server)
            .await;
        mount_empty(&server, JOBS_PATH).await;

        let resources =
            assert_ok!(discover(&options(&server), &target(), ListOptions::default()).await);

        let names: Vec<&str> = resources.iter().map(|r| r.resource_name.as_str()).collect();
        assert_eq!(names, vec!["web", "api"]);
    }

    #[tokio::test]
    async fn test_service_failure_does_not_stop_jobs() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(SERVICES_PATH))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "error": { "code": 403, "message": "Permission denied" }
            })))
            .mount(&server)
            .await;
        mount_page(&server, JOBS_PATH, None, json!({ "jobs": [job("nightly")] })).await;

        let client = GcpClient::new(&options(&server)).await.unwrap();
        let resources = discover_with_client(&client, &target(), ListOptions::default()).await;

        assert_eq!(resources.len(), 1);
        assert_eq!(resources[0].resource_type, ResourceKind::Job);
        assert_eq!(resources[0].resource_name, "nightly");
    }

    #[tokio::test]
    async fn test_invalid_endpoint_is_a_hard_failure() {
        let options = ClientOptions {
            endpoint: Some("not a url".to_string()),
            access_token: Some("test-token".to_string()),
        };

        assert_err!(discover(&options, &target(), ListOptions::default()).await);
    }
}

mod listing_tests {
    use super::*;

    #[tokio::test]
    async fn test_sends_bearer_token_and_page_size() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(JOBS_PATH))
            .and(bearer_token("test-token"))
            .and(query_param("pageSize", "2"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "jobs": [job("nightly")] })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = GcpClient::new(&options(&server)).await.unwrap();
        let options = ListOptions { page_size: Some(2) };
        let jobs = list_jobs(&client, "acme", "us-central1", options).await;

        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].resource_type.as_str(), "google_cloud_run_v2_job");
    }

    #[tokio::test]
    async fn test_duplicate_names_are_kept() {
        let server = MockServer::start().await;
        mount_page(
            &server,
            SERVICES_PATH,
            None,
            json!({ "services": [service("web")], "nextPageToken": "svc-2" }),
        )
        .await;
        let second = json!({ "services": [service("web")] });
        mount_page(&server, SERVICES_PATH, Some("svc-2"), second).await;

        let client = GcpClient::new(&options(&server)).await.unwrap();
        let services = list_services(&client, "acme", "us-central1", ListOptions::default()).await;

        assert_eq!(services.len(), 2);
        assert_eq!(services[0], services[1]);
    }

    #[tokio::test]
    async fn test_name_without_separator_is_used_verbatim() {
        let server = MockServer::start().await;
        mount_page(&server, SERVICES_PATH, None, json!({ "services": [{ "name": "web" }] })).await;

        let client = GcpClient::new(&options(&server)).await.unwrap();
        let services = list_services(&client, "acme", "us-central1", ListOptions::default()).await;

        assert_eq!(services.len(), 1);
        assert_eq!(services[0].resource_name, "web");
        assert_eq!(services[0].id, "web");
    }

    #[tokio::test]
    async fn test_callback_error_stops_paging() {
        let server = MockServer::start().await;
        mount_page(
            &server,
            SERVICES_PATH,
            None,
            json!({ "services": [service("web"), service("api")], "nextPageToken": "svc-2" }),
        )
        .await;
        mount_page(
            &server,
            SERVICES_PATH,
            Some("svc-2"),
            json!({ "services": [service("worker")], "nextPageToken": "svc-3" }),
        )
        .await;
        Mock::given(method("GET"))
            .and(path(SERVICES_PATH))
            .and(query_param("pageToken", "svc-3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "services": [] })))
            .expect(0)
            .mount(&server)
            .await;

        let client = GcpClient::new(&options(&server)).await.unwrap();
        let mut seen = Vec::new();
        let mut pages = 0;

        let result = ListCall::services(&client, "acme", "us-central1")
            .pages(|page| {
                pages += 1;
                if pages == 2 {
                    return Err(anyhow::anyhow!("stop at page 2"));
                }
                seen.extend(page.services.into_iter().map(|s| s.name));
                Ok(())
            })
            .await;

        assert!(result.is_err());
        assert_eq!(pages, 2);
        assert_eq!(seen.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_body_is_an_empty_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(JOBS_PATH))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let client = GcpClient::new(&options(&server)).await.unwrap();
        let jobs = list_jobs(&client, "acme", "us-central1", ListOptions::default()).await;

        assert!(jobs.is_empty());
    }

    #[tokio::test]
    async fn test_not_found_is_reported_by_status_not_by_url_digits() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/projects/shop-403123/locations/us-central1/services"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": { "code": 404, "message": "Location not found" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = GcpClient::new(&options(&server)).await.unwrap();
        let result = ListCall::services(&client, "shop-403123", "us-central1")
            .pages(|_| Ok(()))
            .await;

        let err = assert_err!(result);
        assert_eq!(
            format_gcp_error(&err),
            "Location not found. Check the project and region."
        );
    }
}
