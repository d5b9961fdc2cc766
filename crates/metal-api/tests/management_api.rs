//! Behavioral tests for the management API client against a mock agent.

use metal_api::{boot_from_network, Error, ManagementClient, PowerManager};
use metal_core::config::ManagementApiConfig;
use reqwest::StatusCode;
use serde_json::json;
use std::sync::Arc;
use std::time::{Duration, Instant};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mock_route(server: &MockServer, verb: &str, route: &str, status: u16, times: u64) {
    Mock::given(method(verb))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status))
        .expect(times)
        .mount(server)
        .await;
}

/// Paths of every request the server received, in arrival order.
async fn received_paths(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|request| format!("{} {}", request.method, request.url.path()))
        .collect()
}

fn client_for(server: &MockServer) -> ManagementClient {
    ManagementClient::new(server.address().to_string())
}

#[tokio::test]
async fn power_cycle_stops_when_power_off_fails() {
    let server = MockServer::start().await;
    mock_route(&server, "POST", "/poweroff", 500, 1).await;
    mock_route(&server, "POST", "/poweron", 200, 0).await;

    let err = client_for(&server).power_cycle().await.unwrap_err();

    assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
    assert_eq!(received_paths(&server).await, vec!["POST /poweroff"]);
}

#[tokio::test]
async fn power_cycle_powers_off_then_on() {
    let server = MockServer::start().await;
    mock_route(&server, "POST", "/poweroff", 200, 1).await;
    mock_route(&server, "POST", "/poweron", 200, 1).await;

    client_for(&server).power_cycle().await.unwrap();

    assert_eq!(
        received_paths(&server).await,
        vec!["POST /poweroff", "POST /poweron"]
    );
}

#[tokio::test]
async fn power_cycle_reports_power_on_failure() {
    let server = MockServer::start().await;
    mock_route(&server, "POST", "/poweroff", 200, 1).await;
    mock_route(&server, "POST", "/poweron", 503, 1).await;

    let err = client_for(&server).power_cycle().await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::SERVICE_UNAVAILABLE));
}

#[tokio::test]
async fn unreachable_endpoint_is_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let endpoint = listener.local_addr().unwrap().to_string();
    drop(listener);

    let client = ManagementClient::new(endpoint);
    let started = Instant::now();

    let err = client.power_on().await.unwrap_err();
    assert!(matches!(err, Error::Transport(_)), "got {err:?}");
    assert!(err.is_transport());

    let err = client.is_powered_on().await.unwrap_err();
    assert!(err.is_transport(), "got {err:?}");

    assert!(started.elapsed() < client.timeout());
}

#[tokio::test]
async fn slow_agent_hits_request_deadline() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/pxeboot"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let deadline = Duration::from_millis(300);
    let client = ManagementClient::builder(server.address().to_string())
        .with_timeout(deadline)
        .build()
        .unwrap();

    let started = Instant::now();
    let err = client.set_pxe().await.unwrap_err();
    let elapsed = started.elapsed();

    assert!(err.is_timeout(), "got {err:?}");
    assert!(err.is_transport());
    assert!(elapsed >= deadline, "returned after {elapsed:?}");
    assert!(elapsed < deadline + Duration::from_secs(2), "returned after {elapsed:?}");
}

#[tokio::test]
async fn slow_status_query_hits_request_deadline() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "PoweredOn": true }))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let config = ManagementApiConfig::from_json(&format!(
        r#"{{"endpoint": "{}", "timeout_secs": 1}}"#,
        server.address()
    ))
    .unwrap();
    let client = ManagementClient::builder(config.endpoint.clone())
        .with_http_config(config.client_config())
        .build()
        .unwrap();

    let err = client.is_powered_on().await.unwrap_err();
    assert!(err.is_timeout(), "got {err:?}");
}

#[tokio::test]
async fn concurrent_calls_share_one_client() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "PoweredOn": true })))
        .expect(8)
        .mount(&server)
        .await;

    let client = Arc::new(client_for(&server));
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let client = Arc::clone(&client);
            tokio::spawn(async move { client.is_powered_on().await })
        })
        .collect();

    for handle in handles {
        assert!(handle.await.unwrap().unwrap());
    }
}

#[tokio::test]
async fn boot_from_network_against_running_machine() {
    let server = MockServer::start().await;
    mock_route(&server, "POST", "/pxeboot", 200, 1).await;
    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "PoweredOn": true })))
        .expect(1)
        .mount(&server)
        .await;
    mock_route(&server, "POST", "/poweroff", 200, 1).await;
    mock_route(&server, "POST", "/poweron", 200, 1).await;

    let manager: Arc<dyn PowerManager> = Arc::new(client_for(&server));
    boot_from_network(manager.as_ref()).await.unwrap();

    assert_eq!(
        received_paths(&server).await,
        vec![
            "POST /pxeboot",
            "GET /status",
            "POST /poweroff",
            "POST /poweron"
        ]
    );
}

#[tokio::test]
async fn boot_from_network_against_stopped_machine() {
    let server = MockServer::start().await;
    mock_route(&server, "POST", "/pxeboot", 200, 1).await;
    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "PoweredOn": false })))
        .expect(1)
        .mount(&server)
        .await;
    mock_route(&server, "POST", "/poweroff", 200, 0).await;
    mock_route(&server, "POST", "/poweron", 200, 1).await;

    let client = client_for(&server);
    boot_from_network(&client).await.unwrap();
}
