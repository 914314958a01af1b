// Copyright (c) 2026 the agwsync authors
// SPDX-License-Identifier: MIT

//! Unit tests for `azure.rs`, exercised against a mock ARM endpoint.

use super::*;
use crate::sync_errors::GatewayApiError;
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GATEWAY_PATH: &str =
    "/subscriptions/sub/resourceGroups/rg/providers/Microsoft.Network/applicationGateways/gw";

fn client_for(server: &MockServer) -> ArmClient {
    ArmClient::new(
        server.uri(),
        "sub",
        "2023-09-01",
        ArmAuth::StaticToken("test-token".to_string()),
        Duration::from_millis(10),
    )
}

#[tokio::test]
async fn test_get_fetches_and_authenticates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(GATEWAY_PATH))
        .and(query_param("api-version", "2023-09-01"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": GATEWAY_PATH,
            "name": "gw",
            "properties": { "provisioningState": "Succeeded" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = client_for(&server).get("rg", "gw").await.unwrap();
    assert_eq!(gateway.name.as_deref(), Some("gw"));
    assert!(!gateway.is_updating());
}

#[tokio::test]
async fn test_managed_identity_token_is_fetched_and_cached() {
    let server = MockServer::start().await;
    // Token fetch must carry the metadata header and both parameters, and
    // must happen exactly once across consecutive requests.
    Mock::given(method("GET"))
        .and(path("/metadata/identity/oauth2/token"))
        .and(query_param("api-version", "2018-02-01"))
        .and(query_param("resource", "https://management.azure.com/"))
        .and(header("Metadata", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "imds-token",
            "expires_on": (unix_now() + 3600).to_string()
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(GATEWAY_PATH))
        .and(header("authorization", "Bearer imds-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "gw",
            "properties": {}
        })))
        .expect(2)
        .mount(&server)
        .await;

    let auth = ArmAuth::ManagedIdentity {
        endpoint: format!("{}/metadata/identity/oauth2/token", server.uri()),
        cache: Mutex::new(None),
    };
    let client = ArmClient::new(
        server.uri(),
        "sub",
        "2023-09-01",
        auth,
        Duration::from_millis(10),
    );

    client.get("rg", "gw").await.unwrap();
    client.get("rg", "gw").await.unwrap();
}

#[tokio::test]
async fn test_imds_failure_surfaces_as_token_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/metadata/identity/oauth2/token"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let auth = ArmAuth::ManagedIdentity {
        endpoint: format!("{}/metadata/identity/oauth2/token", server.uri()),
        cache: Mutex::new(None),
    };
    let client = ArmClient::new(
        server.uri(),
        "sub",
        "2023-09-01",
        auth,
        Duration::from_millis(10),
    );

    let err = client.get("rg", "gw").await.unwrap_err();
    assert!(matches!(err, GatewayApiError::TokenAcquisition { .. }));
}

#[tokio::test]
async fn test_get_surfaces_http_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(GATEWAY_PATH))
        .respond_with(ResponseTemplate::new(403).set_body_string("authorization failed"))
        .mount(&server)
        .await;

    let err = client_for(&server).get("rg", "gw").await.unwrap_err();
    match err {
        GatewayApiError::RequestFailed {
            status, message, ..
        } => {
            assert_eq!(status, 403);
            assert_eq!(message, "authorization failed");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_get_rejects_malformed_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(GATEWAY_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = client_for(&server).get("rg", "gw").await.unwrap_err();
    assert!(matches!(err, GatewayApiError::UnexpectedBody { .. }));
}

#[tokio::test]
async fn test_update_returns_operation_handle() {
    let server = MockServer::start().await;
    let status_url = format!("{}/operations/op-1", server.uri());
    Mock::given(method("PUT"))
        .and(path(GATEWAY_PATH))
        .and(query_param("api-version", "2023-09-01"))
        .respond_with(
            ResponseTemplate::new(202).insert_header("Azure-AsyncOperation", status_url.as_str()),
        )
        .expect(1)
        .mount(&server)
        .await;

    let handle = client_for(&server)
        .create_or_update("rg", "gw", &ApplicationGateway::default())
        .await
        .unwrap();
    assert_eq!(handle.status_url.as_deref(), Some(status_url.as_str()));
}

#[tokio::test]
async fn test_update_falls_back_to_location_header() {
    let server = MockServer::start().await;
    let status_url = format!("{}/operations/op-2", server.uri());
    Mock::given(method("PUT"))
        .and(path(GATEWAY_PATH))
        .respond_with(ResponseTemplate::new(202).insert_header("Location", status_url.as_str()))
        .mount(&server)
        .await;

    let handle = client_for(&server)
        .create_or_update("rg", "gw", &ApplicationGateway::default())
        .await
        .unwrap();
    assert_eq!(handle.status_url.as_deref(), Some(status_url.as_str()));
}

#[tokio::test]
async fn test_synchronous_update_needs_no_wait() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path(GATEWAY_PATH))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let handle = client
        .create_or_update("rg", "gw", &ApplicationGateway::default())
        .await
        .unwrap();
    assert!(handle.status_url.is_none());

    // No status URL means nothing to poll.
    client.wait(handle).await.unwrap();
}

#[tokio::test]
async fn test_wait_polls_until_succeeded() {
    let server = MockServer::start().await;
    // First poll answers InProgress, every later poll Succeeded.
    Mock::given(method("GET"))
        .and(path("/operations/op-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "InProgress"})))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/operations/op-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "Succeeded"})))
        .expect(1)
        .mount(&server)
        .await;

    let handle = OperationHandle {
        status_url: Some(format!("{}/operations/op-1", server.uri())),
    };
    client_for(&server).wait(handle).await.unwrap();
}

#[tokio::test]
async fn test_wait_surfaces_operation_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/operations/op-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "Failed",
            "error": { "code": "InvalidResourceReference", "message": "listener missing" }
        })))
        .mount(&server)
        .await;

    let handle = OperationHandle {
        status_url: Some(format!("{}/operations/op-1", server.uri())),
    };
    let err = client_for(&server).wait(handle).await.unwrap_err();
    match err {
        GatewayApiError::OperationFailed {
            status, message, ..
        } => {
            assert_eq!(status, "Failed");
            assert!(message.contains("InvalidResourceReference"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_wait_surfaces_canceled_operation() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/operations/op-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "Canceled"})))
        .mount(&server)
        .await;

    let handle = OperationHandle {
        status_url: Some(format!("{}/operations/op-1", server.uri())),
    };
    let err = client_for(&server).wait(handle).await.unwrap_err();
    assert!(matches!(
        err,
        GatewayApiError::OperationFailed { status, .. } if status == "Canceled"
    ));
}

#[tokio::test]
async fn test_wait_surfaces_polling_http_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/operations/op-1"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let handle = OperationHandle {
        status_url: Some(format!("{}/operations/op-1", server.uri())),
    };
    let err = client_for(&server).wait(handle).await.unwrap_err();
    assert!(matches!(
        err,
        GatewayApiError::RequestFailed { status: 500, .. }
    ));
}
