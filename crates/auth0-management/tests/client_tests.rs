//! Management client tests against a mock Management API.

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use auth0_core::{ConnectionFilter, ConnectionOptions, ManagementApi, Strategy};
use auth0_management::{Credentials, ManagementClient, ManagementConfig};

fn client_for(server: &MockServer) -> ManagementClient {
    let mut config = ManagementConfig::with_token(server.uri(), "test-token");
    config.retry_delay_ms = 1;
    config.per_page = 2;
    ManagementClient::new(config).unwrap()
}

fn connection_json(id: &str, name: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": name,
        "strategy": "auth0",
        "options": { "brute_force_protection": true }
    })
}

#[tokio::test]
async fn test_read_connection_sends_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/connections/con_1"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(connection_json("con_1", "db")))
        .expect(1)
        .mount(&server)
        .await;

    let connection = client_for(&server).read_connection("con_1").await.unwrap();
    assert_eq!(connection.strategy, Some(Strategy::Auth0));
    match connection.options {
        Some(ConnectionOptions::Database(options)) => {
            assert_eq!(options.brute_force_protection, Some(true))
        }
        other => panic!("unexpected options: {other:?}"),
    }
}

#[tokio::test]
async fn test_not_found_is_classified() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/v2/connections/con_gone"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "statusCode": 404,
            "error": "Not Found",
            "message": "The connection does not exist"
        })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .delete_connection("con_gone")
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_api_error_message_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v2/connections"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "statusCode": 400,
            "error": "Bad Request",
            "message": "Payload validation error",
            "errorCode": "invalid_body"
        })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .create_connection(&Default::default())
        .await
        .unwrap_err();
    assert!(!err.is_not_found());
    assert_eq!(
        err.to_string(),
        "Management API error (400): Payload validation error (invalid_body)"
    );
}

#[tokio::test]
async fn test_list_connections_walks_pages() {
    let server = MockServer::start().await;
    for (page, connections) in [
        ("0", vec![connection_json("con_1", "a"), connection_json("con_2", "b")]),
        ("1", vec![connection_json("con_3", "c")]),
    ] {
        Mock::given(method("GET"))
            .and(path("/api/v2/connections"))
            .and(query_param("page", page))
            .and(query_param("per_page", "2"))
            .and(query_param("include_totals", "true"))
            .and(query_param("name", "a"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "connections": connections,
                "start": 0,
                "limit": 2,
                "total": 3
            })))
            .expect(1)
            .mount(&server)
            .await;
    }

    let filter = ConnectionFilter {
        name: Some("a".to_string()),
        ..Default::default()
    };
    let connections = client_for(&server).list_connections(&filter).await.unwrap();
    let ids: Vec<_> = connections.iter().filter_map(|c| c.id.as_deref()).collect();
    assert_eq!(ids, vec!["con_1", "con_2", "con_3"]);
}

#[tokio::test]
async fn test_rate_limited_requests_are_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/keys/signing"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v2/keys/signing"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "kid": "key_1", "current": true }
        ])))
        .mount(&server)
        .await;

    let keys = client_for(&server).list_signing_keys().await.unwrap();
    assert_eq!(keys.len(), 1);
    assert!(keys[0].current);
}

#[tokio::test]
async fn test_server_errors_are_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v2/keys/encryption/rekey"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let err = client_for(&server).rekey_encryption_keys().await.unwrap_err();
    assert!(matches!(err, auth0_core::Auth0Error::Api { status: 503, .. }));
}

#[tokio::test]
async fn test_client_credentials_token_is_cached() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_partial_json(json!({
            "grant_type": "client_credentials",
            "client_id": "m2m",
            "client_secret": "secret"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "fetched-token",
            "expires_in": 86400,
            "token_type": "Bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v2/custom-domains"))
        .and(header("authorization", "Bearer fetched-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(2)
        .mount(&server)
        .await;

    let mut config = ManagementConfig::with_token(server.uri(), "");
    config.credentials = Credentials::ClientCredentials {
        client_id: "m2m".to_string(),
        client_secret: "secret".to_string(),
    };
    let client = ManagementClient::new(config).unwrap();

    assert!(client.list_custom_domains().await.unwrap().is_empty());
    assert!(client.list_custom_domains().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_encryption_keys_are_paginated() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/keys/encryption"))
        .and(query_param("page", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "keys": [
                { "kid": "k1", "type": "tenant-master-key", "state": "active" },
                { "kid": "k2", "type": "environment-root-key", "state": "active" }
            ],
            "start": 0, "limit": 2, "total": 3
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v2/keys/encryption"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "keys": [
                { "kid": "k3", "type": "tenant-master-key", "state": "destroyed", "parent_kid": "k2" }
            ],
            "start": 2, "limit": 2, "total": 3
        })))
        .mount(&server)
        .await;

    let keys = client_for(&server).list_encryption_keys().await.unwrap();
    assert_eq!(keys.len(), 3);
    assert_eq!(keys[2].parent_kid.as_deref(), Some("k2"));
}
