//! Resource lifecycle tests against a mock Management API.

use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_json, body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use auth0_management::{ManagementClient, ManagementConfig};
use auth0_resources::custom_domain_verification::verify_until_ready;
use auth0_resources::signing_keys::signing_keys_id;
use auth0_resources::{
    AttrMap, CustomDomainVerificationResource, Operation, ProviderContext, ProviderRegistry,
    ResourceRequest, ResourceResponse,
};

fn client_for(server: &MockServer) -> ManagementClient {
    let mut config = ManagementConfig::with_token(server.uri(), "test-token");
    config.retry_delay_ms = 1;
    ManagementClient::new(config).unwrap()
}

fn registry_for(server: &MockServer) -> ProviderRegistry {
    ProviderRegistry::new(ProviderContext::new(Arc::new(client_for(server))))
}

fn attrs(value: Value) -> AttrMap {
    value.as_object().cloned().unwrap()
}

fn request(id: Option<&str>, config: Value, state: Value) -> ResourceRequest {
    ResourceRequest {
        id: id.map(str::to_string),
        config: attrs(config),
        state: attrs(state),
    }
}

fn error_text(response: &ResourceResponse) -> String {
    response
        .diagnostics
        .errors()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

fn not_found() -> ResponseTemplate {
    ResponseTemplate::new(404).set_body_json(json!({
        "statusCode": 404,
        "error": "Not Found",
        "message": "The resource does not exist"
    }))
}

mod connection_tests {
    use super::*;

    #[tokio::test]
    async fn test_create_sends_name_and_strategy_and_stores_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v2/connections"))
            .and(body_partial_json(json!({
                "name": "users",
                "strategy": "auth0",
                "options": { "brute_force_protection": true, "password_policy": "good" }
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": "con_1",
                "name": "users",
                "strategy": "auth0",
                "options": { "brute_force_protection": true, "password_policy": "good" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let response = registry_for(&server)
            .apply(
                "auth0_connection",
                Operation::Create,
                request(
                    None,
                    json!({
                        "name": "users",
                        "strategy": "auth0",
                        "options": { "brute_force_protection": true, "password_policy": "good" }
                    }),
                    json!({}),
                ),
            )
            .await;

        assert!(!response.diagnostics.has_error(), "{}", error_text(&response));
        assert_eq!(response.id.as_deref(), Some("con_1"));
        let state = response.state.unwrap();
        assert_eq!(state["name"], "users");
        assert_eq!(state["options"]["password_policy"], "good");
    }

    #[tokio::test]
    async fn test_read_of_deleted_connection_removes_from_state() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2/connections/con_gone"))
            .respond_with(not_found())
            .mount(&server)
            .await;

        let response = registry_for(&server)
            .apply(
                "auth0_connection",
                Operation::Read,
                request(Some("con_gone"), json!({}), json!({ "name": "gone", "strategy": "auth0" })),
            )
            .await;

        assert!(response.diagnostics.is_empty());
        assert!(response.id.is_none());
        assert!(response.state.is_none());
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/v2/connections/con_1"))
            .respond_with(ResponseTemplate::new(204))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/api/v2/connections/con_1"))
            .respond_with(not_found())
            .mount(&server)
            .await;

        let registry = registry_for(&server);
        for _ in 0..2 {
            let response = registry
                .apply(
                    "auth0_connection",
                    Operation::Delete,
                    request(Some("con_1"), json!({}), json!({ "strategy": "auth0" })),
                )
                .await;
            assert!(response.diagnostics.is_empty(), "{}", error_text(&response));
            assert!(response.id.is_none());
        }
    }

    #[tokio::test]
    async fn test_update_refuses_unmanaged_configuration_secret() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2/connections/con_1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "con_1",
                "name": "users",
                "strategy": "auth0",
                "options": { "configuration": { "foo": "enc1", "anotherFoo": "enc2" } }
            })))
            .mount(&server)
            .await;
        Mock::given(method("PATCH"))
            .and(path("/api/v2/connections/con_1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(0)
            .mount(&server)
            .await;

        let config = json!({
            "name": "users",
            "strategy": "auth0",
            "options": { "configuration": { "foo": "bar" } }
        });
        let response = registry_for(&server)
            .apply(
                "auth0_connection",
                Operation::Update,
                request(Some("con_1"), config.clone(), config),
            )
            .await;

        let errors: Vec<_> = response.diagnostics.errors().collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].summary, "Unmanaged Configuration Secret");
        assert!(errors[0].detail.as_deref().unwrap().contains("\"anotherFoo\""));
    }

    #[tokio::test]
    async fn test_update_omits_name_and_strategy() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/api/v2/connections/con_1"))
            .and(body_json(json!({
                "display_name": "Corporate",
                "show_as_button": true,
                "options": { "issuer": "https://idp.example.com" }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "con_1",
                "name": "corp",
                "display_name": "Corporate",
                "strategy": "oidc",
                "show_as_button": true,
                "options": { "issuer": "https://idp.example.com" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let config = json!({
            "name": "corp",
            "strategy": "oidc",
            "display_name": "Corporate",
            "show_as_button": true,
            "options": { "issuer": "https://idp.example.com" }
        });
        let response = registry_for(&server)
            .apply(
                "auth0_connection",
                Operation::Update,
                request(Some("con_1"), config.clone(), config),
            )
            .await;

        assert!(!response.diagnostics.has_error(), "{}", error_text(&response));
        assert_eq!(response.state.unwrap()["display_name"], "Corporate");
    }

    #[tokio::test]
    async fn test_changing_strategy_is_rejected() {
        let server = MockServer::start().await;
        let response = registry_for(&server)
            .apply(
                "auth0_connection",
                Operation::Update,
                request(
                    Some("con_1"),
                    json!({ "name": "corp", "strategy": "okta" }),
                    json!({ "name": "corp", "strategy": "oidc" }),
                ),
            )
            .await;
        assert!(response.diagnostics.has_error());
        assert!(error_text(&response).contains("strategy"));
    }

    #[tokio::test]
    async fn test_unknown_strategy_fails_validation() {
        let server = MockServer::start().await;
        let response = registry_for(&server)
            .apply(
                "auth0_connection",
                Operation::Create,
                request(None, json!({ "name": "x", "strategy": "myspace" }), json!({})),
            )
            .await;
        let errors: Vec<_> = response.diagnostics.errors().collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].attribute.as_deref(), Some("strategy"));
    }

    #[tokio::test]
    async fn test_missing_required_name() {
        let server = MockServer::start().await;
        let response = registry_for(&server)
            .apply(
                "auth0_connection",
                Operation::Create,
                request(None, json!({ "strategy": "auth0" }), json!({})),
            )
            .await;
        assert!(response
            .diagnostics
            .errors()
            .any(|d| d.attribute.as_deref() == Some("name")));
    }
}

mod enabled_clients_tests {
    use super::*;

    #[tokio::test]
    async fn test_enable_client_appends_to_existing_list() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2/connections/con_1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "con_1",
                "name": "users",
                "strategy": "auth0",
                "enabled_clients": ["client_a"]
            })))
            .mount(&server)
            .await;
        Mock::given(method("PATCH"))
            .and(path("/api/v2/connections/con_1"))
            .and(body_json(json!({ "enabled_clients": ["client_a", "client_b"] })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "con_1",
                "enabled_clients": ["client_a", "client_b"]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let response = registry_for(&server)
            .apply(
                "auth0_connection_client",
                Operation::Create,
                request(None, json!({ "connection_id": "con_1", "client_id": "client_b" }), json!({})),
            )
            .await;

        assert!(!response.diagnostics.has_error(), "{}", error_text(&response));
        assert_eq!(response.id.as_deref(), Some("con_1:client_b"));
        let state = response.state.unwrap();
        assert_eq!(state["name"], "users");
        assert_eq!(state["strategy"], "auth0");
    }

    #[tokio::test]
    async fn test_disable_client_removes_only_that_client() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2/connections/con_1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "con_1",
                "strategy": "auth0",
                "enabled_clients": ["client_a", "client_b"]
            })))
            .mount(&server)
            .await;
        Mock::given(method("PATCH"))
            .and(path("/api/v2/connections/con_1"))
            .and(body_json(json!({ "enabled_clients": ["client_a"] })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "con_1" })))
            .expect(1)
            .mount(&server)
            .await;

        let response = registry_for(&server)
            .apply(
                "auth0_connection_client",
                Operation::Delete,
                request(Some("con_1:client_b"), json!({}), json!({})),
            )
            .await;
        assert!(response.diagnostics.is_empty(), "{}", error_text(&response));
    }

    #[tokio::test]
    async fn test_disable_client_reports_failed_patch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2/connections/con_1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "con_1",
                "strategy": "auth0",
                "enabled_clients": ["client_a", "client_b"]
            })))
            .mount(&server)
            .await;
        Mock::given(method("PATCH"))
            .and(path("/api/v2/connections/con_1"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "statusCode": 400,
                "error": "Bad Request",
                "message": "Payload validation error"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let response = registry_for(&server)
            .apply(
                "auth0_connection_client",
                Operation::Delete,
                request(Some("con_1:client_b"), json!({}), json!({})),
            )
            .await;
        assert!(response.diagnostics.has_error());
    }

    #[tokio::test]
    async fn test_read_drops_client_no_longer_enabled() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2/connections/con_1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "con_1",
                "strategy": "auth0",
                "enabled_clients": ["client_a"]
            })))
            .mount(&server)
            .await;

        let response = registry_for(&server)
            .apply(
                "auth0_connection_client",
                Operation::Read,
                request(Some("con_1:client_b"), json!({}), json!({})),
            )
            .await;
        assert!(response.id.is_none());
    }

    #[tokio::test]
    async fn test_import_id_format_errors() {
        let server = MockServer::start().await;
        let registry = registry_for(&server);

        let empty = registry
            .apply("auth0_connection_client", Operation::Import, request(Some(""), json!({}), json!({})))
            .await;
        assert!(error_text(&empty).contains("ID cannot be empty"));

        for bad in ["con_1", "con_1:", ":client", "a:b:c"] {
            let response = registry
                .apply("auth0_connection_client", Operation::Import, request(Some(bad), json!({}), json!({})))
                .await;
            assert!(
                error_text(&response).contains("ID must be formatted as <connectionID>:<clientID>"),
                "{}",
                bad
            );
        }
    }

    #[tokio::test]
    async fn test_bulk_create_refuses_non_empty_connection() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2/connections/con_1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "con_1",
                "strategy": "auth0",
                "enabled_clients": ["client_a"]
            })))
            .mount(&server)
            .await;
        Mock::given(method("PATCH"))
            .and(path("/api/v2/connections/con_1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(0)
            .mount(&server)
            .await;

        let response = registry_for(&server)
            .apply(
                "auth0_connection_clients",
                Operation::Create,
                request(
                    None,
                    json!({ "connection_id": "con_1", "enabled_clients": ["client_b"] }),
                    json!({}),
                ),
            )
            .await;

        let errors: Vec<_> = response.diagnostics.errors().collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].summary, "Connection with non-empty enabled clients");
        assert!(response.id.is_none());
    }

    #[tokio::test]
    async fn test_bulk_delete_clears_list() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/api/v2/connections/con_1"))
            .and(body_json(json!({ "enabled_clients": [] })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "con_1" })))
            .expect(1)
            .mount(&server)
            .await;

        let response = registry_for(&server)
            .apply(
                "auth0_connection_clients",
                Operation::Delete,
                request(Some("con_1"), json!({}), json!({ "connection_id": "con_1" })),
            )
            .await;
        assert!(response.diagnostics.is_empty(), "{}", error_text(&response));
    }

    #[tokio::test]
    async fn test_concurrent_enables_on_one_connection_all_succeed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2/connections/con_1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "con_1",
                "strategy": "auth0",
                "enabled_clients": []
            })))
            .mount(&server)
            .await;
        Mock::given(method("PATCH"))
            .and(path("/api/v2/connections/con_1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "con_1" })))
            .expect(3)
            .mount(&server)
            .await;

        let registry = Arc::new(registry_for(&server));
        let handles: Vec<_> = ["a", "b", "c"]
            .into_iter()
            .map(|client| {
                let registry = Arc::clone(&registry);
                tokio::spawn(async move {
                    registry
                        .apply(
                            "auth0_connection_client",
                            Operation::Create,
                            request(None, json!({ "connection_id": "con_1", "client_id": client }), json!({})),
                        )
                        .await
                })
            })
            .collect();

        for handle in handles {
            let response = handle.await.unwrap();
            assert!(!response.diagnostics.has_error(), "{}", error_text(&response));
        }
    }
}

mod custom_domain_tests {
    use super::*;

    fn domain(status: &str) -> Value {
        json!({
            "custom_domain_id": "cd_1",
            "domain": "login.example.com",
            "primary": true,
            "status": status,
            "type": "auth0_managed_certs",
            "origin_domain_name": "example.edge.tenants.auth0.com"
        })
    }

    #[tokio::test]
    async fn test_verification_polls_until_ready() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v2/custom-domains/cd_1/verify"))
            .respond_with(ResponseTemplate::new(200).set_body_json(domain("pending_verification")))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        let mut ready = domain("ready");
        ready["cname_api_key"] = json!("secret-key");
        Mock::given(method("POST"))
            .and(path("/api/v2/custom-domains/cd_1/verify"))
            .respond_with(ResponseTemplate::new(200).set_body_json(ready))
            .expect(1)
            .mount(&server)
            .await;

        let mut registry = registry_for(&server);
        registry.register_resource(CustomDomainVerificationResource::with_poll_interval(
            Duration::from_millis(5),
        ));

        let response = registry
            .apply(
                "auth0_custom_domain_verification",
                Operation::Create,
                request(
                    None,
                    json!({ "custom_domain_id": "cd_1", "timeouts": { "create": "5s" } }),
                    json!({}),
                ),
            )
            .await;

        assert!(!response.diagnostics.has_error(), "{}", error_text(&response));
        assert_eq!(response.id.as_deref(), Some("cd_1"));
        let state = response.state.unwrap();
        assert_eq!(state["origin_domain_name"], "example.edge.tenants.auth0.com");
        assert_eq!(state["cname_api_key"], "secret-key");
    }

    #[tokio::test]
    async fn test_verification_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v2/custom-domains/cd_1/verify"))
            .respond_with(ResponseTemplate::new(200).set_body_json(domain("pending_verification")))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = verify_until_ready(&client, "cd_1", Duration::from_millis(10), Duration::from_millis(100))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("did not reach status \"ready\""));
    }

    #[tokio::test]
    async fn test_verification_stops_on_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v2/custom-domains/cd_1/verify"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "statusCode": 400,
                "error": "Bad Request",
                "message": "Domain has no pending verification"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = verify_until_ready(&client, "cd_1", Duration::from_millis(5), Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Domain has no pending verification"));
    }

    #[tokio::test]
    async fn test_read_removes_deleted_domain() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2/custom-domains/cd_1"))
            .respond_with(not_found())
            .mount(&server)
            .await;

        let response = registry_for(&server)
            .apply(
                "auth0_custom_domain",
                Operation::Read,
                request(Some("cd_1"), json!({}), json!({ "domain": "login.example.com" })),
            )
            .await;
        assert!(response.id.is_none());
    }

    #[tokio::test]
    async fn test_invalid_tls_policy_rejected() {
        let server = MockServer::start().await;
        let response = registry_for(&server)
            .apply(
                "auth0_custom_domain",
                Operation::Create,
                request(
                    None,
                    json!({
                        "domain": "login.example.com",
                        "type": "auth0_managed_certs",
                        "tls_policy": "legacy"
                    }),
                    json!({}),
                ),
            )
            .await;
        assert!(response
            .diagnostics
            .errors()
            .any(|d| d.attribute.as_deref() == Some("tls_policy")));
    }
}

mod key_tests {
    use super::*;

    fn keys_page() -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "keys": [
                { "kid": "k1", "type": "tenant-master-key", "state": "active", "created_at": "2024-01-01T00:00:00Z" },
                { "kid": "k2", "type": "tenant-encryption-key", "state": "active", "parent_kid": "k1" }
            ],
            "start": 0,
            "limit": 50,
            "total": 2
        }))
    }

    #[tokio::test]
    async fn test_rotation_only_when_rotation_id_changes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2/keys/encryption"))
            .respond_with(keys_page())
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/v2/keys/encryption/rekey"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let registry = registry_for(&server);

        let unchanged = registry
            .apply(
                "auth0_encryption_key_manager",
                Operation::Update,
                request(
                    Some("mgr"),
                    json!({ "key_rotation_id": "first" }),
                    json!({ "key_rotation_id": "first" }),
                ),
            )
            .await;
        assert!(!unchanged.diagnostics.has_error(), "{}", error_text(&unchanged));

        let changed = registry
            .apply(
                "auth0_encryption_key_manager",
                Operation::Update,
                request(
                    Some("mgr"),
                    json!({ "key_rotation_id": "second" }),
                    json!({ "key_rotation_id": "first" }),
                ),
            )
            .await;
        assert!(!changed.diagnostics.has_error(), "{}", error_text(&changed));

        let state = changed.state.unwrap();
        let keys = state["encryption_keys"].as_array().unwrap();
        assert_eq!(keys.len(), 2);
        assert_eq!(keys[1]["parent_key_id"], "k1");
        assert_eq!(keys[0]["type"], "tenant-master-key");
    }

    #[tokio::test]
    async fn test_create_without_rotation_id_does_not_rekey() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2/keys/encryption"))
            .respond_with(keys_page())
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/v2/keys/encryption/rekey"))
            .respond_with(ResponseTemplate::new(204))
            .expect(0)
            .mount(&server)
            .await;

        let response = registry_for(&server)
            .apply("auth0_encryption_key_manager", Operation::Create, request(None, json!({}), json!({})))
            .await;
        assert!(response.id.is_some());
    }

    #[tokio::test]
    async fn test_signing_keys_data_source() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2/keys/signing"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "kid": "a", "cert": "CERT-A", "current": true, "thumbprint": "TA" },
                { "kid": "b", "cert": "CERT-B", "next": true, "thumbprint": "TB" }
            ])))
            .mount(&server)
            .await;

        let response = registry_for(&server)
            .read_data_source("auth0_signing_keys", request(None, json!({}), json!({})))
            .await;

        assert!(!response.diagnostics.has_error(), "{}", error_text(&response));
        let keys: Vec<auth0_core::SigningKey> = serde_json::from_value(json!([
            { "kid": "a" },
            { "kid": "b" }
        ]))
        .unwrap();
        assert_eq!(response.id.as_deref(), Some(signing_keys_id(&keys).as_str()));
        let state = response.state.unwrap();
        assert_eq!(state["signing_keys"][0]["cert"], "CERT-A");
        assert_eq!(state["signing_keys"][1]["next"], true);
    }
}

mod registry_tests {
    use super::*;

    #[tokio::test]
    async fn test_unknown_resource_type() {
        let server = MockServer::start().await;
        let response = registry_for(&server)
            .apply("auth0_widget", Operation::Read, request(Some("x"), json!({}), json!({})))
            .await;
        assert!(error_text(&response).contains("auth0_widget"));
    }

    #[tokio::test]
    async fn test_non_create_requires_id() {
        let server = MockServer::start().await;
        let response = registry_for(&server)
            .apply("auth0_connection", Operation::Read, request(None, json!({}), json!({})))
            .await;
        assert!(error_text(&response).contains("requires a resource ID"));
    }

    #[tokio::test]
    async fn test_schemas_cover_every_type() {
        let server = MockServer::start().await;
        let schemas = registry_for(&server).schemas();
        for name in [
            "auth0_connection",
            "auth0_connection_client",
            "auth0_connection_clients",
            "auth0_connection_directory",
            "auth0_connection_scim_configuration",
            "auth0_connection_scim_token",
            "auth0_connection_profile",
            "auth0_custom_domain",
            "auth0_custom_domain_verification",
            "auth0_encryption_key_manager",
        ] {
            assert!(schemas.resources.contains_key(name), "{}", name);
        }
        for name in [
            "auth0_connection",
            "auth0_connection_scim_configuration",
            "auth0_custom_domain",
            "auth0_signing_keys",
        ] {
            assert!(schemas.data_sources.contains_key(name), "{}", name);
        }
    }
}

mod provisioning_tests {
    use super::*;

    #[tokio::test]
    async fn test_scim_token_keeps_secret_from_creation() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v2/connections/con_1/scim-configuration/tokens"))
            .and(body_json(json!({ "scopes": ["get:users"], "token_lifetime": 3600 })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "token_id": "tok_1",
                "token": "scim-secret",
                "scopes": ["get:users"],
                "created_at": "2024-01-01T00:00:00Z"
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v2/connections/con_1/scim-configuration/tokens"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "token_id": "tok_1", "scopes": ["get:users"] }
            ])))
            .mount(&server)
            .await;

        let registry = registry_for(&server);
        let created = registry
            .apply(
                "auth0_connection_scim_token",
                Operation::Create,
                request(
                    None,
                    json!({ "connection_id": "con_1", "scopes": ["get:users"], "token_lifetime": 3600 }),
                    json!({}),
                ),
            )
            .await;
        assert!(!created.diagnostics.has_error(), "{}", error_text(&created));
        assert_eq!(created.id.as_deref(), Some("con_1:tok_1"));
        let state = created.state.unwrap();
        assert_eq!(state["token"], "scim-secret");

        let read = registry
            .apply(
                "auth0_connection_scim_token",
                Operation::Read,
                ResourceRequest {
                    id: Some("con_1:tok_1".to_string()),
                    config: AttrMap::new(),
                    state,
                },
            )
            .await;
        assert_eq!(read.state.unwrap()["token"], "scim-secret");
    }

    #[tokio::test]
    async fn test_scim_token_update_without_declared_scopes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2/connections/con_1/scim-configuration/tokens"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "token_id": "tok_1", "scopes": ["get:users"] }
            ])))
            .mount(&server)
            .await;

        let response = registry_for(&server)
            .apply(
                "auth0_connection_scim_token",
                Operation::Update,
                request(
                    Some("con_1:tok_1"),
                    json!({ "connection_id": "con_1" }),
                    json!({ "connection_id": "con_1", "scopes": ["get:users"], "token_id": "tok_1" }),
                ),
            )
            .await;
        assert!(!response.diagnostics.has_error(), "{}", error_text(&response));
        assert_eq!(response.id.as_deref(), Some("con_1:tok_1"));
        assert_eq!(response.state.unwrap()["scopes"], json!(["get:users"]));
    }

    #[tokio::test]
    async fn test_scim_token_import_id_format() {
        let server = MockServer::start().await;
        let response = registry_for(&server)
            .apply(
                "auth0_connection_scim_token",
                Operation::Import,
                request(Some("tok_1"), json!({}), json!({})),
            )
            .await;
        assert!(error_text(&response).contains("ID must be formatted as <connectionID>:<tokenID>"));
    }

    #[tokio::test]
    async fn test_directory_create_on_missing_connection_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v2/connections/con_gone/directory-provisioning"))
            .respond_with(not_found())
            .mount(&server)
            .await;

        let response = registry_for(&server)
            .apply(
                "auth0_connection_directory",
                Operation::Create,
                request(None, json!({ "connection_id": "con_gone" }), json!({})),
            )
            .await;
        assert!(response.diagnostics.has_error());
        assert!(response.id.is_none());
    }

    #[tokio::test]
    async fn test_scim_configuration_requires_fields_together() {
        let server = MockServer::start().await;
        let response = registry_for(&server)
            .apply(
                "auth0_connection_scim_configuration",
                Operation::Create,
                request(
                    None,
                    json!({ "connection_id": "con_1", "user_id_attribute": "externalId" }),
                    json!({}),
                ),
            )
            .await;
        assert!(response.diagnostics.has_error());
    }
}
