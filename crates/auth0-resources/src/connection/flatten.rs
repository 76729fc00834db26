//! Connection response → stored state

use serde_json::{json, Value};

use auth0_core::{
    split_scope_string, Connection, ConnectionOptions, DatabaseOptions, EmailOptions, IdpInitiated,
    OidcAttributeMap, OidcConnectionSettings, Strategy, Totp,
};

use crate::data::{map_to_json_string, AttrMap, AttrReader, ResourceData};
use crate::diag::{Diagnostic, Diagnostics};

pub const DEFAULT_USER_ROOT_ATTRIBUTES: &str = "on_each_login";

/// Write the connection into state.
///
/// Write-only options (`configuration`, `metadata_xml`, `fed_metadata_xml`)
/// keep the value already present in `d` unless the API reports one.
pub fn flatten_connection(d: &mut ResourceData, connection: &Connection) -> Diagnostics {
    let strategy = connection
        .strategy
        .or_else(|| d.string("strategy").and_then(|s| s.parse().ok()));

    let previous = d
        .block("options")
        .map(|b| b.map().clone())
        .unwrap_or_default();

    let mut diags = Diagnostics::new();
    let options = match (&connection.options, strategy) {
        (Some(options), Some(strategy)) => {
            let (value, warnings) = flatten_options(options, strategy, &previous);
            diags.extend(warnings);
            value
        }
        _ => Value::Null,
    };

    d.set("name", json!(connection.name));
    d.set("display_name", json!(connection.display_name));
    d.set("strategy", json!(strategy.map(|s| s.as_str())));
    d.set("is_domain_connection", json!(connection.is_domain_connection));
    d.set("metadata", json!(connection.metadata));
    d.set("realms", json!(connection.realms));
    if strategy.is_some_and(|s| s.shows_button()) {
        d.set("show_as_button", json!(connection.show_as_button));
    }
    d.set("options", options);

    diags
}

/// Options block for the active variant; fields of other variants are absent
pub fn flatten_options(
    options: &ConnectionOptions,
    strategy: Strategy,
    previous: &AttrMap,
) -> (Value, Diagnostics) {
    let mut diags = Diagnostics::new();
    let user_root = |value: &Option<String>| user_root_attributes(strategy, value);

    let value = match options {
        ConnectionOptions::Database(o) => flatten_database(o, previous),
        ConnectionOptions::GoogleOAuth2(o) => json!({
            "client_id": o.client_id,
            "client_secret": o.client_secret,
            "allowed_audiences": o.allowed_audiences,
            "scopes": o.scopes.enabled(),
            "non_persistent_attrs": o.non_persistent_attrs,
            "set_user_root_attributes": user_root(&o.set_user_root_attributes),
            "upstream_params": map_to_json_string(o.upstream_params.as_ref()),
        }),
        ConnectionOptions::GoogleApps(o) => json!({
            "client_id": o.client_id,
            "client_secret": o.client_secret,
            "domain": o.domain,
            "tenant_domain": o.tenant_domain,
            "domain_aliases": o.domain_aliases,
            "icon_url": o.icon_url,
            "api_enable_users": o.api_enable_users,
            "map_user_id_to_id": o.map_user_id_to_id,
            "handle_login_from_social": o.handle_login_from_social,
            "scopes": o.scopes.enabled(),
            "non_persistent_attrs": o.non_persistent_attrs,
            "set_user_root_attributes": user_root(&o.set_user_root_attributes),
            "upstream_params": map_to_json_string(o.upstream_params.as_ref()),
        }),
        ConnectionOptions::OAuth2(o) => json!({
            "client_id": o.client_id,
            "client_secret": o.client_secret,
            "authorization_endpoint": o.authorization_endpoint,
            "token_endpoint": o.token_endpoint,
            "scopes": o.scope.as_deref().map(split_scope_string),
            "scripts": o.scripts,
            "icon_url": o.icon_url,
            "pkce_enabled": o.pkce_enabled,
            "non_persistent_attrs": o.non_persistent_attrs,
            "set_user_root_attributes": user_root(&o.set_user_root_attributes),
            "upstream_params": map_to_json_string(o.upstream_params.as_ref()),
        }),
        ConnectionOptions::Facebook(o) => json!({
            "client_id": o.client_id,
            "client_secret": o.client_secret,
            "scopes": o.scopes.enabled(),
            "non_persistent_attrs": o.non_persistent_attrs,
            "set_user_root_attributes": user_root(&o.set_user_root_attributes),
            "upstream_params": map_to_json_string(o.upstream_params.as_ref()),
        }),
        ConnectionOptions::Apple(o) => json!({
            "client_id": o.client_id,
            "client_secret": o.client_secret,
            "team_id": o.team_id,
            "key_id": o.key_id,
            "scopes": o.scopes.enabled(),
            "non_persistent_attrs": o.non_persistent_attrs,
            "set_user_root_attributes": user_root(&o.set_user_root_attributes),
            "upstream_params": map_to_json_string(o.upstream_params.as_ref()),
        }),
        ConnectionOptions::LinkedIn(o) => json!({
            "client_id": o.client_id,
            "client_secret": o.client_secret,
            "strategy_version": o.strategy_version,
            "scopes": o.scopes.enabled(),
            "non_persistent_attrs": o.non_persistent_attrs,
            "set_user_root_attributes": user_root(&o.set_user_root_attributes),
            "upstream_params": map_to_json_string(o.upstream_params.as_ref()),
        }),
        ConnectionOptions::GitHub(o) => json!({
            "client_id": o.client_id,
            "client_secret": o.client_secret,
            "scopes": o.scopes.enabled(),
            "non_persistent_attrs": o.non_persistent_attrs,
            "set_user_root_attributes": user_root(&o.set_user_root_attributes),
            "upstream_params": map_to_json_string(o.upstream_params.as_ref()),
        }),
        ConnectionOptions::WindowsLive(o) => json!({
            "client_id": o.client_id,
            "client_secret": o.client_secret,
            "strategy_version": o.strategy_version,
            "scopes": o.scopes.enabled(),
            "non_persistent_attrs": o.non_persistent_attrs,
            "set_user_root_attributes": user_root(&o.set_user_root_attributes),
            "upstream_params": map_to_json_string(o.upstream_params.as_ref()),
        }),
        ConnectionOptions::Salesforce(o) => json!({
            "client_id": o.client_id,
            "client_secret": o.client_secret,
            "community_base_url": o.community_base_url,
            "scopes": o.scopes.enabled(),
            "non_persistent_attrs": o.non_persistent_attrs,
            "set_user_root_attributes": user_root(&o.set_user_root_attributes),
            "upstream_params": map_to_json_string(o.upstream_params.as_ref()),
        }),
        ConnectionOptions::Sms(o) => json!({
            "name": o.name,
            "from": o.from,
            "syntax": o.syntax,
            "template": o.template,
            "totp": flatten_totp(&o.totp),
            "messaging_service_sid": o.messaging_service_sid,
            "twilio_sid": o.twilio_sid,
            "twilio_token": o.twilio_token,
            "provider": o.provider,
            "gateway_url": o.gateway_url,
            "forward_request_info": o.forward_request_info,
            "disable_signup": o.disable_signup,
            "brute_force_protection": o.brute_force_protection,
        }),
        ConnectionOptions::Email(o) => {
            let (value, warnings) = flatten_email(o);
            diags.extend(warnings);
            value
        }
        ConnectionOptions::Oidc(o) => json!({
            "client_id": o.client_id,
            "client_secret": o.client_secret,
            "discovery_url": o.discovery_url,
            "issuer": o.issuer,
            "jwks_uri": o.jwks_uri,
            "authorization_endpoint": o.authorization_endpoint,
            "token_endpoint": o.token_endpoint,
            "userinfo_endpoint": o.userinfo_endpoint,
            "type": o.client_type,
            "scopes": o.scope.as_deref().map(split_scope_string),
            "domain_aliases": o.domain_aliases,
            "icon_url": o.icon_url,
            "tenant_domain": o.tenant_domain,
            "connection_settings": flatten_connection_settings(&o.connection_settings),
            "attribute_map": flatten_attribute_map(&o.attribute_map),
            "non_persistent_attrs": o.non_persistent_attrs,
            "set_user_root_attributes": user_root(&o.set_user_root_attributes),
            "upstream_params": map_to_json_string(o.upstream_params.as_ref()),
        }),
        ConnectionOptions::Okta(o) => json!({
            "client_id": o.client_id,
            "client_secret": o.client_secret,
            "domain": o.domain,
            "issuer": o.issuer,
            "jwks_uri": o.jwks_uri,
            "authorization_endpoint": o.authorization_endpoint,
            "token_endpoint": o.token_endpoint,
            "userinfo_endpoint": o.userinfo_endpoint,
            "scopes": o.scope.as_deref().map(split_scope_string),
            "domain_aliases": o.domain_aliases,
            "icon_url": o.icon_url,
            "connection_settings": flatten_connection_settings(&o.connection_settings),
            "attribute_map": flatten_attribute_map(&o.attribute_map),
            "non_persistent_attrs": o.non_persistent_attrs,
            "set_user_root_attributes": user_root(&o.set_user_root_attributes),
            "upstream_params": map_to_json_string(o.upstream_params.as_ref()),
        }),
        ConnectionOptions::Ad(o) => json!({
            "tenant_domain": o.tenant_domain,
            "domain_aliases": o.domain_aliases,
            "icon_url": o.icon_url,
            "ips": o.ips,
            "use_cert_auth": o.use_cert_auth,
            "use_kerberos": o.use_kerberos,
            "disable_cache": o.disable_cache,
            "brute_force_protection": o.brute_force_protection,
            "non_persistent_attrs": o.non_persistent_attrs,
            "set_user_root_attributes": user_root(&o.set_user_root_attributes),
        }),
        ConnectionOptions::AzureAd(o) => json!({
            "client_id": o.client_id,
            "client_secret": o.client_secret,
            "app_id": o.app_id,
            "tenant_domain": o.tenant_domain,
            "domain": o.domain,
            "domain_aliases": o.domain_aliases,
            "icon_url": o.icon_url,
            "identity_api": o.identity_api,
            "waad_protocol": o.waad_protocol,
            "use_wsfed": o.use_wsfed,
            "use_common_endpoint": o.use_common_endpoint,
            "max_groups_to_retrieve": o.max_groups_to_retrieve,
            "api_enable_users": o.api_enable_users,
            "should_trust_email_verified_connection": o.should_trust_email_verified_connection,
            "scopes": o.scopes.enabled(),
            "non_persistent_attrs": o.non_persistent_attrs,
            "set_user_root_attributes": user_root(&o.set_user_root_attributes),
            "upstream_params": map_to_json_string(o.upstream_params.as_ref()),
        }),
        ConnectionOptions::Adfs(o) => json!({
            "adfs_server": o.adfs_server,
            "fed_metadata_xml": preserve(previous, "fed_metadata_xml", json!(o.fed_metadata_xml)),
            "tenant_domain": o.tenant_domain,
            "domain_aliases": o.domain_aliases,
            "icon_url": o.icon_url,
            "entity_id": o.entity_id,
            "sign_in_endpoint": o.sign_in_endpoint,
            "should_trust_email_verified_connection": o.should_trust_email_verified_connection,
            "non_persistent_attrs": o.non_persistent_attrs,
            "set_user_root_attributes": user_root(&o.set_user_root_attributes),
            "upstream_params": map_to_json_string(o.upstream_params.as_ref()),
        }),
        ConnectionOptions::Saml(o) => json!({
            "signing_cert": o.signing_cert,
            "signature_algorithm": o.signature_algorithm,
            "digest_algorithm": o.digest_algorithm,
            "sign_in_endpoint": o.sign_in_endpoint,
            "sign_out_endpoint": o.sign_out_endpoint,
            "disable_sign_out": o.disable_sign_out,
            "debug": o.debug,
            "sign_saml_request": o.sign_saml_request,
            "protocol_binding": o.protocol_binding,
            "request_template": o.request_template,
            "user_id_attribute": o.user_id_attribute,
            "tenant_domain": o.tenant_domain,
            "domain_aliases": o.domain_aliases,
            "icon_url": o.icon_url,
            "entity_id": o.entity_id,
            "metadata_xml": preserve(previous, "metadata_xml", json!(o.metadata_xml)),
            "metadata_url": o.metadata_url,
            "fields_map": map_to_json_string(o.fields_map.as_ref()),
            "idp_initiated": flatten_idp_initiated(&o.idp_initiated),
            "global_token_revocation_jwt_iss": o.global_token_revocation_jwt_iss,
            "global_token_revocation_jwt_sub": o.global_token_revocation_jwt_sub,
            "non_persistent_attrs": o.non_persistent_attrs,
            "set_user_root_attributes": user_root(&o.set_user_root_attributes),
            "upstream_params": map_to_json_string(o.upstream_params.as_ref()),
        }),
        ConnectionOptions::PingFederate(o) => json!({
            "ping_federate_base_url": o.ping_federate_base_url,
            "signing_cert": o.signing_cert,
            "sign_saml_request": o.sign_saml_request,
            "signature_algorithm": o.signature_algorithm,
            "digest_algorithm": o.digest_algorithm,
            "tenant_domain": o.tenant_domain,
            "domain_aliases": o.domain_aliases,
            "icon_url": o.icon_url,
            "idp_initiated": flatten_idp_initiated(&o.idp_initiated),
            "non_persistent_attrs": o.non_persistent_attrs,
            "set_user_root_attributes": user_root(&o.set_user_root_attributes),
            "upstream_params": map_to_json_string(o.upstream_params.as_ref()),
        }),
    };

    (value, diags)
}

/// `on_each_login` for strategies whose API default is an empty string
pub fn user_root_attributes(strategy: Strategy, value: &Option<String>) -> Option<String> {
    match value.as_deref() {
        None | Some("") if strategy.defaults_user_root_attributes() => {
            Some(DEFAULT_USER_ROOT_ATTRIBUTES.to_string())
        }
        _ => value.clone(),
    }
}

/// Value already in state, or the reported one when state has none
fn preserve(previous: &AttrMap, key: &str, reported: Value) -> Value {
    match previous.raw(key) {
        Some(value) => value.clone(),
        None => reported,
    }
}

fn flatten_database(o: &DatabaseOptions, previous: &AttrMap) -> Value {
    json!({
        "validation": o.validation.as_ref().map(|v| json!({
            "username": v.username.as_ref().map(|u| json!({ "min": u.min, "max": u.max })),
        })),
        "password_policy": o.password_policy,
        "password_history": o.password_history.as_ref().map(|h| json!({
            "enable": h.enable,
            "size": h.size,
        })),
        "password_no_personal_info": o.password_no_personal_info.as_ref().map(|p| json!({
            "enable": p.enable,
        })),
        "password_dictionary": o.password_dictionary.as_ref().map(|p| json!({
            "enable": p.enable,
            "dictionary": p.dictionary,
        })),
        "password_complexity_options": o.password_complexity_options.as_ref().map(|p| json!({
            "min_length": p.min_length,
        })),
        "enabled_database_customization": o.enabled_database_customization,
        "brute_force_protection": o.brute_force_protection,
        "import_mode": o.import_mode,
        "disable_signup": o.disable_signup,
        "disable_self_service_change_password": o.disable_self_service_change_password,
        "requires_username": o.requires_username,
        "custom_scripts": o.custom_scripts,
        "configuration": preserve(previous, "configuration", json!(o.configuration)),
        "mfa": o.mfa.as_ref().map(|m| json!({
            "active": m.active,
            "return_enroll_settings": m.return_enroll_settings,
        })),
        "precedence": o.precedence,
        "non_persistent_attrs": o.non_persistent_attrs,
        "set_user_root_attributes": o.set_user_root_attributes,
        "upstream_params": map_to_json_string(o.upstream_params.as_ref()),
    })
}

fn flatten_email(o: &EmailOptions) -> (Value, Diagnostics) {
    let mut diags = Diagnostics::new();

    let auth_params = match &o.auth_params {
        None | Some(Value::Null) => Value::Null,
        Some(Value::Object(map)) => Value::Object(map.clone()),
        Some(other) => {
            diags.push(
                Diagnostic::warning("Unable to cast auth_params to map")
                    .with_detail(format!(
                        "The API returned auth_params of an unexpected shape ({}); the field is left unset.",
                        json_type_name(other)
                    ))
                    .with_attribute("options.auth_params"),
            );
            Value::Null
        }
    };

    let email = o.email.clone().unwrap_or_default();
    let value = json!({
        "name": o.name,
        "from": email.from,
        "subject": email.subject,
        "syntax": email.syntax,
        "template": email.body,
        "totp": flatten_totp(&o.totp),
        "disable_signup": o.disable_signup,
        "brute_force_protection": o.brute_force_protection,
        "set_user_root_attributes": o.set_user_root_attributes,
        "non_persistent_attrs": o.non_persistent_attrs,
        "auth_params": auth_params,
    });
    (value, diags)
}

fn flatten_totp(totp: &Option<Totp>) -> Value {
    match totp {
        Some(t) => json!({ "time_step": t.time_step, "length": t.length }),
        None => Value::Null,
    }
}

fn flatten_connection_settings(settings: &Option<OidcConnectionSettings>) -> Value {
    match settings {
        Some(s) => json!({ "pkce": s.pkce }),
        None => Value::Null,
    }
}

fn flatten_attribute_map(map: &Option<OidcAttributeMap>) -> Value {
    match map {
        Some(m) => {
            let attributes = m
                .attributes
                .as_ref()
                .and_then(|a| serde_json::to_string(a).ok());
            json!({
                "mapping_mode": m.mapping_mode,
                "userinfo_scope": m.userinfo_scope,
                "attributes": attributes,
            })
        }
        None => Value::Null,
    }
}

fn flatten_idp_initiated(idp: &Option<IdpInitiated>) -> Value {
    match idp {
        Some(i) => json!({
            "client_id": i.client_id,
            "client_protocol": i.client_protocol,
            "client_authorize_query": i.client_authorize_query,
        }),
        None => Value::Null,
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
