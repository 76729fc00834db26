//! Field declarations of `auth0_connection`

use crate::schema::{
    Field, Schema, Validator, MAPPING_MODES, OIDC_CLIENT_TYPES, PKCE_VALUES,
    USER_ROOT_ATTRIBUTE_MODES,
};

pub fn connection_schema() -> Schema {
    Schema::new()
        .field(
            "name",
            Field::string()
                .required()
                .force_new()
                .validate(Validator::NonEmpty)
                .describe("Name of the connection."),
        )
        .field("display_name", Field::string().describe("Name used in login screens."))
        .field(
            "strategy",
            Field::string()
                .required()
                .force_new()
                .validate(Validator::strategies())
                .describe("Type of the connection, which indicates the identity provider."),
        )
        .field("is_domain_connection", Field::bool().optional_computed())
        .field("show_as_button", Field::bool().optional_computed().describe(
            "Display a button for the connection in the login page. Enterprise strategies only.",
        ))
        .field("metadata", Field::map())
        .field("realms", Field::list().optional_computed())
        .field("options", Field::block(options_schema()).optional_computed())
}

/// Read-only variant used by the data source
pub fn connection_data_source_schema() -> Schema {
    let mut schema = Schema::new();
    for (name, field) in connection_schema().fields {
        schema.fields.insert(name, field.computed());
    }
    schema
        .field("connection_id", Field::string().optional_computed())
        .field("name", Field::string().optional_computed())
        .field("enabled_clients", Field::set().computed())
        .exactly_one_of(&["connection_id", "name"])
}

fn options_schema() -> Schema {
    Schema::new()
        // Shared
        .field("client_id", Field::string())
        .field("client_secret", Field::string().sensitive())
        .field("scopes", Field::set().optional_computed())
        .field(
            "set_user_root_attributes",
            Field::string()
                .optional_computed()
                .validate(Validator::one_of(USER_ROOT_ATTRIBUTE_MODES)),
        )
        .field("non_persistent_attrs", Field::set().optional_computed())
        .field("upstream_params", Field::string().validate(Validator::JsonString))
        .field("icon_url", Field::string().validate(Validator::Url))
        .field("domain_aliases", Field::set())
        .field("tenant_domain", Field::string())
        .field("allowed_audiences", Field::set())
        .field("domain", Field::string())
        .field("brute_force_protection", Field::bool().optional_computed())
        .field("disable_signup", Field::bool().optional_computed())
        .field("strategy_version", Field::int().optional_computed())
        // Database
        .field("validation", Field::block(Schema::new().field(
            "username",
            Field::block(Schema::new().field("min", Field::int()).field("max", Field::int())),
        )))
        .field("password_policy", Field::string().optional_computed())
        .field("password_history", Field::block(
            Schema::new().field("enable", Field::bool()).field("size", Field::int()),
        ))
        .field("password_no_personal_info", Field::block(Schema::new().field("enable", Field::bool())))
        .field("password_dictionary", Field::block(
            Schema::new().field("enable", Field::bool()).field("dictionary", Field::set()),
        ))
        .field("password_complexity_options", Field::block(
            Schema::new().field("min_length", Field::int()),
        ))
        .field("enabled_database_customization", Field::bool())
        .field("import_mode", Field::bool())
        .field("disable_self_service_change_password", Field::bool())
        .field("requires_username", Field::bool())
        .field("custom_scripts", Field::map())
        .field("configuration", Field::map().sensitive())
        .field("mfa", Field::block(
            Schema::new()
                .field("active", Field::bool())
                .field("return_enroll_settings", Field::bool()),
        ))
        .field("precedence", Field::list())
        // Google Apps / Azure AD
        .field("api_enable_users", Field::bool())
        .field("map_user_id_to_id", Field::bool())
        .field("handle_login_from_social", Field::bool())
        .field("app_id", Field::string())
        .field("identity_api", Field::string())
        .field("waad_protocol", Field::string())
        .field("use_wsfed", Field::bool())
        .field("use_common_endpoint", Field::bool())
        .field("max_groups_to_retrieve", Field::string())
        .field("should_trust_email_verified_connection", Field::string())
        // OAuth2 family
        .field("authorization_endpoint", Field::string().validate(Validator::Url))
        .field("token_endpoint", Field::string().validate(Validator::Url))
        .field("scripts", Field::map())
        .field("pkce_enabled", Field::bool())
        // Apple / Salesforce
        .field("team_id", Field::string())
        .field("key_id", Field::string())
        .field("community_base_url", Field::string().validate(Validator::Url))
        // Passwordless
        .field("name", Field::string())
        .field("from", Field::string())
        .field("subject", Field::string())
        .field("syntax", Field::string())
        .field("template", Field::string())
        .field("totp", Field::block(
            Schema::new().field("time_step", Field::int()).field("length", Field::int()),
        ))
        .field("messaging_service_sid", Field::string())
        .field("twilio_sid", Field::string())
        .field("twilio_token", Field::string().sensitive())
        .field("provider", Field::string())
        .field("gateway_url", Field::string().validate(Validator::Url))
        .field("forward_request_info", Field::bool())
        .field("auth_params", Field::map())
        // OIDC / Okta
        .field("discovery_url", Field::string().validate(Validator::Url))
        .field("issuer", Field::string())
        .field("jwks_uri", Field::string().validate(Validator::Url))
        .field("userinfo_endpoint", Field::string().validate(Validator::Url))
        .field("type", Field::string().validate(Validator::one_of(OIDC_CLIENT_TYPES)))
        .field("connection_settings", Field::block(
            Schema::new().field("pkce", Field::string().validate(Validator::one_of(PKCE_VALUES))),
        ))
        .field("attribute_map", Field::block(
            Schema::new()
                .field(
                    "mapping_mode",
                    Field::string().required().validate(Validator::one_of(MAPPING_MODES)),
                )
                .field("userinfo_scope", Field::string())
                .field("attributes", Field::string().validate(Validator::JsonString)),
        ))
        // AD
        .field("ips", Field::set())
        .field("use_cert_auth", Field::bool())
        .field("use_kerberos", Field::bool())
        .field("disable_cache", Field::bool())
        // ADFS / SAML / PingFederate
        .field("adfs_server", Field::string())
        .field("fed_metadata_xml", Field::string().sensitive())
        .field("entity_id", Field::string())
        .field("sign_in_endpoint", Field::string().validate(Validator::Url))
        .field("sign_out_endpoint", Field::string())
        .field("signing_cert", Field::string())
        .field("signature_algorithm", Field::string())
        .field("digest_algorithm", Field::string())
        .field("disable_sign_out", Field::bool())
        .field("debug", Field::bool())
        .field("sign_saml_request", Field::bool())
        .field("protocol_binding", Field::string())
        .field("request_template", Field::string())
        .field("user_id_attribute", Field::string())
        .field("metadata_xml", Field::string().sensitive())
        .field("metadata_url", Field::string())
        .field("fields_map", Field::string().validate(Validator::JsonString))
        .field("idp_initiated", Field::block(
            Schema::new()
                .field("client_id", Field::string())
                .field("client_protocol", Field::string())
                .field("client_authorize_query", Field::string()),
        ))
        .field("global_token_revocation_jwt_iss", Field::string())
        .field("global_token_revocation_jwt_sub", Field::string())
        .field("ping_federate_base_url", Field::string().validate(Validator::Url))
}
