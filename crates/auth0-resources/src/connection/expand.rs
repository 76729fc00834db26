//! Declared configuration → connection request

use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

use auth0_core::{
    join_scope_string, AdOptions, AdfsOptions, AppleOptions, AzureAdOptions, Connection,
    ConnectionOptions, DatabaseOptions, DatabaseValidation, EmailOptions, EmailTemplate,
    FacebookOptions, GitHubOptions, GoogleAppsOptions, GoogleOAuth2Options, IdpInitiated,
    LinkedInOptions, ManagementApi, Mfa, OAuth2Options, OidcAttributeMap, OidcConnectionSettings,
    OidcOptions, OktaOptions, OptionsKind, PasswordComplexityOptions, PasswordDictionary,
    PasswordHistory, PasswordNoPersonalInfo, PingFederateOptions, Result, SalesforceOptions,
    SamlOptions, ScopeChanges, ScopeFlags, SmsOptions, Strategy, Totp, UsernameValidation,
    WindowsLiveOptions,
};

use crate::data::{AttrMap, AttrReader, Block, ResourceData};
use crate::diag::{DiagResult, Diagnostic, Diagnostics};

/// Build the create or update request for a connection.
///
/// `name` and `strategy` are only sent on create. For database connections
/// being updated, the stored `configuration` keys are compared with the
/// declared ones first.
pub async fn expand_connection(d: &ResourceData, api: &dyn ManagementApi) -> DiagResult<Connection> {
    let strategy: Strategy = d
        .string("strategy")
        .unwrap_or_default()
        .parse()?;

    let mut connection = Connection {
        display_name: d.string("display_name"),
        is_domain_connection: d.bool("is_domain_connection"),
        metadata: d.string_map("metadata"),
        realms: d.string_list("realms"),
        ..Default::default()
    };

    if d.is_new_resource() {
        connection.name = d.string("name");
        connection.strategy = Some(strategy);
    }

    if strategy.shows_button() {
        connection.show_as_button = d.bool("show_as_button");
    }

    let empty = AttrMap::new();
    let o = d.block("options").unwrap_or(Block(&empty));
    let previous_scopes = previous_scopes(d);

    let options = match strategy.options_kind() {
        OptionsKind::Database => {
            let options = expand_database(&o)?;
            if !d.is_new_resource() {
                let id = d.require_id()?;
                let remote = api.read_connection(id).await?;
                let declared = options.configuration.clone().unwrap_or_default();
                let remote_configuration = remote
                    .options
                    .as_ref()
                    .and_then(ConnectionOptions::configuration)
                    .cloned()
                    .unwrap_or_default();
                check_unmanaged_configuration(&declared, &remote_configuration).into_result()?;
            }
            ConnectionOptions::Database(options)
        }
        OptionsKind::GoogleOAuth2 => ConnectionOptions::GoogleOAuth2(GoogleOAuth2Options {
            client_id: o.string("client_id"),
            client_secret: o.string("client_secret"),
            allowed_audiences: o.string_list("allowed_audiences"),
            non_persistent_attrs: o.string_list("non_persistent_attrs"),
            set_user_root_attributes: o.string("set_user_root_attributes"),
            upstream_params: o.json_map("upstream_params")?,
            scopes: expand_scope_flags(&o, &previous_scopes),
        }),
        OptionsKind::GoogleApps => ConnectionOptions::GoogleApps(GoogleAppsOptions {
            client_id: o.string("client_id"),
            client_secret: o.string("client_secret"),
            domain: o.string("domain"),
            tenant_domain: o.string("tenant_domain"),
            domain_aliases: o.string_list("domain_aliases"),
            icon_url: o.string("icon_url"),
            api_enable_users: o.bool("api_enable_users"),
            map_user_id_to_id: o.bool("map_user_id_to_id"),
            handle_login_from_social: o.bool("handle_login_from_social"),
            non_persistent_attrs: o.string_list("non_persistent_attrs"),
            set_user_root_attributes: o.string("set_user_root_attributes"),
            upstream_params: o.json_map("upstream_params")?,
            scopes: expand_scope_flags(&o, &previous_scopes),
        }),
        OptionsKind::OAuth2 => ConnectionOptions::OAuth2(OAuth2Options {
            client_id: o.string("client_id"),
            client_secret: o.string("client_secret"),
            authorization_endpoint: o.string("authorization_endpoint"),
            token_endpoint: o.string("token_endpoint"),
            scope: expand_scope_string(&o),
            scripts: o.string_map("scripts"),
            icon_url: o.string("icon_url"),
            pkce_enabled: o.bool("pkce_enabled"),
            non_persistent_attrs: o.string_list("non_persistent_attrs"),
            set_user_root_attributes: o.string("set_user_root_attributes"),
            upstream_params: o.json_map("upstream_params")?,
        }),
        OptionsKind::Facebook => ConnectionOptions::Facebook(FacebookOptions {
            client_id: o.string("client_id"),
            client_secret: o.string("client_secret"),
            non_persistent_attrs: o.string_list("non_persistent_attrs"),
            set_user_root_attributes: o.string("set_user_root_attributes"),
            upstream_params: o.json_map("upstream_params")?,
            scopes: expand_scope_flags(&o, &previous_scopes),
        }),
        OptionsKind::Apple => ConnectionOptions::Apple(AppleOptions {
            client_id: o.string("client_id"),
            client_secret: o.string("client_secret"),
            team_id: o.string("team_id"),
            key_id: o.string("key_id"),
            non_persistent_attrs: o.string_list("non_persistent_attrs"),
            set_user_root_attributes: o.string("set_user_root_attributes"),
            upstream_params: o.json_map("upstream_params")?,
            scopes: expand_scope_flags(&o, &previous_scopes),
        }),
        OptionsKind::LinkedIn => ConnectionOptions::LinkedIn(LinkedInOptions {
            client_id: o.string("client_id"),
            client_secret: o.string("client_secret"),
            strategy_version: o.int("strategy_version"),
            non_persistent_attrs: o.string_list("non_persistent_attrs"),
            set_user_root_attributes: o.string("set_user_root_attributes"),
            upstream_params: o.json_map("upstream_params")?,
            scopes: expand_scope_flags(&o, &previous_scopes),
        }),
        OptionsKind::GitHub => ConnectionOptions::GitHub(GitHubOptions {
            client_id: o.string("client_id"),
            client_secret: o.string("client_secret"),
            non_persistent_attrs: o.string_list("non_persistent_attrs"),
            set_user_root_attributes: o.string("set_user_root_attributes"),
            upstream_params: o.json_map("upstream_params")?,
            scopes: expand_scope_flags(&o, &previous_scopes),
        }),
        OptionsKind::WindowsLive => ConnectionOptions::WindowsLive(WindowsLiveOptions {
            client_id: o.string("client_id"),
            client_secret: o.string("client_secret"),
            strategy_version: o.int("strategy_version"),
            non_persistent_attrs: o.string_list("non_persistent_attrs"),
            set_user_root_attributes: o.string("set_user_root_attributes"),
            upstream_params: o.json_map("upstream_params")?,
            scopes: expand_scope_flags(&o, &previous_scopes),
        }),
        OptionsKind::Salesforce => ConnectionOptions::Salesforce(SalesforceOptions {
            client_id: o.string("client_id"),
            client_secret: o.string("client_secret"),
            community_base_url: o.string("community_base_url"),
            non_persistent_attrs: o.string_list("non_persistent_attrs"),
            set_user_root_attributes: o.string("set_user_root_attributes"),
            upstream_params: o.json_map("upstream_params")?,
            scopes: expand_scope_flags(&o, &previous_scopes),
        }),
        OptionsKind::Sms => ConnectionOptions::Sms(SmsOptions {
            name: o.string("name"),
            from: o.string("from"),
            syntax: o.string("syntax"),
            template: o.string("template"),
            totp: expand_totp(&o),
            messaging_service_sid: o.string("messaging_service_sid"),
            twilio_sid: o.string("twilio_sid"),
            twilio_token: o.string("twilio_token"),
            provider: o.string("provider"),
            gateway_url: o.string("gateway_url"),
            forward_request_info: o.bool("forward_request_info"),
            disable_signup: o.bool("disable_signup"),
            brute_force_protection: o.bool("brute_force_protection"),
        }),
        OptionsKind::Email => ConnectionOptions::Email(expand_email(&o)),
        OptionsKind::Oidc => ConnectionOptions::Oidc(OidcOptions {
            client_id: o.string("client_id"),
            client_secret: o.string("client_secret"),
            discovery_url: o.string("discovery_url"),
            issuer: o.string("issuer"),
            jwks_uri: o.string("jwks_uri"),
            authorization_endpoint: o.string("authorization_endpoint"),
            token_endpoint: o.string("token_endpoint"),
            userinfo_endpoint: o.string("userinfo_endpoint"),
            client_type: o.string("type"),
            scope: expand_scope_string(&o),
            domain_aliases: o.string_list("domain_aliases"),
            icon_url: o.string("icon_url"),
            tenant_domain: o.string("tenant_domain"),
            connection_settings: expand_connection_settings(&o),
            attribute_map: expand_attribute_map(&o)?,
            non_persistent_attrs: o.string_list("non_persistent_attrs"),
            set_user_root_attributes: o.string("set_user_root_attributes"),
            upstream_params: o.json_map("upstream_params")?,
        }),
        OptionsKind::Okta => ConnectionOptions::Okta(OktaOptions {
            client_id: o.string("client_id"),
            client_secret: o.string("client_secret"),
            domain: o.string("domain"),
            issuer: o.string("issuer"),
            jwks_uri: o.string("jwks_uri"),
            authorization_endpoint: o.string("authorization_endpoint"),
            token_endpoint: o.string("token_endpoint"),
            userinfo_endpoint: o.string("userinfo_endpoint"),
            scope: expand_scope_string(&o),
            domain_aliases: o.string_list("domain_aliases"),
            icon_url: o.string("icon_url"),
            connection_settings: expand_connection_settings(&o),
            attribute_map: expand_attribute_map(&o)?,
            non_persistent_attrs: o.string_list("non_persistent_attrs"),
            set_user_root_attributes: o.string("set_user_root_attributes"),
            upstream_params: o.json_map("upstream_params")?,
        }),
        OptionsKind::Ad => ConnectionOptions::Ad(AdOptions {
            tenant_domain: o.string("tenant_domain"),
            domain_aliases: o.string_list("domain_aliases"),
            icon_url: o.string("icon_url"),
            ips: o.string_list("ips"),
            use_cert_auth: o.bool("use_cert_auth"),
            use_kerberos: o.bool("use_kerberos"),
            disable_cache: o.bool("disable_cache"),
            brute_force_protection: o.bool("brute_force_protection"),
            non_persistent_attrs: o.string_list("non_persistent_attrs"),
            set_user_root_attributes: o.string("set_user_root_attributes"),
        }),
        OptionsKind::AzureAd => ConnectionOptions::AzureAd(AzureAdOptions {
            client_id: o.string("client_id"),
            client_secret: o.string("client_secret"),
            app_id: o.string("app_id"),
            tenant_domain: o.string("tenant_domain"),
            domain: o.string("domain"),
            domain_aliases: o.string_list("domain_aliases"),
            icon_url: o.string("icon_url"),
            identity_api: o.string("identity_api"),
            waad_protocol: o.string("waad_protocol"),
            use_wsfed: o.bool("use_wsfed"),
            use_common_endpoint: o.bool("use_common_endpoint"),
            max_groups_to_retrieve: o.string("max_groups_to_retrieve"),
            api_enable_users: o.bool("api_enable_users"),
            should_trust_email_verified_connection: o.string("should_trust_email_verified_connection"),
            non_persistent_attrs: o.string_list("non_persistent_attrs"),
            set_user_root_attributes: o.string("set_user_root_attributes"),
            upstream_params: o.json_map("upstream_params")?,
            scopes: expand_scope_flags(&o, &previous_scopes),
        }),
        OptionsKind::Adfs => ConnectionOptions::Adfs(AdfsOptions {
            adfs_server: o.string("adfs_server"),
            fed_metadata_xml: o.string("fed_metadata_xml"),
            tenant_domain: o.string("tenant_domain"),
            domain_aliases: o.string_list("domain_aliases"),
            icon_url: o.string("icon_url"),
            entity_id: o.string("entity_id"),
            sign_in_endpoint: o.string("sign_in_endpoint"),
            should_trust_email_verified_connection: o.string("should_trust_email_verified_connection"),
            non_persistent_attrs: o.string_list("non_persistent_attrs"),
            set_user_root_attributes: o.string("set_user_root_attributes"),
            upstream_params: o.json_map("upstream_params")?,
        }),
        OptionsKind::Saml => ConnectionOptions::Saml(SamlOptions {
            signing_cert: o.string("signing_cert"),
            signature_algorithm: o.string("signature_algorithm"),
            digest_algorithm: o.string("digest_algorithm"),
            sign_in_endpoint: o.string("sign_in_endpoint"),
            sign_out_endpoint: o.string("sign_out_endpoint"),
            disable_sign_out: o.bool("disable_sign_out"),
            debug: o.bool("debug"),
            sign_saml_request: o.bool("sign_saml_request"),
            protocol_binding: o.string("protocol_binding"),
            request_template: o.string("request_template"),
            user_id_attribute: o.string("user_id_attribute"),
            tenant_domain: o.string("tenant_domain"),
            domain_aliases: o.string_list("domain_aliases"),
            icon_url: o.string("icon_url"),
            entity_id: o.string("entity_id"),
            metadata_xml: o.string("metadata_xml"),
            metadata_url: o.string("metadata_url"),
            fields_map: o.json_map("fields_map")?,
            idp_initiated: expand_idp_initiated(&o),
            global_token_revocation_jwt_iss: o.string("global_token_revocation_jwt_iss"),
            global_token_revocation_jwt_sub: o.string("global_token_revocation_jwt_sub"),
            non_persistent_attrs: o.string_list("non_persistent_attrs"),
            set_user_root_attributes: o.string("set_user_root_attributes"),
            upstream_params: o.json_map("upstream_params")?,
        }),
        OptionsKind::PingFederate => ConnectionOptions::PingFederate(PingFederateOptions {
            ping_federate_base_url: o.string("ping_federate_base_url"),
            signing_cert: o.string("signing_cert"),
            sign_saml_request: o.bool("sign_saml_request"),
            signature_algorithm: o.string("signature_algorithm"),
            digest_algorithm: o.string("digest_algorithm"),
            tenant_domain: o.string("tenant_domain"),
            domain_aliases: o.string_list("domain_aliases"),
            icon_url: o.string("icon_url"),
            idp_initiated: expand_idp_initiated(&o),
            non_persistent_attrs: o.string_list("non_persistent_attrs"),
            set_user_root_attributes: o.string("set_user_root_attributes"),
            upstream_params: o.json_map("upstream_params")?,
        }),
    };

    debug!("Expanded {:?} options for strategy {}", options.kind(), strategy);
    connection.options = Some(options);
    Ok(connection)
}

/// One error per configuration key stored remotely but not declared.
///
/// Sending the declared map as-is would delete those keys.
pub fn check_unmanaged_configuration(
    declared: &BTreeMap<String, String>,
    remote: &BTreeMap<String, String>,
) -> Diagnostics {
    let mut diags = Diagnostics::new();
    for key in remote.keys().filter(|k| !declared.contains_key(*k)) {
        diags.push(
            Diagnostic::error("Unmanaged Configuration Secret")
                .with_detail(format!(
                    "Detected a configuration secret not managed through this provider: {:?}. \
                     If you proceed, this configuration secret will get deleted. Add it to the \
                     connection's options.configuration to prevent its removal.",
                    key
                ))
                .with_attribute("options.configuration"),
        );
    }
    diags
}

/// Scope set declared by the previous apply
fn previous_scopes(d: &ResourceData) -> BTreeSet<String> {
    d.prior()
        .block("options")
        .and_then(|o| o.string_set("scopes"))
        .unwrap_or_default()
}

/// Declared scopes as the baseline, with toggles relative to the previous set on top
fn expand_scope_flags(o: &Block<'_>, previous: &BTreeSet<String>) -> ScopeFlags {
    let declared = o.string_set("scopes").unwrap_or_default();
    let mut flags = ScopeFlags::from_enabled(declared.iter().cloned());
    flags.apply(&ScopeChanges::between(previous, &declared));
    flags
}

fn expand_scope_string(o: &Block<'_>) -> Option<String> {
    o.string_set("scopes").map(|scopes| join_scope_string(&scopes))
}

fn expand_database(o: &Block<'_>) -> Result<DatabaseOptions> {
    Ok(DatabaseOptions {
        validation: o.block("validation").map(|v| DatabaseValidation {
            username: v.block("username").map(|u| UsernameValidation {
                min: u.int("min"),
                max: u.int("max"),
            }),
        }),
        password_policy: o.string("password_policy"),
        password_history: o.block("password_history").map(|b| PasswordHistory {
            enable: b.bool("enable"),
            size: b.int("size"),
        }),
        password_no_personal_info: o
            .block("password_no_personal_info")
            .map(|b| PasswordNoPersonalInfo { enable: b.bool("enable") }),
        password_dictionary: o.block("password_dictionary").map(|b| PasswordDictionary {
            enable: b.bool("enable"),
            dictionary: b.string_list("dictionary"),
        }),
        password_complexity_options: o
            .block("password_complexity_options")
            .map(|b| PasswordComplexityOptions { min_length: b.int("min_length") }),
        enabled_database_customization: o.bool("enabled_database_customization"),
        brute_force_protection: o.bool("brute_force_protection"),
        import_mode: o.bool("import_mode"),
        disable_signup: o.bool("disable_signup"),
        disable_self_service_change_password: o.bool("disable_self_service_change_password"),
        requires_username: o.bool("requires_username"),
        custom_scripts: o.string_map("custom_scripts"),
        configuration: o.string_map("configuration"),
        mfa: o.block("mfa").map(|b| Mfa {
            active: b.bool("active"),
            return_enroll_settings: b.bool("return_enroll_settings"),
        }),
        precedence: o.string_list("precedence"),
        non_persistent_attrs: o.string_list("non_persistent_attrs"),
        set_user_root_attributes: o.string("set_user_root_attributes"),
        upstream_params: o.json_map("upstream_params")?,
    })
}

fn expand_email(o: &Block<'_>) -> EmailOptions {
    let template = EmailTemplate {
        from: o.string("from"),
        subject: o.string("subject"),
        syntax: o.string("syntax"),
        body: o.string("template"),
    };
    EmailOptions {
        name: o.string("name"),
        email: (template != EmailTemplate::default()).then_some(template),
        totp: expand_totp(o),
        disable_signup: o.bool("disable_signup"),
        brute_force_protection: o.bool("brute_force_protection"),
        set_user_root_attributes: o.string("set_user_root_attributes"),
        non_persistent_attrs: o.string_list("non_persistent_attrs"),
        auth_params: o.raw("auth_params").cloned(),
    }
}

fn expand_totp(o: &Block<'_>) -> Option<Totp> {
    o.block("totp").map(|b| Totp {
        time_step: b.int("time_step"),
        length: b.int("length"),
    })
}

fn expand_connection_settings(o: &Block<'_>) -> Option<OidcConnectionSettings> {
    o.block("connection_settings")
        .map(|b| OidcConnectionSettings { pkce: b.string("pkce") })
}

fn expand_attribute_map(o: &Block<'_>) -> Result<Option<OidcAttributeMap>> {
    let Some(b) = o.block("attribute_map") else {
        return Ok(None);
    };
    let attributes = b
        .json_map("attributes")?
        .and_then(|v| v.as_object().cloned())
        .map(|m| m.into_iter().collect());
    Ok(Some(OidcAttributeMap {
        mapping_mode: b.string("mapping_mode"),
        userinfo_scope: b.string("userinfo_scope"),
        attributes,
    }))
}

fn expand_idp_initiated(o: &Block<'_>) -> Option<IdpInitiated> {
    o.block("idp_initiated").map(|b| IdpInitiated {
        client_id: b.string("client_id"),
        client_protocol: b.string("client_protocol"),
        client_authorize_query: b.string("client_authorize_query"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_unmanaged_configuration_names_each_extra_key() {
        let declared = map(&[("foo", "bar")]);
        let remote = map(&[("foo", "bar"), ("anotherFoo", "anotherBar")]);

        let diags = check_unmanaged_configuration(&declared, &remote);
        assert_eq!(diags.len(), 1);
        let diag = diags.iter().next().unwrap();
        assert!(diag.is_error());
        assert!(diag.detail.as_deref().unwrap().contains("\"anotherFoo\""));
        assert_eq!(diag.attribute.as_deref(), Some("options.configuration"));
    }

    #[test]
    fn test_no_unmanaged_configuration_when_declared_covers_remote() {
        let declared = map(&[("foo", "bar"), ("extra", "x")]);
        let remote = map(&[("foo", "encrypted")]);
        assert!(check_unmanaged_configuration(&declared, &remote).is_empty());
        assert!(check_unmanaged_configuration(&BTreeMap::new(), &BTreeMap::new()).is_empty());
    }
}
