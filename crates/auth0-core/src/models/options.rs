//! Strategy-specific connection options
//!
//! The Management API returns `options` as an untyped object whose shape is
//! selected by the connection's strategy. Each shape is a flat record of
//! optional fields; [`ConnectionOptions`] is the closed set of shapes.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

use crate::error::Result;
use crate::strategy::{OptionsKind, Strategy};

/// Macro to declare an options record where every field is optional and
/// omitted from request bodies when unset.
macro_rules! options_struct {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($(#[$fmeta:meta])* $field:ident : $ty:ty),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
        pub struct $name {
            $(
                $(#[$fmeta])*
                #[serde(default, skip_serializing_if = "Option::is_none")]
                pub $field: Option<$ty>,
            )*
        }
    };
    (
        $(#[$meta:meta])*
        $name:ident with scopes {
            $($(#[$fmeta:meta])* $field:ident : $ty:ty),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
        pub struct $name {
            $(
                $(#[$fmeta])*
                #[serde(default, skip_serializing_if = "Option::is_none")]
                pub $field: Option<$ty>,
            )*
            /// Individually toggleable scope flags (`"email": true`, ...)
            #[serde(flatten)]
            pub scopes: ScopeFlags,
        }
    };
}

// =============================================================================
// Scopes
// =============================================================================

/// Scopes the API models as one boolean flag per scope
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeFlags(BTreeMap<String, bool>);

impl ScopeFlags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flags for a declared scope set, all enabled
    pub fn from_enabled<I, S>(scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(scopes.into_iter().map(|s| (s.into(), true)).collect())
    }

    /// Set the flag of each named scope
    pub fn set_scopes<I, S>(&mut self, enable: bool, scopes: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for scope in scopes {
            self.0.insert(scope.into(), enable);
        }
    }

    /// Apply the toggles of a scope diff
    pub fn apply(&mut self, changes: &ScopeChanges) {
        self.set_scopes(true, changes.enable.iter().cloned());
        self.set_scopes(false, changes.disable.iter().cloned());
    }

    /// Scopes whose flag is on
    pub fn enabled(&self) -> BTreeSet<String> {
        self.0
            .iter()
            .filter(|(_, on)| **on)
            .map(|(scope, _)| scope.clone())
            .collect()
    }

    pub fn get(&self, scope: &str) -> Option<bool> {
        self.0.get(scope).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for ScopeFlags {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ScopeFlags {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        // Flattened: receives every field the record did not claim, keep the flags.
        let raw = BTreeMap::<String, Value>::deserialize(deserializer)?;
        Ok(Self(
            raw.into_iter()
                .filter_map(|(k, v)| v.as_bool().map(|on| (k, on)))
                .collect(),
        ))
    }
}

/// Toggles needed to move from one declared scope set to another
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeChanges {
    pub enable: BTreeSet<String>,
    pub disable: BTreeSet<String>,
}

impl ScopeChanges {
    /// `enable = new \ old`, `disable = old \ new`; the intersection is untouched.
    pub fn between(old: &BTreeSet<String>, new: &BTreeSet<String>) -> Self {
        Self {
            enable: new.difference(old).cloned().collect(),
            disable: old.difference(new).cloned().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.enable.is_empty() && self.disable.is_empty()
    }
}

/// Split a space-separated `scope` string into a set
pub fn split_scope_string(scope: &str) -> BTreeSet<String> {
    scope.split_whitespace().map(str::to_string).collect()
}

/// Join a scope set into the space-separated form used by OAuth2/OIDC
pub fn join_scope_string<'a>(scopes: impl IntoIterator<Item = &'a String>) -> String {
    scopes
        .into_iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" ")
}

// =============================================================================
// Shared nested records
// =============================================================================

options_struct! {
    /// Time-based one-time password settings for passwordless connections
    Totp {
        time_step: i64,
        length: i64,
    }
}

options_struct! {
    PasswordHistory {
        enable: bool,
        size: i64,
    }
}

options_struct! {
    PasswordNoPersonalInfo {
        enable: bool,
    }
}

options_struct! {
    PasswordDictionary {
        enable: bool,
        dictionary: Vec<String>,
    }
}

options_struct! {
    PasswordComplexityOptions {
        min_length: i64,
    }
}

options_struct! {
    UsernameValidation {
        min: i64,
        max: i64,
    }
}

options_struct! {
    DatabaseValidation {
        username: UsernameValidation,
    }
}

options_struct! {
    Mfa {
        active: bool,
        return_enroll_settings: bool,
    }
}

options_struct! {
    /// IdP-initiated login settings for SAML-family connections
    IdpInitiated {
        client_id: String,
        client_protocol: String,
        client_authorize_query: String,
    }
}

options_struct! {
    OidcConnectionSettings {
        pkce: String,
    }
}

options_struct! {
    OidcAttributeMap {
        mapping_mode: String,
        userinfo_scope: String,
        attributes: BTreeMap<String, Value>,
    }
}

options_struct! {
    EmailTemplate {
        from: String,
        subject: String,
        syntax: String,
        body: String,
    }
}

// =============================================================================
// Option shapes
// =============================================================================

options_struct! {
    /// Options of `auth0` database connections
    DatabaseOptions {
        validation: DatabaseValidation,
        password_policy: String,
        password_history: PasswordHistory,
        password_no_personal_info: PasswordNoPersonalInfo,
        password_dictionary: PasswordDictionary,
        password_complexity_options: PasswordComplexityOptions,
        enabled_database_customization: bool,
        brute_force_protection: bool,
        import_mode: bool,
        disable_signup: bool,
        disable_self_service_change_password: bool,
        requires_username: bool,
        #[serde(rename = "customScripts")]
        custom_scripts: BTreeMap<String, String>,
        /// Write-only: the API answers with encrypted values, if at all
        configuration: BTreeMap<String, String>,
        mfa: Mfa,
        precedence: Vec<String>,
        non_persistent_attrs: Vec<String>,
        set_user_root_attributes: String,
        upstream_params: Value,
    }
}

options_struct! {
    GoogleOAuth2Options with scopes {
        client_id: String,
        client_secret: String,
        allowed_audiences: Vec<String>,
        non_persistent_attrs: Vec<String>,
        set_user_root_attributes: String,
        upstream_params: Value,
    }
}

options_struct! {
    GoogleAppsOptions with scopes {
        client_id: String,
        client_secret: String,
        domain: String,
        tenant_domain: String,
        domain_aliases: Vec<String>,
        icon_url: String,
        api_enable_users: bool,
        map_user_id_to_id: bool,
        handle_login_from_social: bool,
        non_persistent_attrs: Vec<String>,
        set_user_root_attributes: String,
        upstream_params: Value,
    }
}

options_struct! {
    /// Shared shape of the generic OAuth2 family (Dropbox, Twitter, Custom, ...)
    OAuth2Options {
        client_id: String,
        client_secret: String,
        #[serde(rename = "authorizationURL")]
        authorization_endpoint: String,
        #[serde(rename = "tokenURL")]
        token_endpoint: String,
        scope: String,
        scripts: BTreeMap<String, String>,
        icon_url: String,
        pkce_enabled: bool,
        non_persistent_attrs: Vec<String>,
        set_user_root_attributes: String,
        upstream_params: Value,
    }
}

options_struct! {
    FacebookOptions with scopes {
        client_id: String,
        client_secret: String,
        non_persistent_attrs: Vec<String>,
        set_user_root_attributes: String,
        upstream_params: Value,
    }
}

options_struct! {
    AppleOptions with scopes {
        client_id: String,
        /// Private key used to sign the client assertion
        client_secret: String,
        team_id: String,
        #[serde(rename = "kid")]
        key_id: String,
        non_persistent_attrs: Vec<String>,
        set_user_root_attributes: String,
        upstream_params: Value,
    }
}

options_struct! {
    LinkedInOptions with scopes {
        client_id: String,
        client_secret: String,
        strategy_version: i64,
        non_persistent_attrs: Vec<String>,
        set_user_root_attributes: String,
        upstream_params: Value,
    }
}

options_struct! {
    GitHubOptions with scopes {
        client_id: String,
        client_secret: String,
        non_persistent_attrs: Vec<String>,
        set_user_root_attributes: String,
        upstream_params: Value,
    }
}

options_struct! {
    WindowsLiveOptions with scopes {
        client_id: String,
        client_secret: String,
        strategy_version: i64,
        non_persistent_attrs: Vec<String>,
        set_user_root_attributes: String,
        upstream_params: Value,
    }
}

options_struct! {
    SalesforceOptions with scopes {
        client_id: String,
        client_secret: String,
        community_base_url: String,
        non_persistent_attrs: Vec<String>,
        set_user_root_attributes: String,
        upstream_params: Value,
    }
}

options_struct! {
    SmsOptions {
        name: String,
        from: String,
        syntax: String,
        template: String,
        totp: Totp,
        messaging_service_sid: String,
        twilio_sid: String,
        twilio_token: String,
        provider: String,
        gateway_url: String,
        forward_request_info: bool,
        disable_signup: bool,
        brute_force_protection: bool,
    }
}

options_struct! {
    EmailOptions {
        name: String,
        email: EmailTemplate,
        totp: Totp,
        disable_signup: bool,
        brute_force_protection: bool,
        set_user_root_attributes: String,
        non_persistent_attrs: Vec<String>,
        /// Untyped upstream; expected to be a string map
        #[serde(rename = "authParams")]
        auth_params: Value,
    }
}

options_struct! {
    OidcOptions {
        client_id: String,
        client_secret: String,
        discovery_url: String,
        issuer: String,
        jwks_uri: String,
        authorization_endpoint: String,
        token_endpoint: String,
        userinfo_endpoint: String,
        #[serde(rename = "type")]
        client_type: String,
        scope: String,
        domain_aliases: Vec<String>,
        icon_url: String,
        tenant_domain: String,
        connection_settings: OidcConnectionSettings,
        attribute_map: OidcAttributeMap,
        non_persistent_attrs: Vec<String>,
        set_user_root_attributes: String,
        upstream_params: Value,
    }
}

options_struct! {
    OktaOptions {
        client_id: String,
        client_secret: String,
        domain: String,
        issuer: String,
        jwks_uri: String,
        authorization_endpoint: String,
        token_endpoint: String,
        userinfo_endpoint: String,
        scope: String,
        domain_aliases: Vec<String>,
        icon_url: String,
        connection_settings: OidcConnectionSettings,
        attribute_map: OidcAttributeMap,
        non_persistent_attrs: Vec<String>,
        set_user_root_attributes: String,
        upstream_params: Value,
    }
}

options_struct! {
    AdOptions {
        tenant_domain: String,
        domain_aliases: Vec<String>,
        icon_url: String,
        ips: Vec<String>,
        #[serde(rename = "certAuth")]
        use_cert_auth: bool,
        #[serde(rename = "kerberos")]
        use_kerberos: bool,
        disable_cache: bool,
        brute_force_protection: bool,
        non_persistent_attrs: Vec<String>,
        set_user_root_attributes: String,
    }
}

options_struct! {
    AzureAdOptions with scopes {
        client_id: String,
        client_secret: String,
        app_id: String,
        tenant_domain: String,
        domain: String,
        domain_aliases: Vec<String>,
        icon_url: String,
        identity_api: String,
        waad_protocol: String,
        use_wsfed: bool,
        #[serde(rename = "useCommonEndpoint")]
        use_common_endpoint: bool,
        max_groups_to_retrieve: String,
        api_enable_users: bool,
        should_trust_email_verified_connection: String,
        non_persistent_attrs: Vec<String>,
        set_user_root_attributes: String,
        upstream_params: Value,
    }
}

options_struct! {
    AdfsOptions {
        adfs_server: String,
        /// Write-only federation metadata
        #[serde(rename = "fedMetadataXml")]
        fed_metadata_xml: String,
        tenant_domain: String,
        domain_aliases: Vec<String>,
        icon_url: String,
        entity_id: String,
        #[serde(rename = "signInEndpoint")]
        sign_in_endpoint: String,
        should_trust_email_verified_connection: String,
        non_persistent_attrs: Vec<String>,
        set_user_root_attributes: String,
        upstream_params: Value,
    }
}

options_struct! {
    SamlOptions {
        #[serde(rename = "signingCert")]
        signing_cert: String,
        #[serde(rename = "signatureAlgorithm")]
        signature_algorithm: String,
        #[serde(rename = "digestAlgorithm")]
        digest_algorithm: String,
        #[serde(rename = "signInEndpoint")]
        sign_in_endpoint: String,
        #[serde(rename = "signOutEndpoint")]
        sign_out_endpoint: String,
        #[serde(rename = "disableSignout")]
        disable_sign_out: bool,
        debug: bool,
        #[serde(rename = "signSAMLRequest")]
        sign_saml_request: bool,
        #[serde(rename = "protocolBinding")]
        protocol_binding: String,
        #[serde(rename = "requestTemplate")]
        request_template: String,
        user_id_attribute: String,
        tenant_domain: String,
        domain_aliases: Vec<String>,
        icon_url: String,
        #[serde(rename = "entityId")]
        entity_id: String,
        /// Write-only IdP metadata document
        #[serde(rename = "metadataXml")]
        metadata_xml: String,
        #[serde(rename = "metadataUrl")]
        metadata_url: String,
        #[serde(rename = "fieldsMap")]
        fields_map: Value,
        #[serde(rename = "idpinitiated")]
        idp_initiated: IdpInitiated,
        global_token_revocation_jwt_iss: String,
        global_token_revocation_jwt_sub: String,
        non_persistent_attrs: Vec<String>,
        set_user_root_attributes: String,
        upstream_params: Value,
    }
}

options_struct! {
    PingFederateOptions {
        #[serde(rename = "pingFederateBaseUrl")]
        ping_federate_base_url: String,
        #[serde(rename = "signingCert")]
        signing_cert: String,
        #[serde(rename = "signSAMLRequest")]
        sign_saml_request: bool,
        #[serde(rename = "signatureAlgorithm")]
        signature_algorithm: String,
        #[serde(rename = "digestAlgorithm")]
        digest_algorithm: String,
        tenant_domain: String,
        domain_aliases: Vec<String>,
        icon_url: String,
        #[serde(rename = "idpinitiated")]
        idp_initiated: IdpInitiated,
        non_persistent_attrs: Vec<String>,
        set_user_root_attributes: String,
        upstream_params: Value,
    }
}

// =============================================================================
// Closed set of shapes
// =============================================================================

/// Options of a connection, one variant per [`OptionsKind`]
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionOptions {
    Database(DatabaseOptions),
    GoogleOAuth2(GoogleOAuth2Options),
    GoogleApps(GoogleAppsOptions),
    OAuth2(OAuth2Options),
    Facebook(FacebookOptions),
    Apple(AppleOptions),
    LinkedIn(LinkedInOptions),
    GitHub(GitHubOptions),
    WindowsLive(WindowsLiveOptions),
    Salesforce(SalesforceOptions),
    Sms(SmsOptions),
    Email(EmailOptions),
    Oidc(OidcOptions),
    Okta(OktaOptions),
    Ad(AdOptions),
    AzureAd(AzureAdOptions),
    Adfs(AdfsOptions),
    Saml(SamlOptions),
    PingFederate(PingFederateOptions),
}

impl ConnectionOptions {
    /// Decode the API's untyped options object for the given strategy.
    pub fn from_value(strategy: Strategy, value: Value) -> Result<Self> {
        let options = match strategy.options_kind() {
            OptionsKind::Database => Self::Database(serde_json::from_value(value)?),
            OptionsKind::GoogleOAuth2 => Self::GoogleOAuth2(serde_json::from_value(value)?),
            OptionsKind::GoogleApps => Self::GoogleApps(serde_json::from_value(value)?),
            OptionsKind::OAuth2 => Self::OAuth2(serde_json::from_value(value)?),
            OptionsKind::Facebook => Self::Facebook(serde_json::from_value(value)?),
            OptionsKind::Apple => Self::Apple(serde_json::from_value(value)?),
            OptionsKind::LinkedIn => Self::LinkedIn(serde_json::from_value(value)?),
            OptionsKind::GitHub => Self::GitHub(serde_json::from_value(value)?),
            OptionsKind::WindowsLive => Self::WindowsLive(serde_json::from_value(value)?),
            OptionsKind::Salesforce => Self::Salesforce(serde_json::from_value(value)?),
            OptionsKind::Sms => Self::Sms(serde_json::from_value(value)?),
            OptionsKind::Email => Self::Email(serde_json::from_value(value)?),
            OptionsKind::Oidc => Self::Oidc(serde_json::from_value(value)?),
            OptionsKind::Okta => Self::Okta(serde_json::from_value(value)?),
            OptionsKind::Ad => Self::Ad(serde_json::from_value(value)?),
            OptionsKind::AzureAd => Self::AzureAd(serde_json::from_value(value)?),
            OptionsKind::Adfs => Self::Adfs(serde_json::from_value(value)?),
            OptionsKind::Saml => Self::Saml(serde_json::from_value(value)?),
            OptionsKind::PingFederate => Self::PingFederate(serde_json::from_value(value)?),
        };
        Ok(options)
    }

    /// Encode as the JSON object sent to the API.
    pub fn to_value(&self) -> Result<Value> {
        let value = match self {
            Self::Database(o) => serde_json::to_value(o)?,
            Self::GoogleOAuth2(o) => serde_json::to_value(o)?,
            Self::GoogleApps(o) => serde_json::to_value(o)?,
            Self::OAuth2(o) => serde_json::to_value(o)?,
            Self::Facebook(o) => serde_json::to_value(o)?,
            Self::Apple(o) => serde_json::to_value(o)?,
            Self::LinkedIn(o) => serde_json::to_value(o)?,
            Self::GitHub(o) => serde_json::to_value(o)?,
            Self::WindowsLive(o) => serde_json::to_value(o)?,
            Self::Salesforce(o) => serde_json::to_value(o)?,
            Self::Sms(o) => serde_json::to_value(o)?,
            Self::Email(o) => serde_json::to_value(o)?,
            Self::Oidc(o) => serde_json::to_value(o)?,
            Self::Okta(o) => serde_json::to_value(o)?,
            Self::Ad(o) => serde_json::to_value(o)?,
            Self::AzureAd(o) => serde_json::to_value(o)?,
            Self::Adfs(o) => serde_json::to_value(o)?,
            Self::Saml(o) => serde_json::to_value(o)?,
            Self::PingFederate(o) => serde_json::to_value(o)?,
        };
        Ok(value)
    }

    pub fn kind(&self) -> OptionsKind {
        match self {
            Self::Database(_) => OptionsKind::Database,
            Self::GoogleOAuth2(_) => OptionsKind::GoogleOAuth2,
            Self::GoogleApps(_) => OptionsKind::GoogleApps,
            Self::OAuth2(_) => OptionsKind::OAuth2,
            Self::Facebook(_) => OptionsKind::Facebook,
            Self::Apple(_) => OptionsKind::Apple,
            Self::LinkedIn(_) => OptionsKind::LinkedIn,
            Self::GitHub(_) => OptionsKind::GitHub,
            Self::WindowsLive(_) => OptionsKind::WindowsLive,
            Self::Salesforce(_) => OptionsKind::Salesforce,
            Self::Sms(_) => OptionsKind::Sms,
            Self::Email(_) => OptionsKind::Email,
            Self::Oidc(_) => OptionsKind::Oidc,
            Self::Okta(_) => OptionsKind::Okta,
            Self::Ad(_) => OptionsKind::Ad,
            Self::AzureAd(_) => OptionsKind::AzureAd,
            Self::Adfs(_) => OptionsKind::Adfs,
            Self::Saml(_) => OptionsKind::Saml,
            Self::PingFederate(_) => OptionsKind::PingFederate,
        }
    }

    /// Database `configuration` as reported by the API, if any
    pub fn configuration(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            Self::Database(o) => o.configuration.as_ref(),
            _ => None,
        }
    }
}
