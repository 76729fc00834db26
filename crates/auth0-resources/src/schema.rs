//! Field declarations and validation of declared configuration

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

use auth0_core::{Auth0Error, Result, Strategy};

use crate::data::{AttrMap, ResourceData};
use crate::diag::{Diagnostic, Diagnostics};

/// http(s) URL with a host
static URL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?://[^\s/?#:]+(:\d+)?([/?#]\S*)?$").expect("valid regex"));

// =============================================================================
// Closed vocabularies
// =============================================================================

pub const PKCE_VALUES: &[&str] = &["auto", "S256", "plain", "disabled"];
pub const MAPPING_MODES: &[&str] = &["use_map", "bind_all", "basic_profile"];
pub const TLS_POLICIES: &[&str] = &["compatible", "recommended"];
pub const CLIENT_IP_HEADERS: &[&str] = &["cf-connecting-ip", "x-forwarded-for", "true-client-ip", ""];
pub const CUSTOM_DOMAIN_TYPES: &[&str] = &["auth0_managed_certs", "self_managed_certs"];
pub const USER_ROOT_ATTRIBUTE_MODES: &[&str] = &["on_each_login", "on_first_login", "never_on_login"];
pub const OIDC_CLIENT_TYPES: &[&str] = &["front_channel", "back_channel"];
pub const PROFILE_ORGANIZATION_MODES: &[&str] = &["none", "optional", "required"];

// =============================================================================
// Fields
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    String,
    Bool,
    Int,
    List,
    Set,
    Map,
    Block,
}

impl FieldKind {
    fn accepts(&self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Bool => value.is_boolean(),
            Self::Int => value.is_i64() || value.is_u64(),
            Self::List | Self::Set => value.is_array(),
            Self::Map => value.is_object(),
            Self::Block => value.is_object() || value.is_array(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "values", rename_all = "snake_case")]
pub enum Validator {
    OneOf(Vec<String>),
    Url,
    JsonString,
    NonEmpty,
}

impl Validator {
    pub fn one_of(values: &[&str]) -> Self {
        Self::OneOf(values.iter().map(|v| v.to_string()).collect())
    }

    pub fn strategies() -> Self {
        Self::one_of(&Strategy::identifiers())
    }

    /// Validate one scalar; lists and sets are validated per element
    fn check(&self, value: &Value) -> std::result::Result<(), String> {
        let Some(s) = value.as_str() else {
            return Ok(());
        };
        match self {
            Self::OneOf(allowed) => {
                if allowed.iter().any(|a| a == s) {
                    Ok(())
                } else {
                    Err(format!("expected one of {:?}, got {:?}", allowed, s))
                }
            }
            Self::Url => {
                if URL_REGEX.is_match(s) {
                    Ok(())
                } else {
                    Err(format!("expected a valid http(s) URL, got {:?}", s))
                }
            }
            Self::JsonString => {
                if s.is_empty() {
                    return Ok(());
                }
                serde_json::from_str::<Value>(s)
                    .map(|_| ())
                    .map_err(|e| format!("invalid JSON string: {}", e))
            }
            Self::NonEmpty => {
                if s.is_empty() {
                    Err("must not be empty".to_string())
                } else {
                    Ok(())
                }
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Field {
    pub kind: FieldKind,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub optional: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub computed: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub sensitive: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub force_new: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validator: Option<Validator>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elem: Option<Box<Schema>>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
}

impl Field {
    fn of(kind: FieldKind) -> Self {
        Self {
            kind,
            required: false,
            optional: true,
            computed: false,
            sensitive: false,
            force_new: false,
            validator: None,
            max_items: None,
            elem: None,
            description: String::new(),
        }
    }

    pub fn string() -> Self {
        Self::of(FieldKind::String)
    }

    pub fn bool() -> Self {
        Self::of(FieldKind::Bool)
    }

    pub fn int() -> Self {
        Self::of(FieldKind::Int)
    }

    pub fn list() -> Self {
        Self::of(FieldKind::List)
    }

    pub fn set() -> Self {
        Self::of(FieldKind::Set)
    }

    pub fn map() -> Self {
        Self::of(FieldKind::Map)
    }

    /// Single nested block
    pub fn block(schema: Schema) -> Self {
        let mut field = Self::of(FieldKind::Block);
        field.max_items = Some(1);
        field.elem = Some(Box::new(schema));
        field
    }

    /// Repeated nested blocks
    pub fn blocks(schema: Schema) -> Self {
        let mut field = Self::of(FieldKind::Block);
        field.elem = Some(Box::new(schema));
        field
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self.optional = false;
        self
    }

    /// Optional, and filled from the API when left unset
    pub fn optional_computed(mut self) -> Self {
        self.computed = true;
        self
    }

    /// Read-only, reported by the API
    pub fn computed(mut self) -> Self {
        self.computed = true;
        self.optional = false;
        self.required = false;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn force_new(mut self) -> Self {
        self.force_new = true;
        self
    }

    pub fn validate(mut self, validator: Validator) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Cross-field rules
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "fields", rename_all = "snake_case")]
pub enum Constraint {
    /// Exactly one of the fields must be set
    ExactlyOneOf(Vec<String>),
    /// Either all of the fields are set or none
    RequiredTogether(Vec<String>),
}

// =============================================================================
// Schema
// =============================================================================

#[derive(Debug, Clone, Default, Serialize)]
pub struct Schema {
    pub fields: BTreeMap<String, Field>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<Constraint>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: &str, field: Field) -> Self {
        self.fields.insert(name.to_string(), field);
        self
    }

    pub fn exactly_one_of(mut self, names: &[&str]) -> Self {
        self.constraints
            .push(Constraint::ExactlyOneOf(names.iter().map(|n| n.to_string()).collect()));
        self
    }

    pub fn required_together(mut self, names: &[&str]) -> Self {
        self.constraints
            .push(Constraint::RequiredTogether(names.iter().map(|n| n.to_string()).collect()));
        self
    }

    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    /// Check declared configuration against the field declarations
    pub fn validate(&self, config: &AttrMap) -> Diagnostics {
        let mut diags = Diagnostics::new();
        self.validate_at("", config, &mut diags);
        diags
    }

    fn validate_at(&self, prefix: &str, config: &AttrMap, diags: &mut Diagnostics) {
        let path = |name: &str| {
            if prefix.is_empty() {
                name.to_string()
            } else {
                format!("{}.{}", prefix, name)
            }
        };

        for (name, field) in &self.fields {
            let value = config.get(name).filter(|v| !v.is_null());

            let Some(value) = value else {
                if field.required {
                    diags.push(
                        Diagnostic::error("Missing required argument")
                            .with_detail(format!("The argument {:?} is required.", name))
                            .with_attribute(path(name)),
                    );
                }
                continue;
            };

            if !field.kind.accepts(value) {
                diags.push(
                    Diagnostic::error("Incorrect attribute value type")
                        .with_detail(format!("{:?} must be of type {:?}", name, field.kind))
                        .with_attribute(path(name)),
                );
                continue;
            }

            if let Some(validator) = &field.validator {
                let items: Vec<&Value> = match value {
                    Value::Array(items) => items.iter().collect(),
                    other => vec![other],
                };
                for item in items {
                    if let Err(message) = validator.check(item) {
                        diags.push(
                            Diagnostic::error("Invalid attribute value")
                                .with_detail(message)
                                .with_attribute(path(name)),
                        );
                    }
                }
            }

            if let (FieldKind::Block, Some(elem)) = (field.kind, &field.elem) {
                let blocks: Vec<&AttrMap> = match value {
                    Value::Array(items) => items.iter().filter_map(Value::as_object).collect(),
                    Value::Object(map) => vec![map],
                    _ => Vec::new(),
                };
                if let Some(max) = field.max_items {
                    if blocks.len() > max {
                        diags.push(
                            Diagnostic::error("Too many blocks")
                                .with_detail(format!("No more than {} {:?} blocks are allowed.", max, name))
                                .with_attribute(path(name)),
                        );
                    }
                }
                for block in blocks {
                    elem.validate_at(&path(name), block, diags);
                }
            }
        }

        for constraint in &self.constraints {
            match constraint {
                Constraint::ExactlyOneOf(names) => {
                    let set = names.iter().filter(|n| is_set(config, n)).count();
                    if set != 1 {
                        diags.push(
                            Diagnostic::error("Invalid combination of arguments")
                                .with_detail(format!("Exactly one of {} must be specified.", quote_all(names))),
                        );
                    }
                }
                Constraint::RequiredTogether(names) => {
                    let set = names.iter().filter(|n| is_set(config, n)).count();
                    if set != 0 && set != names.len() {
                        diags.push(
                            Diagnostic::error("Missing required argument")
                                .with_detail(format!("{} must be specified together.", quote_all(names))),
                        );
                    }
                }
            }
        }
    }

    /// Reject in-place changes of immutable fields
    pub fn check_immutable(&self, d: &ResourceData) -> Result<()> {
        for (name, field) in &self.fields {
            if !field.force_new {
                continue;
            }
            // Omitted computed fields keep whatever the server reported
            if field.computed && !is_set(d.config(), name) {
                continue;
            }
            if d.has_change(name) {
                return Err(Auth0Error::config_error(format!(
                    "{:?} cannot be changed after creation; the resource must be replaced",
                    name
                )));
            }
        }
        Ok(())
    }
}

fn is_set(config: &AttrMap, name: &str) -> bool {
    match config.get(name) {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    }
}

fn quote_all(names: &[String]) -> String {
    names
        .iter()
        .map(|n| format!("{:?}", n))
        .collect::<Vec<_>>()
        .join(", ")
}
