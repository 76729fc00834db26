//! Attribute value accessors over the generic configuration tree
//!
//! Declared configuration and stored state arrive as JSON objects. `null`
//! and a missing key both mean "unset"; an empty string is a value.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use auth0_core::{Auth0Error, Result};

use crate::diag::Diagnostics;

pub type AttrMap = Map<String, Value>;

/// Typed reads over an attribute map
pub trait AttrReader {
    /// Raw value of a key, `None` when absent or null
    fn raw(&self, key: &str) -> Option<&Value>;

    fn is_set(&self, key: &str) -> bool {
        self.raw(key).is_some()
    }

    fn string(&self, key: &str) -> Option<String> {
        self.raw(key).and_then(Value::as_str).map(str::to_string)
    }

    fn bool(&self, key: &str) -> Option<bool> {
        self.raw(key).and_then(Value::as_bool)
    }

    fn int(&self, key: &str) -> Option<i64> {
        self.raw(key).and_then(Value::as_i64)
    }

    fn string_list(&self, key: &str) -> Option<Vec<String>> {
        self.raw(key).and_then(Value::as_array).map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
    }

    fn string_set(&self, key: &str) -> Option<BTreeSet<String>> {
        self.string_list(key).map(|items| items.into_iter().collect())
    }

    fn string_map(&self, key: &str) -> Option<BTreeMap<String, String>> {
        self.raw(key).and_then(Value::as_object).map(|map| {
            map.iter()
                .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                .collect()
        })
    }

    /// Parse a JSON-string attribute (e.g. `upstream_params`) into a value
    fn json_map(&self, key: &str) -> Result<Option<Value>> {
        match self.string(key) {
            None => Ok(None),
            Some(s) if s.is_empty() => Ok(None),
            Some(s) => json_string_to_map(&s).map(|m| Some(Value::Object(m))),
        }
    }

    /// A single nested block, given as an object or a list of one object
    fn block(&self, key: &str) -> Option<Block<'_>> {
        match self.raw(key)? {
            Value::Object(map) => Some(Block(map)),
            Value::Array(items) => items.first().and_then(Value::as_object).map(Block),
            _ => None,
        }
    }

    /// Repeated nested blocks
    fn blocks(&self, key: &str) -> Vec<Block<'_>> {
        match self.raw(key) {
            Some(Value::Array(items)) => items.iter().filter_map(Value::as_object).map(Block).collect(),
            Some(Value::Object(map)) => vec![Block(map)],
            _ => Vec::new(),
        }
    }
}

/// Borrowed view of a nested block
#[derive(Debug, Clone, Copy)]
pub struct Block<'a>(pub &'a AttrMap);

impl<'a> Block<'a> {
    pub fn map(&self) -> &'a AttrMap {
        self.0
    }
}

impl AttrReader for Block<'_> {
    fn raw(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|v| !v.is_null())
    }
}

impl AttrReader for AttrMap {
    fn raw(&self, key: &str) -> Option<&Value> {
        self.get(key).filter(|v| !v.is_null())
    }
}

/// Working copy of one resource instance during an operation.
///
/// Reads see the declared configuration on create/update and the stored
/// state on read/delete; writes made by flatten are visible to later reads.
#[derive(Debug, Clone, Default)]
pub struct ResourceData {
    id: Option<String>,
    config: AttrMap,
    prior: AttrMap,
    state: AttrMap,
    new_resource: bool,
}

impl ResourceData {
    pub fn for_create(config: AttrMap) -> Self {
        Self {
            id: None,
            state: config.clone(),
            config,
            prior: AttrMap::new(),
            new_resource: true,
        }
    }

    pub fn for_read(id: impl Into<String>, state: AttrMap) -> Self {
        Self {
            id: Some(id.into()),
            config: state.clone(),
            prior: state.clone(),
            state,
            new_resource: false,
        }
    }

    pub fn for_update(id: impl Into<String>, prior: AttrMap, config: AttrMap) -> Self {
        Self {
            id: Some(id.into()),
            state: config.clone(),
            config,
            prior,
            new_resource: false,
        }
    }

    pub fn for_delete(id: impl Into<String>, state: AttrMap) -> Self {
        Self::for_read(id, state)
    }

    pub fn for_import(id: impl Into<String>) -> Self {
        Self::for_read(id, AttrMap::new())
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// ID of an existing resource
    pub fn require_id(&self) -> Result<&str> {
        self.id()
            .ok_or_else(|| Auth0Error::invalid_input("resource has no ID"))
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = Some(id.into());
    }

    /// Drop the resource from state
    pub fn clear_id(&mut self) {
        self.id = None;
    }

    pub fn is_removed(&self) -> bool {
        self.id.is_none()
    }

    pub fn is_new_resource(&self) -> bool {
        self.new_resource
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.state.insert(key.to_string(), value.into());
    }

    pub fn config(&self) -> &AttrMap {
        &self.config
    }

    pub fn prior(&self) -> &AttrMap {
        &self.prior
    }

    pub fn has_change(&self, key: &str) -> bool {
        let (old, new) = self.get_change(key);
        old != new
    }

    /// Prior and declared values of a key
    pub fn get_change(&self, key: &str) -> (Option<&Value>, Option<&Value>) {
        (self.prior.raw(key), self.config.raw(key))
    }

    /// Stored state, including the `id` attribute, or `None` once removed
    pub fn into_state(self) -> Option<(String, AttrMap)> {
        let id = self.id?;
        let mut state = self.state;
        state.insert("id".to_string(), Value::String(id.clone()));
        Some((id, state))
    }

    pub fn into_response(self, diagnostics: Diagnostics) -> ResourceResponse {
        match self.into_state() {
            Some((id, state)) => ResourceResponse {
                id: Some(id),
                state: Some(state),
                diagnostics,
            },
            None => ResourceResponse {
                id: None,
                state: None,
                diagnostics,
            },
        }
    }
}

/// Outcome of one operation as returned to the host
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceResponse {
    pub id: Option<String>,
    /// `None` when the resource was removed from state
    pub state: Option<AttrMap>,
    pub diagnostics: Diagnostics,
}

impl ResourceResponse {
    pub fn failed(diagnostics: Diagnostics) -> Self {
        Self {
            id: None,
            state: None,
            diagnostics,
        }
    }
}

impl AttrReader for ResourceData {
    fn raw(&self, key: &str) -> Option<&Value> {
        self.state.get(key).filter(|v| !v.is_null())
    }
}

// =============================================================================
// JSON helpers
// =============================================================================

/// Parse an opaque JSON parameter string into an object
pub fn json_string_to_map(s: &str) -> Result<AttrMap> {
    match serde_json::from_str::<Value>(s) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(Auth0Error::invalid_input(format!(
            "expected a JSON object, got: {}",
            s
        ))),
        Err(e) => Err(Auth0Error::invalid_input(format!("invalid JSON: {}", e))),
    }
}

/// Render an opaque JSON parameter object as the string form kept in state
pub fn map_to_json_string(value: Option<&Value>) -> Option<String> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::Object(map)) if map.is_empty() => None,
        Some(v) => serde_json::to_string(v).ok(),
    }
}

/// Parse durations such as `30s`, `5m`, `1h30m`
pub fn parse_duration(s: &str) -> Result<Duration> {
    let invalid = || Auth0Error::invalid_input(format!("invalid duration {:?}", s));
    let mut total = 0u64;
    let mut digits = String::new();

    for c in s.trim().chars() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }
        let amount: u64 = digits.parse().map_err(|_| invalid())?;
        digits.clear();
        let unit = match c {
            'h' => 3600,
            'm' => 60,
            's' => 1,
            _ => return Err(invalid()),
        };
        total = amount
            .checked_mul(unit)
            .and_then(|secs| total.checked_add(secs))
            .ok_or_else(invalid)?;
    }

    if !digits.is_empty() || s.trim().is_empty() {
        return Err(invalid());
    }
    Ok(Duration::from_secs(total))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> AttrMap {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_null_is_unset_and_empty_string_is_value() {
        let d = ResourceData::for_create(map(json!({ "a": null, "b": "" })));
        assert_eq!(d.string("a"), None);
        assert_eq!(d.string("b"), Some(String::new()));
        assert!(!d.is_set("a"));
    }

    #[test]
    fn test_block_accepts_object_or_single_item_list() {
        let d = ResourceData::for_create(map(json!({
            "object": { "x": 1 },
            "list": [{ "x": 2 }],
            "empty": []
        })));
        assert_eq!(d.block("object").unwrap().int("x"), Some(1));
        assert_eq!(d.block("list").unwrap().int("x"), Some(2));
        assert!(d.block("empty").is_none());
    }

    #[test]
    fn test_change_tracking() {
        let d = ResourceData::for_update(
            "id",
            map(json!({ "name": "a", "display_name": "old" })),
            map(json!({ "name": "a", "display_name": "new" })),
        );
        assert!(!d.has_change("name"));
        assert!(d.has_change("display_name"));
        assert_eq!(d.get_change("display_name").0, Some(&json!("old")));
    }

    #[test]
    fn test_set_is_visible_and_removal_drops_state() {
        let mut d = ResourceData::for_import("con_1");
        d.set("name", "db");
        assert_eq!(d.string("name").as_deref(), Some("db"));

        let (id, state) = d.clone().into_state().unwrap();
        assert_eq!(id, "con_1");
        assert_eq!(state.get("id"), Some(&json!("con_1")));

        d.clear_id();
        assert!(d.into_state().is_none());
    }

    #[test]
    fn test_json_helpers() {
        let d = ResourceData::for_create(map(json!({ "params": "{\"screen_name\":{\"alias\":\"login_hint\"}}" })));
        let parsed = d.json_map("params").unwrap().unwrap();
        assert_eq!(parsed["screen_name"]["alias"], "login_hint");
        assert_eq!(
            map_to_json_string(Some(&parsed)).as_deref(),
            Some("{\"screen_name\":{\"alias\":\"login_hint\"}}")
        );
        assert!(json_string_to_map("[1]").is_err());
        assert_eq!(map_to_json_string(Some(&json!({}))), None);
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("30s").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_duration("5m").unwrap(), Duration::from_secs(300));
        assert_eq!(parse_duration("1h30m").unwrap(), Duration::from_secs(5400));
        assert!(parse_duration("5").is_err());
        assert!(parse_duration("5d").is_err());
        assert!(parse_duration("").is_err());
        assert!(parse_duration("9999999999999999h").is_err());
        assert!(parse_duration("18446744073709551615s1s").is_err());
    }
}
