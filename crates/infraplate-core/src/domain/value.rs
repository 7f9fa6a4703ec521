//! The universal value model.
//!
//! API payloads and custom variables are both decoded into [`Value`], an
//! exhaustive tagged variant. Objects are kept in a `BTreeMap` so that every
//! rendering of a container is canonical: same input, same bytes.

use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use std::collections::BTreeMap;
use std::fmt;

pub use serde_json::Number;

/// Longest string sample shown by [`Value::sample`] before truncation.
const SAMPLE_MAX_CHARS: usize = 50;

/// A dynamically typed value decoded from JSON or YAML.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<Value>),
    Object(BTreeMap<String, Value>),
}

impl Value {
    /// Name of the variant as shown to users.
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
        }
    }

    /// Template truthiness: `null`, `false`, `0`, and empty strings,
    /// arrays and objects are false.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(b) => *b,
            Self::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
            Self::String(s) => !s.is_empty(),
            Self::Array(items) => !items.is_empty(),
            Self::Object(map) => !map.is_empty(),
        }
    }

    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Self::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Number of children for containers, characters for strings.
    pub fn len(&self) -> Option<usize> {
        match self {
            Self::String(s) => Some(s.chars().count()),
            Self::Array(items) => Some(items.len()),
            Self::Object(map) => Some(map.len()),
            _ => None,
        }
    }

    /// Text substituted into a template.
    ///
    /// Strings are emitted raw, other scalars as their JSON literal and
    /// containers as compact canonical JSON.
    pub fn to_text(&self) -> String {
        match self {
            Self::String(s) => s.clone(),
            Self::Null => "null".to_owned(),
            Self::Bool(b) => b.to_string(),
            Self::Number(n) => n.to_string(),
            Self::Array(_) | Self::Object(_) => self.to_canonical_json(),
        }
    }

    /// Compact JSON with object keys in sorted order.
    pub fn to_canonical_json(&self) -> String {
        serde_json::Value::from(self).to_string()
    }

    /// Short human-readable preview used when listing variables.
    pub fn sample(&self) -> String {
        match self {
            Self::String(s) if s.chars().count() > SAMPLE_MAX_CHARS => {
                let head: String = s.chars().take(SAMPLE_MAX_CHARS - 3).collect();
                format!("\"{head}...\"")
            }
            Self::String(s) => format!("\"{s}\""),
            Self::Array(items) => match items.len() {
                1 => "[1 element]".to_owned(),
                n => format!("[{n} elements]"),
            },
            Self::Object(map) => match map.len() {
                1 => "{ 1 property }".to_owned(),
                n => format!("{{ {n} properties }}"),
            },
            other => other.to_text(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

// ── Conversions ──────────────────────────────────────────────────────────────

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Number(n.into())
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Self::Number(n.into())
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Self::Number((n as u64).into())
    }
}

impl From<f64> for Value {
    /// Non-finite floats have no JSON representation and become `Null`.
    fn from(f: f64) -> Self {
        Number::from_f64(f).map_or(Self::Null, Self::Number)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::Array(items)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Self::Object(map)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => Self::Number(n),
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => {
                Self::Array(items.into_iter().map(Self::from).collect())
            }
            serde_json::Value::Object(map) => {
                Self::Object(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

impl From<&Value> for serde_json::Value {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => Self::Number(n.clone()),
            Value::String(s) => Self::String(s.clone()),
            Value::Array(items) => Self::Array(items.iter().map(Self::from).collect()),
            Value::Object(map) => Self::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), Self::from(v)))
                    .collect(),
            ),
        }
    }
}

// ── Serde ────────────────────────────────────────────────────────────────────

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Number(n) => n.serialize(serializer),
            Self::String(s) => serializer.serialize_str(s),
            Self::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Object(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map {
                    out.serialize_entry(k, v)?;
                }
                out.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ValueVisitor)
    }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any JSON or YAML value")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Value, D::Error> {
        Deserialize::deserialize(deserializer)
    }

    fn visit_bool<E: de::Error>(self, b: bool) -> Result<Value, E> {
        Ok(Value::Bool(b))
    }

    fn visit_i64<E: de::Error>(self, n: i64) -> Result<Value, E> {
        Ok(Value::from(n))
    }

    fn visit_u64<E: de::Error>(self, n: u64) -> Result<Value, E> {
        Ok(Value::from(n))
    }

    fn visit_f64<E: de::Error>(self, f: f64) -> Result<Value, E> {
        Ok(Value::from(f))
    }

    fn visit_str<E: de::Error>(self, s: &str) -> Result<Value, E> {
        Ok(Value::String(s.to_owned()))
    }

    fn visit_string<E: de::Error>(self, s: String) -> Result<Value, E> {
        Ok(Value::String(s))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Value, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(Value::Array(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Value, A::Error> {
        let mut map = BTreeMap::new();
        while let Some((key, value)) = access.next_entry::<String, Value>()? {
            map.insert(key, value);
        }
        Ok(Value::Object(map))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn v(json: serde_json::Value) -> Value {
        Value::from(json)
    }

    // ========================================================================
    // Truthiness
    // ========================================================================

    #[test]
    fn falsy_values() {
        for falsy in [json!(null), json!(false), json!(0), json!(0.0), json!(""), json!([]), json!({})] {
            assert!(!v(falsy.clone()).is_truthy(), "{falsy} should be falsy");
        }
    }

    #[test]
    fn truthy_values() {
        for truthy in [json!(true), json!(1), json!(-2.5), json!("0"), json!([0]), json!({"a": null})] {
            assert!(v(truthy.clone()).is_truthy(), "{truthy} should be truthy");
        }
    }

    // ========================================================================
    // Rendering
    // ========================================================================

    #[test]
    fn scalars_render_as_literal_text() {
        assert_eq!(v(json!("web")).to_text(), "web");
        assert_eq!(v(json!(3)).to_text(), "3");
        assert_eq!(v(json!(1.5)).to_text(), "1.5");
        assert_eq!(v(json!(true)).to_text(), "true");
        assert_eq!(v(json!(null)).to_text(), "null");
    }

    #[test]
    fn containers_render_as_canonical_json() {
        let value = v(json!({"b": [1, "x"], "a": {"z": null, "y": true}}));
        assert_eq!(value.to_text(), r#"{"a":{"y":true,"z":null},"b":[1,"x"]}"#);
    }

    #[test]
    fn canonical_json_escapes_strings() {
        assert_eq!(v(json!(["a\"b"])).to_text(), r#"["a\"b"]"#);
    }

    // ========================================================================
    // Samples
    // ========================================================================

    #[test]
    fn long_strings_are_truncated_in_samples() {
        let long = "x".repeat(60);
        let sample = v(json!(long)).sample();
        assert_eq!(sample, format!("\"{}...\"", "x".repeat(47)));
    }

    #[test]
    fn container_samples_show_sizes() {
        assert_eq!(v(json!([1])).sample(), "[1 element]");
        assert_eq!(v(json!([1, 2, 3])).sample(), "[3 elements]");
        assert_eq!(v(json!({"a": 1, "b": 2})).sample(), "{ 2 properties }");
        assert_eq!(v(json!({})).sample(), "{ 0 properties }");
    }

    // ========================================================================
    // Serde
    // ========================================================================

    #[test]
    fn deserializes_from_yaml_and_json_alike() {
        let from_json: Value = serde_json::from_str(r#"{"a": [1, true, null]}"#).unwrap();
        let from_yaml: Value = serde_yaml::from_str("a:\n  - 1\n  - true\n  - null\n").unwrap();
        assert_eq!(from_json, from_yaml);
    }

    #[test]
    fn non_finite_floats_become_null() {
        assert_eq!(Value::from(f64::NAN), Value::Null);
    }
}
