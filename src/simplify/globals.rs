//! Content-addressed global variable table.
//!
//! Style-bearing values are normalized, hashed and stored once per run; nodes
//! only carry the resulting [`StyleKey`].

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Number, Value};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Decimal places kept for every number before hashing.
pub const FLOAT_PRECISION: i32 = 4;

/// Provider-internal fields that never affect rendering.
pub const STRIPPED_FIELDS: &[&str] = &[
    "boundVariables",
    "explicitVariableModes",
    "componentPropertyReferences",
    "pluginData",
    "sharedPluginData",
];

/// Digest bytes kept in a key (128 bits).
const KEY_BYTES: usize = 16;

/// Property family a global variable belongs to; also the key prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleCategory {
    Fill,
    Stroke,
    Effect,
    Text,
    Grid,
    Radius,
    Blend,
    Opacity,
    Constraints,
    Layout,
}

impl StyleCategory {
    pub fn prefix(&self) -> &'static str {
        match self {
            StyleCategory::Fill => "fill",
            StyleCategory::Stroke => "stroke",
            StyleCategory::Effect => "effect",
            StyleCategory::Text => "text",
            StyleCategory::Grid => "grid",
            StyleCategory::Radius => "radius",
            StyleCategory::Blend => "blend",
            StyleCategory::Opacity => "opacity",
            StyleCategory::Constraints => "constraints",
            StyleCategory::Layout => "layout",
        }
    }
}

/// Deterministic identifier of a normalized style value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StyleKey(String);

impl StyleKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The category prefix, e.g. `fill` for `fill_3f2a…`.
    pub fn category(&self) -> &str {
        self.0.split_once('_').map_or(&self.0, |(prefix, _)| prefix)
    }
}

impl fmt::Display for StyleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Per-run mapping from [`StyleKey`] to canonical value, in first-occurrence order.
///
/// One table belongs to exactly one simplification run; never share it across
/// documents.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlobalVariableTable {
    entries: Vec<(StyleKey, Value)>,
    index: HashMap<StyleKey, usize>,
    by_digest: HashMap<String, usize>,
}

impl GlobalVariableTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` once and return its key. Equal normalized values always
    /// return the same key and leave the table unchanged, whichever property
    /// they come from; `category` only labels a key when it is first minted.
    pub fn intern(&mut self, category: StyleCategory, value: &Value) -> StyleKey {
        let normalized = normalize(value);
        let digest = content_digest(&normalized);
        if let Some(&i) = self.by_digest.get(&digest) {
            return self.entries[i].0.clone();
        }
        let key = StyleKey(format!("{}_{}", category.prefix(), digest));
        let slot = self.entries.len();
        self.by_digest.insert(digest, slot);
        self.index.insert(key.clone(), slot);
        self.entries.push((key.clone(), normalized));
        key
    }

    pub fn get(&self, key: &StyleKey) -> Option<&Value> {
        self.index.get(key).map(|&i| &self.entries[i].1)
    }

    pub fn contains(&self, key: &StyleKey) -> bool {
        self.index.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&StyleKey, &Value)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    /// Number of entries whose key belongs to `category`.
    pub fn count_category(&self, category: StyleCategory) -> usize {
        self.entries
            .iter()
            .filter(|(k, _)| k.category() == category.prefix())
            .count()
    }
}

impl Serialize for GlobalVariableTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        struct Styles<'a>(&'a [(StyleKey, Value)]);

        impl Serialize for Styles<'_> {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                let mut map = serializer.serialize_map(Some(self.0.len()))?;
                for (key, value) in self.0 {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }

        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry("styles", &Styles(&self.entries))?;
        map.end()
    }
}

/// Canonicalize a value for hashing: strip [`STRIPPED_FIELDS`], round numbers
/// to [`FLOAT_PRECISION`] decimals and sort object keys. Arrays keep order.
pub fn normalize(value: &Value) -> Value {
    match value {
        Value::Number(n) => round_number(n),
        Value::Array(items) => Value::Array(items.iter().map(normalize).collect()),
        Value::Object(fields) => {
            let sorted: BTreeMap<&String, Value> = fields
                .iter()
                .filter(|(k, _)| !STRIPPED_FIELDS.contains(&k.as_str()))
                .map(|(k, v)| (k, normalize(v)))
                .collect();
            Value::Object(
                sorted
                    .into_iter()
                    .map(|(k, v)| (k.clone(), v))
                    .collect::<Map<String, Value>>(),
            )
        }
        other => other.clone(),
    }
}

fn round_number(n: &Number) -> Value {
    if n.is_i64() || n.is_u64() {
        return Value::Number(n.clone());
    }
    let Some(f) = n.as_f64() else {
        return Value::Null;
    };
    if !f.is_finite() {
        return Value::Null;
    }
    let scale = 10f64.powi(FLOAT_PRECISION);
    let rounded = (f * scale).round() / scale;
    if rounded.fract() == 0.0 && rounded.abs() < 9.0e15 {
        Value::from(rounded as i64)
    } else {
        Number::from_f64(rounded).map_or(Value::Null, Value::Number)
    }
}

fn content_digest(normalized: &Value) -> String {
    let digest = Sha256::digest(normalized.to_string().as_bytes());
    hex::encode(&digest[..KEY_BYTES])
}
