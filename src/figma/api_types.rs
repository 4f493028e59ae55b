//! Figma API response types for parsing JSON from the Figma REST API.
//!
//! Node trees stay as [`serde_json::Value`]: one malformed node must not fail
//! deserialization of the whole file, so nodes are read leniently through
//! [`RawNode`](super::raw::RawNode) instead.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

/// Parse a Figma payload without serde_json's nesting limit.
///
/// Every node level costs two JSON levels (the node and its `children`), so
/// the default limit of 128 would reject documents about 64 nodes deep. The
/// stack grows on the heap instead.
pub fn parse_payload<T: DeserializeOwned>(text: &str) -> serde_json::Result<T> {
    let mut json = serde_json::Deserializer::from_str(text);
    json.disable_recursion_limit();
    let parsed = T::deserialize(serde_stacker::Deserializer::new(&mut json))?;
    json.end()?;
    Ok(parsed)
}

/// A Figma file response from `GET /v1/files/:key`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FigmaFileResponse {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub last_modified: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub editor_type: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub document: Value,
    #[serde(default)]
    pub components: BTreeMap<String, Value>,
    #[serde(default)]
    pub component_sets: BTreeMap<String, Value>,
}

/// Response from `GET /v1/files/:key/nodes`.
///
/// Figma answers `null` for requested ids that do not exist, hence the
/// optional containers.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FigmaNodesResponse {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub last_modified: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub editor_type: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub nodes: HashMap<String, Option<FigmaNodeContainer>>,
}

/// One requested subtree plus the components it references.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FigmaNodeContainer {
    #[serde(default)]
    pub document: Value,
    #[serde(default)]
    pub components: BTreeMap<String, Value>,
    #[serde(default)]
    pub component_sets: BTreeMap<String, Value>,
}

/// Response from `GET /v1/files/:key/images` (image fill URLs by `imageRef`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FigmaImageFillsResponse {
    #[serde(default)]
    pub error: bool,
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(default)]
    pub meta: FigmaImageFillsMeta,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FigmaImageFillsMeta {
    #[serde(default)]
    pub images: HashMap<String, String>,
}

/// Either raw payload shape accepted by the simplifier.
#[derive(Debug, Clone)]
pub enum RawResponse {
    File(FigmaFileResponse),
    Nodes(FigmaNodesResponse),
}

impl RawResponse {
    /// Detect the payload shape: a top-level `nodes` object marks a node-scoped
    /// response, anything else is treated as a whole-file response.
    pub fn from_value(value: Value) -> serde_json::Result<Self> {
        if value.get("nodes").is_some_and(Value::is_object) {
            serde_json::from_value(value).map(RawResponse::Nodes)
        } else {
            serde_json::from_value(value).map(RawResponse::File)
        }
    }
}
