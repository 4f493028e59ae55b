//! Document-level metadata, independent of tree depth.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::figma::{FigmaFileResponse, FigmaNodesResponse};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editor_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Node ids a node-scoped request asked for; empty for whole files.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requested_nodes: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub components: BTreeMap<String, ComponentSummary>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub component_sets: BTreeMap<String, ComponentSummary>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentSummary {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_set_id: Option<String>,
}

pub fn extract_file_metadata(file: &FigmaFileResponse) -> Metadata {
    Metadata {
        name: file.name.clone().unwrap_or_default(),
        last_modified: file.last_modified.clone(),
        version: file.version.clone(),
        thumbnail_url: file.thumbnail_url.clone(),
        editor_type: file.editor_type.clone(),
        role: file.role.clone(),
        requested_nodes: Vec::new(),
        components: summarize(&file.components),
        component_sets: summarize(&file.component_sets),
    }
}

/// Metadata of the document containing the requested nodes.
///
/// Top-level fields come from the response itself, never from a node;
/// component summaries are merged across the requested containers.
pub fn extract_nodes_metadata(response: &FigmaNodesResponse, requested: &[String]) -> Metadata {
    let mut components = BTreeMap::new();
    let mut component_sets = BTreeMap::new();
    for id in requested {
        if let Some(Some(container)) = response.nodes.get(id) {
            components.extend(summarize(&container.components));
            component_sets.extend(summarize(&container.component_sets));
        }
    }

    Metadata {
        name: response.name.clone().unwrap_or_default(),
        last_modified: response.last_modified.clone(),
        version: response.version.clone(),
        thumbnail_url: response.thumbnail_url.clone(),
        editor_type: response.editor_type.clone(),
        role: response.role.clone(),
        requested_nodes: requested.to_vec(),
        components,
        component_sets,
    }
}

fn summarize(entries: &BTreeMap<String, Value>) -> BTreeMap<String, ComponentSummary> {
    entries
        .iter()
        .filter_map(|(id, entry)| {
            let text = |field: &str| entry.get(field).and_then(Value::as_str).map(str::to_string);
            let summary = ComponentSummary {
                name: text("name")?,
                key: text("key"),
                description: text("description").filter(|d| !d.is_empty()),
                component_set_id: text("componentSetId"),
            };
            Some((id.clone(), summary))
        })
        .collect()
}
