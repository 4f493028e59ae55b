//! Result assembly and the simplification entry points.

use serde::Serialize;

use super::globals::GlobalVariableTable;
use super::metadata::{extract_file_metadata, extract_nodes_metadata, Metadata};
use super::node::{ImageAssetReference, NodeSimplifier, SimplifiedNode};
use super::walker::{find_nodes, walk};
use crate::figma::{FigmaFileResponse, FigmaNodesResponse, RawNode, RawResponse};
use crate::{DctxError, Result};

/// Options for one simplification run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimplifyOptions {
    /// Deepest raw level kept below the forest roots; `None` walks everything.
    pub max_depth: Option<u32>,
}

/// Metadata, node forest and the global variable table of one run.
///
/// Immutable once assembled; use the accessors or [`SimplifiedDesign::into_parts`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimplifiedDesign {
    metadata: Metadata,
    nodes: Vec<SimplifiedNode>,
    global_vars: GlobalVariableTable,
}

impl SimplifiedDesign {
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn nodes(&self) -> &[SimplifiedNode] {
        &self.nodes
    }

    pub fn global_vars(&self) -> &GlobalVariableTable {
        &self.global_vars
    }

    pub fn into_parts(self) -> (Metadata, Vec<SimplifiedNode>, GlobalVariableTable) {
        (self.metadata, self.nodes, self.global_vars)
    }
}

/// Combine the three sections; no further transformation.
pub fn assemble(
    metadata: Metadata,
    nodes: Vec<SimplifiedNode>,
    global_vars: GlobalVariableTable,
) -> SimplifiedDesign {
    SimplifiedDesign {
        metadata,
        nodes,
        global_vars,
    }
}

/// A simplified design plus the image references the asset pipeline needs.
#[derive(Debug, Clone, PartialEq)]
pub struct Simplification {
    pub design: SimplifiedDesign,
    pub image_assets: Vec<ImageAssetReference>,
}

/// Simplify a whole-file response. The forest roots are the document's pages.
pub fn simplify_file(file: &FigmaFileResponse, options: &SimplifyOptions) -> Result<Simplification> {
    let document = RawNode::from_value(&file.document).ok_or_else(|| {
        DctxError::untraversable("file response has no document object to traverse")
    })?;

    let metadata = extract_file_metadata(file);
    let pages = document.children().iter().filter_map(|page| {
        let raw = RawNode::from_value(page);
        if raw.is_none() {
            tracing::warn!("skipping non-object page entry");
        }
        raw
    });
    Ok(run(metadata, pages, options))
}

/// Simplify a node-scoped response. The forest roots are exactly `requested`.
pub fn simplify_nodes(
    response: &FigmaNodesResponse,
    requested: &[String],
    options: &SimplifyOptions,
) -> Result<Simplification> {
    if requested.is_empty() {
        return Err(DctxError::untraversable("no node ids were requested"));
    }

    let roots = requested
        .iter()
        .map(|id| {
            response
                .nodes
                .get(id)
                .and_then(Option::as_ref)
                .and_then(|container| RawNode::from_value(&container.document))
                .ok_or_else(|| {
                    DctxError::untraversable(format!("node {id} is missing from the response"))
                })
        })
        .collect::<Result<Vec<_>>>()?;

    let metadata = extract_nodes_metadata(response, requested);
    Ok(run(metadata, roots, options))
}

/// Simplify either payload shape.
///
/// An empty `requested` list means every root: the pages of a file, or every
/// non-null node of a nodes response in id order. For a whole-file payload,
/// requested ids are looked up inside the document.
pub fn simplify_response(
    response: &RawResponse,
    requested: &[String],
    options: &SimplifyOptions,
) -> Result<Simplification> {
    match response {
        RawResponse::File(file) if requested.is_empty() => simplify_file(file, options),
        RawResponse::File(file) => {
            let document = RawNode::from_value(&file.document).ok_or_else(|| {
                DctxError::untraversable("file response has no document object to traverse")
            })?;
            let roots = find_nodes(document, requested)
                .into_iter()
                .zip(requested)
                .map(|(found, id)| {
                    found.ok_or_else(|| {
                        DctxError::untraversable(format!("node {id} is not in the document"))
                    })
                })
                .collect::<Result<Vec<_>>>()?;

            let mut metadata = extract_file_metadata(file);
            metadata.requested_nodes = requested.to_vec();
            Ok(run(metadata, roots, options))
        }
        RawResponse::Nodes(nodes) if requested.is_empty() => {
            let mut ids: Vec<String> = nodes
                .nodes
                .iter()
                .filter(|(_, container)| container.is_some())
                .map(|(id, _)| id.clone())
                .collect();
            ids.sort();
            simplify_nodes(nodes, &ids, options)
        }
        RawResponse::Nodes(nodes) => simplify_nodes(nodes, requested, options),
    }
}

fn run<'a>(
    metadata: Metadata,
    roots: impl IntoIterator<Item = RawNode<'a>>,
    options: &SimplifyOptions,
) -> Simplification {
    let mut simplifier = NodeSimplifier::new();
    let nodes = walk(roots, options.max_depth, &mut simplifier);
    let (global_vars, image_assets) = simplifier.finish();

    tracing::info!(
        document = %metadata.name,
        roots = nodes.len(),
        global_vars = global_vars.len(),
        image_assets = image_assets.len(),
        "simplified design"
    );

    Simplification {
        design: assemble(metadata, nodes, global_vars),
        image_assets,
    }
}
