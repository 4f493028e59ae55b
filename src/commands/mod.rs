mod get;
mod images;
mod simplify;

pub use get::run_get;
pub use images::run_images;
pub use simplify::run_simplify;

use dctx_lib::{
    normalize_node_id, parse_figma_target, simplify_file, simplify_nodes, DctxError, FigmaAuth,
    FigmaClient, Simplification, SimplifyOptions,
};

use crate::cli::TargetArgs;
use crate::settings::ResolvedSettings;

/// File key plus the deduplicated, normalized node ids to fetch.
pub(crate) fn resolve_target(target: &TargetArgs) -> Result<(String, Vec<String>), DctxError> {
    let parsed = parse_figma_target(&target.file_key).map_err(|e| DctxError::Config(e.to_string()))?;

    let mut node_ids: Vec<String> = Vec::new();
    let flagged = target.node_ids.iter().map(|id| normalize_node_id(id));
    for id in parsed.node_id.into_iter().chain(flagged) {
        if !id.is_empty() && !node_ids.contains(&id) {
            node_ids.push(id);
        }
    }

    Ok((parsed.file_key, node_ids))
}

pub(crate) fn build_client(settings: &ResolvedSettings) -> Result<FigmaClient, DctxError> {
    let auth = FigmaAuth::from_env().ok_or_else(|| {
        DctxError::Config(
            "FIGMA_TOKEN or FIGMA_OAUTH_TOKEN environment variable is required".to_string(),
        )
    })?;
    FigmaClient::with_base_url_and_timeout(auth, &settings.base_url, settings.request_timeout)
}

/// `depth` query value for a request.
///
/// Whole files count from the document, one level above the pages. The nodes
/// endpoint takes positive depths only, so depth 0 fetches the full subtree
/// and the walker applies the bound.
fn api_depth(depth: Option<u32>, whole_file: bool) -> Option<u32> {
    match depth {
        Some(d) if whole_file => Some(d.saturating_add(1)),
        Some(0) => None,
        other => other,
    }
}

/// Fetch the file (or the requested nodes) and simplify it.
pub(crate) async fn fetch_and_simplify(
    client: &FigmaClient,
    file_key: &str,
    node_ids: &[String],
    depth: Option<u32>,
) -> Result<Simplification, DctxError> {
    let options = SimplifyOptions { max_depth: depth };

    if node_ids.is_empty() {
        let file = client
            .fetch_file(file_key, api_depth(depth, true))
            .await?;
        simplify_file(&file, &options)
    } else {
        let nodes = client
            .fetch_nodes(file_key, node_ids, api_depth(depth, false))
            .await?;
        simplify_nodes(&nodes, node_ids, &options)
    }
}
