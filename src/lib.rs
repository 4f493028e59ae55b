//! Design Context (dctx) Library
//!
//! Turns raw Figma REST payloads into compact, LLM-friendly designs: a
//! depth-limited node forest whose style values live once in a
//! content-addressed global variable table.
//!
//! # Module Overview
//!
//! - [`simplify`] - Tree walking, style extraction and global-variable dedup
//! - [`figma`] - Figma payload types and the lenient raw node view
//! - [`figma_client`] - Figma REST client (files, nodes, image fills)
//! - [`assets`] - Image fill download
//! - [`config`] - Configuration file support
//! - [`output`] - Output formats and schemas
//! - [`resource`] - Figma URL / file key parsing
//!
//! # Example
//!
//! ```no_run
//! use dctx_lib::{simplify_nodes, FigmaAuth, FigmaClient, SimplifyOptions};
//!
//! # async fn example() -> dctx_lib::Result<()> {
//! let client = FigmaClient::new(FigmaAuth::PersonalAccessToken("token".into()))?;
//! let ids = vec!["12:34".to_string()];
//! let response = client.fetch_nodes("FILE_KEY", &ids, Some(3)).await?;
//!
//! let result = simplify_nodes(&response, &ids, &SimplifyOptions { max_depth: Some(3) })?;
//! println!("{}", serde_json::to_string_pretty(&result.design)?);
//! # Ok(())
//! # }
//! ```

pub mod assets;
pub mod config;
pub mod error;
pub mod figma;
pub mod figma_client;
pub mod output;
pub mod resource;
pub mod simplify;

pub use assets::{download_image_assets, group_image_refs, AssetDownload, AssetOutcome};
pub use config::Config;
pub use error::{DctxError, Result};
pub use figma::{
    parse_payload, FigmaFileResponse, FigmaImageFillsResponse, FigmaNodesResponse, NodeKind, RawNode,
    RawResponse,
};
pub use figma_client::{FigmaAuth, FigmaClient};
pub use output::{ErrorOutput, ImagesOutput, OutputFormat, DCTX_OUTPUT_VERSION};
pub use resource::{normalize_node_id, parse_figma_target, FigmaTarget};
pub use simplify::{
    simplify_file, simplify_nodes, simplify_response, GlobalVariableTable, ImageAssetReference,
    Metadata, SimplifiedDesign, SimplifiedNode, Simplification, SimplifyOptions, StyleCategory,
    StyleKey, StyleProperty,
};
