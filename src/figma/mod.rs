//! Figma payload types.
//!
//! This module provides:
//! - API response types for parsing Figma JSON responses
//! - [`RawNode`] - a lenient view over one raw node
//! - [`NodeKind`] - the tagged node-kind discriminant

pub mod api_types;
pub mod raw;


pub use api_types::{
    parse_payload, FigmaFileResponse, FigmaImageFillsResponse, FigmaNodeContainer, FigmaNodesResponse,
    RawResponse,
};
pub use raw::{BoundingBox, NodeKind, RawNode};
