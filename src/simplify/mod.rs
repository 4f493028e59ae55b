//! Design-tree simplification and global-variable extraction.
//!
//! A raw Figma payload is turned into a [`SimplifiedDesign`]:
//! - [`Metadata`] of the containing document
//! - a depth-limited forest of [`SimplifiedNode`]s
//! - a [`GlobalVariableTable`] holding every style value once, keyed by content
//!
//! Each call to [`simplify_file`] or [`simplify_nodes`] owns its own table.

pub mod design;
pub mod globals;
pub mod layout;
pub mod metadata;
pub mod node;
pub mod style;
pub mod walker;

#[cfg(test)]
mod tests;

pub use design::{
    assemble, simplify_file, simplify_nodes, simplify_response, SimplifiedDesign, Simplification,
    SimplifyOptions,
};
pub use globals::{GlobalVariableTable, StyleCategory, StyleKey};
pub use layout::Geometry;
pub use metadata::{extract_file_metadata, extract_nodes_metadata, ComponentSummary, Metadata};
pub use node::{
    ComponentProperty, ImageAssetReference, ImageSource, NodeSimplifier, SimplifiedNode,
    StyleProperty,
};
pub use walker::{find_nodes, walk};
