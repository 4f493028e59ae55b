//! Depth-limited, order-preserving traversal of raw node trees.
//!
//! Uses an explicit work stack so pathological nesting cannot overflow the
//! call stack. Output keeps pre-order, depth-first, source order.

use serde_json::Value;
use std::slice;

use super::node::{NodeSimplifier, SimplifiedNode};
use crate::figma::RawNode;

/// One open node on the work stack.
struct Frame<'a> {
    /// `None` for skipped nodes whose retained descendants get promoted.
    node: Option<SimplifiedNode>,
    /// Nearest retained raw ancestor of this frame's children.
    anchor: Option<RawNode<'a>>,
    children: slice::Iter<'a, Value>,
    child_depth: u32,
    collected: Vec<SimplifiedNode>,
}

impl<'a> Frame<'a> {
    fn open(
        node: Option<SimplifiedNode>,
        anchor: Option<RawNode<'a>>,
        raw: RawNode<'a>,
        child_depth: u32,
        max_depth: Option<u32>,
    ) -> Self {
        let children = if within_depth(child_depth, max_depth) {
            raw.children()
        } else {
            &[]
        };
        Self {
            node,
            anchor,
            children: children.iter(),
            child_depth,
            collected: Vec::new(),
        }
    }

    /// Finished output of this frame: the node with its children, or the
    /// promoted children of a skipped node.
    fn close(self) -> Vec<SimplifiedNode> {
        match self.node {
            Some(mut node) => {
                node.children = self.collected;
                vec![node]
            }
            None => self.collected,
        }
    }
}

/// Simplify each root and its subtree. Roots are depth 0 and always retained.
///
/// With `max_depth = Some(d)`, nodes deeper than `d` are omitted entirely.
pub fn walk<'a>(
    roots: impl IntoIterator<Item = RawNode<'a>>,
    max_depth: Option<u32>,
    simplifier: &mut NodeSimplifier,
) -> Vec<SimplifiedNode> {
    let mut forest = Vec::new();
    for root in roots {
        let node = simplifier.simplify(root, None);
        let mut stack = vec![Frame::open(Some(node), Some(root), root, 1, max_depth)];

        while let Some(top) = stack.last_mut() {
            let Some(value) = top.children.next() else {
                if let Some(frame) = stack.pop() {
                    let closed = frame.close();
                    match stack.last_mut() {
                        Some(parent) => parent.collected.extend(closed),
                        None => forest.extend(closed),
                    }
                }
                continue;
            };

            let depth = top.child_depth;
            let anchor = top.anchor;
            let Some(raw) = RawNode::from_value(value) else {
                tracing::warn!(depth, "skipping non-object child entry");
                continue;
            };

            if is_retained(&raw) {
                let node = simplifier.simplify(raw, anchor.as_ref());
                stack.push(Frame::open(Some(node), Some(raw), raw, depth + 1, max_depth));
            } else {
                tracing::trace!(id = raw.id(), kind = %raw.kind(), "flattening skipped node");
                stack.push(Frame::open(None, anchor, raw, depth + 1, max_depth));
            }
        }
    }
    forest
}

/// Locate each of `ids` below `root`, in request order. Iterative, pre-order.
pub fn find_nodes<'a>(root: RawNode<'a>, ids: &[String]) -> Vec<Option<RawNode<'a>>> {
    let mut found: Vec<Option<RawNode<'a>>> = vec![None; ids.len()];
    let mut remaining = ids.len();
    let mut stack = vec![root];

    while let Some(raw) = stack.pop() {
        for (slot, id) in found.iter_mut().zip(ids) {
            if slot.is_none() && raw.id() == id {
                *slot = Some(raw);
                remaining -= 1;
            }
        }
        if remaining == 0 {
            break;
        }
        stack.extend(raw.children().iter().rev().filter_map(RawNode::from_value));
    }
    found
}

fn within_depth(depth: u32, max_depth: Option<u32>) -> bool {
    max_depth.map_or(true, |max| depth <= max)
}

/// Invisible nodes and kinds without visual payload are skipped.
fn is_retained(raw: &RawNode<'_>) -> bool {
    raw.visible() && raw.kind().has_visual_payload()
}
