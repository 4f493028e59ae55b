//! Layout and geometry extraction.
//!
//! Auto-layout containers and their children are described by the rules that
//! place them (mode, alignment, gap, padding, sizing). Free-positioned nodes
//! keep a position relative to their nearest retained ancestor.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::style::format_number;
use crate::figma::RawNode;

/// Minimal box needed to reconstruct a node's placement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    pub width: f64,
    pub height: f64,
}

/// Layout rules of a node, interned under the `layout` property.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutRules {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wrap: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub justify_content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub align_items: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gap: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub padding: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sizing: Option<Sizing>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub align_self: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grow: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overflow: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sizing {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub horizontal: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vertical: Option<String>,
}

impl LayoutRules {
    pub fn is_empty(&self) -> bool {
        *self == LayoutRules::default()
    }
}

/// Layout rules for `node`, or `None` when it neither arranges children nor
/// is sized/positioned by an auto-layout parent.
pub fn layout_rules(node: &RawNode<'_>) -> Option<Value> {
    let mut rules = LayoutRules::default();

    if node.is_auto_layout() {
        rules.mode = match node.str_field("layoutMode") {
            Some("HORIZONTAL") => Some("row".into()),
            Some("VERTICAL") => Some("column".into()),
            _ => None,
        };
        rules.wrap = (node.str_field("layoutWrap") == Some("WRAP")).then_some(true);
        rules.justify_content = node
            .str_field("primaryAxisAlignItems")
            .and_then(axis_alignment);
        rules.align_items = node
            .str_field("counterAxisAlignItems")
            .and_then(axis_alignment);
        rules.gap = node
            .f64_field("itemSpacing")
            .filter(|gap| *gap != 0.0)
            .map(|gap| format!("{}px", format_number(gap)));
        rules.padding = padding(node);
    }

    let sizing = Sizing {
        horizontal: node.str_field("layoutSizingHorizontal").map(sizing_mode),
        vertical: node.str_field("layoutSizingVertical").map(sizing_mode),
    };
    if sizing != Sizing::default() {
        rules.sizing = Some(sizing);
    }
    rules.align_self = (node.str_field("layoutAlign") == Some("STRETCH")).then(|| "stretch".into());
    rules.grow = node.f64_field("layoutGrow").filter(|grow| *grow > 0.0);
    rules.position =
        (node.str_field("layoutPositioning") == Some("ABSOLUTE")).then(|| "absolute".into());
    rules.overflow = match node.str_field("overflowDirection") {
        Some("HORIZONTAL_SCROLLING") => Some("scroll-x".into()),
        Some("VERTICAL_SCROLLING") => Some("scroll-y".into()),
        Some("HORIZONTAL_AND_VERTICAL_SCROLLING") => Some("scroll".into()),
        _ => None,
    };

    if rules.is_empty() {
        return None;
    }
    serde_json::to_value(rules).ok()
}

/// Size of `node` plus its position relative to `anchor`.
///
/// Position is omitted when the anchor lays children out automatically and
/// the node is not absolutely positioned inside it. Roots keep absolute
/// coordinates.
pub fn geometry(node: &RawNode<'_>, anchor: Option<&RawNode<'_>>) -> Option<Geometry> {
    let bb = node.bounding_box()?;
    let absolute = node.str_field("layoutPositioning") == Some("ABSOLUTE");

    let (x, y) = match anchor {
        None => (Some(bb.x), Some(bb.y)),
        Some(parent) if parent.is_auto_layout() && !absolute => (None, None),
        Some(parent) => match parent.bounding_box() {
            Some(origin) => (Some(bb.x - origin.x), Some(bb.y - origin.y)),
            None => (Some(bb.x), Some(bb.y)),
        },
    };

    Some(Geometry {
        x: x.map(round2),
        y: y.map(round2),
        width: round2(bb.width),
        height: round2(bb.height),
    })
}

fn axis_alignment(value: &str) -> Option<String> {
    let css = match value {
        "MIN" => "flex-start",
        "MAX" => "flex-end",
        "CENTER" => "center",
        "SPACE_BETWEEN" => "space-between",
        "BASELINE" => "baseline",
        _ => return None,
    };
    Some(css.to_string())
}

fn sizing_mode(value: &str) -> String {
    match value {
        "FIXED" => "fixed".to_string(),
        "HUG" => "hug".to_string(),
        "FILL" => "fill".to_string(),
        other => other.to_ascii_lowercase(),
    }
}

/// CSS shorthand padding, `None` when all sides are zero.
fn padding(node: &RawNode<'_>) -> Option<String> {
    let side = |field: &str| node.f64_field(field).unwrap_or(0.0);
    let (top, right, bottom, left) = (
        side("paddingTop"),
        side("paddingRight"),
        side("paddingBottom"),
        side("paddingLeft"),
    );
    if top == 0.0 && right == 0.0 && bottom == 0.0 && left == 0.0 {
        return None;
    }
    let px = |v: f64| format!("{}px", format_number(v));
    let text = if top == bottom && left == right {
        if top == left {
            px(top)
        } else {
            format!("{} {}", px(top), px(right))
        }
    } else {
        format!("{} {} {} {}", px(top), px(right), px(bottom), px(left))
    };
    Some(text)
}

fn round2(value: f64) -> f64 {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}
