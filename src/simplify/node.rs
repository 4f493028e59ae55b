//! Per-node simplification.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};

use super::globals::{GlobalVariableTable, StyleCategory, StyleKey};
use super::layout::{self, Geometry};
use super::style;
use crate::figma::{NodeKind, RawNode};

/// Names under which style keys appear on a simplified node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StyleProperty {
    Layout,
    Fills,
    Strokes,
    Effects,
    TextStyle,
    LayoutGrids,
    BorderRadius,
    BlendMode,
    Opacity,
    Constraints,
}

impl StyleProperty {
    pub const ALL: [StyleProperty; 10] = [
        StyleProperty::Layout,
        StyleProperty::Fills,
        StyleProperty::Strokes,
        StyleProperty::Effects,
        StyleProperty::TextStyle,
        StyleProperty::LayoutGrids,
        StyleProperty::BorderRadius,
        StyleProperty::BlendMode,
        StyleProperty::Opacity,
        StyleProperty::Constraints,
    ];

    pub fn category(&self) -> StyleCategory {
        match self {
            StyleProperty::Layout => StyleCategory::Layout,
            StyleProperty::Fills => StyleCategory::Fill,
            StyleProperty::Strokes => StyleCategory::Stroke,
            StyleProperty::Effects => StyleCategory::Effect,
            StyleProperty::TextStyle => StyleCategory::Text,
            StyleProperty::LayoutGrids => StyleCategory::Grid,
            StyleProperty::BorderRadius => StyleCategory::Radius,
            StyleProperty::BlendMode => StyleCategory::Blend,
            StyleProperty::Opacity => StyleCategory::Opacity,
            StyleProperty::Constraints => StyleCategory::Constraints,
        }
    }

    fn extract(&self, node: &RawNode<'_>) -> Option<Value> {
        match self {
            StyleProperty::Layout => layout::layout_rules(node),
            StyleProperty::Fills => style::fills(node),
            StyleProperty::Strokes => style::strokes(node),
            StyleProperty::Effects => style::effects(node),
            StyleProperty::TextStyle => style::text_style(node),
            StyleProperty::LayoutGrids => style::layout_grids(node),
            StyleProperty::BorderRadius => style::border_radius(node),
            StyleProperty::BlendMode => style::blend_mode(node),
            StyleProperty::Opacity => style::opacity(node),
            StyleProperty::Constraints => style::constraints(node),
        }
    }
}

/// A compact node: hierarchy, geometry and keys into the global variable table.
///
/// Never embeds a style value; every style-bearing property is a [`StyleKey`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimplifiedNode {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Geometry>,
    #[serde(flatten)]
    pub styles: BTreeMap<StyleProperty, StyleKey>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component_id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub component_properties: Vec<ComponentProperty>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SimplifiedNode>,
}

impl SimplifiedNode {
    pub fn style(&self, property: StyleProperty) -> Option<&StyleKey> {
        self.styles.get(&property)
    }

    /// Pre-order iterator over this node and its descendants.
    pub fn descendants(&self) -> Vec<&SimplifiedNode> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(node.children.iter().rev());
        }
        out
    }
}

/// One instance-level component property value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentProperty {
    pub name: String,
    pub value: Value,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Where an image reference was found on a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageSource {
    Fill,
    Background,
}

/// Pointer from a node to a bitmap, resolved by the asset pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageAssetReference {
    pub node_id: String,
    pub image_ref: String,
    pub source: ImageSource,
}

/// Simplifies nodes one at a time, owning the run's table and image references.
#[derive(Debug, Default)]
pub struct NodeSimplifier {
    globals: GlobalVariableTable,
    image_assets: Vec<ImageAssetReference>,
    seen_assets: HashSet<(String, String)>,
}

impl NodeSimplifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simplify `raw` without its children; the walker attaches those.
    ///
    /// `anchor` is the nearest retained ancestor, used for relative geometry.
    pub fn simplify(&mut self, raw: RawNode<'_>, anchor: Option<&RawNode<'_>>) -> SimplifiedNode {
        let kind = raw.kind();

        let mut styles = BTreeMap::new();
        for property in StyleProperty::ALL {
            if let Some(value) = property.extract(&raw) {
                let key = self.globals.intern(property.category(), &value);
                styles.insert(property, key);
            }
        }
        self.collect_image_assets(&raw);

        let (component_id, component_properties) = if kind == NodeKind::Instance {
            (
                raw.str_field("componentId").map(str::to_string),
                component_properties(&raw),
            )
        } else {
            (None, Vec::new())
        };

        SimplifiedNode {
            id: raw.id().to_string(),
            name: raw.name().to_string(),
            text: kind
                .carries_text()
                .then(|| raw.characters().map(str::to_string))
                .flatten(),
            geometry: layout::geometry(&raw, anchor),
            styles,
            component_id,
            component_properties,
            children: Vec::new(),
            kind,
        }
    }

    /// Hand back the table and the image references collected so far.
    pub fn finish(self) -> (GlobalVariableTable, Vec<ImageAssetReference>) {
        (self.globals, self.image_assets)
    }

    pub fn globals(&self) -> &GlobalVariableTable {
        &self.globals
    }

    fn collect_image_assets(&mut self, raw: &RawNode<'_>) {
        for (field, source) in [
            ("fills", ImageSource::Fill),
            ("background", ImageSource::Background),
        ] {
            let Some(paints) = raw.array_field(field) else {
                continue;
            };
            for image_ref in style::image_refs(paints) {
                let seen = (raw.id().to_string(), image_ref.to_string());
                if self.seen_assets.insert(seen) {
                    self.image_assets.push(ImageAssetReference {
                        node_id: raw.id().to_string(),
                        image_ref: image_ref.to_string(),
                        source,
                    });
                }
            }
        }
    }
}

fn component_properties(raw: &RawNode<'_>) -> Vec<ComponentProperty> {
    let Some(props) = raw.object_field("componentProperties") else {
        return Vec::new();
    };
    props
        .iter()
        .map(|(name, prop)| ComponentProperty {
            name: name.clone(),
            value: prop.get("value").cloned().unwrap_or(Value::Null),
            kind: prop
                .get("type")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn red_fill() -> Value {
        json!([{ "type": "SOLID", "color": { "r": 1, "g": 0, "b": 0, "a": 1 } }])
    }

    #[test]
    fn simplify_copies_identity_and_interns_styles() {
        let raw = json!({
            "id": "1:2",
            "name": "Button",
            "type": "RECTANGLE",
            "fills": red_fill(),
            "cornerRadius": 4,
            "absoluteBoundingBox": { "x": 0, "y": 0, "width": 80, "height": 32 }
        });
        let mut simplifier = NodeSimplifier::new();
        let node = simplifier.simplify(RawNode::from_value(&raw).unwrap(), None);

        assert_eq!(node.id, "1:2");
        assert_eq!(node.name, "Button");
        assert_eq!(node.kind, NodeKind::Rectangle);
        let fill = node.style(StyleProperty::Fills).expect("fill key");
        assert_eq!(simplifier.globals().get(fill), Some(&json!(["#ff0000"])));
        assert!(node.style(StyleProperty::BorderRadius).is_some());
        assert!(node.children.is_empty());
    }

    #[test]
    fn absent_properties_are_not_defaulted() {
        let raw = json!({ "id": "1:3", "name": "Bare", "type": "GROUP" });
        let mut simplifier = NodeSimplifier::new();
        let node = simplifier.simplify(RawNode::from_value(&raw).unwrap(), None);

        assert!(node.styles.is_empty());
        assert!(node.geometry.is_none());
        assert!(simplifier.globals().is_empty());
        let rendered = serde_json::to_value(&node).unwrap();
        assert_eq!(rendered, json!({ "id": "1:3", "name": "Bare", "type": "GROUP" }));
    }

    #[test]
    fn serialized_node_carries_keys_not_values() {
        let raw = json!({ "id": "1:4", "name": "Swatch", "type": "RECTANGLE", "fills": red_fill() });
        let mut simplifier = NodeSimplifier::new();
        let node = simplifier.simplify(RawNode::from_value(&raw).unwrap(), None);

        let rendered = serde_json::to_value(&node).unwrap();
        let key = rendered["fills"].as_str().expect("fills rendered as key");
        assert!(key.starts_with("fill_"));
    }

    #[test]
    fn text_nodes_keep_characters() {
        let raw = json!({ "id": "2:1", "name": "Title", "type": "TEXT", "characters": "Hello", "style": { "fontSize": 20 } });
        let mut simplifier = NodeSimplifier::new();
        let node = simplifier.simplify(RawNode::from_value(&raw).unwrap(), None);

        assert_eq!(node.text.as_deref(), Some("Hello"));
        assert!(node.style(StyleProperty::TextStyle).is_some());
    }

    #[test]
    fn image_fills_and_backgrounds_are_recorded_once() {
        let image = json!([{ "type": "IMAGE", "imageRef": "img-1", "scaleMode": "FILL" }]);
        let raw = json!({
            "id": "3:1",
            "name": "Hero",
            "type": "FRAME",
            "fills": image.clone(),
            "background": image
        });
        let mut simplifier = NodeSimplifier::new();
        let node = simplifier.simplify(RawNode::from_value(&raw).unwrap(), None);
        let (globals, assets) = simplifier.finish();

        assert_eq!(
            assets,
            vec![ImageAssetReference {
                node_id: "3:1".into(),
                image_ref: "img-1".into(),
                source: ImageSource::Fill,
            }]
        );
        let fill = node.style(StyleProperty::Fills).unwrap();
        assert_eq!(globals.get(fill).unwrap()[0]["imageRef"], json!("img-1"));
    }

    #[test]
    fn instances_keep_component_reference() {
        let raw = json!({
            "id": "4:1",
            "name": "Button/Primary",
            "type": "INSTANCE",
            "componentId": "10:5",
            "componentProperties": {
                "Label#1:0": { "type": "TEXT", "value": "Buy" }
            }
        });
        let mut simplifier = NodeSimplifier::new();
        let node = simplifier.simplify(RawNode::from_value(&raw).unwrap(), None);

        assert_eq!(node.component_id.as_deref(), Some("10:5"));
        assert_eq!(node.component_properties.len(), 1);
        assert_eq!(node.component_properties[0].value, json!("Buy"));
        assert_eq!(node.component_properties[0].kind, "TEXT");
    }

    #[test]
    fn malformed_style_fields_do_not_abort() {
        let raw = json!({
            "id": "5:1",
            "name": "Odd",
            "type": "RECTANGLE",
            "fills": "not-a-list",
            "effects": [42],
            "absoluteBoundingBox": { "x": "zero" }
        });
        let mut simplifier = NodeSimplifier::new();
        let node = simplifier.simplify(RawNode::from_value(&raw).unwrap(), None);

        let fill = node.style(StyleProperty::Fills).unwrap();
        assert_eq!(simplifier.globals().get(fill), Some(&json!("not-a-list")));
        let effects = node.style(StyleProperty::Effects).unwrap();
        assert_eq!(simplifier.globals().get(effects), Some(&json!([42])));
        assert!(node.geometry.is_none());
    }
}
