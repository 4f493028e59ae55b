//! Lenient read-only view over raw Figma nodes.
//!
//! Every accessor treats a field with an unexpected JSON type as absent, so a
//! malformed node degrades to fewer simplified fields instead of an error.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

/// Discriminant of a Figma node.
///
/// Selects which optional geometry/style fields are meaningful on a node.
/// Unknown kinds are preserved verbatim in [`NodeKind::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Document,
    Canvas,
    Frame,
    Group,
    Section,
    Component,
    ComponentSet,
    Instance,
    Rectangle,
    Ellipse,
    Line,
    Vector,
    Star,
    RegularPolygon,
    BooleanOperation,
    Text,
    Slice,
    Sticky,
    ShapeWithText,
    Connector,
    Table,
    TableCell,
    WashiTape,
    Other(String),
}

impl NodeKind {
    pub fn parse(value: &str) -> Self {
        match value {
            "DOCUMENT" => NodeKind::Document,
            "CANVAS" => NodeKind::Canvas,
            "FRAME" => NodeKind::Frame,
            "GROUP" => NodeKind::Group,
            "SECTION" => NodeKind::Section,
            "COMPONENT" => NodeKind::Component,
            "COMPONENT_SET" => NodeKind::ComponentSet,
            "INSTANCE" => NodeKind::Instance,
            "RECTANGLE" => NodeKind::Rectangle,
            "ELLIPSE" => NodeKind::Ellipse,
            "LINE" => NodeKind::Line,
            "VECTOR" => NodeKind::Vector,
            "STAR" => NodeKind::Star,
            "REGULAR_POLYGON" => NodeKind::RegularPolygon,
            "BOOLEAN_OPERATION" => NodeKind::BooleanOperation,
            "TEXT" => NodeKind::Text,
            "SLICE" => NodeKind::Slice,
            "STICKY" => NodeKind::Sticky,
            "SHAPE_WITH_TEXT" => NodeKind::ShapeWithText,
            "CONNECTOR" => NodeKind::Connector,
            "TABLE" => NodeKind::Table,
            "TABLE_CELL" => NodeKind::TableCell,
            "WASHI_TAPE" => NodeKind::WashiTape,
            other => NodeKind::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            NodeKind::Document => "DOCUMENT",
            NodeKind::Canvas => "CANVAS",
            NodeKind::Frame => "FRAME",
            NodeKind::Group => "GROUP",
            NodeKind::Section => "SECTION",
            NodeKind::Component => "COMPONENT",
            NodeKind::ComponentSet => "COMPONENT_SET",
            NodeKind::Instance => "INSTANCE",
            NodeKind::Rectangle => "RECTANGLE",
            NodeKind::Ellipse => "ELLIPSE",
            NodeKind::Line => "LINE",
            NodeKind::Vector => "VECTOR",
            NodeKind::Star => "STAR",
            NodeKind::RegularPolygon => "REGULAR_POLYGON",
            NodeKind::BooleanOperation => "BOOLEAN_OPERATION",
            NodeKind::Text => "TEXT",
            NodeKind::Slice => "SLICE",
            NodeKind::Sticky => "STICKY",
            NodeKind::ShapeWithText => "SHAPE_WITH_TEXT",
            NodeKind::Connector => "CONNECTOR",
            NodeKind::Table => "TABLE",
            NodeKind::TableCell => "TABLE_CELL",
            NodeKind::WashiTape => "WASHI_TAPE",
            NodeKind::Other(other) => other,
        }
    }

    /// Slices only mark export regions; they draw nothing.
    pub fn has_visual_payload(&self) -> bool {
        !matches!(self, NodeKind::Slice)
    }

    /// Kinds whose `characters` carry user-visible text.
    pub fn carries_text(&self) -> bool {
        matches!(
            self,
            NodeKind::Text | NodeKind::Sticky | NodeKind::ShapeWithText
        )
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for NodeKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for NodeKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(NodeKind::parse(&value))
    }
}

/// Axis-aligned box in absolute canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Borrowed view over one raw node object.
#[derive(Debug, Clone, Copy)]
pub struct RawNode<'a> {
    fields: &'a Map<String, Value>,
}

impl<'a> RawNode<'a> {
    /// Returns `None` when the value is not a JSON object.
    pub fn from_value(value: &'a Value) -> Option<Self> {
        value.as_object().map(|fields| Self { fields })
    }

    pub fn id(&self) -> &'a str {
        self.str_field("id").unwrap_or_default()
    }

    pub fn name(&self) -> &'a str {
        self.str_field("name").unwrap_or_default()
    }

    pub fn kind(&self) -> NodeKind {
        NodeKind::parse(self.str_field("type").unwrap_or("UNKNOWN"))
    }

    /// Nodes are visible unless they say otherwise.
    pub fn visible(&self) -> bool {
        self.bool_field("visible").unwrap_or(true)
    }

    pub fn children(&self) -> &'a [Value] {
        self.array_field("children").unwrap_or_default()
    }

    pub fn characters(&self) -> Option<&'a str> {
        self.str_field("characters")
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let bb = self.object_field("absoluteBoundingBox")?;
        Some(BoundingBox {
            x: bb.get("x")?.as_f64()?,
            y: bb.get("y")?.as_f64()?,
            width: bb.get("width")?.as_f64()?,
            height: bb.get("height")?.as_f64()?,
        })
    }

    /// True when this node arranges its children through auto layout.
    pub fn is_auto_layout(&self) -> bool {
        matches!(
            self.str_field("layoutMode"),
            Some("HORIZONTAL") | Some("VERTICAL")
        )
    }

    pub fn get(&self, field: &str) -> Option<&'a Value> {
        self.fields.get(field)
    }

    pub fn str_field(&self, field: &str) -> Option<&'a str> {
        self.fields.get(field).and_then(Value::as_str)
    }

    pub fn f64_field(&self, field: &str) -> Option<f64> {
        self.fields.get(field).and_then(Value::as_f64)
    }

    pub fn bool_field(&self, field: &str) -> Option<bool> {
        self.fields.get(field).and_then(Value::as_bool)
    }

    pub fn array_field(&self, field: &str) -> Option<&'a [Value]> {
        self.fields
            .get(field)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
    }

    pub fn object_field(&self, field: &str) -> Option<&'a Map<String, Value>> {
        self.fields.get(field).and_then(Value::as_object)
    }
}
