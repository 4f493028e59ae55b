//! Compact values for style-bearing node properties.
//!
//! Each extractor returns `None` when the property is absent or carries
//! nothing visible, so node output scales with actual content. Shapes an
//! extractor does not understand are returned verbatim for interning.

use palette::Srgb;
use serde_json::{json, Map, Value};

use crate::figma::RawNode;

/// Paint types that resolve to a bitmap.
const IMAGE_PAINT: &str = "IMAGE";

/// Simplified visible `fills`, or `None` when there are none.
pub fn fills(node: &RawNode<'_>) -> Option<Value> {
    let paints = node.get("fills")?;
    match paints.as_array() {
        Some(list) => non_empty(list.iter().filter_map(simplify_paint).collect()),
        None => Some(paints.clone()),
    }
}

/// Stroke paints plus the stroke geometry that affects rendering.
pub fn strokes(node: &RawNode<'_>) -> Option<Value> {
    let paints = node.get("strokes")?;
    let colors = match paints.as_array() {
        Some(list) => list.iter().filter_map(simplify_paint).collect::<Vec<_>>(),
        None => return Some(paints.clone()),
    };
    if colors.is_empty() {
        return None;
    }

    let mut stroke = Map::new();
    stroke.insert("colors".into(), Value::Array(colors));
    for field in [
        "strokeWeight",
        "strokeAlign",
        "strokeDashes",
        "individualStrokeWeights",
    ] {
        if let Some(value) = node.get(field) {
            stroke.insert(field.into(), value.clone());
        }
    }
    Some(Value::Object(stroke))
}

/// Visible effects (shadows and blurs).
pub fn effects(node: &RawNode<'_>) -> Option<Value> {
    let effects = node.get("effects")?;
    match effects.as_array() {
        Some(list) => non_empty(
            list.iter()
                .filter(|e| is_visible(e))
                .map(simplify_effect)
                .collect(),
        ),
        None => Some(effects.clone()),
    }
}

/// Typography of a text node.
pub fn text_style(node: &RawNode<'_>) -> Option<Value> {
    let style = node.get("style")?;
    let Some(fields) = style.as_object() else {
        return Some(style.clone());
    };

    let mut text = Map::new();
    for field in [
        "fontFamily",
        "fontStyle",
        "fontWeight",
        "fontSize",
        "textCase",
        "textDecoration",
        "textAlignHorizontal",
        "textAlignVertical",
        "italic",
    ] {
        if let Some(value) = fields.get(field) {
            text.insert(field.into(), value.clone());
        }
    }

    let font_size = fields.get("fontSize").and_then(Value::as_f64);
    if let (Some(line_height), Some(size)) = (
        fields.get("lineHeightPx").and_then(Value::as_f64),
        font_size,
    ) {
        if size > 0.0 {
            text.insert(
                "lineHeight".into(),
                Value::String(format!("{}em", format_number(line_height / size))),
            );
        }
    }
    if let (Some(spacing), Some(size)) = (
        fields.get("letterSpacing").and_then(Value::as_f64),
        font_size,
    ) {
        if spacing != 0.0 && size > 0.0 {
            text.insert(
                "letterSpacing".into(),
                Value::String(format!("{}%", format_number(spacing / size * 100.0))),
            );
        }
    }

    if text.is_empty() {
        // Nothing recognized; keep the raw style rather than dropping it.
        return Some(style.clone());
    }
    Some(Value::Object(text))
}

/// Visible layout grids.
pub fn layout_grids(node: &RawNode<'_>) -> Option<Value> {
    let grids = node.get("layoutGrids")?;
    match grids.as_array() {
        Some(list) => non_empty(list.iter().filter(|g| is_visible(g)).cloned().collect()),
        None => Some(grids.clone()),
    }
}

/// CSS-like border radius: `"8px"` or `"8px 8px 0px 0px"`.
pub fn border_radius(node: &RawNode<'_>) -> Option<Value> {
    if let Some(radii) = node.array_field("rectangleCornerRadii") {
        let values: Option<Vec<f64>> = radii.iter().map(Value::as_f64).collect();
        return match values {
            Some(values) if values.len() == 4 => {
                if values.iter().all(|r| *r == values[0]) {
                    (values[0] > 0.0)
                        .then(|| Value::String(format!("{}px", format_number(values[0]))))
                } else {
                    let parts: Vec<String> = values
                        .iter()
                        .map(|r| format!("{}px", format_number(*r)))
                        .collect();
                    Some(Value::String(parts.join(" ")))
                }
            }
            _ => Some(Value::Array(radii.to_vec())),
        };
    }
    let radius = node.f64_field("cornerRadius")?;
    (radius > 0.0).then(|| Value::String(format!("{}px", format_number(radius))))
}

/// Blend mode when it differs from normal compositing.
pub fn blend_mode(node: &RawNode<'_>) -> Option<Value> {
    match node.str_field("blendMode")? {
        "PASS_THROUGH" | "NORMAL" => None,
        mode => Some(Value::String(mode.to_string())),
    }
}

/// Node opacity when not fully opaque.
pub fn opacity(node: &RawNode<'_>) -> Option<Value> {
    let opacity = node.f64_field("opacity")?;
    ((opacity - 1.0).abs() > f64::EPSILON).then(|| json!(opacity))
}

/// Resizing constraints relative to the parent.
pub fn constraints(node: &RawNode<'_>) -> Option<Value> {
    node.get("constraints").cloned()
}

/// `imageRef`s of visible image paints in a paint list.
pub fn image_refs(paints: &[Value]) -> impl Iterator<Item = &str> {
    paints
        .iter()
        .filter(|p| is_visible(p))
        .filter(|p| p.get("type").and_then(Value::as_str) == Some(IMAGE_PAINT))
        .filter_map(|p| p.get("imageRef").and_then(Value::as_str))
}

/// Simplify one paint. Invisible paints yield `None`.
pub fn simplify_paint(paint: &Value) -> Option<Value> {
    if !is_visible(paint) {
        return None;
    }
    let Some(fields) = paint.as_object() else {
        return Some(paint.clone());
    };
    let opacity = fields.get("opacity").and_then(Value::as_f64).unwrap_or(1.0);

    let simplified = match fields.get("type").and_then(Value::as_str) {
        Some("SOLID") => fields
            .get("color")
            .and_then(|c| color_string(c, opacity))
            .map(Value::String),
        Some(IMAGE_PAINT) => fields.get("imageRef").map(|image_ref| {
            let mut image = Map::new();
            image.insert("type".into(), json!(IMAGE_PAINT));
            image.insert("imageRef".into(), image_ref.clone());
            if let Some(mode) = fields.get("scaleMode") {
                image.insert("scaleMode".into(), mode.clone());
            }
            Value::Object(image)
        }),
        Some(kind) if kind.starts_with("GRADIENT_") => gradient(kind, fields, opacity),
        _ => None,
    };

    if simplified.is_none() {
        tracing::debug!(paint = %paint, "passing through unrecognized paint");
    }
    Some(simplified.unwrap_or_else(|| paint.clone()))
}

fn gradient(kind: &str, fields: &Map<String, Value>, opacity: f64) -> Option<Value> {
    let stops = fields
        .get("gradientStops")?
        .as_array()?
        .iter()
        .map(|stop| {
            Some(json!({
                "position": stop.get("position")?.as_f64()?,
                "color": color_string(stop.get("color")?, opacity)?,
            }))
        })
        .collect::<Option<Vec<_>>>()?;

    let mut gradient = Map::new();
    gradient.insert("type".into(), json!(kind));
    gradient.insert("stops".into(), Value::Array(stops));
    if let Some(handles) = fields.get("gradientHandlePositions") {
        gradient.insert("handles".into(), handles.clone());
    }
    Some(Value::Object(gradient))
}

fn simplify_effect(effect: &Value) -> Value {
    let Some(fields) = effect.as_object() else {
        return effect.clone();
    };
    let kind = fields.get("type").and_then(Value::as_str);
    let mut simplified = Map::new();
    match kind {
        Some("DROP_SHADOW") | Some("INNER_SHADOW") => {
            simplified.insert("type".into(), json!(kind));
            if let Some(color) = fields.get("color").and_then(|c| color_string(c, 1.0)) {
                simplified.insert("color".into(), Value::String(color));
            }
            for field in ["offset", "radius", "spread", "showShadowBehindNode"] {
                if let Some(value) = fields.get(field) {
                    simplified.insert(field.into(), value.clone());
                }
            }
        }
        Some("LAYER_BLUR") | Some("BACKGROUND_BLUR") => {
            simplified.insert("type".into(), json!(kind));
            if let Some(radius) = fields.get("radius") {
                simplified.insert("radius".into(), radius.clone());
            }
        }
        _ => return effect.clone(),
    }
    Value::Object(simplified)
}

/// `#rrggbb` for opaque colors, `rgba(r, g, b, a)` otherwise.
pub fn color_string(color: &Value, opacity: f64) -> Option<String> {
    let channel = |name: &str| color.get(name).and_then(Value::as_f64);
    let (r, g, b) = (channel("r")?, channel("g")?, channel("b")?);
    let alpha = (channel("a").unwrap_or(1.0) * opacity).clamp(0.0, 1.0);

    let rgb: Srgb<u8> = Srgb::new(
        r.clamp(0.0, 1.0) as f32,
        g.clamp(0.0, 1.0) as f32,
        b.clamp(0.0, 1.0) as f32,
    )
    .into_format();

    if alpha >= 1.0 {
        Some(format!("#{:02x}{:02x}{:02x}", rgb.red, rgb.green, rgb.blue))
    } else {
        Some(format!(
            "rgba({}, {}, {}, {})",
            rgb.red,
            rgb.green,
            rgb.blue,
            format_number(alpha)
        ))
    }
}

/// Two-decimal rendering without trailing zeros (`1.5`, `8`, `0.33`).
pub fn format_number(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    let text = format!("{:.2}", rounded);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}

fn is_visible(value: &Value) -> bool {
    value.get("visible").and_then(Value::as_bool).unwrap_or(true)
}

fn non_empty(values: Vec<Value>) -> Option<Value> {
    (!values.is_empty()).then_some(Value::Array(values))
}
