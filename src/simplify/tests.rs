//! End-to-end tests for the simplification engine.

#[cfg(test)]
mod tests {
    use crate::figma::{FigmaFileResponse, FigmaNodesResponse, RawResponse};
    use crate::simplify::{
        simplify_file, simplify_nodes, simplify_response, ImageSource, SimplifiedNode,
        SimplifyOptions, StyleCategory, StyleProperty,
    };
    use crate::DctxError;
    use serde_json::{json, Value};

    fn solid(r: f64, g: f64, b: f64) -> Value {
        json!([{ "type": "SOLID", "color": { "r": r, "g": g, "b": b, "a": 1.0 } }])
    }

    fn file(document: Value) -> FigmaFileResponse {
        serde_json::from_value(json!({
            "name": "Checkout",
            "lastModified": "2024-03-01T10:00:00Z",
            "version": "42",
            "document": document
        }))
        .expect("file response")
    }

    fn page(children: Value) -> Value {
        json!({
            "id": "0:0",
            "name": "Document",
            "type": "DOCUMENT",
            "children": [{ "id": "0:1", "name": "Page 1", "type": "CANVAS", "children": children }]
        })
    }

    fn depth_of(nodes: &[SimplifiedNode], depth: u32, out: &mut Vec<(String, u32)>) {
        for node in nodes {
            out.push((node.id.clone(), depth));
            depth_of(&node.children, depth + 1, out);
        }
    }

    #[test]
    fn structurally_equal_fills_share_one_key_across_nodes() {
        let doc = page(json!([
            { "id": "1", "name": "a", "type": "RECTANGLE", "fills": solid(0.2, 0.4, 0.6) },
            { "id": "2", "name": "b", "type": "FRAME", "children": [
                // Same color, different field order and float noise.
                { "id": "3", "name": "c", "type": "RECTANGLE",
                  "fills": [{ "color": { "a": 1, "b": 0.6000000001, "g": 0.4, "r": 0.2 }, "type": "SOLID" }] }
            ]}
        ]));
        let result = simplify_file(&file(doc), &SimplifyOptions::default()).unwrap();
        let canvas = &result.design.nodes()[0];

        let a = canvas.children[0].style(StyleProperty::Fills).unwrap();
        let c = canvas.children[1].children[0].style(StyleProperty::Fills).unwrap();
        assert_eq!(a, c);
        assert_eq!(result.design.global_vars().count_category(StyleCategory::Fill), 1);
    }

    #[test]
    fn equal_values_on_different_properties_share_one_entry() {
        let doc = page(json!([
            { "id": "1", "name": "odd", "type": "RECTANGLE",
              "fills": { "r": 1 }, "strokes": { "r": 1 } }
        ]));
        let result = simplify_file(&file(doc), &SimplifyOptions::default()).unwrap();
        let rect = &result.design.nodes()[0].children[0];

        let fill = rect.style(StyleProperty::Fills).unwrap();
        let stroke = rect.style(StyleProperty::Strokes).unwrap();
        assert_eq!(fill, stroke);
        assert_eq!(result.design.global_vars().len(), 1);
    }

    #[test]
    fn depth_bound_holds_for_whole_files() {
        let doc = page(json!([
            { "id": "1", "name": "a", "type": "FRAME", "children": [
                { "id": "2", "name": "b", "type": "FRAME", "children": [
                    { "id": "3", "name": "c", "type": "RECTANGLE" }
                ]}
            ]}
        ]));
        for max in 0..4 {
            let options = SimplifyOptions { max_depth: Some(max) };
            let result = simplify_file(&file(doc.clone()), &options).unwrap();
            let mut depths = Vec::new();
            depth_of(result.design.nodes(), 0, &mut depths);
            assert!(depths.iter().all(|(_, d)| *d <= max), "max {max}: {depths:?}");
            assert_eq!(depths.len() as u32, max + 1);
        }
    }

    #[test]
    fn whole_file_forest_roots_are_pages() {
        let result = simplify_file(&file(page(json!([]))), &SimplifyOptions::default()).unwrap();
        let ids: Vec<_> = result.design.nodes().iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["0:1"]);
        assert_eq!(result.design.metadata().name, "Checkout");
    }

    #[test]
    fn missing_document_fails_fast() {
        let empty: FigmaFileResponse = serde_json::from_value(json!({ "name": "x" })).unwrap();
        let err = simplify_file(&empty, &SimplifyOptions::default()).unwrap_err();
        assert!(matches!(err, DctxError::Untraversable(_)));
    }

    fn nodes_response() -> FigmaNodesResponse {
        serde_json::from_value(json!({
            "name": "Checkout",
            "lastModified": "2024-03-01T10:00:00Z",
            "thumbnailUrl": "https://example.com/t.png",
            "nodes": {
                "12:34": {
                    "document": {
                        "id": "12:34", "name": "Payment form", "type": "FRAME",
                        "layoutMode": "VERTICAL", "itemSpacing": 8,
                        "absoluteBoundingBox": { "x": 100, "y": 100, "width": 320, "height": 200 },
                        "children": [
                            { "id": "12:35", "name": "Card", "type": "RECTANGLE",
                              "fills": [{ "type": "IMAGE", "imageRef": "card-bg", "scaleMode": "FILL" }],
                              "absoluteBoundingBox": { "x": 100, "y": 100, "width": 320, "height": 120 } }
                        ]
                    },
                    "components": {}
                },
                "99:1": null
            }
        }))
        .expect("nodes response")
    }

    #[test]
    fn node_scoped_roots_match_request_and_metadata_matches_document() {
        let response = nodes_response();
        let result =
            simplify_nodes(&response, &["12:34".to_string()], &SimplifyOptions::default()).unwrap();

        let roots = result.design.nodes();
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].id, "12:34");
        let meta = result.design.metadata();
        assert_eq!(meta.name, "Checkout");
        assert_ne!(meta.name, roots[0].name);
        assert_eq!(meta.requested_nodes, vec!["12:34"]);
        assert_eq!(meta.thumbnail_url.as_deref(), Some("https://example.com/t.png"));
    }

    #[test]
    fn node_scoped_children_of_auto_layout_drop_position() {
        let response = nodes_response();
        let result =
            simplify_nodes(&response, &["12:34".to_string()], &SimplifyOptions::default()).unwrap();
        let root = &result.design.nodes()[0];

        let root_geo = root.geometry.unwrap();
        assert_eq!((root_geo.x, root_geo.y), (Some(100.0), Some(100.0)));
        let child_geo = root.children[0].geometry.unwrap();
        assert_eq!((child_geo.x, child_geo.y), (None, None));
        assert!(root.style(StyleProperty::Layout).is_some());
    }

    #[test]
    fn image_fills_are_handed_over_not_resolved() {
        let response = nodes_response();
        let result =
            simplify_nodes(&response, &["12:34".to_string()], &SimplifyOptions::default()).unwrap();

        assert_eq!(result.image_assets.len(), 1);
        assert_eq!(result.image_assets[0].node_id, "12:35");
        assert_eq!(result.image_assets[0].image_ref, "card-bg");
        assert_eq!(result.image_assets[0].source, ImageSource::Fill);
    }

    #[test]
    fn missing_or_null_requested_node_fails_fast() {
        let response = nodes_response();
        for id in ["99:1", "5:5"] {
            let err = simplify_nodes(&response, &[id.to_string()], &SimplifyOptions::default())
                .unwrap_err();
            match err {
                DctxError::Untraversable(msg) => assert!(msg.contains(id)),
                other => panic!("expected untraversable error, got {other:?}"),
            }
        }
        assert!(simplify_nodes(&response, &[], &SimplifyOptions::default()).is_err());
    }

    #[test]
    fn each_run_owns_its_table() {
        let response = nodes_response();
        let first =
            simplify_nodes(&response, &["12:34".to_string()], &SimplifyOptions::default()).unwrap();
        let other = simplify_file(
            &file(page(json!([{ "id": "1", "name": "x", "type": "RECTANGLE", "fills": solid(0.0, 1.0, 0.0) }]))),
            &SimplifyOptions::default(),
        )
        .unwrap();

        let green = other.design.nodes()[0].children[0]
            .style(StyleProperty::Fills)
            .unwrap();
        assert!(!first.design.global_vars().contains(green));
    }

    #[test]
    fn raw_response_without_ids_uses_every_present_node() {
        let raw = RawResponse::from_value(json!({
            "name": "Checkout",
            "nodes": {
                "2:1": { "document": { "id": "2:1", "name": "b", "type": "FRAME" } },
                "1:1": { "document": { "id": "1:1", "name": "a", "type": "FRAME" } },
                "3:1": null
            }
        }))
        .unwrap();

        let result = simplify_response(&raw, &[], &SimplifyOptions::default()).unwrap();
        let ids: Vec<_> = result.design.nodes().iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["1:1", "2:1"]);
    }

    #[test]
    fn raw_file_with_ids_roots_at_found_nodes() {
        let doc = page(json!([
            { "id": "1", "name": "a", "type": "FRAME", "children": [
                { "id": "1.1", "name": "inner", "type": "RECTANGLE",
                  "absoluteBoundingBox": { "x": 40, "y": 50, "width": 10, "height": 10 } }
            ]}
        ]));
        let raw = RawResponse::File(file(doc));

        let result =
            simplify_response(&raw, &["1.1".to_string()], &SimplifyOptions::default()).unwrap();
        let root = &result.design.nodes()[0];
        assert_eq!(root.id, "1.1");
        assert_eq!(root.geometry.unwrap().x, Some(40.0));
        assert_eq!(result.design.metadata().requested_nodes, vec!["1.1"]);

        let err = simplify_response(&raw, &["nope".to_string()], &SimplifyOptions::default())
            .unwrap_err();
        assert!(matches!(err, DctxError::Untraversable(msg) if msg.contains("nope")));
    }

    #[test]
    fn serialized_design_splits_into_three_sections() {
        let response = nodes_response();
        let result =
            simplify_nodes(&response, &["12:34".to_string()], &SimplifyOptions::default()).unwrap();
        let rendered = serde_json::to_value(&result.design).unwrap();

        let mut sections: Vec<_> = rendered.as_object().unwrap().keys().cloned().collect();
        sections.sort();
        assert_eq!(sections, vec!["globalVars", "metadata", "nodes"]);
        assert!(rendered["globalVars"]["styles"].is_object());

        let (metadata, nodes, globals) = result.design.into_parts();
        assert_eq!(metadata.name, "Checkout");
        assert_eq!(nodes.len(), 1);
        assert!(!globals.is_empty());
    }
}
