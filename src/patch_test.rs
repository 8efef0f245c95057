#![allow(clippy::float_cmp)]

use serde_json::json;

use super::*;
use crate::doc::{DocStore, ItemRef};

// =============================================================
// GeometryPatch
// =============================================================

#[test]
fn geometry_patch_constructors() {
    assert_eq!(GeometryPatch::position(1.0, 2.0).x, Some(1.0));
    assert_eq!(GeometryPatch::size(40.0, 50.0).h, Some(50.0));
    assert_eq!(GeometryPatch::rotation(45.0).rotation, Some(45.0));
    assert!(GeometryPatch::default().is_empty());
    assert!(!GeometryPatch::rotation(0.0).is_empty());
}

#[test]
fn geometry_patch_apply_floors_size() {
    let mut g = Geometry { x: 0.0, y: 0.0, w: 100.0, h: 100.0, rotation: 0.0, z_index: 11 };
    GeometryPatch::size(10.0, 200.0).apply(&mut g);
    assert_eq!((g.w, g.h), (30.0, 200.0));
    assert_eq!(g.z_index, 11);
}

#[test]
fn geometry_patch_serializes_sparse_camel_case() {
    let patch = GeometryPatch { z_index: Some(12), ..GeometryPatch::default() };
    assert_eq!(serde_json::to_value(patch).unwrap(), json!({ "zIndex": 12 }));
}

// =============================================================
// ItemPatch
// =============================================================

#[test]
fn geometry_wraps_per_kind() {
    let g = GeometryPatch::position(1.0, 1.0);
    assert_eq!(ItemPatch::geometry(ItemKind::Sticker, g), Some(ItemPatch::Sticker(g)));
    assert_eq!(ItemPatch::geometry(ItemKind::FloatingImage, g), Some(ItemPatch::FloatingImage(g)));
    assert!(matches!(
        ItemPatch::geometry(ItemKind::FloatingText, g),
        Some(ItemPatch::FloatingText(TextPatch { geometry, .. })) if geometry == g
    ));
    assert_eq!(ItemPatch::geometry(ItemKind::Block, g), None);
}

#[test]
fn kind_matches_variant() {
    assert_eq!(ItemPatch::Block(BlockStylePatch::default()).kind(), ItemKind::Block);
    assert_eq!(ItemPatch::FloatingText(TextPatch::default()).kind(), ItemKind::FloatingText);
}

#[test]
fn item_patch_wire_shape() {
    let patch = ItemPatch::Sticker(GeometryPatch::position(3.0, 4.0));
    assert_eq!(
        serde_json::to_value(&patch).unwrap(),
        json!({ "type": "sticker", "changes": { "x": 3.0, "y": 4.0 } })
    );
}

// =============================================================
// from_json
// =============================================================

#[test]
fn from_json_parses_sticker_fields() {
    let patch = ItemPatch::from_json(ItemKind::Sticker, &json!({ "x": 10, "zIndex": 3, "opacity": 0.5 })).unwrap();
    let ItemPatch::Sticker(g) = patch else {
        panic!("expected sticker patch");
    };
    assert_eq!(g.x, Some(10.0));
    assert_eq!(g.z_index, Some(3));
    assert_eq!(g.opacity, Some(0.5));
    assert_eq!(g.y, None);
}

#[test]
fn from_json_parses_text_styles_and_geometry() {
    let raw = json!({
        "rotation": 15,
        "text": "hi",
        "fontWeight": "bold",
        "textAlign": "right",
        "fontFamily": "serif",
        "underline": true
    });
    let ItemPatch::FloatingText(p) = ItemPatch::from_json(ItemKind::FloatingText, &raw).unwrap() else {
        panic!("expected text patch");
    };
    assert_eq!(p.geometry.rotation, Some(15.0));
    assert_eq!(p.text.as_deref(), Some("hi"));
    assert_eq!(p.font_weight.as_deref(), Some("bold"));
    assert_eq!(p.text_align, Some(TextAlign::Right));
    assert_eq!(p.font_family.as_deref(), Some("serif"));
    assert_eq!(p.underline, Some(true));
}

#[test]
fn from_json_block_fields_are_styles() {
    let raw = json!({ "fontSize": 18, "imageHeight": 240, "x": 5 });
    let patch = ItemPatch::from_json(ItemKind::Block, &raw).unwrap();
    assert_eq!(
        patch,
        ItemPatch::Block(BlockStylePatch { font_size: Some(18.0), image_height: Some(240.0), ..BlockStylePatch::default() })
    );
}

#[test]
fn from_json_ignores_unknown_keys() {
    let patch = ItemPatch::from_json(ItemKind::FloatingImage, &json!({ "id": "nope", "foo": 1 })).unwrap();
    assert_eq!(patch, ItemPatch::FloatingImage(GeometryPatch::default()));
}

#[test]
fn from_json_rejects_event_payloads() {
    let raw = json!({ "x": 5, "nativeEvent": {}, "preventDefault": null });
    let err = ItemPatch::from_json(ItemKind::Sticker, &raw).unwrap_err();
    assert!(matches!(err, PatchError::EventPayload(_)));

    let err = ItemPatch::from_json(ItemKind::FloatingText, &json!({ "target": {} })).unwrap_err();
    assert_eq!(err, PatchError::EventPayload("target".into()));
}

#[test]
fn from_json_rejects_non_objects() {
    assert_eq!(ItemPatch::from_json(ItemKind::Sticker, &json!("x")), Err(PatchError::NotAnObject));
    assert_eq!(ItemPatch::from_json(ItemKind::Sticker, &json!([1, 2])), Err(PatchError::NotAnObject));
    assert_eq!(ItemPatch::from_json(ItemKind::Block, &json!(null)), Err(PatchError::NotAnObject));
}

#[test]
fn from_json_rejects_wrong_field_types() {
    let err = ItemPatch::from_json(ItemKind::Sticker, &json!({ "x": "left" })).unwrap_err();
    assert!(matches!(err, PatchError::InvalidField(_)));
}

#[test]
fn rejected_event_payload_leaves_item_untouched() {
    let mut doc = DocStore::new();
    let id = doc.add_floating_text();
    let item = ItemRef::new(ItemKind::FloatingText, id);
    let before = doc.clone();
    let result = ItemPatch::from_json(item.kind, &json!({ "currentTarget": {}, "text": "oops" }));
    assert!(result.is_err());
    assert_eq!(doc, before);
}
