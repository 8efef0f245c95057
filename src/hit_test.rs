#![allow(clippy::float_cmp)]

use uuid::Uuid;

use super::*;
use crate::doc::{BlockKind, ZDirection};
use crate::patch::{GeometryPatch, ItemPatch};
use crate::render::layout_blocks;

const EPSILON: f64 = 1e-9;

fn sticker_doc() -> (DocStore, ItemRef) {
    let mut doc = DocStore::new();
    let id = doc.add_sticker("a.png", 0.0);
    (doc, ItemRef::new(ItemKind::Sticker, id))
}

// =============================================================
// Local frame
// =============================================================

#[test]
fn to_local_unrotated_is_offset_from_center() {
    let g = Geometry { x: 0.0, y: 0.0, w: 100.0, h: 50.0, rotation: 0.0, z_index: 0 };
    let p = to_local(Point::new(60.0, 30.0), &g);
    assert!((p.x - 10.0).abs() < EPSILON);
    assert!((p.y - 5.0).abs() < EPSILON);
}

#[test]
fn to_local_undoes_rotation() {
    let g = Geometry { x: 0.0, y: 0.0, w: 100.0, h: 100.0, rotation: 90.0, z_index: 0 };
    // A quarter turn clockwise carries the local top-center (0, -50) to the right of center.
    let p = to_local(Point::new(100.0, 50.0), &g);
    assert!(p.x.abs() < EPSILON);
    assert!((p.y + 50.0).abs() < EPSILON);
}

#[test]
fn handle_locals() {
    let g = Geometry { x: 0.0, y: 0.0, w: 80.0, h: 40.0, rotation: 0.0, z_index: 0 };
    assert_eq!(resize_handle_local(&g), Point::new(40.0, 20.0));
    assert_eq!(rotate_handle_local(&g, 24.0), Point::new(0.0, -44.0));
}

// =============================================================
// Free items
// =============================================================

#[test]
fn body_hit_inside_item() {
    let (doc, item) = sticker_doc();
    let hit = hit_test(Point::new(400.0, 350.0), &doc, &[], &Camera::default(), None, true);
    assert_eq!(hit, Some(Hit { item, part: HitPart::Body }));
}

#[test]
fn miss_is_background() {
    let (doc, _) = sticker_doc();
    assert_eq!(hit_test(Point::new(10.0, 10.0), &doc, &[], &Camera::default(), None, true), None);
}

#[test]
fn rotated_item_hit_uses_local_frame() {
    let mut doc = DocStore::new();
    let id = doc.add_floating_text();
    let item = ItemRef::new(ItemKind::FloatingText, id);
    let turn = ItemPatch::geometry(ItemKind::FloatingText, GeometryPatch::rotation(90.0)).unwrap();
    doc.update_item(item, &turn).unwrap();
    // 200x100 at (300, 250), center (400, 300). Rotated a quarter turn it spans y 200..400.
    let cam = Camera::default();
    assert!(hit_test(Point::new(400.0, 210.0), &doc, &[], &cam, None, true).is_some());
    assert!(hit_test(Point::new(320.0, 300.0), &doc, &[], &cam, None, true).is_none());
}

#[test]
fn top_most_item_wins() {
    let mut doc = DocStore::new();
    let low = doc.add_sticker("a.png", 0.0);
    let high = doc.add_sticker("b.png", 0.0);
    let cam = Camera::default();
    let pt = Point::new(400.0, 350.0);
    assert_eq!(hit_test(pt, &doc, &[], &cam, None, true).map(|h| h.item.id), Some(high));
    let low_ref = ItemRef::new(ItemKind::Sticker, low);
    doc.change_z_index(low_ref, ZDirection::Up).unwrap();
    doc.change_z_index(low_ref, ZDirection::Up).unwrap();
    assert_eq!(hit_test(pt, &doc, &[], &cam, None, true).map(|h| h.item.id), Some(low));
}

// =============================================================
// Handles
// =============================================================

#[test]
fn resize_handle_only_for_selected() {
    let (doc, item) = sticker_doc();
    let cam = Camera::default();
    let corner = Point::new(449.0, 399.0);
    assert_eq!(hit_test(corner, &doc, &[], &cam, Some(item), true).map(|h| h.part), Some(HitPart::ResizeHandle));
    assert_eq!(hit_test(corner, &doc, &[], &cam, None, true).map(|h| h.part), Some(HitPart::Body));
}

#[test]
fn rotate_handle_above_top_edge() {
    let (doc, item) = sticker_doc();
    let cam = Camera::default();
    let pt = Point::new(400.0, 300.0 - ROTATE_HANDLE_OFFSET_PX);
    assert_eq!(hit_test(pt, &doc, &[], &cam, Some(item), true), Some(Hit { item, part: HitPart::RotateHandle }));
}

#[test]
fn handles_ignored_when_not_editable() {
    let (doc, item) = sticker_doc();
    let pt = Point::new(400.0, 300.0 - ROTATE_HANDLE_OFFSET_PX);
    assert_eq!(hit_test(pt, &doc, &[], &Camera::default(), Some(item), false), None);
}

#[test]
fn handle_radius_scales_with_camera() {
    let (doc, item) = sticker_doc();
    let cam = Camera { origin_x: 0.0, origin_y: 0.0, scale: 0.5 };
    // At half scale the 24px offset is 48 canvas units and the 8px radius is 16.
    let pt = Point::new(400.0, 300.0 - 48.0 + 12.0);
    assert_eq!(hit_test(pt, &doc, &[], &cam, Some(item), true).map(|h| h.part), Some(HitPart::RotateHandle));
}

// =============================================================
// Blocks
// =============================================================

#[test]
fn blocks_hit_below_free_items() {
    let mut doc = DocStore::new();
    let block = doc.add_block(BlockKind::ImageFull);
    let blocks = layout_blocks(doc.blocks(), 800.0);
    let cam = Camera::default();
    assert_eq!(
        hit_test(Point::new(60.0, 60.0), &doc, &blocks, &cam, None, true),
        Some(Hit { item: ItemRef::new(ItemKind::Block, block), part: HitPart::Body })
    );
    let sticker = doc.add_sticker("a.png", 0.0);
    let blocks = layout_blocks(doc.blocks(), 800.0);
    assert_eq!(
        hit_test(Point::new(400.0, 310.0), &doc, &blocks, &cam, None, true).map(|h| h.item),
        Some(ItemRef::new(ItemKind::Sticker, sticker))
    );
}

#[test]
fn selected_block_has_no_handles() {
    let mut doc = DocStore::new();
    let block = ItemRef::new(ItemKind::Block, doc.add_block(BlockKind::Paragraph));
    let ghost = ItemRef::new(ItemKind::Sticker, Uuid::new_v4());
    let cam = Camera::default();
    assert_eq!(hit_test(Point::new(5.0, 5.0), &doc, &[], &cam, Some(block), true), None);
    assert_eq!(hit_test(Point::new(5.0, 5.0), &doc, &[], &cam, Some(ghost), true), None);
}
