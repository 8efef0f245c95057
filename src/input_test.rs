#![allow(clippy::clone_on_copy, clippy::float_cmp)]

use uuid::Uuid;

use super::*;
use crate::doc::ItemKind;

const EPSILON: f64 = 1e-9;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn sticker() -> ItemRef {
    ItemRef::new(ItemKind::Sticker, Uuid::new_v4())
}

fn geometry() -> Geometry {
    Geometry { x: 100.0, y: 100.0, w: 100.0, h: 100.0, rotation: 0.0, z_index: 11 }
}

fn at(x: f64, y: f64) -> Pointer {
    Pointer { screen: Point::new(x, y), canvas: Point::new(x, y) }
}

// =============================================================
// InputState
// =============================================================

#[test]
fn default_state_is_idle() {
    let state = InputState::default();
    assert_eq!(state, InputState::Idle);
    assert!(!state.is_active());
    assert_eq!(state.cursor(), "default");
}

#[test]
fn cursors_per_gesture() {
    let p = Point::new(0.0, 0.0);
    assert_eq!(InputState::Dragging { start: p, initial_x: 0.0, initial_y: 0.0 }.cursor(), "grabbing");
    assert_eq!(InputState::Resizing { start: p, initial_w: 0.0, initial_h: 0.0 }.cursor(), "nwse-resize");
    assert_eq!(InputState::Rotating { center: p, initial_rotation: 0.0 }.cursor(), "crosshair");
}

// =============================================================
// Pure gesture math
// =============================================================

#[test]
fn drag_position_adds_total_travel() {
    let p = drag_position(Point::new(10.0, 20.0), Point::new(100.0, 100.0), Point::new(130.0, 90.0));
    assert_eq!(p, Point::new(40.0, 10.0));
}

#[test]
fn resize_size_floors_each_axis() {
    let (w, h) = resize_size(100.0, 100.0, Point::new(0.0, 0.0), Point::new(-90.0, 20.0));
    assert_eq!((w, h), (MIN_ITEM_SIZE, 120.0));
}

#[test]
fn rotation_zero_when_pointer_straight_above() {
    let r = rotation_from_pointer(Point::new(50.0, 50.0), Point::new(50.0, 0.0)).unwrap();
    assert!(approx_eq(r, 0.0));
}

#[test]
fn rotation_ninety_when_pointer_right() {
    let r = rotation_from_pointer(Point::new(50.0, 50.0), Point::new(100.0, 50.0)).unwrap();
    assert!(approx_eq(r, 90.0));
}

#[test]
fn rotation_below_and_left() {
    let c = Point::new(0.0, 0.0);
    assert!(approx_eq(rotation_from_pointer(c, Point::new(0.0, 10.0)).unwrap(), 180.0));
    // atan2 returns 180 for the negative x axis, so left reads 270 rather than -90.
    assert!(approx_eq(rotation_from_pointer(c, Point::new(-10.0, 0.0)).unwrap(), 270.0));
}

#[test]
fn rotation_undefined_at_center() {
    assert!(rotation_from_pointer(Point::new(5.0, 5.0), Point::new(5.0, 5.0)).is_none());
}

// =============================================================
// ItemController transitions
// =============================================================

#[test]
fn drag_moves_by_total_delta() {
    let g = geometry();
    let mut c = ItemController::new(sticker(), false);
    assert!(c.begin(HitPart::Body, at(120.0, 120.0), &g, None));
    assert_eq!(c.state().cursor(), "grabbing");
    let patch = c.on_move(at(170.0, 100.0)).unwrap();
    assert_eq!((patch.x, patch.y), (Some(150.0), Some(80.0)));
    assert_eq!(patch.w, None);
}

#[test]
fn drag_is_path_independent() {
    let g = geometry();
    let mut c = ItemController::new(sticker(), false);
    c.begin_drag(at(0.0, 0.0), &g);
    let _intermediate = c.on_move(at(500.0, -300.0));
    let direct = c.on_move(at(10.0, 10.0)).unwrap();
    assert_eq!((direct.x, direct.y), (Some(110.0), Some(110.0)));
}

#[test]
fn resize_from_bottom_right_with_floor() {
    let g = geometry();
    let mut c = ItemController::new(sticker(), false);
    assert!(c.begin(HitPart::ResizeHandle, at(200.0, 200.0), &g, None));
    let grow = c.on_move(at(250.0, 230.0)).unwrap();
    assert_eq!((grow.w, grow.h), (Some(150.0), Some(130.0)));
    let shrink = c.on_move(at(0.0, 0.0)).unwrap();
    assert_eq!((shrink.w, shrink.h), (Some(MIN_ITEM_SIZE), Some(MIN_ITEM_SIZE)));
    assert_eq!(shrink.x, None);
}

#[test]
fn rotate_uses_screen_center_of_bounds() {
    let g = geometry();
    let mut c = ItemController::new(sticker(), false);
    let bounds = Rect::new(100.0, 100.0, 100.0, 100.0);
    assert!(c.begin(HitPart::RotateHandle, at(150.0, 70.0), &g, Some(bounds)));
    assert_eq!(c.state().cursor(), "crosshair");
    let patch = c.on_move(at(250.0, 150.0)).unwrap();
    assert!(approx_eq(patch.rotation.unwrap(), 90.0));
}

#[test]
fn rotate_at_center_keeps_initial_rotation() {
    let g = Geometry { rotation: 33.0, ..geometry() };
    let mut c = ItemController::new(sticker(), false);
    c.begin_rotate(Some(Rect::new(0.0, 0.0, 10.0, 10.0)), &g);
    let patch = c.on_move(at(5.0, 5.0)).unwrap();
    assert_eq!(patch.rotation, Some(33.0));
}

#[test]
fn rotate_without_bounds_does_not_start() {
    let g = geometry();
    let mut c = ItemController::new(sticker(), false);
    assert!(!c.begin(HitPart::RotateHandle, at(0.0, 0.0), &g, None));
    assert_eq!(c.state(), InputState::Idle);
    assert!(c.on_move(at(10.0, 10.0)).is_none());
}

#[test]
fn read_only_never_leaves_idle() {
    let g = geometry();
    let mut c = ItemController::new(sticker(), true);
    assert!(!c.begin_drag(at(0.0, 0.0), &g));
    assert!(!c.begin_resize(at(0.0, 0.0), &g));
    assert!(!c.begin_rotate(Some(Rect::new(0.0, 0.0, 1.0, 1.0)), &g));
    assert!(!c.is_active());
}

#[test]
fn second_gesture_rejected_while_active() {
    let g = geometry();
    let mut c = ItemController::new(sticker(), false);
    assert!(c.begin_drag(at(0.0, 0.0), &g));
    assert!(!c.begin_resize(at(0.0, 0.0), &g));
    assert!(matches!(c.state(), InputState::Dragging { .. }));
}

#[test]
fn end_returns_to_idle() {
    let g = geometry();
    let mut c = ItemController::new(sticker(), false);
    assert!(!c.end());
    c.begin_drag(at(0.0, 0.0), &g);
    assert!(c.end());
    assert_eq!(c.state(), InputState::Idle);
    assert!(c.on_move(at(5.0, 5.0)).is_none());
    assert!(c.begin_resize(at(0.0, 0.0), &g));
}
