#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::camera::{Camera, Point};
use crate::consts::{HANDLE_RADIUS_PX, ROTATE_HANDLE_OFFSET_PX};
use crate::doc::{DocStore, Geometry, ItemKind, ItemRef};
use crate::render::BlockBox;

/// Which part of an item was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    Body,
    /// Bottom-right resize handle.
    ResizeHandle,
    /// Handle above the top edge.
    RotateHandle,
}

/// Result of a hit test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub item: ItemRef,
    pub part: HitPart,
}

/// Express a canvas point in the item's unrotated frame, origin at its center.
#[must_use]
pub fn to_local(pt: Point, geometry: &Geometry) -> Point {
    let center = geometry.rect().center();
    let (sin, cos) = (-geometry.rotation).to_radians().sin_cos();
    let dx = pt.x - center.x;
    let dy = pt.y - center.y;
    Point::new(dx * cos - dy * sin, dx * sin + dy * cos)
}

/// Local position of the resize handle (bottom-right corner).
#[must_use]
pub fn resize_handle_local(geometry: &Geometry) -> Point {
    Point::new(geometry.w * 0.5, geometry.h * 0.5)
}

/// Local position of the rotate handle, `offset` canvas units above the top edge.
#[must_use]
pub fn rotate_handle_local(geometry: &Geometry, offset: f64) -> Point {
    Point::new(0.0, -geometry.h * 0.5 - offset)
}

fn within(a: Point, b: Point, radius: f64) -> bool {
    (a.x - b.x).hypot(a.y - b.y) <= radius
}

fn body_contains(local: Point, geometry: &Geometry) -> bool {
    local.x.abs() <= geometry.w * 0.5 && local.y.abs() <= geometry.h * 0.5
}

/// Test which item (if any) is under `canvas_pt`.
///
/// Handles of the selected item are checked first and only when `editable`.
/// Free items are checked top-most first, then blocks. `None` means the
/// pointer is over the canvas background.
#[must_use]
pub fn hit_test(
    canvas_pt: Point,
    doc: &DocStore,
    blocks: &[BlockBox],
    camera: &Camera,
    selected: Option<ItemRef>,
    editable: bool,
) -> Option<Hit> {
    if editable {
        if let Some(item) = selected.filter(|s| s.kind.is_free()) {
            if let Some(geometry) = doc.geometry(item) {
                let radius = camera.screen_dist_to_canvas(HANDLE_RADIUS_PX);
                let offset = camera.screen_dist_to_canvas(ROTATE_HANDLE_OFFSET_PX);
                let local = to_local(canvas_pt, &geometry);
                if within(local, rotate_handle_local(&geometry, offset), radius) {
                    return Some(Hit { item, part: HitPart::RotateHandle });
                }
                if within(local, resize_handle_local(&geometry), radius) {
                    return Some(Hit { item, part: HitPart::ResizeHandle });
                }
            }
        }
    }

    let top_most = doc
        .sorted_free_items()
        .into_iter()
        .rev()
        .find(|(_, g)| body_contains(to_local(canvas_pt, g), g));
    if let Some((item, _)) = top_most {
        return Some(Hit { item, part: HitPart::Body });
    }

    blocks
        .iter()
        .find(|b| b.rect.contains(canvas_pt))
        .map(|b| Hit { item: ItemRef::new(ItemKind::Block, b.id), part: HitPart::Body })
}
