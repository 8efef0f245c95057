//! Input model: pointer samples, buttons, keys, and the per-item gesture state machine.
//!
//! An [`ItemController`] is bound to one free item. Between pointer-down and
//! pointer-up it holds exactly one gesture (`Dragging`, `Resizing` or
//! `Rotating`) together with the snapshot taken when the gesture started.
//! Every pointer-move recomputes the item's geometry from that snapshot, never
//! from the previous move, so dropped or coalesced move events cannot drift
//! the result.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::camera::{Point, Rect};
use crate::consts::{MIN_ITEM_SIZE, ROTATE_OFFSET_DEG};
use crate::doc::{Geometry, ItemRef};
use crate::hit::HitPart;
use crate::patch::GeometryPatch;

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button (or two-finger tap).
    Secondary,
}

/// A keyboard key.
///
/// The inner string holds the key name as reported by the browser (e.g. `"Delete"`, `"]"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

/// One pointer position expressed in both coordinate spaces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pointer {
    /// Viewport position in CSS pixels.
    pub screen: Point,
    /// Position in canvas pixels.
    pub canvas: Point,
}

/// Gesture state of one controller.
///
/// Each active variant carries the snapshot taken at gesture start.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InputState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// Moving the item by its body.
    Dragging {
        /// Canvas-space pointer position at gesture start.
        start: Point,
        /// Item x at gesture start.
        initial_x: f64,
        /// Item y at gesture start.
        initial_y: f64,
    },
    /// Resizing the item from its bottom-right handle.
    Resizing {
        /// Canvas-space pointer position at gesture start.
        start: Point,
        /// Item width at gesture start.
        initial_w: f64,
        /// Item height at gesture start.
        initial_h: f64,
    },
    /// Rotating the item around its center with the rotate handle.
    Rotating {
        /// Viewport-space center of the item's bounding box at gesture start.
        center: Point,
        /// Rotation in degrees at gesture start.
        initial_rotation: f64,
    },
}

impl InputState {
    /// Whether a gesture is in progress.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Idle)
    }

    /// CSS cursor to show while in this state.
    #[must_use]
    pub fn cursor(&self) -> &'static str {
        match self {
            Self::Idle => "default",
            Self::Dragging { .. } => "grabbing",
            Self::Resizing { .. } => "nwse-resize",
            Self::Rotating { .. } => "crosshair",
        }
    }
}

/// New position for a drag: the start position plus the pointer's total travel.
#[must_use]
pub fn drag_position(initial: Point, start: Point, current: Point) -> Point {
    Point::new(initial.x + (current.x - start.x), initial.y + (current.y - start.y))
}

/// New size for a bottom-right resize, floored at the minimum item size on both axes.
#[must_use]
pub fn resize_size(initial_w: f64, initial_h: f64, start: Point, current: Point) -> (f64, f64) {
    (
        (initial_w + (current.x - start.x)).max(MIN_ITEM_SIZE),
        (initial_h + (current.y - start.y)).max(MIN_ITEM_SIZE),
    )
}

/// Rotation in degrees for a pointer around `center`; 0° is straight up.
///
/// Returns `None` when the pointer sits exactly on the center.
#[must_use]
pub fn rotation_from_pointer(center: Point, pointer: Point) -> Option<f64> {
    let dx = pointer.x - center.x;
    let dy = pointer.y - center.y;
    if dx.hypot(dy) < f64::EPSILON {
        return None;
    }
    Some(dy.atan2(dx).to_degrees() + ROTATE_OFFSET_DEG)
}

/// Gesture state machine bound to a single free item.
#[derive(Debug, Clone)]
pub struct ItemController {
    item: ItemRef,
    read_only: bool,
    state: InputState,
}

impl ItemController {
    /// A controller for `item`. Read-only controllers never leave `Idle`.
    #[must_use]
    pub fn new(item: ItemRef, read_only: bool) -> Self {
        Self { item, read_only, state: InputState::Idle }
    }

    #[must_use]
    pub fn item(&self) -> ItemRef {
        self.item
    }

    #[must_use]
    pub fn state(&self) -> InputState {
        self.state
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    /// Start a gesture for the part of the item under the pointer.
    ///
    /// `bounds` is the item's viewport bounding rectangle, needed only for
    /// rotation. Returns `true` if a gesture started.
    pub fn begin(&mut self, part: HitPart, pointer: Pointer, geometry: &Geometry, bounds: Option<Rect>) -> bool {
        match part {
            HitPart::Body => self.begin_drag(pointer, geometry),
            HitPart::ResizeHandle => self.begin_resize(pointer, geometry),
            HitPart::RotateHandle => self.begin_rotate(bounds, geometry),
        }
    }

    /// `Idle → Dragging`.
    pub fn begin_drag(&mut self, pointer: Pointer, geometry: &Geometry) -> bool {
        self.transition(InputState::Dragging {
            start: pointer.canvas,
            initial_x: geometry.x,
            initial_y: geometry.y,
        })
    }

    /// `Idle → Resizing`.
    pub fn begin_resize(&mut self, pointer: Pointer, geometry: &Geometry) -> bool {
        self.transition(InputState::Resizing {
            start: pointer.canvas,
            initial_w: geometry.w,
            initial_h: geometry.h,
        })
    }

    /// `Idle → Rotating`. Without a bounding rectangle nothing happens.
    pub fn begin_rotate(&mut self, bounds: Option<Rect>, geometry: &Geometry) -> bool {
        let Some(bounds) = bounds else {
            return false;
        };
        self.transition(InputState::Rotating { center: bounds.center(), initial_rotation: geometry.rotation })
    }

    fn transition(&mut self, next: InputState) -> bool {
        if self.read_only || self.state.is_active() {
            return false;
        }
        self.state = next;
        true
    }

    /// Geometry for the current pointer, recomputed from the gesture snapshot.
    ///
    /// Returns `None` while idle.
    #[must_use]
    pub fn on_move(&self, pointer: Pointer) -> Option<GeometryPatch> {
        match self.state {
            InputState::Idle => None,
            InputState::Dragging { start, initial_x, initial_y } => {
                let pos = drag_position(Point::new(initial_x, initial_y), start, pointer.canvas);
                Some(GeometryPatch::position(pos.x, pos.y))
            }
            InputState::Resizing { start, initial_w, initial_h } => {
                let (w, h) = resize_size(initial_w, initial_h, start, pointer.canvas);
                Some(GeometryPatch::size(w, h))
            }
            InputState::Rotating { center, initial_rotation } => {
                let degrees = rotation_from_pointer(center, pointer.screen).unwrap_or(initial_rotation);
                Some(GeometryPatch::rotation(degrees))
            }
        }
    }

    /// Any state `→ Idle`. Returns `true` if a gesture was in progress.
    pub fn end(&mut self) -> bool {
        let was_active = self.state.is_active();
        self.state = InputState::Idle;
        was_active
    }
}
