use std::cell::RefCell;
use std::rc::Rc;

use rand::Rng;
use serde::Serialize;
use web_sys::Element;

use crate::camera::{Camera, Point, Rect};
use crate::config::EngineConfig;
use crate::consts::BLOCK_IMAGE_ROTATE_STEP_DEG;
use crate::doc::{
    BlockKind, BlockMove, DocError, DocStore, ImageFit, ImageSlot, ItemId, ItemKind, ItemRef, ItemView, ZDirection,
};
use crate::hit::{HitPart, hit_test};
use crate::input::{Button, ItemController, Key, Pointer};
use crate::patch::{GeometryPatch, ItemPatch};
use crate::render::{self, ComposeOptions, Scene};
use crate::selection::Selection;
use crate::snapshot::{DocumentSnapshot, DocumentStyles};
use crate::upload::{ImageUploader, resolve_image_url};

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Action {
    ItemCreated { item: ItemRef },
    ItemUpdated { item: ItemRef, patch: ItemPatch },
    ItemDeleted { item: ItemRef },
    SelectionChanged { item: Option<ItemRef> },
    SetCursor { cursor: String },
    RenderNeeded,
}

/// Core engine state: all logic that does not depend on the DOM.
///
/// Separated from `Engine` so it can be tested without WASM/browser dependencies.
#[derive(Debug, Clone)]
pub struct EngineCore {
    pub doc: DocStore,
    pub selection: Selection,
    pub gesture: Option<ItemController>,
    pub camera: Camera,
    pub config: EngineConfig,
    pub title: String,
    pub styles: DocumentStyles,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self::with_config(EngineConfig::default())
    }
}

impl EngineCore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            doc: DocStore::with_z_floor(config.z_floor),
            selection: Selection::new(),
            gesture: None,
            camera: Camera::default(),
            config,
            title: String::new(),
            styles: DocumentStyles::default(),
        }
    }

    // --- Mode ---

    #[must_use]
    pub fn read_only(&self) -> bool {
        self.config.read_only
    }

    /// Switch read-only mode. Entering it drops the selection and any gesture.
    pub fn set_read_only(&mut self, read_only: bool) {
        self.config.read_only = read_only;
        if read_only {
            self.selection.clear();
            self.gesture = None;
        }
    }

    // --- Data inputs ---

    /// Hydrate the document from persisted state.
    pub fn load_snapshot(&mut self, snapshot: DocumentSnapshot) {
        self.title.clone_from(&snapshot.title);
        self.styles = snapshot.styles.clone();
        snapshot.restore(&mut self.doc);
        self.selection.clear();
        self.gesture = None;
        tracing::debug!(items = self.doc.len(), "document loaded");
    }

    /// Parse and hydrate persisted JSON. Returns `false` (document untouched) on bad input.
    pub fn load_snapshot_json(&mut self, raw: &str) -> bool {
        match DocumentSnapshot::from_json(raw) {
            Ok(snapshot) => {
                self.load_snapshot(snapshot);
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "rejected persisted document");
                false
            }
        }
    }

    /// Current state for the persistence collaborator.
    #[must_use]
    pub fn snapshot(&self) -> DocumentSnapshot {
        DocumentSnapshot::capture(&self.doc, self.title.clone(), self.styles.clone())
    }

    // --- Creation ---

    fn sticker_tilt(&self) -> f64 {
        let max = self.config.sticker_tilt_deg;
        if max > 0.0 { rand::rng().random_range(-max..=max) } else { 0.0 }
    }

    fn spawned(&mut self, item: ItemRef) -> ItemRef {
        self.selection.select(item);
        tracing::debug!(item = ?item, "item added");
        item
    }

    /// Add a sticker and select it. `None` in read-only mode.
    pub fn add_sticker(&mut self, url: impl Into<String>) -> Option<ItemRef> {
        if self.read_only() {
            return None;
        }
        let tilt = self.sticker_tilt();
        let id = self.doc.add_sticker(url, tilt);
        Some(self.spawned(ItemRef::new(ItemKind::Sticker, id)))
    }

    /// Add a floating text note and select it. `None` in read-only mode.
    pub fn add_floating_text(&mut self) -> Option<ItemRef> {
        if self.read_only() {
            return None;
        }
        let id = self.doc.add_floating_text();
        Some(self.spawned(ItemRef::new(ItemKind::FloatingText, id)))
    }

    /// Add a floating image for an already resolved URL and select it.
    pub fn commit_floating_image(&mut self, url: impl Into<String>) -> Option<ItemRef> {
        if self.read_only() {
            return None;
        }
        let id = self.doc.add_floating_image(url);
        Some(self.spawned(ItemRef::new(ItemKind::FloatingImage, id)))
    }

    /// Resolve `bytes` to a URL, then add a floating image.
    ///
    /// Without an uploader the bytes are inlined as a data URL. If resolution
    /// fails nothing is added and the selection is unchanged. `core` is not
    /// borrowed while the upload is pending, so input keeps flowing into it.
    pub async fn add_floating_image(
        core: &RefCell<Self>,
        bytes: &[u8],
        uploader: Option<&dyn ImageUploader>,
    ) -> Option<ItemRef> {
        if core.borrow().read_only() {
            return None;
        }
        let url = resolve_image_url(uploader, bytes).await?;
        core.borrow_mut().commit_floating_image(url)
    }

    // --- Updates ---

    /// Apply a typed patch. Returns `false` (and logs) when it cannot apply.
    pub fn update_item(&mut self, item: ItemRef, patch: &ItemPatch) -> bool {
        if self.read_only() {
            return false;
        }
        match self.doc.update_item(item, patch) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(item = ?item, error = %e, "update dropped");
                false
            }
        }
    }

    /// Apply a loosely typed JSON patch from an outside caller.
    ///
    /// Event-shaped or malformed payloads are dropped with a warning and the
    /// item is left exactly as it was.
    pub fn update_item_json(&mut self, item: ItemRef, changes: &serde_json::Value) -> bool {
        match ItemPatch::from_json(item.kind, changes) {
            Ok(patch) => self.update_item(item, &patch),
            Err(e) => {
                tracing::warn!(item = ?item, error = %e, "malformed update payload dropped");
                false
            }
        }
    }

    /// Nudge a free item's z-index by one. Returns the new value.
    pub fn change_z_index(&mut self, item: ItemRef, direction: ZDirection) -> Option<i64> {
        if self.read_only() {
            return None;
        }
        match self.doc.change_z_index(item, direction) {
            Ok(z) => Some(z),
            Err(e) => {
                tracing::debug!(item = ?item, error = %e, "z-index change ignored");
                None
            }
        }
    }

    // --- Deletion ---

    /// Delete any item. Clears the selection and gesture if they pointed at it.
    pub fn delete_item(&mut self, item: ItemRef) -> bool {
        if self.read_only() {
            return false;
        }
        let removed = self.doc.delete_item(item);
        self.selection.forget(item);
        self.drop_gesture_for(item);
        removed
    }

    /// Delete the selected item. No-op without a selection.
    pub fn delete_selected(&mut self) -> Option<ItemRef> {
        if self.read_only() {
            return None;
        }
        let item = self.selection.delete_selected(&mut self.doc)?;
        self.drop_gesture_for(item);
        Some(item)
    }

    fn drop_gesture_for(&mut self, item: ItemRef) {
        if self.gesture.as_ref().is_some_and(|g| g.item() == item) {
            self.gesture = None;
        }
    }

    // --- Selection ---

    /// Select an existing item. Ignored in read-only mode.
    pub fn select(&mut self, item: ItemRef) -> bool {
        if self.read_only() || !self.doc.contains(item) {
            return false;
        }
        self.selection.select(item);
        true
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// The currently selected item, if any.
    #[must_use]
    pub fn selected(&self) -> Option<ItemRef> {
        self.selection.selected()
    }

    /// The selected item as the style toolbar sees it.
    #[must_use]
    pub fn selected_view(&self) -> Option<ItemView<'_>> {
        self.selection.snapshot(&self.doc)
    }

    // --- Blocks ---

    /// Append a block. `None` in read-only mode.
    pub fn add_block(&mut self, kind: BlockKind) -> Option<ItemId> {
        if self.read_only() {
            return None;
        }
        Some(self.doc.add_block(kind))
    }

    /// Insert a block at `index`. `None` in read-only mode.
    pub fn insert_block(&mut self, index: usize, kind: BlockKind) -> Option<ItemId> {
        if self.read_only() {
            return None;
        }
        Some(self.doc.insert_block(index, kind))
    }

    pub fn set_block_text(&mut self, id: ItemId, text: impl Into<String>) -> bool {
        let text = text.into();
        self.edit_block(id, |doc| doc.set_block_text(id, text))
    }

    pub fn set_block_kind(&mut self, id: ItemId, kind: BlockKind) -> bool {
        self.edit_block(id, |doc| doc.set_block_kind(id, kind))
    }

    pub fn set_block_fit(&mut self, id: ItemId, fit: ImageFit) -> bool {
        self.edit_block(id, |doc| doc.set_block_fit(id, fit))
    }

    pub fn rotate_block_image(&mut self, id: ItemId) -> bool {
        self.edit_block(id, |doc| doc.rotate_block_image(id, BLOCK_IMAGE_ROTATE_STEP_DEG).map(|_| ()))
    }

    /// Swap a block with its neighbour. `false` at either end.
    pub fn move_block(&mut self, id: ItemId, direction: BlockMove) -> bool {
        let mut moved = false;
        let ok = self.edit_block(id, |doc| {
            moved = doc.move_block(id, direction)?;
            Ok(())
        });
        ok && moved
    }

    /// Place an already resolved URL in one of a block's image slots.
    pub fn commit_block_image(&mut self, id: ItemId, slot: ImageSlot, url: impl Into<String>) -> bool {
        let url = url.into();
        self.edit_block(id, |doc| doc.set_block_image(id, slot, Some(url)))
    }

    /// Resolve `bytes` and place the URL in one of a block's image slots.
    ///
    /// Like [`EngineCore::add_floating_image`], `core` is free during the upload.
    pub async fn set_block_image(
        core: &RefCell<Self>,
        id: ItemId,
        slot: ImageSlot,
        bytes: &[u8],
        uploader: Option<&dyn ImageUploader>,
    ) -> bool {
        if core.borrow().read_only() {
            return false;
        }
        let Some(url) = resolve_image_url(uploader, bytes).await else {
            return false;
        };
        core.borrow_mut().commit_block_image(id, slot, url)
    }

    fn edit_block(
        &mut self,
        id: ItemId,
        edit: impl FnOnce(&mut DocStore) -> Result<(), DocError>,
    ) -> bool {
        if self.read_only() {
            return false;
        }
        match edit(&mut self.doc) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(%id, error = %e, "block edit dropped");
                false
            }
        }
    }

    // --- Composition ---

    #[must_use]
    pub fn compose_options(&self) -> ComposeOptions {
        ComposeOptions {
            logical_width: self.config.canvas_width,
            min_height: self.config.min_canvas_height,
            camera: self.camera,
            frame_height: None,
            read_only: self.read_only(),
        }
    }

    /// The document as a display list for the current camera and mode.
    #[must_use]
    pub fn scene(&self) -> Scene {
        render::compose(&self.doc, &self.selection, &self.compose_options())
    }

    /// Read-only thumbnail scene `target_width` pixels wide.
    #[must_use]
    pub fn preview(&self, target_width: f64, frame_height: Option<f64>) -> Scene {
        let options = ComposeOptions {
            min_height: self.config.min_canvas_height,
            ..ComposeOptions::preview(self.config.canvas_width, target_width, frame_height)
        };
        render::compose(&self.doc, &self.selection, &options)
    }

    /// Viewport bounding box of a free item derived from the model.
    #[must_use]
    pub fn item_screen_bounds(&self, item: ItemRef) -> Option<Rect> {
        self.doc.geometry(item).map(|g| self.camera.rect_to_screen(g.rect()))
    }

    fn pointer(&self, screen: Point) -> Pointer {
        Pointer { screen, canvas: self.camera.screen_to_canvas(screen) }
    }

    // --- Input events ---

    /// Pointer pressed, resolving rotate-handle bounds from the model.
    pub fn on_pointer_down(&mut self, screen_pt: Point, button: Button) -> Vec<Action> {
        self.on_pointer_down_with(screen_pt, button, Self::item_screen_bounds)
    }

    /// Pointer pressed, with the host supplying the viewport bounds of an item.
    ///
    /// `bounds` is only consulted for the rotate handle; returning `None`
    /// (element gone) leaves the item selected but idle.
    pub fn on_pointer_down_with(
        &mut self,
        screen_pt: Point,
        button: Button,
        bounds: impl FnOnce(&Self, ItemRef) -> Option<Rect>,
    ) -> Vec<Action> {
        if button != Button::Primary || self.read_only() {
            return Vec::new();
        }
        let pointer = self.pointer(screen_pt);
        let blocks = render::layout_blocks(self.doc.blocks(), self.config.canvas_width);
        let hit = hit_test(pointer.canvas, &self.doc, &blocks, &self.camera, self.selection.selected(), true);

        let mut actions = Vec::new();
        let Some(hit) = hit else {
            if self.selection.selected().is_some() {
                self.selection.clear();
                actions.push(Action::SelectionChanged { item: None });
                actions.push(Action::RenderNeeded);
            }
            return actions;
        };

        if !self.selection.is_selected(hit.item) {
            self.selection.select(hit.item);
            actions.push(Action::SelectionChanged { item: Some(hit.item) });
        }

        if let Some(geometry) = self.doc.geometry(hit.item) {
            let mut controller = ItemController::new(hit.item, false);
            let rect = if hit.part == HitPart::RotateHandle { bounds(self, hit.item) } else { None };
            if controller.begin(hit.part, pointer, &geometry, rect) {
                actions.push(Action::SetCursor { cursor: controller.state().cursor().to_owned() });
                self.gesture = Some(controller);
            } else {
                tracing::debug!(item = ?hit.item, part = ?hit.part, "gesture did not start");
            }
        }

        actions.push(Action::RenderNeeded);
        actions
    }

    /// Pointer moved: update the item under gesture, if any.
    pub fn on_pointer_move(&mut self, screen_pt: Point) -> Vec<Action> {
        let Some(controller) = &self.gesture else {
            return Vec::new();
        };
        let item = controller.item();
        let Some(patch) = controller
            .on_move(self.pointer(screen_pt))
            .and_then(|g| ItemPatch::geometry(item.kind, g))
        else {
            return Vec::new();
        };
        if let Err(e) = self.doc.update_item(item, &patch) {
            tracing::debug!(item = ?item, error = %e, "gesture target vanished");
            self.gesture = None;
            return vec![Action::SetCursor { cursor: "default".into() }];
        }
        vec![Action::ItemUpdated { item, patch }, Action::RenderNeeded]
    }

    /// Pointer released anywhere: commit the last geometry and go idle.
    pub fn on_pointer_up(&mut self, _screen_pt: Point, _button: Button) -> Vec<Action> {
        let Some(mut controller) = self.gesture.take() else {
            return Vec::new();
        };
        if controller.end() {
            vec![Action::SetCursor { cursor: "default".into() }, Action::RenderNeeded]
        } else {
            Vec::new()
        }
    }

    /// Keyboard shortcuts: `Delete`/`Backspace` remove, `]`/`[` restack.
    pub fn on_key_down(&mut self, key: &Key) -> Vec<Action> {
        if self.read_only() {
            return Vec::new();
        }
        match key.0.as_str() {
            "Delete" | "Backspace" => match self.delete_selected() {
                Some(item) => vec![
                    Action::ItemDeleted { item },
                    Action::SelectionChanged { item: None },
                    Action::RenderNeeded,
                ],
                None => Vec::new(),
            },
            "]" | "[" => {
                let direction = if key.0 == "]" { ZDirection::Up } else { ZDirection::Down };
                let Some(item) = self.selection.selected() else {
                    return Vec::new();
                };
                match self.change_z_index(item, direction) {
                    Some(z) => {
                        let patch =
                            ItemPatch::geometry(item.kind, GeometryPatch { z_index: Some(z), ..GeometryPatch::default() });
                        patch
                            .map(|patch| vec![Action::ItemUpdated { item, patch }, Action::RenderNeeded])
                            .unwrap_or_default()
                    }
                    None => Vec::new(),
                }
            }
            _ => Vec::new(),
        }
    }
}

/// DOM id of the element an item is rendered into.
#[must_use]
pub fn item_dom_id(item: ItemRef) -> String {
    let prefix = match item.kind {
        ItemKind::Block => "block",
        ItemKind::Sticker => "sticker",
        ItemKind::FloatingText => "floating",
        ItemKind::FloatingImage => "floating-image",
    };
    format!("{prefix}-{}", item.id)
}

fn dom_bounds(item: ItemRef) -> Option<Rect> {
    let document = web_sys::window()?.document()?;
    let element = document.get_element_by_id(&item_dom_id(item))?;
    let r = element.get_bounding_client_rect();
    Some(Rect::new(r.left(), r.top(), r.width(), r.height()))
}

/// The full engine. Wraps `EngineCore` and the canvas root element in the page.
///
/// The core is shared so that pending image uploads can hold it without
/// blocking input handlers.
#[derive(Debug)]
pub struct Engine {
    root: Element,
    pub core: Rc<RefCell<EngineCore>>,
}

impl Engine {
    /// Create a new engine bound to the given root element.
    #[must_use]
    pub fn new(root: Element, config: EngineConfig) -> Self {
        Self { root, core: Rc::new(RefCell::new(EngineCore::with_config(config))) }
    }

    /// Re-read where the root element sits in the viewport.
    pub fn sync_viewport(&self) {
        let r = self.root.get_bounding_client_rect();
        let mut core = self.core.borrow_mut();
        core.camera.origin_x = r.left();
        core.camera.origin_y = r.top();
        let width = r.width();
        if width > 0.0 {
            core.camera.scale = width / core.config.canvas_width;
        }
    }

    // --- Input events ---

    /// Pointer pressed; rotate-handle bounds come from the live DOM element.
    pub fn on_pointer_down(&self, screen_pt: Point, button: Button) -> Vec<Action> {
        self.sync_viewport();
        self.core.borrow_mut().on_pointer_down_with(screen_pt, button, |_, item| dom_bounds(item))
    }

    pub fn on_pointer_move(&self, screen_pt: Point) -> Vec<Action> {
        self.core.borrow_mut().on_pointer_move(screen_pt)
    }

    pub fn on_pointer_up(&self, screen_pt: Point, button: Button) -> Vec<Action> {
        self.core.borrow_mut().on_pointer_up(screen_pt, button)
    }

    pub fn on_key_down(&self, key: &Key) -> Vec<Action> {
        self.core.borrow_mut().on_key_down(key)
    }

    // --- Render ---

    #[must_use]
    pub fn scene(&self) -> Scene {
        self.core.borrow().scene()
    }
}
