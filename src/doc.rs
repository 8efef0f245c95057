//! Document model: content blocks, free items, and the in-memory store.
//!
//! This module defines the data types that describe what is on a post
//! (`ContentBlock`, `Sticker`, `FloatingText`, `FloatingImage`), the typed
//! `(kind, id)` reference used to address any of them (`ItemRef`), and the
//! runtime store that owns the four collections (`DocStore`).
//!
//! The four collections are independent id namespaces. They are kept as ordered
//! vectors because insertion order is the paint tiebreak between free items of
//! equal z-index and the document order of blocks. Every mutation goes through
//! a `DocStore` method; nothing else touches the vectors.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::camera::Rect;
use crate::consts::{
    BLOCK_FONT_SIZE, BLOCK_IMAGE_HEIGHT, IMAGE_SIZE, IMAGE_SPAWN, MIN_ITEM_SIZE, STICKER_SIZE, STICKER_SPAWN,
    TEXT_PLACEHOLDER, TEXT_SIZE, TEXT_SPAWN, Z_FLOOR,
};
use crate::patch::ItemPatch;

/// Unique identifier for an item within its collection.
pub type ItemId = Uuid;

/// The collection an item lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    /// Flow-positioned content block.
    #[serde(rename = "block")]
    Block,
    /// Decorative image with immutable content.
    #[serde(rename = "sticker")]
    Sticker,
    /// Floating text note with editable content and styles.
    #[serde(rename = "floating")]
    FloatingText,
    /// Free-floating uploaded image.
    #[serde(rename = "floatingImage")]
    FloatingImage,
}

impl ItemKind {
    /// Whether items of this kind are absolutely positioned.
    #[must_use]
    pub fn is_free(self) -> bool {
        !matches!(self, Self::Block)
    }
}

/// Typed address of an item: which collection, and which id within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemRef {
    #[serde(rename = "type")]
    pub kind: ItemKind,
    pub id: ItemId,
}

impl ItemRef {
    #[must_use]
    pub fn new(kind: ItemKind, id: ItemId) -> Self {
        Self { kind, id }
    }
}

/// Position, size, rotation and stacking of a free item, in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Geometry {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width, never below [`MIN_ITEM_SIZE`].
    pub w: f64,
    /// Height, never below [`MIN_ITEM_SIZE`].
    pub h: f64,
    /// Clockwise rotation in degrees around the center. Not normalized.
    pub rotation: f64,
    /// Paint order; higher paints on top.
    pub z_index: i64,
}

impl Geometry {
    /// Bounding box before rotation.
    #[must_use]
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.w, self.h)
    }

    /// Raise width and height to the minimum item size.
    pub fn enforce_min_size(&mut self) {
        self.w = self.w.max(MIN_ITEM_SIZE);
        self.h = self.h.max(MIN_ITEM_SIZE);
    }
}

fn default_opacity() -> f64 {
    1.0
}

/// Clamp an opacity into `0.0..=1.0`, mapping NaN to fully opaque.
#[must_use]
pub fn clamp_opacity(value: f64) -> f64 {
    if value.is_nan() { 1.0 } else { value.clamp(0.0, 1.0) }
}

/// A decorative sticker. Only geometry and opacity are editable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sticker {
    pub id: ItemId,
    #[serde(flatten)]
    pub geometry: Geometry,
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    pub url: String,
}

/// A free-floating image. Same editable surface as a sticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FloatingImage {
    pub id: ItemId,
    #[serde(flatten)]
    pub geometry: Geometry,
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    pub url: String,
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

/// Visual styles of a floating text note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextStyles {
    pub font_size: f64,
    pub font_weight: String,
    pub text_align: TextAlign,
    pub color: String,
    pub background_color: String,
    pub font_family: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub underline: Option<bool>,
}

impl Default for TextStyles {
    fn default() -> Self {
        Self {
            font_size: 20.0,
            font_weight: "normal".into(),
            text_align: TextAlign::Center,
            color: "#333333".into(),
            background_color: "transparent".into(),
            font_family: "inherit".into(),
            italic: None,
            underline: None,
        }
    }
}

/// A free-floating text note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FloatingText {
    pub id: ItemId,
    #[serde(flatten)]
    pub geometry: Geometry,
    pub text: String,
    #[serde(default)]
    pub styles: TextStyles,
}

/// Layout of a content block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockKind {
    #[default]
    Paragraph,
    ImageFull,
    ImageDouble,
    ImageLeft,
    ImageRight,
}

impl BlockKind {
    /// Whether the block shows at least one image.
    #[must_use]
    pub fn has_image(self) -> bool {
        !matches!(self, Self::Paragraph)
    }

    /// Whether the image shares its row with text.
    #[must_use]
    pub fn is_side_by_side(self) -> bool {
        matches!(self, Self::ImageLeft | Self::ImageRight)
    }
}

/// How a block image fills its frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFit {
    #[default]
    Cover,
    Contain,
}

/// Styles of a content block. Block updates only ever land here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BlockStyles {
    pub font_size: f64,
    pub text_align: TextAlign,
    pub color: String,
    pub image_height: f64,
}

impl Default for BlockStyles {
    fn default() -> Self {
        Self {
            font_size: BLOCK_FONT_SIZE,
            text_align: TextAlign::Left,
            color: "#333333".into(),
            image_height: BLOCK_IMAGE_HEIGHT,
        }
    }
}

/// A flow-positioned content block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentBlock {
    pub id: ItemId,
    #[serde(rename = "type")]
    pub kind: BlockKind,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(rename = "imageUrl2", default, skip_serializing_if = "Option::is_none")]
    pub image_url2: Option<String>,
    #[serde(default)]
    pub image_rotation: f64,
    #[serde(default)]
    pub image_fit: ImageFit,
    #[serde(default)]
    pub styles: BlockStyles,
}

impl ContentBlock {
    /// A fresh block of `kind` with empty content and default styles.
    #[must_use]
    pub fn new(kind: BlockKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            text: String::new(),
            image_url: None,
            image_url2: None,
            image_rotation: 0.0,
            image_fit: ImageFit::Cover,
            styles: BlockStyles::default(),
        }
    }
}

/// Which image of a block is targeted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSlot {
    Primary,
    Secondary,
}

/// Direction for moving a block within the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockMove {
    Up,
    Down,
}

/// Direction for nudging a free item's z-index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZDirection {
    Up,
    Down,
}

/// Borrowed view of any item, for readers such as the style toolbar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ItemView<'a> {
    Block(&'a ContentBlock),
    Sticker(&'a Sticker),
    FloatingText(&'a FloatingText),
    FloatingImage(&'a FloatingImage),
}

impl ItemView<'_> {
    /// Typed reference to the viewed item.
    #[must_use]
    pub fn item_ref(&self) -> ItemRef {
        match self {
            Self::Block(b) => ItemRef::new(ItemKind::Block, b.id),
            Self::Sticker(s) => ItemRef::new(ItemKind::Sticker, s.id),
            Self::FloatingText(t) => ItemRef::new(ItemKind::FloatingText, t.id),
            Self::FloatingImage(i) => ItemRef::new(ItemKind::FloatingImage, i.id),
        }
    }

    /// Geometry of a free item; `None` for blocks.
    #[must_use]
    pub fn geometry(&self) -> Option<&Geometry> {
        match self {
            Self::Block(_) => None,
            Self::Sticker(s) => Some(&s.geometry),
            Self::FloatingText(t) => Some(&t.geometry),
            Self::FloatingImage(i) => Some(&i.geometry),
        }
    }
}

/// Errors from store operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DocError {
    #[error("item not found: {0:?}")]
    NotFound(ItemRef),
    #[error("{0:?} items have no z-index")]
    NoZIndex(ItemKind),
    #[error("{patch:?} patch cannot target a {target:?} item")]
    KindMismatch { target: ItemKind, patch: ItemKind },
}

/// In-memory store of the four item collections.
#[derive(Debug, Clone, PartialEq)]
pub struct DocStore {
    pub(crate) blocks: Vec<ContentBlock>,
    pub(crate) stickers: Vec<Sticker>,
    pub(crate) floating_texts: Vec<FloatingText>,
    pub(crate) floating_images: Vec<FloatingImage>,
    z_floor: i64,
}

impl Default for DocStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DocStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::with_z_floor(Z_FLOOR)
    }

    /// Create an empty store whose spawned items stack above `z_floor`.
    #[must_use]
    pub fn with_z_floor(z_floor: i64) -> Self {
        Self {
            blocks: Vec::new(),
            stickers: Vec::new(),
            floating_texts: Vec::new(),
            floating_images: Vec::new(),
            z_floor,
        }
    }

    // --- Reads ---

    #[must_use]
    pub fn blocks(&self) -> &[ContentBlock] {
        &self.blocks
    }

    #[must_use]
    pub fn stickers(&self) -> &[Sticker] {
        &self.stickers
    }

    #[must_use]
    pub fn floating_texts(&self) -> &[FloatingText] {
        &self.floating_texts
    }

    #[must_use]
    pub fn floating_images(&self) -> &[FloatingImage] {
        &self.floating_images
    }

    /// Look up any item by its typed reference.
    #[must_use]
    pub fn get(&self, item: ItemRef) -> Option<ItemView<'_>> {
        match item.kind {
            ItemKind::Block => self.blocks.iter().find(|b| b.id == item.id).map(ItemView::Block),
            ItemKind::Sticker => self.stickers.iter().find(|s| s.id == item.id).map(ItemView::Sticker),
            ItemKind::FloatingText => self
                .floating_texts
                .iter()
                .find(|t| t.id == item.id)
                .map(ItemView::FloatingText),
            ItemKind::FloatingImage => self
                .floating_images
                .iter()
                .find(|i| i.id == item.id)
                .map(ItemView::FloatingImage),
        }
    }

    /// Geometry of a free item; `None` for blocks or unknown ids.
    #[must_use]
    pub fn geometry(&self, item: ItemRef) -> Option<Geometry> {
        self.get(item).and_then(|v| v.geometry().copied())
    }

    /// Whether the referenced item exists.
    #[must_use]
    pub fn contains(&self, item: ItemRef) -> bool {
        self.get(item).is_some()
    }

    /// Total number of items across all four collections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.len() + self.stickers.len() + self.floating_texts.len() + self.floating_images.len()
    }

    /// Returns `true` if all four collections are empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate free items in collection order: stickers, floating texts, floating images.
    pub fn free_items(&self) -> impl Iterator<Item = (ItemRef, &Geometry)> {
        let stickers = self
            .stickers
            .iter()
            .map(|s| (ItemRef::new(ItemKind::Sticker, s.id), &s.geometry));
        let texts = self
            .floating_texts
            .iter()
            .map(|t| (ItemRef::new(ItemKind::FloatingText, t.id), &t.geometry));
        let images = self
            .floating_images
            .iter()
            .map(|i| (ItemRef::new(ItemKind::FloatingImage, i.id), &i.geometry));
        stickers.chain(texts).chain(images)
    }

    /// Free items in paint order: ascending z-index, stable on collection order.
    #[must_use]
    pub fn sorted_free_items(&self) -> Vec<(ItemRef, &Geometry)> {
        let mut items: Vec<(ItemRef, &Geometry)> = self.free_items().collect();
        items.sort_by_key(|(_, g)| g.z_index);
        items
    }

    // --- Z-order ---

    /// Highest z-index across all free items, if there are any.
    #[must_use]
    pub fn max_z_index(&self) -> Option<i64> {
        self.free_items().map(|(_, g)| g.z_index).max()
    }

    /// The z-index the next spawned item receives. Recomputed on every call.
    #[must_use]
    pub fn next_z_index(&self) -> i64 {
        self.max_z_index().unwrap_or(self.z_floor).max(self.z_floor) + 1
    }

    /// Nudge a free item's z-index by one. Ties are left as they fall.
    ///
    /// # Errors
    ///
    /// Returns [`DocError::NoZIndex`] for blocks and [`DocError::NotFound`]
    /// when the item does not exist.
    pub fn change_z_index(&mut self, item: ItemRef, direction: ZDirection) -> Result<i64, DocError> {
        let geometry = self.geometry_mut(item)?;
        geometry.z_index += match direction {
            ZDirection::Up => 1,
            ZDirection::Down => -1,
        };
        Ok(geometry.z_index)
    }

    // --- Free items ---

    /// Append a sticker at the sticker spawn point and return its id.
    pub fn add_sticker(&mut self, url: impl Into<String>, rotation: f64) -> ItemId {
        let id = Uuid::new_v4();
        let geometry = self.spawn_geometry(STICKER_SPAWN, STICKER_SIZE, rotation);
        self.stickers.push(Sticker { id, geometry, opacity: 1.0, url: url.into() });
        id
    }

    /// Append a floating text note with placeholder content and return its id.
    pub fn add_floating_text(&mut self) -> ItemId {
        let id = Uuid::new_v4();
        let geometry = self.spawn_geometry(TEXT_SPAWN, TEXT_SIZE, 0.0);
        self.floating_texts.push(FloatingText {
            id,
            geometry,
            text: TEXT_PLACEHOLDER.into(),
            styles: TextStyles::default(),
        });
        id
    }

    /// Append a floating image pointing at an already resolved `url`.
    pub fn add_floating_image(&mut self, url: impl Into<String>) -> ItemId {
        let id = Uuid::new_v4();
        let geometry = self.spawn_geometry(IMAGE_SPAWN, IMAGE_SIZE, 0.0);
        self.floating_images.push(FloatingImage { id, geometry, opacity: 1.0, url: url.into() });
        id
    }

    fn spawn_geometry(&self, (x, y): (f64, f64), (w, h): (f64, f64), rotation: f64) -> Geometry {
        Geometry { x, y, w, h, rotation, z_index: self.next_z_index() }
    }

    fn geometry_mut(&mut self, item: ItemRef) -> Result<&mut Geometry, DocError> {
        let found = match item.kind {
            ItemKind::Block => return Err(DocError::NoZIndex(ItemKind::Block)),
            ItemKind::Sticker => self
                .stickers
                .iter_mut()
                .find(|s| s.id == item.id)
                .map(|s| &mut s.geometry),
            ItemKind::FloatingText => self
                .floating_texts
                .iter_mut()
                .find(|t| t.id == item.id)
                .map(|t| &mut t.geometry),
            ItemKind::FloatingImage => self
                .floating_images
                .iter_mut()
                .find(|i| i.id == item.id)
                .map(|i| &mut i.geometry),
        };
        found.ok_or(DocError::NotFound(item))
    }

    // --- Updates ---

    /// Merge a typed patch into the referenced item.
    ///
    /// Text style fields land in the note's `styles`; block patches only ever
    /// touch block `styles`. Width and height are floored and opacity clamped.
    ///
    /// # Errors
    ///
    /// Returns [`DocError::KindMismatch`] when the patch variant does not match
    /// `item.kind`, and [`DocError::NotFound`] when the item does not exist.
    pub fn update_item(&mut self, item: ItemRef, patch: &ItemPatch) -> Result<(), DocError> {
        if patch.kind() != item.kind {
            return Err(DocError::KindMismatch { target: item.kind, patch: patch.kind() });
        }
        let not_found = DocError::NotFound(item);
        match patch {
            ItemPatch::Sticker(p) => {
                let sticker = self.stickers.iter_mut().find(|s| s.id == item.id).ok_or(not_found)?;
                p.apply(&mut sticker.geometry);
                if let Some(opacity) = p.opacity {
                    sticker.opacity = clamp_opacity(opacity);
                }
            }
            ItemPatch::FloatingImage(p) => {
                let image = self
                    .floating_images
                    .iter_mut()
                    .find(|i| i.id == item.id)
                    .ok_or(not_found)?;
                p.apply(&mut image.geometry);
                if let Some(opacity) = p.opacity {
                    image.opacity = clamp_opacity(opacity);
                }
            }
            ItemPatch::FloatingText(p) => {
                let note = self
                    .floating_texts
                    .iter_mut()
                    .find(|t| t.id == item.id)
                    .ok_or(not_found)?;
                p.apply(note);
            }
            ItemPatch::Block(p) => {
                let block = self.block_mut(item.id)?;
                p.apply(&mut block.styles);
            }
        }
        Ok(())
    }

    /// Remove the referenced item. Returns `true` if something was removed.
    pub fn delete_item(&mut self, item: ItemRef) -> bool {
        fn remove_by_id<T>(items: &mut Vec<T>, id: ItemId, id_of: impl Fn(&T) -> ItemId) -> bool {
            let before = items.len();
            items.retain(|it| id_of(it) != id);
            items.len() != before
        }
        match item.kind {
            ItemKind::Block => remove_by_id(&mut self.blocks, item.id, |b| b.id),
            ItemKind::Sticker => remove_by_id(&mut self.stickers, item.id, |s| s.id),
            ItemKind::FloatingText => remove_by_id(&mut self.floating_texts, item.id, |t| t.id),
            ItemKind::FloatingImage => remove_by_id(&mut self.floating_images, item.id, |i| i.id),
        }
    }

    // --- Blocks ---

    /// Append a block at the end of the document and return its id.
    pub fn add_block(&mut self, kind: BlockKind) -> ItemId {
        let block = ContentBlock::new(kind);
        let id = block.id;
        self.blocks.push(block);
        id
    }

    /// Insert a block at `index` (clamped to the document length).
    pub fn insert_block(&mut self, index: usize, kind: BlockKind) -> ItemId {
        let block = ContentBlock::new(kind);
        let id = block.id;
        let index = index.min(self.blocks.len());
        self.blocks.insert(index, block);
        id
    }

    /// Position of a block in document order.
    #[must_use]
    pub fn block_index(&self, id: ItemId) -> Option<usize> {
        self.blocks.iter().position(|b| b.id == id)
    }

    fn block_mut(&mut self, id: ItemId) -> Result<&mut ContentBlock, DocError> {
        self.blocks
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or(DocError::NotFound(ItemRef::new(ItemKind::Block, id)))
    }

    /// Replace a block's paragraph or caption text.
    ///
    /// # Errors
    ///
    /// Returns [`DocError::NotFound`] when the block does not exist.
    pub fn set_block_text(&mut self, id: ItemId, text: impl Into<String>) -> Result<(), DocError> {
        self.block_mut(id)?.text = text.into();
        Ok(())
    }

    /// Set or clear one of a block's image URLs.
    ///
    /// # Errors
    ///
    /// Returns [`DocError::NotFound`] when the block does not exist.
    pub fn set_block_image(&mut self, id: ItemId, slot: ImageSlot, url: Option<String>) -> Result<(), DocError> {
        let block = self.block_mut(id)?;
        match slot {
            ImageSlot::Primary => block.image_url = url,
            ImageSlot::Secondary => block.image_url2 = url,
        }
        Ok(())
    }

    /// Add `step_deg` to a block's image rotation and return the new value.
    ///
    /// # Errors
    ///
    /// Returns [`DocError::NotFound`] when the block does not exist.
    pub fn rotate_block_image(&mut self, id: ItemId, step_deg: f64) -> Result<f64, DocError> {
        let block = self.block_mut(id)?;
        block.image_rotation += step_deg;
        Ok(block.image_rotation)
    }

    /// Switch how a block's image fills its frame.
    ///
    /// # Errors
    ///
    /// Returns [`DocError::NotFound`] when the block does not exist.
    pub fn set_block_fit(&mut self, id: ItemId, fit: ImageFit) -> Result<(), DocError> {
        self.block_mut(id)?.image_fit = fit;
        Ok(())
    }

    /// Switch a block's layout. Existing text and images are kept.
    ///
    /// # Errors
    ///
    /// Returns [`DocError::NotFound`] when the block does not exist.
    pub fn set_block_kind(&mut self, id: ItemId, kind: BlockKind) -> Result<(), DocError> {
        self.block_mut(id)?.kind = kind;
        Ok(())
    }

    /// Swap a block with its neighbour. Returns `false` at either end.
    ///
    /// # Errors
    ///
    /// Returns [`DocError::NotFound`] when the block does not exist.
    pub fn move_block(&mut self, id: ItemId, direction: BlockMove) -> Result<bool, DocError> {
        let index = self
            .block_index(id)
            .ok_or(DocError::NotFound(ItemRef::new(ItemKind::Block, id)))?;
        let target = match direction {
            BlockMove::Up if index > 0 => index - 1,
            BlockMove::Down if index + 1 < self.blocks.len() => index + 1,
            _ => return Ok(false),
        };
        self.blocks.swap(index, target);
        Ok(true)
    }

    // --- Bulk ---

    /// Replace all four collections at once.
    pub fn load(
        &mut self,
        blocks: Vec<ContentBlock>,
        stickers: Vec<Sticker>,
        floating_texts: Vec<FloatingText>,
        floating_images: Vec<FloatingImage>,
    ) {
        self.blocks = blocks;
        self.stickers = stickers;
        self.floating_texts = floating_texts;
        self.floating_images = floating_images;
    }
}
