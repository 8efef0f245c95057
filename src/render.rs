//! Composition: lays the document out into a display list.
//!
//! Blocks are stacked top-to-bottom in document order, each as tall as its own
//! content. Free items form a second layer painted above every block, in
//! ascending z-index with collection order as the tiebreak. The result is a
//! [`Scene`] the host turns into DOM nodes or draw calls; this module never
//! mutates document or selection state.
//!
//! Text height is estimated from an average glyph advance rather than measured,
//! so block boxes are deterministic without a font backend.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use serde::Serialize;

use crate::camera::{Camera, Rect};
use crate::consts::{AVG_GLYPH_WIDTH, BLOCK_GAP, CANVAS_PADDING, CANVAS_WIDTH, LINE_HEIGHT, MIN_CANVAS_HEIGHT};
use crate::doc::{BlockKind, ContentBlock, DocStore, ItemId, ItemKind, ItemRef, ItemView, TextStyles};
use crate::selection::Selection;

/// Gap between the two images of a double block, and between image and text.
const IMAGE_GUTTER: f64 = 12.0;

/// How a document should be composed.
#[derive(Debug, Clone, Copy)]
pub struct ComposeOptions {
    /// Logical canvas width all positions are expressed against.
    pub logical_width: f64,
    /// The document never lays out shorter than this.
    pub min_height: f64,
    /// Viewport placement and uniform scale.
    pub camera: Camera,
    /// Fixed outer height of a preview frame, if any.
    pub frame_height: Option<f64>,
    /// Disables handles, inline editing and selection.
    pub read_only: bool,
}

impl Default for ComposeOptions {
    fn default() -> Self {
        Self {
            logical_width: CANVAS_WIDTH,
            min_height: MIN_CANVAS_HEIGHT,
            camera: Camera::default(),
            frame_height: None,
            read_only: false,
        }
    }
}

impl ComposeOptions {
    /// Read-only thumbnail of a `logical_width` canvas squeezed into `target_width`.
    #[must_use]
    pub fn preview(logical_width: f64, target_width: f64, frame_height: Option<f64>) -> Self {
        Self {
            logical_width,
            camera: Camera::fit_width(logical_width, target_width),
            frame_height,
            read_only: true,
            ..Self::default()
        }
    }
}

/// Outer/inner container sizes for a scaled canvas.
///
/// The inner container keeps the logical width and is scaled by `scale`; its
/// height is divided by `scale` so the scaled result fills the outer frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    pub scale: f64,
    pub outer_width: f64,
    pub outer_height: f64,
    pub inner_width: f64,
    pub inner_height: f64,
}

/// Layout of one content block, in canvas coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockBox {
    pub id: ItemId,
    pub kind: BlockKind,
    /// Full extent of the block.
    pub rect: Rect,
    /// Frames of the block's images, in display order.
    pub image_rects: Vec<Rect>,
    /// Area holding paragraph or caption text.
    pub text_rect: Option<Rect>,
    /// Wrapped text lines.
    pub lines: Vec<String>,
    pub selected: bool,
    pub editable: bool,
}

/// What a free item shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PaintContent {
    Image { url: String },
    Text { text: String, styles: TextStyles },
}

/// One free item ready to paint.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaintItem {
    pub item: ItemRef,
    /// Unrotated box in canvas coordinates.
    pub rect: Rect,
    /// Unrotated box in viewport coordinates.
    pub screen: Rect,
    /// Clockwise degrees around the box center.
    pub rotation: f64,
    pub z_index: i64,
    pub opacity: f64,
    pub content: PaintContent,
    pub selected: bool,
    /// Resize and rotate handles are drawn.
    pub show_handles: bool,
    /// Text content accepts inline edits.
    pub editable: bool,
}

/// Everything the host needs to draw the document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    pub frame: Frame,
    /// Logical document height (grows with content).
    pub height: f64,
    pub blocks: Vec<BlockBox>,
    /// Free items in paint order, bottom first.
    pub items: Vec<PaintItem>,
}

/// Compose the document into a [`Scene`].
#[must_use]
pub fn compose(doc: &DocStore, selection: &Selection, options: &ComposeOptions) -> Scene {
    let selected = if options.read_only { None } else { selection.selected() };
    let editable = !options.read_only;

    let mut blocks = layout_blocks(doc.blocks(), options.logical_width);
    for block in &mut blocks {
        block.selected = selected == Some(ItemRef::new(ItemKind::Block, block.id));
        block.editable = editable;
    }

    let items: Vec<PaintItem> = doc
        .sorted_free_items()
        .into_iter()
        .filter_map(|(item, geometry)| {
            let (opacity, content) = match doc.get(item)? {
                ItemView::Sticker(s) => (s.opacity, PaintContent::Image { url: s.url.clone() }),
                ItemView::FloatingImage(i) => (i.opacity, PaintContent::Image { url: i.url.clone() }),
                ItemView::FloatingText(t) => {
                    (1.0, PaintContent::Text { text: t.text.clone(), styles: t.styles.clone() })
                }
                ItemView::Block(_) => return None,
            };
            let is_selected = selected == Some(item);
            Some(PaintItem {
                item,
                rect: geometry.rect(),
                screen: options.camera.rect_to_screen(geometry.rect()),
                rotation: geometry.rotation,
                z_index: geometry.z_index,
                opacity,
                content,
                selected: is_selected,
                show_handles: is_selected && editable,
                editable: editable && item.kind == ItemKind::FloatingText,
            })
        })
        .collect();

    let blocks_bottom = blocks.last().map_or(0.0, |b| b.rect.bottom() + CANVAS_PADDING);
    let items_bottom = items.iter().map(|i| i.rect.bottom()).fold(0.0, f64::max);
    let height = options.min_height.max(blocks_bottom).max(items_bottom);

    Scene { frame: frame(options, height), height, blocks, items }
}

fn frame(options: &ComposeOptions, height: f64) -> Frame {
    let scale = options.camera.scale;
    let outer_height = options.frame_height.unwrap_or(height * scale);
    Frame {
        scale,
        outer_width: options.logical_width * scale,
        outer_height,
        inner_width: options.logical_width,
        inner_height: outer_height / scale,
    }
}

/// Lay blocks out top-to-bottom inside a canvas of `logical_width`.
#[must_use]
pub fn layout_blocks(blocks: &[ContentBlock], logical_width: f64) -> Vec<BlockBox> {
    let content_w = (logical_width - CANVAS_PADDING * 2.0).max(1.0);
    let mut top = CANVAS_PADDING;
    let mut out = Vec::with_capacity(blocks.len());
    for block in blocks {
        let laid = layout_block(block, CANVAS_PADDING, top, content_w);
        top = laid.rect.bottom() + BLOCK_GAP;
        out.push(laid);
    }
    out
}

#[allow(clippy::cast_precision_loss)]
fn layout_block(block: &ContentBlock, left: f64, top: f64, width: f64) -> BlockBox {
    let font_size = block.styles.font_size;
    let image_h = block.styles.image_height.max(0.0);
    let text_height = |lines: &[String]| lines.len() as f64 * font_size * LINE_HEIGHT;

    let (image_rects, text_rect, lines, height) = match block.kind {
        BlockKind::Paragraph => {
            let mut lines = wrap_text_lines(&block.text, width, font_size);
            if lines.is_empty() {
                lines.push(String::new());
            }
            let h = text_height(&lines);
            (Vec::new(), Some(Rect::new(left, top, width, h)), lines, h)
        }
        BlockKind::ImageFull | BlockKind::ImageDouble => {
            let images = if block.kind == BlockKind::ImageFull {
                vec![Rect::new(left, top, width, image_h)]
            } else {
                let half = (width - IMAGE_GUTTER) * 0.5;
                vec![
                    Rect::new(left, top, half, image_h),
                    Rect::new(left + half + IMAGE_GUTTER, top, half, image_h),
                ]
            };
            let lines = wrap_text_lines(&block.text, width, font_size);
            if lines.is_empty() {
                (images, None, lines, image_h)
            } else {
                let caption_top = top + image_h + IMAGE_GUTTER;
                let caption_h = text_height(&lines);
                let caption = Rect::new(left, caption_top, width, caption_h);
                (images, Some(caption), lines, image_h + IMAGE_GUTTER + caption_h)
            }
        }
        BlockKind::ImageLeft | BlockKind::ImageRight => {
            let half = (width - IMAGE_GUTTER) * 0.5;
            let (image_x, text_x) = if block.kind == BlockKind::ImageLeft {
                (left, left + half + IMAGE_GUTTER)
            } else {
                (left + half + IMAGE_GUTTER, left)
            };
            let lines = wrap_text_lines(&block.text, half, font_size);
            let text_h = text_height(&lines);
            let h = image_h.max(text_h);
            (
                vec![Rect::new(image_x, top, half, image_h)],
                Some(Rect::new(text_x, top, half, text_h)),
                lines,
                h,
            )
        }
    };

    BlockBox {
        id: block.id,
        kind: block.kind,
        rect: Rect::new(left, top, width, height),
        image_rects,
        text_rect,
        lines,
        selected: false,
        editable: false,
    }
}

#[allow(clippy::cast_precision_loss)]
fn measured_text_width(text: &str, font_size: f64) -> f64 {
    text.chars().count() as f64 * font_size * AVG_GLYPH_WIDTH
}

/// Greedy word wrap against an estimated glyph width.
///
/// Hard line breaks are kept; words wider than a line are broken by character.
/// Empty text yields no lines.
#[must_use]
pub fn wrap_text_lines(text: &str, max_w: f64, font_size: f64) -> Vec<String> {
    let mut out = Vec::new();
    if text.is_empty() {
        return out;
    }
    for raw_line in text.lines() {
        let words: Vec<&str> = raw_line.split_whitespace().collect();
        if words.is_empty() {
            out.push(String::new());
            continue;
        }

        let mut current = String::new();
        for word in words {
            let candidate = if current.is_empty() { word.to_owned() } else { format!("{current} {word}") };
            if measured_text_width(&candidate, font_size) <= max_w {
                current = candidate;
                continue;
            }
            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
            }
            if measured_text_width(word, font_size) <= max_w {
                current = word.to_owned();
            } else {
                let mut chunks = break_long_word(word, max_w, font_size);
                if let Some(last) = chunks.pop() {
                    out.extend(chunks);
                    current = last;
                }
            }
        }
        if !current.is_empty() {
            out.push(current);
        }
    }
    out
}

fn break_long_word(word: &str, max_w: f64, font_size: f64) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for ch in word.chars() {
        let mut candidate = current.clone();
        candidate.push(ch);
        if !current.is_empty() && measured_text_width(&candidate, font_size) > max_w {
            lines.push(current);
            current = ch.to_string();
        } else {
            current = candidate;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
