//! Shared numeric constants for the canvas engine.

// ── Canvas ──────────────────────────────────────────────────────

/// Logical width of a post canvas in CSS pixels.
pub const CANVAS_WIDTH: f64 = 800.0;

/// Minimum logical height of a post canvas; it grows with content.
pub const MIN_CANVAS_HEIGHT: f64 = 1000.0;

/// Inner padding applied around the block column.
pub const CANVAS_PADDING: f64 = 40.0;

// ── Free items ──────────────────────────────────────────────────

/// Floor for free-item width and height.
pub const MIN_ITEM_SIZE: f64 = 30.0;

/// The z-index a new item is stacked above when the canvas holds nothing higher.
pub const Z_FLOOR: i64 = 10;

/// Maximum absolute tilt given to a freshly spawned sticker, in degrees.
pub const STICKER_TILT_DEG: f64 = 10.0;

/// Spawn position of new stickers.
pub const STICKER_SPAWN: (f64, f64) = (350.0, 300.0);
/// Default size of new stickers.
pub const STICKER_SIZE: (f64, f64) = (100.0, 100.0);

/// Spawn position of new floating text notes.
pub const TEXT_SPAWN: (f64, f64) = (300.0, 250.0);
/// Default size of new floating text notes.
pub const TEXT_SIZE: (f64, f64) = (200.0, 100.0);

/// Spawn position of new floating images.
pub const IMAGE_SPAWN: (f64, f64) = (250.0, 200.0);
/// Default size of new floating images.
pub const IMAGE_SIZE: (f64, f64) = (300.0, 200.0);

/// Placeholder content of a new floating text note.
pub const TEXT_PLACEHOLDER: &str = "Write something...";

// ── Rotation ────────────────────────────────────────────────────

/// Offset added to the pointer angle so a handle straight above the center reads 0°.
pub const ROTATE_OFFSET_DEG: f64 = 90.0;

/// Step applied by the block image rotate button, in degrees.
pub const BLOCK_IMAGE_ROTATE_STEP_DEG: f64 = 90.0;

// ── Hit-testing ─────────────────────────────────────────────────

/// Screen-space hit slop in pixels for handles.
pub const HANDLE_RADIUS_PX: f64 = 8.0;

/// Distance from the top edge to the rotate handle, in screen pixels.
pub const ROTATE_HANDLE_OFFSET_PX: f64 = 24.0;

// ── Blocks ──────────────────────────────────────────────────────

/// Default paragraph font size in pixels.
pub const BLOCK_FONT_SIZE: f64 = 16.0;

/// Default image height for image blocks in pixels.
pub const BLOCK_IMAGE_HEIGHT: f64 = 300.0;

/// Line height as a multiple of font size.
pub const LINE_HEIGHT: f64 = 1.6;

/// Average glyph advance as a fraction of font size, used for height estimates.
pub const AVG_GLYPH_WIDTH: f64 = 0.55;

/// Vertical gap between consecutive blocks.
pub const BLOCK_GAP: f64 = 16.0;
