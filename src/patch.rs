//! Typed update commands for items, and the JSON boundary that produces them.
//!
//! Inside the crate every edit is an [`ItemPatch`]: a closed, per-kind set of
//! optional fields. A caller cannot hand the store an input event by mistake.
//! Hosts that only have loosely typed data (a style toolbar talking JSON)
//! go through [`ItemPatch::from_json`], which is the one place that still
//! checks payload shape at runtime.

#[cfg(test)]
#[path = "patch_test.rs"]
mod patch_test;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::doc::{BlockStyles, FloatingText, Geometry, ItemKind, TextAlign};

/// Keys that only appear on DOM / synthetic input events.
const EVENT_KEYS: &[&str] = &[
    "preventDefault",
    "stopPropagation",
    "nativeEvent",
    "currentTarget",
    "target",
    "isTrusted",
];

/// Sparse geometry update for a free item. Only present fields are applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeometryPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub w: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub h: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z_index: Option<i64>,
    /// Ignored for floating text, which has no opacity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
}

impl GeometryPatch {
    /// Patch that moves an item to `(x, y)`.
    #[must_use]
    pub fn position(x: f64, y: f64) -> Self {
        Self { x: Some(x), y: Some(y), ..Self::default() }
    }

    /// Patch that resizes an item to `w × h`.
    #[must_use]
    pub fn size(w: f64, h: f64) -> Self {
        Self { w: Some(w), h: Some(h), ..Self::default() }
    }

    /// Patch that sets an item's rotation.
    #[must_use]
    pub fn rotation(degrees: f64) -> Self {
        Self { rotation: Some(degrees), ..Self::default() }
    }

    /// Whether the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merge into `geometry`, keeping width and height at or above the floor.
    pub fn apply(&self, geometry: &mut Geometry) {
        if let Some(x) = self.x {
            geometry.x = x;
        }
        if let Some(y) = self.y {
            geometry.y = y;
        }
        if let Some(w) = self.w {
            geometry.w = w;
        }
        if let Some(h) = self.h {
            geometry.h = h;
        }
        if let Some(r) = self.rotation {
            geometry.rotation = r;
        }
        if let Some(z) = self.z_index {
            geometry.z_index = z;
        }
        geometry.enforce_min_size();
    }
}

/// Sparse update for a floating text note: geometry, content and styles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextPatch {
    #[serde(flatten)]
    pub geometry: GeometryPatch,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_align: Option<TextAlign>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub underline: Option<bool>,
}

impl TextPatch {
    /// Merge into a note. Style fields go to `styles`, the rest to the root.
    pub fn apply(&self, note: &mut FloatingText) {
        self.geometry.apply(&mut note.geometry);
        if let Some(text) = &self.text {
            note.text.clone_from(text);
        }
        let styles = &mut note.styles;
        if let Some(size) = self.font_size {
            styles.font_size = size;
        }
        if let Some(weight) = &self.font_weight {
            styles.font_weight.clone_from(weight);
        }
        if let Some(align) = self.text_align {
            styles.text_align = align;
        }
        if let Some(color) = &self.color {
            styles.color.clone_from(color);
        }
        if let Some(bg) = &self.background_color {
            styles.background_color.clone_from(bg);
        }
        if let Some(family) = &self.font_family {
            styles.font_family.clone_from(family);
        }
        if self.italic.is_some() {
            styles.italic = self.italic;
        }
        if self.underline.is_some() {
            styles.underline = self.underline;
        }
    }
}

/// Sparse update for a content block's styles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockStylePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_align: Option<TextAlign>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_height: Option<f64>,
}

impl BlockStylePatch {
    pub fn apply(&self, styles: &mut BlockStyles) {
        if let Some(size) = self.font_size {
            styles.font_size = size;
        }
        if let Some(align) = self.text_align {
            styles.text_align = align;
        }
        if let Some(color) = &self.color {
            styles.color.clone_from(color);
        }
        if let Some(height) = self.image_height {
            styles.image_height = height;
        }
    }
}

/// An update command addressed to one item kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "changes")]
pub enum ItemPatch {
    #[serde(rename = "sticker")]
    Sticker(GeometryPatch),
    #[serde(rename = "floatingImage")]
    FloatingImage(GeometryPatch),
    #[serde(rename = "floating")]
    FloatingText(TextPatch),
    #[serde(rename = "block")]
    Block(BlockStylePatch),
}

/// Why a loosely typed payload was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatchError {
    #[error("update payload is not a JSON object")]
    NotAnObject,
    #[error("update payload looks like an input event (has `{0}`)")]
    EventPayload(String),
    #[error("invalid update field: {0}")]
    InvalidField(String),
}

impl ItemPatch {
    /// The item kind this patch can be applied to.
    #[must_use]
    pub fn kind(&self) -> ItemKind {
        match self {
            Self::Sticker(_) => ItemKind::Sticker,
            Self::FloatingImage(_) => ItemKind::FloatingImage,
            Self::FloatingText(_) => ItemKind::FloatingText,
            Self::Block(_) => ItemKind::Block,
        }
    }

    /// Wrap a geometry patch for a free item kind. `None` for blocks.
    #[must_use]
    pub fn geometry(kind: ItemKind, geometry: GeometryPatch) -> Option<Self> {
        match kind {
            ItemKind::Sticker => Some(Self::Sticker(geometry)),
            ItemKind::FloatingImage => Some(Self::FloatingImage(geometry)),
            ItemKind::FloatingText => Some(Self::FloatingText(TextPatch { geometry, ..TextPatch::default() })),
            ItemKind::Block => None,
        }
    }

    /// Parse a camelCase JSON object into a patch for `kind`.
    ///
    /// Unknown keys are ignored. For blocks every recognised key is a style.
    ///
    /// # Errors
    ///
    /// Returns [`PatchError::NotAnObject`] for non-objects,
    /// [`PatchError::EventPayload`] when the object carries input-event fields,
    /// and [`PatchError::InvalidField`] when a recognised field has the wrong type.
    pub fn from_json(kind: ItemKind, value: &serde_json::Value) -> Result<Self, PatchError> {
        let Some(map) = value.as_object() else {
            return Err(PatchError::NotAnObject);
        };
        if let Some(key) = EVENT_KEYS.iter().find(|k| map.contains_key(**k)) {
            return Err(PatchError::EventPayload((*key).to_string()));
        }
        Ok(match kind {
            ItemKind::Sticker => Self::Sticker(parse(value)?),
            ItemKind::FloatingImage => Self::FloatingImage(parse(value)?),
            ItemKind::FloatingText => Self::FloatingText(parse(value)?),
            ItemKind::Block => Self::Block(parse(value)?),
        })
    }
}

fn parse<T: DeserializeOwned>(value: &serde_json::Value) -> Result<T, PatchError> {
    serde_json::from_value(value.clone()).map_err(|e| PatchError::InvalidField(e.to_string()))
}
