//! Persisted document shape.
//!
//! The persistence collaborator stores a post as one JSON object holding the
//! title, document-level styles and the four item collections. Field names are
//! camelCase (`zIndex`, `imageUrl2`, `floatingTexts`) and free-item geometry is
//! flattened into each item.
//!
//! Loading is an external boundary, so it re-checks what the store otherwise
//! guarantees by construction: ids are unique per collection, sizes respect
//! the floor and opacity stays within `0.0..=1.0`.

#[cfg(test)]
#[path = "snapshot_test.rs"]
mod snapshot_test;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::doc::{
    ContentBlock, DocStore, FloatingImage, FloatingText, Geometry, ItemId, ItemKind, Sticker, clamp_opacity,
};

/// Document-level appearance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentStyles {
    pub background_color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_image: Option<String>,
    pub font_family: String,
}

impl Default for DocumentStyles {
    fn default() -> Self {
        Self { background_color: "#ffffff".into(), background_image: None, font_family: "inherit".into() }
    }
}

/// A whole post as handed to and from persistence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSnapshot {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub styles: DocumentStyles,
    #[serde(default)]
    pub blocks: Vec<ContentBlock>,
    #[serde(default)]
    pub stickers: Vec<Sticker>,
    #[serde(default)]
    pub floating_texts: Vec<FloatingText>,
    #[serde(default)]
    pub floating_images: Vec<FloatingImage>,
}

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("snapshot json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("duplicate {kind:?} id: {id}")]
    DuplicateId { kind: ItemKind, id: ItemId },
}

impl DocumentSnapshot {
    /// Capture the store's collections under `title` and `styles`.
    #[must_use]
    pub fn capture(doc: &DocStore, title: impl Into<String>, styles: DocumentStyles) -> Self {
        Self {
            title: title.into(),
            styles,
            blocks: doc.blocks().to_vec(),
            stickers: doc.stickers().to_vec(),
            floating_texts: doc.floating_texts().to_vec(),
            floating_images: doc.floating_images().to_vec(),
        }
    }

    /// Move the collections into `doc`, replacing what it held.
    pub fn restore(self, doc: &mut DocStore) {
        doc.load(self.blocks, self.stickers, self.floating_texts, self.floating_images);
    }

    /// Serialize to JSON.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Json`] if serialization fails.
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse and validate a persisted snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Json`] for malformed JSON and
    /// [`SnapshotError::DuplicateId`] when a collection repeats an id.
    pub fn from_json(raw: &str) -> Result<Self, SnapshotError> {
        let mut snapshot: Self = serde_json::from_str(raw)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    fn validate(&mut self) -> Result<(), SnapshotError> {
        unique_ids(ItemKind::Block, self.blocks.iter().map(|b| b.id))?;
        unique_ids(ItemKind::Sticker, self.stickers.iter().map(|s| s.id))?;
        unique_ids(ItemKind::FloatingText, self.floating_texts.iter().map(|t| t.id))?;
        unique_ids(ItemKind::FloatingImage, self.floating_images.iter().map(|i| i.id))?;

        for sticker in &mut self.stickers {
            repair_geometry(ItemKind::Sticker, sticker.id, &mut sticker.geometry);
            sticker.opacity = clamp_opacity(sticker.opacity);
        }
        for note in &mut self.floating_texts {
            repair_geometry(ItemKind::FloatingText, note.id, &mut note.geometry);
        }
        for image in &mut self.floating_images {
            repair_geometry(ItemKind::FloatingImage, image.id, &mut image.geometry);
            image.opacity = clamp_opacity(image.opacity);
        }
        Ok(())
    }
}

fn unique_ids(kind: ItemKind, ids: impl Iterator<Item = ItemId>) -> Result<(), SnapshotError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(SnapshotError::DuplicateId { kind, id });
        }
    }
    Ok(())
}

fn repair_geometry(kind: ItemKind, id: ItemId, geometry: &mut Geometry) {
    let before = (geometry.w, geometry.h);
    geometry.enforce_min_size();
    if geometry.w > before.0 || geometry.h > before.1 {
        tracing::warn!(?kind, %id, w = before.0, h = before.1, "persisted item below minimum size, clamped");
    }
}
