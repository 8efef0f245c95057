//! JavaScript-facing wrapper around [`Engine`].
//!
//! The page owns the DOM listeners; each handler forwards raw numbers here and
//! gets the resulting [`Action`] list back as a JSON array string. Items are
//! addressed by their serialized kind (`"sticker"`, `"floating"`, ...) and id.
//!
//! Image bytes go through an optional page-supplied upload function, which
//! receives a `Uint8Array` and returns (a promise of) the hosted URL. Without
//! one the bytes are inlined as a data URL.

use std::rc::Rc;

use js_sys::{Function, Promise, Uint8Array};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{JsFuture, future_to_promise};
use web_sys::Element;

use crate::camera::Point;
use crate::config::EngineConfig;
use crate::doc::{ImageSlot, ItemId, ItemKind, ItemRef, ZDirection};
use crate::engine::{Action, Engine, EngineCore};
use crate::input::{Button, Key};
use crate::snapshot::DocumentSnapshot;
use crate::upload::{ImageUploader, UploadError};

fn map_button(button: i16) -> Button {
    match button {
        1 => Button::Middle,
        2 => Button::Secondary,
        _ => Button::Primary,
    }
}

fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn actions_json(actions: &[Action]) -> String {
    serde_json::to_string(actions).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to serialize actions");
        "[]".into()
    })
}

fn parse_item(kind: &str, id: &str) -> Result<ItemRef, JsValue> {
    let kind: ItemKind =
        serde_json::from_value(serde_json::Value::String(kind.to_owned())).map_err(js_error)?;
    let id: ItemId = id.parse().map_err(js_error)?;
    Ok(ItemRef::new(kind, id))
}

fn created(item: Option<ItemRef>) -> String {
    let actions: Vec<Action> = item
        .map(|item| {
            vec![
                Action::ItemCreated { item },
                Action::SelectionChanged { item: Some(item) },
                Action::RenderNeeded,
            ]
        })
        .unwrap_or_default();
    actions_json(&actions)
}

fn upload_rejected(e: &JsValue) -> UploadError {
    UploadError::Rejected(e.as_string().unwrap_or_else(|| format!("{e:?}")))
}

/// [`ImageUploader`] backed by a JavaScript function.
struct JsUploader(Function);

#[async_trait::async_trait(?Send)]
impl ImageUploader for JsUploader {
    async fn upload(&self, bytes: &[u8]) -> Result<String, UploadError> {
        let array = Uint8Array::from(bytes);
        let returned = self.0.call1(&JsValue::NULL, &array).map_err(|e| upload_rejected(&e))?;
        let resolved = JsFuture::from(Promise::resolve(&returned)).await.map_err(|e| upload_rejected(&e))?;
        resolved.as_string().ok_or_else(|| UploadError::Rejected("uploader did not resolve to a url".into()))
    }
}

/// Post editor handle exported to the page.
#[wasm_bindgen]
pub struct WebEditor {
    engine: Engine,
}

#[wasm_bindgen]
impl WebEditor {
    /// Bind an editor to `root`. `config_json` overrides [`EngineConfig`] defaults.
    ///
    /// # Errors
    ///
    /// Returns the config error message when `config_json` does not parse.
    #[wasm_bindgen(constructor)]
    pub fn new(root: Element, config_json: Option<String>) -> Result<WebEditor, JsValue> {
        let config = match config_json {
            Some(raw) => EngineConfig::from_json(&raw).map_err(js_error)?,
            None => EngineConfig::default(),
        };
        Ok(Self { engine: Engine::new(root, config) })
    }

    #[wasm_bindgen(js_name = pointerDown)]
    pub fn pointer_down(&self, x: f64, y: f64, button: i16) -> String {
        actions_json(&self.engine.on_pointer_down(Point::new(x, y), map_button(button)))
    }

    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(&self, x: f64, y: f64) -> String {
        actions_json(&self.engine.on_pointer_move(Point::new(x, y)))
    }

    #[wasm_bindgen(js_name = pointerUp)]
    pub fn pointer_up(&self, x: f64, y: f64, button: i16) -> String {
        actions_json(&self.engine.on_pointer_up(Point::new(x, y), map_button(button)))
    }

    #[wasm_bindgen(js_name = keyDown)]
    pub fn key_down(&self, key: String) -> String {
        actions_json(&self.engine.on_key_down(&Key(key)))
    }

    #[wasm_bindgen(js_name = addSticker)]
    pub fn add_sticker(&self, url: String) -> String {
        created(self.engine.core.borrow_mut().add_sticker(url))
    }

    #[wasm_bindgen(js_name = addFloatingText)]
    pub fn add_floating_text(&self) -> String {
        created(self.engine.core.borrow_mut().add_floating_text())
    }

    /// Add a floating image from file bytes.
    ///
    /// Resolves to the action list JSON once `upload` (or the data URL
    /// fallback) produced a URL. The editor keeps taking input meanwhile.
    #[wasm_bindgen(js_name = addFloatingImage)]
    pub fn add_floating_image(&self, bytes: Vec<u8>, upload: Option<Function>) -> Promise {
        let core = Rc::clone(&self.engine.core);
        future_to_promise(async move {
            let uploader = upload.map(JsUploader);
            let uploader = uploader.as_ref().map(|u| u as &dyn ImageUploader);
            let item = EngineCore::add_floating_image(&core, &bytes, uploader).await;
            Ok(JsValue::from_str(&created(item)))
        })
    }

    /// Add a floating image whose bytes the page already uploaded.
    #[wasm_bindgen(js_name = addFloatingImageUrl)]
    pub fn add_floating_image_url(&self, url: String) -> String {
        created(self.engine.core.borrow_mut().commit_floating_image(url))
    }

    /// Fill a block image slot from file bytes. Resolves to whether it applied.
    ///
    /// # Errors
    ///
    /// Returns an error message when `id` is not a uuid.
    #[wasm_bindgen(js_name = setBlockImage)]
    pub fn set_block_image(
        &self,
        id: &str,
        secondary: bool,
        bytes: Vec<u8>,
        upload: Option<Function>,
    ) -> Result<Promise, JsValue> {
        let id: ItemId = id.parse().map_err(js_error)?;
        let slot = if secondary { ImageSlot::Secondary } else { ImageSlot::Primary };
        let core = Rc::clone(&self.engine.core);
        Ok(future_to_promise(async move {
            let uploader = upload.map(JsUploader);
            let uploader = uploader.as_ref().map(|u| u as &dyn ImageUploader);
            let applied = EngineCore::set_block_image(&core, id, slot, &bytes, uploader).await;
            Ok(JsValue::from_bool(applied))
        }))
    }

    /// Merge a JSON object of changes into an item.
    ///
    /// # Errors
    ///
    /// Returns an error message when `kind`/`id` do not name an item type and uuid.
    #[wasm_bindgen(js_name = updateItem)]
    pub fn update_item(&self, kind: &str, id: &str, changes: &str) -> Result<bool, JsValue> {
        let item = parse_item(kind, id)?;
        let changes: serde_json::Value = serde_json::from_str(changes).map_err(js_error)?;
        Ok(self.engine.core.borrow_mut().update_item_json(item, &changes))
    }

    /// # Errors
    ///
    /// Returns an error message when `kind`/`id` do not name an item type and uuid.
    #[wasm_bindgen(js_name = changeZIndex)]
    #[allow(clippy::cast_precision_loss)]
    pub fn change_z_index(&self, kind: &str, id: &str, up: bool) -> Result<Option<f64>, JsValue> {
        let item = parse_item(kind, id)?;
        let direction = if up { ZDirection::Up } else { ZDirection::Down };
        Ok(self.engine.core.borrow_mut().change_z_index(item, direction).map(|z| z as f64))
    }

    #[wasm_bindgen(js_name = deleteSelected)]
    pub fn delete_selected(&self) -> String {
        let deleted = self.engine.core.borrow_mut().delete_selected();
        let actions: Vec<Action> = deleted
            .map(|item| {
                vec![
                    Action::ItemDeleted { item },
                    Action::SelectionChanged { item: None },
                    Action::RenderNeeded,
                ]
            })
            .unwrap_or_default();
        actions_json(&actions)
    }

    #[wasm_bindgen(js_name = setReadOnly)]
    pub fn set_read_only(&self, read_only: bool) {
        self.engine.core.borrow_mut().set_read_only(read_only);
    }

    /// # Errors
    ///
    /// Returns the snapshot error message when `raw` is not a valid document.
    #[wasm_bindgen(js_name = loadDocument)]
    pub fn load_document(&self, raw: &str) -> Result<(), JsValue> {
        let snapshot = DocumentSnapshot::from_json(raw).map_err(js_error)?;
        self.engine.core.borrow_mut().load_snapshot(snapshot);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns the serialization error message.
    #[wasm_bindgen(js_name = saveDocument)]
    pub fn save_document(&self) -> Result<String, JsValue> {
        self.engine.core.borrow().snapshot().to_json().map_err(js_error)
    }

    /// The current display list as JSON.
    ///
    /// # Errors
    ///
    /// Returns the serialization error message.
    pub fn scene(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.engine.scene()).map_err(js_error)
    }

    /// A read-only thumbnail display list `width` pixels wide.
    ///
    /// # Errors
    ///
    /// Returns the serialization error message.
    pub fn preview(&self, width: f64, height: Option<f64>) -> Result<String, JsValue> {
        let scene = self.engine.core.borrow().preview(width, height);
        serde_json::to_string(&scene).map_err(js_error)
    }
}
