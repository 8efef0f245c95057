//! Free-form canvas engine for scrapbook posts.
//!
//! A post is a fixed-width document made of flow-positioned content blocks
//! (paragraphs and image layouts) with free items floating above them:
//! stickers, floating text notes and floating images. This crate owns the
//! document model, the per-item drag/resize/rotate gesture state machine, the
//! single-selection and z-order rules, and the composition of the document
//! into a display list. The host (a browser page compiled to WebAssembly, or a
//! test) wires raw pointer events into [`engine::EngineCore`] and renders the
//! resulting [`render::Scene`].
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level engine, testable [`engine::EngineCore`] and the DOM-bound [`engine::Engine`] |
//! | [`doc`] | Item types and the in-memory store of the four collections |
//! | [`patch`] | Typed update commands and the JSON boundary that parses them |
//! | [`snapshot`] | Persisted document shape and lossless JSON round-trip |
//! | [`input`] | Pointer input types and the per-item gesture state machine |
//! | [`hit`] | Hit-testing of items and their handles |
//! | [`selection`] | Single selection and z-order queries |
//! | [`render`] | Composition of blocks and free items into a [`render::Scene`] |
//! | [`camera`] | Viewport offset / uniform scale and coordinate conversions |
//! | [`upload`] | Image bytes to URL resolution, with a data-URL fallback |
//! | [`config`] | Engine configuration |
//! | [`consts`] | Shared numeric constants (sizes, spawn points, handle radii) |
//! | [`web`] | `wasm-bindgen` facade the page calls into |

pub mod camera;
pub mod config;
pub mod consts;
pub mod doc;
pub mod engine;
pub mod hit;
pub mod input;
pub mod patch;
pub mod render;
pub mod selection;
pub mod snapshot;
pub mod upload;
pub mod web;
