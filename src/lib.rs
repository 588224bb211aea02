//! Scene interaction and layout engine for a comic-panel page editor.
//!
//! This crate compiles natively and to WebAssembly. It owns the page's
//! interaction semantics: resolving panel-relative and absolute element
//! coordinates, hit-testing with rotation, the drag/resize/rotate gesture
//! state machine, edge snapping between panels, duplication, cascade delete,
//! and a fixed-order compositor over a 2D drawing surface. The host owns the
//! DOM, dialogs, and persistence, and reacts to the [`engine::Action`]s the
//! engine returns.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level engine and testable [`engine::EngineCore`] |
//! | [`doc`] | Panels, page elements, selection, and the scene store |
//! | [`geom`] | Points, rectangles, rotation, and coordinate conversion |
//! | [`input`] | Input event types and the gesture state machine |
//! | [`hit`] | Hit-testing and handle layout |
//! | [`gesture`] | Gesture math applied on pointer move |
//! | [`snap`] | Panel edge snapping and guide lines |
//! | [`render`] | Fixed-order compositor |
//! | [`surface`] | 2D drawing surface trait and its canvas implementation |
//! | [`clipboard`] | Copy, paste, and duplicate |
//! | [`cascade`] | Panel delete with everything inside it |
//! | [`split`] | Cutting a panel in two |
//! | [`config`] | Snap, grid, and page settings |
//! | [`consts`] | Shared numeric constants (minimum sizes, handle offsets, etc.) |

pub mod cascade;
pub mod clipboard;
pub mod config;
pub mod consts;
pub mod doc;
pub mod engine;
pub mod geom;
pub mod gesture;
pub mod hit;
pub mod input;
pub mod render;
pub mod snap;
pub mod split;
pub mod surface;
