//! # Scope UI Core Library
//!
//! Core library for the `scope-ui` application: a microscope-control
//! front-end with live parameter editing and a mosaic stage-navigation
//! view. Organizing the project as a library keeps the editing and
//! navigation logic testable without the native window.
//!
//! ## Crate Structure
//!
//! - **`config`**: Application settings loaded from TOML files under
//!   `config/`. See `config::Settings`.
//! - **`coord`**: Unit-tagged scene points shared by the mosaic view and
//!   the instrument-control side.
//! - **`editor`**: The parameter-editing session: working copy, change
//!   counting, commit, and external refresh. The GUI renders it, this
//!   module owns the rules.
//! - **`error`**: The `ScopeError` enum for centralized error handling.
//! - **`gui`**: The native interface built on `eframe`/`egui`: selector,
//!   mosaic canvas, editor windows, and the captured-log panel.
//! - **`log_capture`**: A `log::Log` implementation that captures records
//!   for display inside the GUI.
//! - **`mosaic`**: The mosaic camera: zoom, coordinate transforms, capture
//!   hot-keys, and file-drop validation.
//! - **`parameter`**: Typed parameters and the dotted-path tree they live
//!   in, with per-kind validation.
//! - **`selector`**: The ordered list of loaded configurations with one
//!   current entry, lockable during captures.
//! - **`storage`**: Parameter-file persistence (TOML, one file per
//!   configuration).

pub mod config;
pub mod coord;
pub mod editor;
pub mod error;
pub mod gui;
pub mod log_capture;
pub mod mosaic;
pub mod parameter;
pub mod selector;
pub mod storage;
