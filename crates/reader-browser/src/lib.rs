//! Browser DOM layer for the active reader.
//!
//! Assumes a `wasm32-unknown-unknown` target environment.
//!
//! # Architecture
//!
//! - `selection`: Selection API capture, implementing `SelectionSource`
//! - `events`: listeners that report when the selection may have changed
//!
//! # Re-exports
//!
//! This crate re-exports `reader-core` for convenience, so consumers only
//! need to depend on `reader-browser`.

pub use reader_core;
pub use reader_core::*;

pub mod events;
pub mod selection;

pub use events::{SelectionWatcher, watch_selection};
pub use selection::{BrowserSelection, render_into};
