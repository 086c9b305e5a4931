//! # Showdeck UI orchestration
//!
//! Headless implementation of the showcase page's client-side behavior:
//! media embed lifecycle, section navigation, progressive archive
//! rendering, live-stream tab switching, and share links. The browser is
//! abstracted behind a retained element tree, explicit viewport signals, a
//! logical-time queue, and capability traits for the widget SDK and
//! clipboard, so the whole page runs and tests without a real DOM.

pub mod archive;
pub mod dom;
pub mod embed;
pub mod engine;
pub mod loader;
pub mod observer;
pub mod share;
pub mod testing;
pub mod timers;
pub mod url;
pub mod widget;

pub use engine::UiEngine;
pub use loader::{ArchiveLoader, ArchiveSource};
