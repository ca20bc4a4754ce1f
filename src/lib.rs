//! Core library surface for the Bookshelf TUI application.
//!
//! The book store and the projector carry the behaviour; storage, covers,
//! theme, and the terminal UI are adapters around them. The `bin` target wires
//! them together, and tests drive the same pieces directly.
pub mod bootstrap;
pub mod config;
pub mod cover;
pub mod logging;
pub mod models;
pub mod projection;
pub mod storage;
pub mod store;
pub mod theme;
pub mod ui;

/// The two primary domain types that other layers manipulate.
pub use models::{Book, BookPatch};

/// The derived shelf view and the ordering applied to it.
pub use projection::{project, Projection, SortKey};

/// The owner of the collection and its persistence.
pub use store::BookStore;

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
