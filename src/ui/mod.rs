//! Ratatui front-end. Renders the two shelves from the current projection and
//! routes key presses back into the book store.

mod app;
mod forms;
mod helpers;
mod terminal;

pub use app::App;
pub use terminal::run_app;
