//! TUI host for the quiz trainer.

mod app;
pub mod theme;
mod widgets;

pub use app::App;
