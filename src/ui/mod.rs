//! Ratatui front-end: dashboard cards, the agenda, and the two entry forms.

mod app;
mod forms;
mod helpers;
mod screens;
mod terminal;

pub use app::App;
pub use terminal::run_app;
