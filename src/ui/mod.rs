//! Terminal UI: main menu, a board for playing against the AI or another
//! person, and a progress screen for self-play training.

mod app;
pub mod board_widget;
mod game_view;
mod training_view;

pub use app::App;
