pub mod app;
mod board;
mod capture;
mod dialogs;
pub mod game;
mod hud;
pub mod progress;
pub mod screen;
mod session;
mod state;
pub mod sync;
