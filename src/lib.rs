pub mod app;
pub mod game;
pub mod grid;
pub mod piece;
pub mod scoring;
pub mod settings;
pub mod timer;
pub mod ui;
