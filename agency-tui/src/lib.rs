pub mod app;
pub mod events;
pub mod platform;
pub mod theme;
pub mod ui;
