pub mod api;
pub mod cli;
pub mod client;
pub mod tui;
