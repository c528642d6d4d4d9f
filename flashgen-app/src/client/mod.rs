//! `FlashcardApi` implementations used by the review TUI and the CLI.

pub mod http;
pub mod local;

pub use http::HttpApi;
pub use local::LocalApi;
