pub mod client;
pub mod errors;
pub mod fingerprint;
pub mod generation;
pub mod generator;
pub mod models;
pub mod proposals;
pub mod repo;
pub mod save;
pub mod session;
pub mod validation;

pub use client::*;
pub use errors::*;
pub use generation::*;
pub use generator::*;
pub use models::*;
pub use proposals::*;
pub use repo::*;
pub use save::*;
pub use session::*;
pub use validation::*;
