pub mod dto;
pub mod error;
pub mod identity;
pub mod routes;
pub mod server;
