pub mod dto;
pub mod handlers;
pub mod routes;
pub mod server;
pub mod session_store;

pub use server::HttpServer;
