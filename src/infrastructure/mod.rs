pub mod config;
pub mod container;
pub mod external_services;
pub mod file_system;
pub mod vector_store;

pub use config::{AppConfig, ConfigError};
pub use container::AppContainer;
