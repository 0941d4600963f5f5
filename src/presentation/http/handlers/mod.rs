pub mod chat_handler;
pub mod document_handler;
pub mod vision_handler;

pub use chat_handler::ChatHandler;
pub use document_handler::DocumentHandler;
pub use vision_handler::VisionHandler;
