pub mod chat_dto;
pub mod document_dto;
pub mod response_dto;
pub mod vision_dto;

pub use chat_dto::*;
pub use document_dto::*;
pub use response_dto::*;
pub use vision_dto::*;
