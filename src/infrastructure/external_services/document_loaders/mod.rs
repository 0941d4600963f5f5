pub mod composite_loader;
pub mod image_loader;
pub mod pdf_loader;

pub use composite_loader::CompositeDocumentLoader;
pub use image_loader::ImageLoader;
pub use pdf_loader::PdfLoader;
