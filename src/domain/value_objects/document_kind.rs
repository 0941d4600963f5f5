use serde::{Deserialize, Serialize};
use std::path::Path;

/// File kinds the loader knows how to turn into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Pdf,
    Image,
}

impl DocumentKind {
    /// Resolves the kind from a file name, falling back to the MIME type sent
    /// with an upload. Returns `None` for anything unsupported.
    pub fn classify(file_name: &str, content_type: Option<&str>) -> Option<Self> {
        Self::from_extension(file_name).or_else(|| content_type.and_then(Self::from_content_type))
    }

    pub fn from_extension(file_name: &str) -> Option<Self> {
        let extension = Path::new(file_name)
            .extension()?
            .to_str()?
            .to_ascii_lowercase();

        match extension.as_str() {
            "pdf" => Some(DocumentKind::Pdf),
            "png" | "jpg" | "jpeg" => Some(DocumentKind::Image),
            _ => None,
        }
    }

    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        match essence.as_str() {
            "application/pdf" => Some(DocumentKind::Pdf),
            "image/png" | "image/jpeg" | "image/jpg" => Some(DocumentKind::Image),
            _ => None,
        }
    }

    pub fn supported_extensions() -> &'static [&'static str] {
        &["pdf", "png", "jpg", "jpeg"]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Pdf => "pdf",
            DocumentKind::Image => "image",
        }
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
