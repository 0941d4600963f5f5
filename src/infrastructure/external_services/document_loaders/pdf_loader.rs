use std::collections::BTreeMap;
use std::path::Path;

use async_trait::async_trait;
use lopdf::{Document as PdfDocument, Object};
use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::application::ports::{DocumentLoader, LoadError};
use crate::domain::entities::{Document, LoadedSegment};
use crate::domain::value_objects::{DocumentKind, SegmentMetadata};

/// One segment per page, in page order, numbered from 1.
pub struct PdfLoader {
    password: String,
}

impl PdfLoader {
    pub fn new() -> Self {
        Self {
            password: String::new(),
        }
    }

    fn filter_func(object_id: (u32, u16), object: &mut Object) -> Option<((u32, u16), Object)> {
        static IGNORE: &[&[u8]] = &[
            b"Length",
            b"BBox",
            b"Matrix",
            b"Filter",
            b"ColorSpace",
            b"Width",
            b"Height",
            b"BitsPerComponent",
            b"PTEX.FileName",
            b"PTEX.PageNumber",
            b"PTEX.InfoDict",
            b"FontDescriptor",
            b"ExtGState",
            b"MediaBox",
        ];

        if let Object::Dictionary(dict) = object {
            let keys_to_remove: Vec<_> = dict
                .iter()
                .filter(|(key, _)| IGNORE.contains(&key.as_slice()))
                .map(|(key, _)| key.clone())
                .collect();
            for key in keys_to_remove {
                dict.remove(&key);
            }
        }

        Some((object_id, object.to_owned()))
    }

    fn extract_pages(path: &Path, password: &str) -> Result<BTreeMap<u32, String>, LoadError> {
        let mut doc = PdfDocument::load_filtered(path, Self::filter_func)
            .map_err(|e| LoadError::CorruptedFile(e.to_string()))?;

        if doc.is_encrypted() {
            doc.decrypt(password).map_err(|_e| {
                LoadError::ExtractionFailed("Failed to decrypt PDF - invalid password".to_string())
            })?;
        }

        let pages = doc.get_pages();
        if pages.is_empty() {
            return Err(LoadError::ExtractionFailed("PDF has no pages".to_string()));
        }

        let extracted_pages: Vec<Result<(u32, String), String>> = pages
            .into_par_iter()
            .map(|(page_num, _): (u32, (u32, u16))| -> Result<(u32, String), String> {
                let text = doc.extract_text(&[page_num]).map_err(|e| {
                    format!("Failed to extract text from page {}: {}", page_num, e)
                })?;

                let lines: Vec<&str> = text
                    .split('\n')
                    .map(|s| s.trim_end())
                    .filter(|s| !s.is_empty())
                    .collect();

                Ok((page_num, lines.join("\n")))
            })
            .collect();

        let mut page_texts = BTreeMap::new();
        let mut errors = Vec::new();

        for page_result in extracted_pages {
            match page_result {
                Ok((page_num, text)) => {
                    page_texts.insert(page_num, text);
                }
                Err(e) => errors.push(e),
            }
        }

        for error in errors.iter().take(10) {
            tracing::warn!("{}: {}", path.display(), error);
        }

        if page_texts.is_empty() {
            return Err(LoadError::ExtractionFailed(format!(
                "No page could be read ({} errors)",
                errors.len()
            )));
        }

        Ok(page_texts)
    }
}

impl Default for PdfLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentLoader for PdfLoader {
    async fn load(&self, document: &Document) -> Result<Vec<LoadedSegment>, LoadError> {
        if document.kind() != DocumentKind::Pdf {
            return Err(LoadError::UnsupportedFormat(document.kind().to_string()));
        }

        let path = document.path().to_path_buf();
        let password = self.password.clone();
        let page_texts = tokio::task::spawn_blocking(move || Self::extract_pages(&path, &password))
            .await
            .map_err(|e| LoadError::ExtractionFailed(e.to_string()))??;

        let segments = page_texts
            .into_iter()
            .map(|(page_num, text)| {
                let mut metadata =
                    SegmentMetadata::new(document.file_name().to_string(), DocumentKind::Pdf)
                        .with_page(page_num);
                if let Some(hash) = document.file_hash() {
                    metadata.set_file_hash(hash.clone());
                }
                LoadedSegment::new(text, metadata)
            })
            .collect();

        Ok(segments)
    }

    fn can_load(&self, kind: DocumentKind) -> bool {
        kind == DocumentKind::Pdf
    }
}
