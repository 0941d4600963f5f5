use std::collections::VecDeque;

use crate::domain::entities::{ContentChunk, LoadedSegment};

#[derive(Debug, Clone, PartialEq)]
pub enum ChunkingConfigError {
    ZeroChunkSize,
    OverlapTooLarge { chunk_size: usize, chunk_overlap: usize },
}

impl std::fmt::Display for ChunkingConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChunkingConfigError::ZeroChunkSize => write!(f, "Chunk size must be greater than 0"),
            ChunkingConfigError::OverlapTooLarge {
                chunk_size,
                chunk_overlap,
            } => write!(
                f,
                "Chunk overlap ({}) must be smaller than chunk size ({})",
                chunk_overlap, chunk_size
            ),
        }
    }
}

impl std::error::Error for ChunkingConfigError {}

pub trait TextSplitter {
    fn split_text(&self, text: &str) -> Vec<String>;
}

/// Splits text into windows of at most `chunk_size` characters, preferring
/// paragraph, then line, then word boundaries, and cutting mid-word only when
/// nothing else fits. Neighbouring windows share up to `chunk_overlap`
/// characters.
#[derive(Debug, Clone)]
pub struct RecursiveCharacterSplitter {
    separators: Vec<&'static str>,
    chunk_size: usize,
    chunk_overlap: usize,
}

impl RecursiveCharacterSplitter {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self, ChunkingConfigError> {
        if chunk_size == 0 {
            return Err(ChunkingConfigError::ZeroChunkSize);
        }
        if chunk_overlap >= chunk_size {
            return Err(ChunkingConfigError::OverlapTooLarge {
                chunk_size,
                chunk_overlap,
            });
        }

        Ok(Self {
            separators: vec![
                "\n\n", // Paragraphs
                "\n",   // Lines
                " ",    // Words
                "",     // Characters
            ],
            chunk_size,
            chunk_overlap,
        })
    }

    /// Chunks every segment independently so each chunk keeps the page it
    /// came from. Indices run across the whole batch.
    pub fn split_segments(&self, segments: &[LoadedSegment]) -> Vec<ContentChunk> {
        let mut chunks = Vec::new();

        for segment in segments {
            for text in self.split_text(segment.text()) {
                let index = chunks.len();
                chunks.push(ContentChunk::new(text, index, segment.metadata().clone()));
            }
        }

        chunks
    }

    fn recursive_split(&self, text: &str, first_separator: usize) -> Vec<String> {
        let last = self.separators.len() - 1;
        let separator_index = (first_separator..last)
            .find(|&i| text.contains(self.separators[i]))
            .unwrap_or(last);
        let separator = self.separators[separator_index];

        let pieces: Vec<&str> = if separator.is_empty() {
            text.char_indices()
                .map(|(start, ch)| &text[start..start + ch.len_utf8()])
                .collect()
        } else {
            text.split(separator).filter(|p| !p.is_empty()).collect()
        };

        let mut chunks = Vec::new();
        let mut pending: Vec<&str> = Vec::new();

        for piece in pieces {
            if char_len(piece) < self.chunk_size {
                pending.push(piece);
                continue;
            }

            if !pending.is_empty() {
                chunks.extend(self.merge_pieces(&pending, separator));
                pending.clear();
            }

            if separator_index >= last {
                if let Some(chunk) = trimmed(piece) {
                    chunks.push(chunk);
                }
            } else {
                chunks.extend(self.recursive_split(piece, separator_index + 1));
            }
        }

        if !pending.is_empty() {
            chunks.extend(self.merge_pieces(&pending, separator));
        }

        chunks
    }

    /// Greedily packs small pieces into windows, carrying the tail of each
    /// emitted window (at most `chunk_overlap` characters) into the next.
    fn merge_pieces(&self, pieces: &[&str], separator: &str) -> Vec<String> {
        let separator_len = char_len(separator);
        let mut chunks = Vec::new();
        let mut window: VecDeque<(&str, usize)> = VecDeque::new();
        let mut total = 0usize;

        for &piece in pieces {
            let len = char_len(piece);

            if !window.is_empty() && total + len + separator_len > self.chunk_size {
                if let Some(chunk) = join_window(&window, separator) {
                    chunks.push(chunk);
                }

                while total > self.chunk_overlap
                    || (total > 0 && total + len + separator_len > self.chunk_size)
                {
                    let Some((_, front_len)) = window.pop_front() else {
                        break;
                    };
                    let dropped_separator = if window.is_empty() { 0 } else { separator_len };
                    total = total.saturating_sub(front_len + dropped_separator);
                }
            }

            window.push_back((piece, len));
            total += len + if window.len() > 1 { separator_len } else { 0 };
        }

        if let Some(chunk) = join_window(&window, separator) {
            chunks.push(chunk);
        }

        chunks
    }
}

impl Default for RecursiveCharacterSplitter {
    fn default() -> Self {
        Self {
            separators: vec!["\n\n", "\n", " ", ""],
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

impl TextSplitter for RecursiveCharacterSplitter {
    fn split_text(&self, text: &str) -> Vec<String> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        self.recursive_split(text, 0)
    }
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

fn trimmed(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn join_window(window: &VecDeque<(&str, usize)>, separator: &str) -> Option<String> {
    let joined = window
        .iter()
        .map(|(piece, _)| *piece)
        .collect::<Vec<_>>()
        .join(separator);
    trimmed(&joined)
}
