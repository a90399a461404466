//! Sentence-aware text chunking
//!
//! Text is cut at sentence boundaries (UAX #29). Sentences longer than the
//! budget fall back to word boundaries, and words longer than the budget are
//! cut by character. Sizes are counted in Unicode scalar values so CJK text
//! is measured the same way as ASCII.

use unicode_segmentation::UnicodeSegmentation;

use crate::chunk::Chunk;
use crate::document::Document;
use crate::error::{CoreError, Result};

pub const DEFAULT_CHUNK_SIZE: usize = 4096;
pub const DEFAULT_CHUNK_OVERLAP: usize = 20;

/// Chunks produced for a set of documents plus the next free index
#[derive(Debug, Clone, Default)]
pub struct ChunkBatch {
    pub chunks: Vec<Chunk>,
    pub next_index: usize,
}

/// Splits document text into chunks of at most `chunk_size` characters
#[derive(Debug, Clone)]
pub struct SentenceChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl Default for SentenceChunker {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
        }
    }
}

impl SentenceChunker {
    /// Create a chunker; `chunk_overlap` must be smaller than `chunk_size`
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(CoreError::Validation("chunk_size must be greater than zero".into()));
        }
        if chunk_overlap >= chunk_size {
            return Err(CoreError::Validation(format!(
                "chunk_overlap ({chunk_overlap}) must be less than chunk_size ({chunk_size})"
            )));
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Chunk every document in order, numbering chunks from `start`.
    ///
    /// Identifiers follow document-then-chunk order; the returned
    /// `next_index` continues the sequence for a later batch.
    pub fn chunk_documents(&self, documents: &[Document], start: usize) -> ChunkBatch {
        let mut chunks = Vec::new();
        let mut index = start;

        for document in documents {
            for text in self.split_text(&document.text) {
                chunks.push(Chunk::new(index, text, document.metadata.clone()));
                index += 1;
            }
        }

        ChunkBatch {
            chunks,
            next_index: index,
        }
    }

    /// Split text into trimmed, non-empty chunks in original order
    pub fn split_text(&self, text: &str) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut current = String::new();
        let mut current_len = 0usize;
        // `current` holds text not yet emitted (beyond carried overlap)
        let mut fresh = false;

        for piece in self.pieces(text) {
            let piece_len = piece.chars().count();

            if fresh && current_len + piece_len > self.chunk_size {
                push_trimmed(&mut chunks, &current);
                current = self.overlap_tail(&current);
                current_len = current.chars().count();

                if current_len + piece_len > self.chunk_size {
                    current.clear();
                    current_len = 0;
                }
            }

            current.push_str(&piece);
            current_len += piece_len;
            fresh = true;
        }

        if fresh {
            push_trimmed(&mut chunks, &current);
        }

        chunks
    }

    /// Sentences, each cut down to fit the budget
    fn pieces(&self, text: &str) -> Vec<String> {
        let mut pieces = Vec::new();
        for sentence in text.split_sentence_bounds() {
            if sentence.chars().count() <= self.chunk_size {
                pieces.push(sentence.to_string());
            } else {
                pieces.extend(pack_words(sentence, self.chunk_size));
            }
        }
        pieces
    }

    /// Last `chunk_overlap` characters, starting at a word boundary when possible
    fn overlap_tail(&self, text: &str) -> String {
        if self.chunk_overlap == 0 {
            return String::new();
        }

        let total = text.chars().count();
        if total <= self.chunk_overlap {
            return text.to_string();
        }

        let start = text
            .char_indices()
            .nth(total - self.chunk_overlap)
            .map(|(i, _)| i)
            .unwrap_or(0);
        let tail = &text[start..];

        match tail.find(char::is_whitespace) {
            Some(pos) => tail[pos..].trim_start().to_string(),
            None => tail.to_string(),
        }
    }
}

fn push_trimmed(chunks: &mut Vec<String>, text: &str) {
    let trimmed = text.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
}

/// Group word segments into strings of at most `limit` characters
fn pack_words(sentence: &str, limit: usize) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in sentence.split_word_bounds() {
        let word_len = word.chars().count();

        if word_len > limit {
            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
                current_len = 0;
            }
            out.extend(hard_split(word, limit));
            continue;
        }

        if current_len + word_len > limit {
            out.push(std::mem::take(&mut current));
            current_len = 0;
        }
        current.push_str(word);
        current_len += word_len;
    }

    if !current.is_empty() {
        out.push(current);
    }

    out
}

fn hard_split(word: &str, limit: usize) -> Vec<String> {
    let chars: Vec<char> = word.chars().collect();
    chars.chunks(limit).map(|c| c.iter().collect()).collect()
}
