
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::Split;
use tracing::debug;

/// Represents a chunk of document text ready for embedding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Name of the source document
    pub file_name: String,
    /// Position of this chunk within the document, starting at 0
    pub chunk_index: usize,
    /// The trimmed chunk text
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Configuration for content chunking
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Token budget per chunk
    pub max_tokens: usize,
    /// Characters assumed per token when converting the budget to characters
    pub chars_per_token: usize,
}

impl Default for ChunkingConfig {
    #[inline]
    fn default() -> Self {
        Self {
            max_tokens: 4000,
            chars_per_token: 4,
        }
    }
}

impl ChunkingConfig {
    /// Character budget per chunk
    #[inline]
    pub fn max_chars(&self) -> usize {
        self.max_tokens.saturating_mul(self.chars_per_token)
    }
}

/// Lazy line-accumulating chunker over a borrowed text.
///
/// Lines are never split: a single line longer than the budget becomes its own
/// oversized chunk. Cloning the iterator restarts from the same position.
#[derive(Debug, Clone)]
pub struct TextChunks<'a> {
    lines: Split<'a, char>,
    buffer: String,
    buffer_chars: usize,
    max_chars: usize,
}

impl<'a> TextChunks<'a> {
    #[inline]
    pub fn new(text: &'a str, max_chars: usize) -> Self {
        Self {
            lines: text.split('\n'),
            buffer: String::new(),
            buffer_chars: 0,
            max_chars,
        }
    }

    fn flush(&mut self, next: Option<&str>) -> Option<String> {
        let flushed = match next {
            Some(line) => {
                self.buffer_chars = line.chars().count();
                std::mem::replace(&mut self.buffer, line.to_string())
            }
            None => {
                self.buffer_chars = 0;
                std::mem::take(&mut self.buffer)
            }
        };
        let trimmed = flushed.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }
}

impl Iterator for TextChunks<'_> {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(line) = self.lines.next() {
            let line_chars = line.chars().count();
            let separator = usize::from(!self.buffer.is_empty());

            if self.buffer_chars + separator + line_chars > self.max_chars {
                if let Some(chunk) = self.flush(Some(line)) {
                    return Some(chunk);
                }
            } else {
                if separator == 1 {
                    self.buffer.push('\n');
                }
                self.buffer.push_str(line);
                self.buffer_chars += separator + line_chars;
            }
        }

        if self.buffer.is_empty() {
            None
        } else {
            self.flush(None)
        }
    }
}

/// Split raw text into trimmed chunks of at most `config.max_chars()` characters
#[inline]
pub fn chunk_text(text: &str, config: &ChunkingConfig) -> Vec<String> {
    TextChunks::new(text, config.max_chars()).collect()
}

/// Chunk a document's extracted text, tagging each chunk with its source and position
#[inline]
pub fn chunk_document(file_name: &str, text: &str, config: &ChunkingConfig) -> Vec<Chunk> {
    let chunks: Vec<Chunk> = TextChunks::new(text, config.max_chars())
        .enumerate()
        .map(|(chunk_index, text)| Chunk {
            file_name: file_name.to_string(),
            chunk_index,
            text,
            created_at: Utc::now(),
        })
        .collect();

    debug!(
        "Chunked '{}' into {} chunks (avg {} tokens)",
        file_name,
        chunks.len(),
        chunks
            .iter()
            .map(|c| estimate_token_count(&c.text))
            .sum::<usize>()
            / chunks.len().max(1)
    );

    chunks
}

/// Estimate token count assuming four characters per token
#[inline]
pub fn estimate_token_count(text: &str) -> usize {
    text.chars().count().div_ceil(4)
}
