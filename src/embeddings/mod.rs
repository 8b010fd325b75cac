// Embeddings module
// Handles text chunking and the embedding service boundary

pub mod chunking;
pub mod client;

pub use chunking::{
    Chunk, ChunkingConfig, TextChunks, chunk_document, chunk_text, estimate_token_count,
};
pub use client::{Embedder, OllamaEmbedder, OpenAiEmbedder, build_embedder};
