// Retrieval-augmented question answering over the indexed documents


use tracing::{debug, info};

use crate::Result;
use crate::embeddings::Embedder;
use crate::index::RetrievalContext;
use crate::llm::TextGenerator;

/// Number of chunks retrieved per query
pub const TOP_K: usize = 3;

/// Answer returned when nothing has been indexed yet
pub const NOTHING_INDEXED: &str = "No documents indexed yet.";

/// Answer returned when no retrieved label maps to a stored chunk
pub const NOTHING_RELEVANT: &str = "No relevant information found in the documents.";

/// Build the augmented prompt; `contexts` are expected nearest first
#[inline]
pub fn build_rag_prompt<S: AsRef<str>>(query: &str, contexts: &[S]) -> String {
    let joined = contexts
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "Using the following context from CDMO documents, answer the query: \"{}\"\n\n\
         Context:\n{}\n\n\
         Provide a concise, natural language response based on the context.",
        query, joined
    )
}

/// Answer `query` from the persisted index.
///
/// Reloads the context first so chunks ingested by another run are visible. Returns
/// [`NOTHING_INDEXED`] without calling the embedder when the index is empty, and
/// [`NOTHING_RELEVANT`] when none of the nearest labels has a metadata record.
#[inline]
pub async fn query_with_rag(
    context: &mut RetrievalContext,
    embedder: &dyn Embedder,
    llm: &dyn TextGenerator,
    query: &str,
) -> Result<String> {
    context.load().await?;

    if context.is_empty() {
        info!("Query received but no documents are indexed");
        return Ok(NOTHING_INDEXED.to_string());
    }

    let query_vector = embedder.embed(query).await?;
    let retrieved = context.search(&query_vector, TOP_K)?;

    if retrieved.is_empty() {
        return Ok(NOTHING_RELEVANT.to_string());
    }

    debug!(
        "Retrieved {} chunks for query, distances {:?}",
        retrieved.len(),
        retrieved.iter().map(|hit| hit.distance).collect::<Vec<_>>()
    );

    let contexts: Vec<&str> = retrieved.iter().map(|hit| hit.record.text.as_str()).collect();
    let prompt = build_rag_prompt(query, &contexts);

    llm.generate(&prompt).await
}
