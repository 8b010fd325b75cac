// Document processor
// Ties extraction, report generation, ingestion and retrieval together

use indicatif::ProgressBar;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::config::Config;
use crate::embeddings::{Embedder, build_embedder, chunk_document};
use crate::extract::extract_text;
use crate::index::{IngestReport, RetrievalContext};
use crate::llm::{LlmBackend, TextGenerator};
use crate::rag::query_with_rag;
use crate::report::{PromptTemplates, ReportGenerator, ReportResult};
use crate::{ReportError, Result};

/// A generated report together with the outcome of indexing its source
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedDocument {
    pub report: ReportResult,
    pub ingest: IngestReport,
}

/// Owns the retrieval context and the model backends for one run of the tool
pub struct DocumentProcessor {
    config: Config,
    generator: ReportGenerator,
    llm: Box<dyn TextGenerator>,
    embedder: Box<dyn Embedder>,
    context: RetrievalContext,
}

impl DocumentProcessor {
    #[inline]
    pub fn new(
        config: Config,
        prompts: PromptTemplates,
        llm: Box<dyn TextGenerator>,
        embedder: Box<dyn Embedder>,
    ) -> Self {
        let context = RetrievalContext::new(config.reports_dir(), embedder.dimension());
        Self {
            config,
            generator: ReportGenerator::new(prompts),
            llm,
            embedder,
            context,
        }
    }

    /// Build the backends and prompt templates named by `config`
    #[inline]
    pub async fn from_config(config: Config) -> Result<Self> {
        let llm = LlmBackend::from_config(&config.llm)?;
        let embedder = build_embedder(&config.embeddings)?;
        let prompts = PromptTemplates::load(&config.prompts_file()).await?;
        Ok(Self::new(config, prompts, Box::new(llm), embedder))
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[inline]
    pub fn context(&self) -> &RetrievalContext {
        &self.context
    }

    /// Path of `file_name` inside the documents directory, if it names an existing file
    #[inline]
    pub fn document_path(&self, file_name: &str) -> Option<PathBuf> {
        if file_name.trim().is_empty() {
            return None;
        }
        let path = self.config.documents_dir().join(file_name);
        path.is_file().then_some(path)
    }

    /// Extract, classify and summarize a document, then index its chunks
    #[inline]
    pub async fn generate_report(&mut self, file_name: &str) -> Result<ProcessedDocument> {
        self.generate_report_with_progress(file_name, &ProgressBar::hidden())
            .await
    }

    #[inline]
    pub async fn generate_report_with_progress(
        &mut self,
        file_name: &str,
        progress: &ProgressBar,
    ) -> Result<ProcessedDocument> {
        let path = self.document_path(file_name).ok_or_else(|| {
            ReportError::Extraction(format!(
                "Document not found: {}",
                self.config.documents_dir().join(file_name).display()
            ))
        })?;

        progress.set_message("extracting text");
        let text = extract_text(&path).await?;
        if text.trim().is_empty() {
            warn!("No text extracted from {}", file_name);
        }

        progress.set_message("generating report");
        let report = self.generator.generate(self.llm.as_ref(), &text).await?;

        progress.set_message("indexing chunks");
        let chunks = chunk_document(file_name, &text, &self.config.chunking);
        self.context.load().await?;
        let ingest = self
            .context
            .ingest_with_progress(&chunks, self.embedder.as_ref(), progress)
            .await?;

        info!(
            "Embeddings stored for {} ({} chunks, {} failed)",
            file_name,
            ingest.total_chunks,
            ingest.failed.len()
        );

        Ok(ProcessedDocument { report, ingest })
    }

    /// Answer a natural-language question from the indexed documents
    #[inline]
    pub async fn query(&mut self, question: &str) -> Result<String> {
        query_with_rag(
            &mut self.context,
            self.embedder.as_ref(),
            self.llm.as_ref(),
            question,
        )
        .await
    }
}
