
pub mod flat;
pub mod metadata;

use indicatif::ProgressBar;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, error, info, warn};

use crate::embeddings::{Chunk, Embedder};
use crate::{ReportError, Result};

pub use flat::{FlatL2Index, SearchHits};
pub use metadata::MetadataRecord;

/// Binary index snapshot, stored under the reports directory
pub const INDEX_FILE_NAME: &str = "faiss_index.bin";
/// Metadata JSON array, stored under the reports directory
pub const METADATA_FILE_NAME: &str = "faiss_metadata.json";

/// The vector index paired with its metadata and storage location.
///
/// Label `i` in the index corresponds to `metadata[i]`. Every mutation goes through
/// [`RetrievalContext::append`], which keeps the two in lock step.
#[derive(Debug, Clone)]
pub struct RetrievalContext {
    reports_dir: PathBuf,
    dimension: usize,
    index: Option<FlatL2Index>,
    metadata: Vec<MetadataRecord>,
}

/// Outcome of ingesting one document's chunks
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub total_chunks: usize,
    pub stored: usize,
    /// Chunk indices whose embedding failed
    pub failed: Vec<usize>,
}

/// A metadata record found by similarity search
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievedChunk {
    pub label: usize,
    pub distance: f32,
    pub record: MetadataRecord,
}

impl RetrievalContext {
    #[inline]
    pub fn new(reports_dir: impl Into<PathBuf>, dimension: usize) -> Self {
        Self {
            reports_dir: reports_dir.into(),
            dimension,
            index: None,
            metadata: Vec::new(),
        }
    }

    #[inline]
    pub fn reports_dir(&self) -> &Path {
        &self.reports_dir
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    #[inline]
    pub fn index_path(&self) -> PathBuf {
        self.reports_dir.join(INDEX_FILE_NAME)
    }

    #[inline]
    pub fn metadata_path(&self) -> PathBuf {
        self.reports_dir.join(METADATA_FILE_NAME)
    }

    #[inline]
    pub fn index(&self) -> Option<&FlatL2Index> {
        self.index.as_ref()
    }

    #[inline]
    pub fn metadata(&self) -> &[MetadataRecord] {
        &self.metadata
    }

    /// Number of indexed vectors
    #[inline]
    pub fn len(&self) -> usize {
        self.index.as_ref().map_or(0, FlatL2Index::len)
    }

    /// True when there is nothing to search
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0 || self.metadata.is_empty()
    }

    /// Load the persisted index and metadata when both files exist.
    ///
    /// Returns `false` and leaves the current state untouched when either file is missing.
    #[inline]
    pub async fn load(&mut self) -> Result<bool> {
        let index_path = self.index_path();
        let metadata_path = self.metadata_path();

        if !fs::try_exists(&index_path).await? || !fs::try_exists(&metadata_path).await? {
            debug!(
                "No persisted index found in {}",
                self.reports_dir.display()
            );
            return Ok(false);
        }

        let mut index = FlatL2Index::read(&index_path).await?;
        if index.dimension() != self.dimension {
            return Err(ReportError::DimensionMismatch {
                expected: self.dimension,
                actual: index.dimension(),
            });
        }

        let raw = fs::read_to_string(&metadata_path).await.map_err(|e| {
            ReportError::Persistence(format!(
                "Failed to read metadata file {}: {}",
                metadata_path.display(),
                e
            ))
        })?;
        let mut metadata: Vec<MetadataRecord> = serde_json::from_str(&raw).map_err(|e| {
            ReportError::Persistence(format!(
                "Failed to parse metadata file {}: {}",
                metadata_path.display(),
                e
            ))
        })?;

        if metadata.len() != index.len() {
            let kept = metadata.len().min(index.len());
            warn!(
                "Index holds {} vectors but metadata holds {} records; keeping the first {}",
                index.len(),
                metadata.len(),
                kept
            );
            index.truncate(kept);
            metadata.truncate(kept);
        }

        info!(
            "Loaded index with {} vectors from {}",
            index.len(),
            index_path.display()
        );

        self.index = Some(index);
        self.metadata = metadata;
        Ok(true)
    }

    /// Persist the index snapshot, then the metadata. Does nothing when no index exists.
    #[inline]
    pub async fn save(&self) -> Result<()> {
        let Some(index) = self.index.as_ref() else {
            debug!("Nothing to save, index not initialized");
            return Ok(());
        };

        fs::create_dir_all(&self.reports_dir).await.map_err(|e| {
            ReportError::Persistence(format!(
                "Failed to create directory {}: {}",
                self.reports_dir.display(),
                e
            ))
        })?;

        index.write(&self.index_path()).await?;

        let json = serde_json::to_string_pretty(&self.metadata)
            .map_err(|e| ReportError::Persistence(format!("Failed to encode metadata: {}", e)))?;
        let metadata_path = self.metadata_path();
        fs::write(&metadata_path, json).await.map_err(|e| {
            ReportError::Persistence(format!(
                "Failed to write metadata file {}: {}",
                metadata_path.display(),
                e
            ))
        })?;

        debug!(
            "Saved {} vectors to {}",
            index.len(),
            self.reports_dir.display()
        );
        Ok(())
    }

    fn ensure_index(&mut self) -> &mut FlatL2Index {
        let dimension = self.dimension;
        self.index.get_or_insert_with(|| FlatL2Index::new(dimension))
    }

    /// Add one vector and its record, creating the index on first use.
    /// Returns the new label.
    ///
    /// Fails without touching either side when the index and metadata are out of step.
    #[inline]
    pub fn append(&mut self, vector: &[f32], record: MetadataRecord) -> Result<usize> {
        let records = self.metadata.len();
        let index = self.ensure_index();
        if index.len() != records {
            return Err(ReportError::Persistence(format!(
                "Index holds {} vectors but metadata holds {} records",
                index.len(),
                records
            )));
        }

        let label = index.add(vector)?;
        self.metadata.push(record);
        Ok(label)
    }

    /// Embed and store every chunk, then persist.
    ///
    /// A chunk whose embedding fails is logged and skipped; the rest are still stored.
    /// The index files are written even when no chunk was stored.
    #[inline]
    pub async fn ingest(&mut self, chunks: &[Chunk], embedder: &dyn Embedder) -> Result<IngestReport> {
        self.ingest_with_progress(chunks, embedder, &ProgressBar::hidden())
            .await
    }

    #[inline]
    pub async fn ingest_with_progress(
        &mut self,
        chunks: &[Chunk],
        embedder: &dyn Embedder,
        progress: &ProgressBar,
    ) -> Result<IngestReport> {
        let mut report = IngestReport {
            total_chunks: chunks.len(),
            ..IngestReport::default()
        };
        progress.set_length(chunks.len() as u64);
        self.ensure_index();

        for (position, chunk) in chunks.iter().enumerate() {
            progress.set_message(format!("chunk {}/{}", position + 1, chunks.len()));

            let stored = match embedder.embed(&chunk.text).await {
                Ok(vector) => self
                    .append(&vector, MetadataRecord::from_chunk(chunk))
                    .map(|_| ()),
                Err(e) => Err(e),
            };

            match stored {
                Ok(()) => report.stored += 1,
                Err(e) => {
                    error!(
                        "Error embedding chunk {} of {}: {}",
                        chunk.chunk_index, chunk.file_name, e
                    );
                    report.failed.push(chunk.chunk_index);
                }
            }
            progress.inc(1);
        }

        self.save().await?;

        info!(
            "Stored {}/{} chunks, index now holds {} vectors",
            report.stored,
            report.total_chunks,
            self.len()
        );
        Ok(report)
    }

    /// Up to `k` records nearest to `query`, nearest first.
    ///
    /// Labels without a metadata record are dropped.
    #[inline]
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<RetrievedChunk>> {
        let Some(index) = self.index.as_ref() else {
            return Ok(Vec::new());
        };

        let hits = index.search(query, k)?;
        let retrieved = hits
            .labels
            .iter()
            .zip(&hits.distances)
            .filter_map(|(&label, &distance)| match self.metadata.get(label) {
                Some(record) => Some(RetrievedChunk {
                    label,
                    distance,
                    record: record.clone(),
                }),
                None => {
                    warn!("Index label {} has no metadata record", label);
                    None
                }
            })
            .collect();

        Ok(retrieved)
    }
}
