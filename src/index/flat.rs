use std::path::Path;
use tokio::fs;
use tracing::debug;

use crate::{ReportError, Result};

/// Magic bytes at the start of a serialized index
pub const INDEX_MAGIC: [u8; 4] = *b"FL2I";
pub const INDEX_FORMAT_VERSION: u32 = 1;

const HEADER_LEN: usize = 4 + 4 + 4 + 8;

/// Exact nearest-neighbour index over squared Euclidean distance.
///
/// Vectors are stored contiguously and identified by insertion order (their label).
/// The index only supports appends.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatL2Index {
    dimension: usize,
    vectors: Vec<f32>,
}

/// Search output as parallel arrays, nearest first
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchHits {
    pub labels: Vec<usize>,
    pub distances: Vec<f32>,
}

impl SearchHits {
    #[inline]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl FlatL2Index {
    #[inline]
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            vectors: Vec::new(),
        }
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of stored vectors
    #[inline]
    pub fn len(&self) -> usize {
        self.vectors.len().checked_div(self.dimension).unwrap_or(0)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_dimension(&self, vector: &[f32]) -> Result<()> {
        if vector.len() == self.dimension {
            Ok(())
        } else {
            Err(ReportError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            })
        }
    }

    /// Append a vector, returning its label
    #[inline]
    pub fn add(&mut self, vector: &[f32]) -> Result<usize> {
        self.check_dimension(vector)?;
        let label = self.len();
        self.vectors.extend_from_slice(vector);
        Ok(label)
    }

    /// Drop every vector with a label at or above `len`
    #[inline]
    pub fn truncate(&mut self, len: usize) {
        self.vectors.truncate(len.saturating_mul(self.dimension));
    }

    /// Stored vector for `label`, if any
    #[inline]
    pub fn vector(&self, label: usize) -> Option<&[f32]> {
        let start = label.checked_mul(self.dimension)?;
        self.vectors.get(start..start.checked_add(self.dimension)?)
    }

    /// Return up to `k` nearest vectors ordered by non-decreasing distance.
    /// Equal distances are ordered by label.
    #[inline]
    pub fn search(&self, query: &[f32], k: usize) -> Result<SearchHits> {
        self.check_dimension(query)?;

        if k == 0 || self.is_empty() {
            return Ok(SearchHits::default());
        }

        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .chunks_exact(self.dimension)
            .enumerate()
            .map(|(label, stored)| (label, squared_l2(stored, query)))
            .collect();

        scored.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        scored.truncate(k);

        debug!(
            "Flat index search over {} vectors returned {} hits",
            self.len(),
            scored.len()
        );

        Ok(SearchHits {
            labels: scored.iter().map(|(label, _)| *label).collect(),
            distances: scored.iter().map(|(_, distance)| *distance).collect(),
        })
    }

    /// Serialize into the native binary snapshot format:
    /// magic, format version (u32), dimension (u32), count (u64), then little-endian f32 values
    #[inline]
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let dimension = u32::try_from(self.dimension).map_err(|_| {
            ReportError::Persistence(format!(
                "Index dimension {} does not fit the snapshot format",
                self.dimension
            ))
        })?;
        let count = u64::try_from(self.len())
            .map_err(|_| ReportError::Persistence("Index holds too many vectors".to_string()))?;

        let mut buffer = Vec::with_capacity(HEADER_LEN + self.vectors.len() * 4);
        buffer.extend_from_slice(&INDEX_MAGIC);
        buffer.extend_from_slice(&INDEX_FORMAT_VERSION.to_le_bytes());
        buffer.extend_from_slice(&dimension.to_le_bytes());
        buffer.extend_from_slice(&count.to_le_bytes());
        for value in &self.vectors {
            buffer.extend_from_slice(&value.to_le_bytes());
        }
        Ok(buffer)
    }

    #[inline]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut cursor = bytes;

        let magic = take(&mut cursor, 4)?;
        if magic != INDEX_MAGIC.as_slice() {
            return Err(corrupt("unrecognized index header"));
        }

        let version = u32::from_le_bytes(take_array(&mut cursor)?);
        if version != INDEX_FORMAT_VERSION {
            return Err(corrupt(&format!("unsupported index format version {}", version)));
        }

        let dimension = u32::from_le_bytes(take_array(&mut cursor)?) as usize;
        if dimension == 0 {
            return Err(corrupt("index dimension is zero"));
        }

        let count = usize::try_from(u64::from_le_bytes(take_array(&mut cursor)?))
            .map_err(|_| corrupt("vector count does not fit in memory"))?;

        let expected_len = count
            .checked_mul(dimension)
            .and_then(|values| values.checked_mul(4))
            .ok_or_else(|| corrupt("vector count overflows"))?;
        if cursor.len() != expected_len {
            return Err(corrupt(&format!(
                "expected {} bytes of vector data, found {}",
                expected_len,
                cursor.len()
            )));
        }

        let vectors = cursor
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect();

        Ok(Self { dimension, vectors })
    }

    /// Write the binary snapshot to `path`
    #[inline]
    pub async fn write(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_bytes()?).await.map_err(|e| {
            ReportError::Persistence(format!(
                "Failed to write index file {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// Read a binary snapshot from `path`
    #[inline]
    pub async fn read(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).await.map_err(|e| {
            ReportError::Persistence(format!(
                "Failed to read index file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_bytes(&bytes)
    }
}

fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

fn take<'a>(cursor: &mut &'a [u8], len: usize) -> Result<&'a [u8]> {
    let (head, tail) = cursor
        .split_at_checked(len)
        .ok_or_else(|| corrupt("index file is truncated"))?;
    *cursor = tail;
    Ok(head)
}

fn take_array<const N: usize>(cursor: &mut &[u8]) -> Result<[u8; N]> {
    let head = take(cursor, N)?;
    <[u8; N]>::try_from(head).map_err(|_| corrupt("index file is truncated"))
}

fn corrupt(reason: &str) -> ReportError {
    ReportError::Persistence(format!("Corrupt index file: {}", reason))
}
