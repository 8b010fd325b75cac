use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};

use crate::embeddings::chunking::Chunk;

/// Source information for one stored vector.
///
/// A record's position in the metadata collection equals its vector's label in the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataRecord {
    pub file_name: String,
    pub text: String,
    /// ISO-8601 creation time, e.g. `2025-01-31T09:15:02.117Z`
    pub timestamp: String,
    pub chunk_id: usize,
}

impl MetadataRecord {
    #[inline]
    pub fn from_chunk(chunk: &Chunk) -> Self {
        Self {
            file_name: chunk.file_name.clone(),
            text: chunk.text.clone(),
            timestamp: chunk
                .created_at
                .to_rfc3339_opts(SecondsFormat::Millis, true),
            chunk_id: chunk.chunk_index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    #[test]
    fn serializes_with_camel_case_fields() {
        let chunk = Chunk {
            file_name: "doc1.pdf".to_string(),
            chunk_index: 2,
            text: "Boiling point 141 C".to_string(),
            created_at: Utc
                .with_ymd_and_hms(2025, 1, 31, 9, 15, 2)
                .single()
                .expect("valid timestamp"),
        };

        let value = serde_json::to_value(MetadataRecord::from_chunk(&chunk))
            .expect("should serialize record");

        assert_eq!(
            value,
            json!({
                "fileName": "doc1.pdf",
                "text": "Boiling point 141 C",
                "timestamp": "2025-01-31T09:15:02.000Z",
                "chunkId": 2
            })
        );
    }
}
