use serde::Serialize;

/// Phase of an extraction run as the engine reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionPhase {
    Chunking,
    Generating,
    Deduplicating,
    Done,
}

/// Status snapshot handed synchronously to the caller's progress callback
/// after each window attempt. Indices are contiguous and strictly
/// increasing over a run; `items_extracted` counts candidates before dedup.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionProgress {
    pub chunk_index: usize,
    pub total_chunks: usize,
    pub items_extracted: usize,
    pub phase: ExtractionPhase,
}
