use serde::Serialize;

/// A record parsed from one window, tagged with its source window for
/// traceability. Not persisted; collapsed into the final result by dedup.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateRecord<R> {
    pub record: R,
    pub chunk_index: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExtractionStats {
    pub total_chunks: usize,
    pub successful_chunks: usize,
    pub duplicates_removed: usize,
    pub total_items: usize,
}

/// Final output of a workflow run. Per-window failures are folded into
/// `errors` (one entry per dropped window); `success` is false only when at
/// least one window was attempted and none succeeded.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionResult<R> {
    pub success: bool,
    pub records: Vec<R>,
    pub errors: Vec<String>,
    pub stats: ExtractionStats,
}
