use std::collections::HashSet;

use anyhow::{Context, Result};
use chunking::{Chunk, Chunker};
use extract::{SchemaRecord, StructuredGenerator, TextGenerator};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::ExtractionConfig;
use crate::progress::{ExtractionPhase, ExtractionProgress};
use crate::result::{CandidateRecord, ExtractionResult, ExtractionStats};

/// Drives a whole extraction run: partition the input, generate per window
/// with retry, report progress, collapse overlap duplicates, assemble the
/// result.
///
/// Windows are processed strictly sequentially. That bounds the outbound
/// call rate and keeps progress reporting monotonic; independent runs may
/// still execute concurrently, they share no state.
pub struct WorkflowEngine<G> {
    generator: StructuredGenerator<G>,
}

impl<G: TextGenerator> WorkflowEngine<G> {
    pub fn new(client: G) -> Self {
        Self {
            generator: StructuredGenerator::new(client),
        }
    }

    /// Run one extraction over `text`.
    ///
    /// Only configuration problems surface as `Err`, before any window is
    /// processed. Every per-window failure is folded into the returned
    /// result so callers can render partial success.
    pub async fn extract<R, F>(
        &self,
        text: &str,
        config: &ExtractionConfig,
        mut on_progress: F,
    ) -> Result<ExtractionResult<R>>
    where
        R: SchemaRecord,
        F: FnMut(&ExtractionProgress),
    {
        let chunker = Chunker::new(config.chunking.clone())
            .context("invalid chunking configuration")?;

        let run_id = Uuid::new_v4();
        debug!(%run_id, kind = R::KIND, phase = ?ExtractionPhase::Chunking, "partitioning input");
        let chunks: Vec<Chunk> = chunker.chunks(text).collect();
        let total_chunks = chunks.len();
        info!(
            %run_id,
            kind = R::KIND,
            total_chunks,
            chars = text.chars().count(),
            "starting extraction run"
        );

        let mut candidates: Vec<CandidateRecord<R>> = Vec::new();
        let mut errors = Vec::new();
        let mut successful_chunks = 0;

        for chunk in &chunks {
            let outcome = config
                .retry
                .run(R::KIND, || {
                    self.generator.generate::<R>(&config.prompt, &chunk.text)
                })
                .await;

            match outcome {
                Ok(records) => {
                    successful_chunks += 1;
                    debug!(
                        %run_id,
                        chunk = chunk.index,
                        chunk_id = %chunk.chunk_id,
                        records = records.len(),
                        "window extracted"
                    );
                    candidates.extend(records.into_iter().map(|record| CandidateRecord {
                        record,
                        chunk_index: chunk.index,
                    }));
                }
                Err(failure) => {
                    warn!(%run_id, chunk = chunk.index, error = %failure, "window dropped");
                    errors.push(format!(
                        "chunk {}/{} (chars {}..{}): {}",
                        chunk.index + 1,
                        total_chunks,
                        chunk.span.0,
                        chunk.span.1,
                        failure
                    ));
                }
            }

            on_progress(&ExtractionProgress {
                chunk_index: chunk.index,
                total_chunks,
                items_extracted: candidates.len(),
                phase: ExtractionPhase::Generating,
            });
        }

        debug!(
            %run_id,
            phase = ?ExtractionPhase::Deduplicating,
            candidates = candidates.len(),
            "collapsing overlap duplicates"
        );
        let (records, duplicates_removed) = dedup_first_seen(candidates);

        let stats = ExtractionStats {
            total_chunks,
            successful_chunks,
            duplicates_removed,
            total_items: records.len(),
        };
        let success = successful_chunks > 0 || errors.is_empty();
        info!(
            %run_id,
            phase = ?ExtractionPhase::Done,
            success,
            failed_chunks = errors.len(),
            ?stats,
            "extraction run finished"
        );

        Ok(ExtractionResult {
            success,
            records,
            errors,
            stats,
        })
    }
}

/// First occurrence of each dedup key wins; arrival order is preserved.
/// Candidates whose key cannot be derived are dropped, not deduplicated.
pub fn dedup_first_seen<R: SchemaRecord>(
    candidates: Vec<CandidateRecord<R>>,
) -> (Vec<R>, usize) {
    let mut seen = HashSet::new();
    let mut records = Vec::with_capacity(candidates.len());
    let mut removed = 0;

    for candidate in candidates {
        match candidate.record.dedup_key() {
            Some(key) => {
                if seen.insert(key) {
                    records.push(candidate.record);
                } else {
                    removed += 1;
                }
            }
            None => {
                warn!(
                    kind = R::KIND,
                    chunk = candidate.chunk_index,
                    "dropping candidate without dedup key"
                );
            }
        }
    }

    (records, removed)
}
