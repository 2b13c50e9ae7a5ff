use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::chunk::Chunk;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkerConfig {
    pub max_chunk_chars: usize,
    pub overlap_chars: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            max_chunk_chars: 4000,
            overlap_chars: 200,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChunkingError {
    #[error("max_chunk_chars must be greater than zero")]
    ZeroWindow,

    #[error("overlap_chars ({overlap}) must be smaller than max_chunk_chars ({max})")]
    OverlapTooLarge { overlap: usize, max: usize },
}

#[derive(Debug)]
pub struct Chunker {
    config: ChunkerConfig,
}

impl Chunker {
    /// Fails fast on a window/overlap combination that cannot make progress.
    pub fn new(config: ChunkerConfig) -> Result<Self, ChunkingError> {
        if config.max_chunk_chars == 0 {
            return Err(ChunkingError::ZeroWindow);
        }
        if config.overlap_chars >= config.max_chunk_chars {
            return Err(ChunkingError::OverlapTooLarge {
                overlap: config.overlap_chars,
                max: config.max_chunk_chars,
            });
        }

        Ok(Self { config })
    }

    /// Lazy sequence of overlapping windows covering the whole input.
    ///
    /// Each window after the first starts `overlap_chars` before the previous
    /// window's end, so a record straddling a boundary is fully contained in
    /// at least one window. Sizes are measured in characters; windows never
    /// split a UTF-8 code point. Calling this again walks the text from the
    /// start.
    pub fn chunks<'a>(&self, text: &'a str) -> Chunks<'a> {
        Chunks {
            text,
            max_chars: self.config.max_chunk_chars,
            step_chars: self.config.max_chunk_chars - self.config.overlap_chars,
            byte_pos: 0,
            char_pos: 0,
            index: 0,
            done: text.is_empty(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Chunks<'a> {
    text: &'a str,
    max_chars: usize,
    step_chars: usize,
    byte_pos: usize,
    char_pos: usize,
    index: usize,
    done: bool,
}

impl Iterator for Chunks<'_> {
    type Item = Chunk;

    fn next(&mut self) -> Option<Chunk> {
        if self.done {
            return None;
        }

        let rest = &self.text[self.byte_pos..];

        // One pass over the window to find the byte offsets of the window end
        // and of the next window's start.
        let mut end_bytes = rest.len();
        let mut step_bytes = rest.len();
        let mut window_chars = 0;
        for (count, (offset, _)) in rest.char_indices().enumerate() {
            if count == self.step_chars {
                step_bytes = offset;
            }
            if count == self.max_chars {
                end_bytes = offset;
                break;
            }
            window_chars = count + 1;
        }

        let chunk = Chunk::new(
            self.index,
            rest[..end_bytes].to_string(),
            (self.char_pos, self.char_pos + window_chars),
        );

        if end_bytes == rest.len() {
            // Window reached the end of the input.
            self.done = true;
        } else {
            self.byte_pos += step_bytes;
            self.char_pos += self.step_chars;
        }
        self.index += 1;

        Some(chunk)
    }
}
