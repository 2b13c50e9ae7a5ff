use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A contiguous window of source text submitted to the generator in one call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    pub chunk_id: String,
    pub index: usize,
    pub text: String,
    pub span: (usize, usize), // [start, end) character positions in the source text
}

impl Chunk {
    pub fn new(index: usize, text: String, span: (usize, usize)) -> Self {
        let chunk_id = Self::generate_chunk_id(&text, span);

        Self {
            chunk_id,
            index,
            text,
            span,
        }
    }

    /// Stable content-derived id, usable across runs over the same document.
    fn generate_chunk_id(text: &str, span: (usize, usize)) -> String {
        let mut hasher = Sha256::new();
        hasher.update(text.as_bytes());
        hasher.update(span.0.to_string().as_bytes());
        hasher.update(span.1.to_string().as_bytes());
        let digest = hasher.finalize();
        hex::encode(&digest[..16])
    }

    pub fn len_chars(&self) -> usize {
        self.span.1 - self.span.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_id_is_stable() {
        let a = Chunk::new(0, "same text".to_string(), (0, 9));
        let b = Chunk::new(0, "same text".to_string(), (0, 9));
        assert_eq!(a.chunk_id, b.chunk_id);
        assert_eq!(a.chunk_id.len(), 32);
    }

    #[test]
    fn chunk_id_depends_on_span() {
        let a = Chunk::new(0, "same text".to_string(), (0, 9));
        let b = Chunk::new(0, "same text".to_string(), (100, 109));
        assert_ne!(a.chunk_id, b.chunk_id);
    }
}
