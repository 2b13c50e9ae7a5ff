use chunking::ChunkerConfig;
use extract::PromptTemplate;

use crate::retry::RetryPolicy;

/// Immutable binding of a schema's prompt to chunking and retry parameters.
/// Built once per extraction domain.
#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    pub prompt: PromptTemplate,
    pub chunking: ChunkerConfig,
    pub retry: RetryPolicy,
}

impl ExtractionConfig {
    pub fn new(prompt: PromptTemplate) -> Self {
        Self {
            prompt,
            chunking: ChunkerConfig::default(),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_chunking(mut self, chunking: ChunkerConfig) -> Self {
        self.chunking = chunking;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}
