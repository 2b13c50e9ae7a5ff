use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Contract every extraction domain implements. The serde shape defines the
/// field list and the required/optional split, `validate` the per-field
/// rules, `dedup_key` the identity used to collapse duplicates arising from
/// window overlap.
pub trait SchemaRecord: DeserializeOwned + Serialize + Clone + Send + Sync + 'static {
    /// Key the model is instructed to wrap its record array in.
    const ENVELOPE: &'static str;

    /// Record name used in logs and error messages.
    const KIND: &'static str;

    fn validate(&self) -> Result<(), SchemaViolation>;

    /// Identity for cross-window dedup. `None` means the key cannot be
    /// derived; such records are dropped rather than deduplicated.
    fn dedup_key(&self) -> Option<String>;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {problem}")]
pub struct SchemaViolation {
    pub field: &'static str,
    pub problem: String,
}

impl SchemaViolation {
    pub fn new(field: &'static str, problem: impl Into<String>) -> Self {
        Self {
            field,
            problem: problem.into(),
        }
    }
}
