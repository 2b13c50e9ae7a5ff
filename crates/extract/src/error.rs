use thiserror::Error;

/// Failure taxonomy for a single generation call.
///
/// A valid empty record array is not represented here: it is an ordinary
/// success with zero records.
#[derive(Debug, Clone, Error)]
pub enum GenerationFailure {
    /// The response could not be parsed against the schema, even after one
    /// local repair attempt.
    #[error("malformed model output: {0}")]
    MalformedOutput(String),

    /// Network, auth, quota or timeout failure reaching the capability.
    #[error("generation capability unavailable: {0}")]
    Unavailable(String),
}
