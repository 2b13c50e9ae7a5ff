pub mod error;
pub mod llm;
pub mod prompt;
pub mod repair;
pub mod schema;

pub use error::GenerationFailure;
pub use llm::{DEFAULT_CALL_TIMEOUT, OllamaClient, ScriptedClient, TextGenerator};
pub use prompt::PromptTemplate;
pub use schema::{SchemaRecord, SchemaViolation};

use serde_json::Value;
use tracing::warn;

/// Adapter over a [`TextGenerator`]: renders the prompt for one window, makes
/// exactly one outbound call, and parses the response into validated records.
pub struct StructuredGenerator<G> {
    client: G,
}

impl<G: TextGenerator> StructuredGenerator<G> {
    pub fn new(client: G) -> Self {
        Self { client }
    }

    /// One unit of work: window text in, validated records out.
    ///
    /// A valid empty array is a success with zero records, distinct from both
    /// failure modes. Individual candidates that fail to decode or validate
    /// are dropped; if every candidate of a non-empty array is unusable the
    /// whole attempt is malformed, so the engine's retry loop can ask again.
    pub async fn generate<R: SchemaRecord>(
        &self,
        template: &PromptTemplate,
        chunk_text: &str,
    ) -> Result<Vec<R>, GenerationFailure> {
        let prompt = template.render(chunk_text);
        let raw = self.client.generate(&prompt).await?;

        let value = repair::parse_with_repair(&raw).ok_or_else(|| {
            GenerationFailure::MalformedOutput("response is not valid JSON".to_string())
        })?;

        let items = candidate_array::<R>(&value).ok_or_else(|| {
            GenerationFailure::MalformedOutput(format!(
                "response JSON carries no \"{}\" array",
                R::ENVELOPE
            ))
        })?;

        let total = items.len();
        let mut records = Vec::with_capacity(total);
        for item in items {
            match serde_json::from_value::<R>(item.clone()) {
                Ok(record) => match record.validate() {
                    Ok(()) => records.push(record),
                    Err(violation) => {
                        warn!(kind = R::KIND, %violation, "dropping invalid candidate");
                    }
                },
                Err(err) => {
                    warn!(kind = R::KIND, error = %err, "dropping undecodable candidate");
                }
            }
        }

        if records.is_empty() && total > 0 {
            return Err(GenerationFailure::MalformedOutput(format!(
                "all {total} candidates failed {} validation",
                R::KIND
            )));
        }

        Ok(records)
    }
}

/// Accept either the schema envelope (`{"events": [...]}`) or a bare array.
fn candidate_array<R: SchemaRecord>(value: &Value) -> Option<&Vec<Value>> {
    match value {
        Value::Array(items) => Some(items),
        Value::Object(map) => map.get(R::ENVELOPE).and_then(|v| v.as_array()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Club {
        name: String,
        #[serde(default)]
        members: Option<u32>,
    }

    impl SchemaRecord for Club {
        const ENVELOPE: &'static str = "clubs";
        const KIND: &'static str = "club";

        fn validate(&self) -> Result<(), SchemaViolation> {
            if self.name.trim().is_empty() {
                return Err(SchemaViolation::new("name", "must not be blank"));
            }
            Ok(())
        }

        fn dedup_key(&self) -> Option<String> {
            Some(self.name.trim().to_lowercase())
        }
    }

    fn adapter(responses: &[&str]) -> StructuredGenerator<ScriptedClient> {
        let client = ScriptedClient::default();
        for response in responses {
            client.push_text(*response);
        }
        StructuredGenerator::new(client)
    }

    fn template() -> PromptTemplate {
        PromptTemplate::new("Extract clubs.")
    }

    #[tokio::test]
    async fn parses_enveloped_records() {
        let adapter = adapter(&[r#"{"clubs": [{"name": "Chess Club", "members": 12}]}"#]);

        let clubs: Vec<Club> = adapter.generate(&template(), "window").await.unwrap();
        assert_eq!(clubs.len(), 1);
        assert_eq!(clubs[0].name, "Chess Club");
        assert_eq!(clubs[0].members, Some(12));
    }

    #[tokio::test]
    async fn parses_bare_array() {
        let adapter = adapter(&[r#"[{"name": "Debate Society"}]"#]);

        let clubs: Vec<Club> = adapter.generate(&template(), "window").await.unwrap();
        assert_eq!(clubs[0].name, "Debate Society");
    }

    #[tokio::test]
    async fn repairs_fenced_output_in_same_attempt() {
        let adapter = adapter(&["```json\n{\"clubs\": [{\"name\": \"Robotics\"}]}\n```"]);

        let clubs: Vec<Club> = adapter.generate(&template(), "window").await.unwrap();
        assert_eq!(clubs[0].name, "Robotics");
    }

    #[tokio::test]
    async fn empty_array_is_success_with_zero_records() {
        let adapter = adapter(&[r#"{"clubs": []}"#]);

        let clubs: Vec<Club> = adapter.generate(&template(), "window").await.unwrap();
        assert!(clubs.is_empty());
    }

    #[tokio::test]
    async fn unparseable_output_is_malformed() {
        let adapter = adapter(&["no json here at all"]);

        let err = adapter
            .generate::<Club>(&template(), "window")
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationFailure::MalformedOutput(_)));
    }

    #[tokio::test]
    async fn missing_envelope_is_malformed() {
        let adapter = adapter(&[r#"{"societies": [{"name": "x"}]}"#]);

        let err = adapter
            .generate::<Club>(&template(), "window")
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationFailure::MalformedOutput(_)));
    }

    #[tokio::test]
    async fn invalid_candidates_are_dropped_not_fatal() {
        let adapter = adapter(&[
            r#"{"clubs": [{"name": "  "}, {"name": "Film Club"}, {"members": 3}]}"#,
        ]);

        let clubs: Vec<Club> = adapter.generate(&template(), "window").await.unwrap();
        assert_eq!(clubs.len(), 1);
        assert_eq!(clubs[0].name, "Film Club");
    }

    #[tokio::test]
    async fn all_candidates_invalid_is_malformed() {
        let adapter = adapter(&[r#"{"clubs": [{"name": ""}, {"members": 9}]}"#]);

        let err = adapter
            .generate::<Club>(&template(), "window")
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationFailure::MalformedOutput(_)));
    }

    #[tokio::test]
    async fn transport_failure_passes_through() {
        let client = ScriptedClient::default();
        client.push_failure(GenerationFailure::Unavailable("quota exceeded".to_string()));
        let adapter = StructuredGenerator::new(client);

        let err = adapter
            .generate::<Club>(&template(), "window")
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationFailure::Unavailable(_)));
    }
}
