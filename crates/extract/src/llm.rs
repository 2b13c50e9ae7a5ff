use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::GenerationFailure;

/// Bound on a single generation call so one stuck window cannot stall a
/// whole run.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// One outbound call to the generation capability: prompt in, raw model text
/// out. Implementations make exactly one call and never retry; retries are
/// the workflow engine's responsibility.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationFailure>;
}

#[derive(Clone)]
pub struct OllamaClient {
    base_url: String,
    model: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    format: &'a str, // "json" for structured output
}

#[derive(Deserialize)]
struct OllamaResponse {
    response: String,
}

impl OllamaClient {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        call_timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(call_timeout)
            .build()
            .context("failed to build HTTP client for the generation backend")?;

        Ok(Self {
            base_url: base_url.into(),
            model: model.into(),
            client,
        })
    }

    pub fn local_default() -> Result<Self> {
        Self::new("http://localhost:11434", "llama3", DEFAULT_CALL_TIMEOUT)
    }
}

#[async_trait]
impl TextGenerator for OllamaClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationFailure> {
        let url = format!("{}/api/generate", self.base_url);

        let request = OllamaRequest {
            model: &self.model,
            prompt,
            stream: false,
            format: "json", // Force JSON output
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(classify_transport_error)?;

        if !response.status().is_success() {
            return Err(GenerationFailure::Unavailable(format!(
                "backend returned status {}",
                response.status()
            )));
        }

        let body: OllamaResponse = response
            .json()
            .await
            .map_err(|e| GenerationFailure::Unavailable(format!("unreadable backend envelope: {e}")))?;

        Ok(body.response)
    }
}

fn classify_transport_error(err: reqwest::Error) -> GenerationFailure {
    if err.is_timeout() {
        GenerationFailure::Unavailable(format!("generation call timed out: {err}"))
    } else {
        GenerationFailure::Unavailable(err.to_string())
    }
}

/// In-memory generator that pops scripted responses in order. Used by tests
/// and offline development; an exhausted script reports the capability as
/// unavailable.
#[derive(Clone, Default)]
pub struct ScriptedClient {
    responses: Arc<Mutex<VecDeque<Result<String, GenerationFailure>>>>,
}

impl ScriptedClient {
    pub fn push_text(&self, response: impl Into<String>) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(response.into()));
    }

    pub fn push_failure(&self, failure: GenerationFailure) {
        self.responses.lock().unwrap().push_back(Err(failure));
    }
}

#[async_trait]
impl TextGenerator for ScriptedClient {
    async fn generate(&self, _prompt: &str) -> Result<String, GenerationFailure> {
        self.responses.lock().unwrap().pop_front().unwrap_or_else(|| {
            Err(GenerationFailure::Unavailable(
                "scripted client has no responses left".to_string(),
            ))
        })
    }
}
