use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};

use chunking::ChunkerConfig;
use extract::{PromptTemplate, SchemaRecord, SchemaViolation, TextGenerator};
use workflow::{ExtractionConfig, ExtractionProgress, ExtractionStats, WorkflowEngine};

use crate::collapse_errors;

static DATE_FORMAT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());
static TIME_FORMAT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{2}:\d{2}$").unwrap());

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventCategory {
    Academic,
    Exam,
    Holiday,
    Registration,
    Cultural,
    Sports,
    #[default]
    #[serde(other)]
    Other,
}

/// One academic-calendar entry as extracted from an uploaded document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub title: String,
    pub date: String, // YYYY-MM-DD
    #[serde(default)]
    pub time: Option<String>, // HH:MM
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: EventCategory,
}

impl SchemaRecord for CalendarEvent {
    const ENVELOPE: &'static str = "events";
    const KIND: &'static str = "calendar event";

    fn validate(&self) -> Result<(), SchemaViolation> {
        if self.title.trim().is_empty() {
            return Err(SchemaViolation::new("title", "must not be blank"));
        }
        if !DATE_FORMAT.is_match(&self.date) {
            return Err(SchemaViolation::new(
                "date",
                format!("expected YYYY-MM-DD, got {:?}", self.date),
            ));
        }
        if let Some(time) = &self.time {
            if !TIME_FORMAT.is_match(time) {
                return Err(SchemaViolation::new(
                    "time",
                    format!("expected HH:MM, got {time:?}"),
                ));
            }
        }
        Ok(())
    }

    fn dedup_key(&self) -> Option<String> {
        let title = self.title.trim().to_lowercase();
        if title.is_empty() {
            return None;
        }
        Some(format!("{title}|{}", self.date))
    }
}

/// Result shape consumed by the portal's calendar upload screen.
#[derive(Debug, Clone, Serialize)]
pub struct CalendarExtraction {
    pub success: bool,
    pub events: Vec<CalendarEvent>,
    pub error: Option<String>,
    pub stats: Option<ExtractionStats>,
}

pub fn calendar_config() -> ExtractionConfig {
    ExtractionConfig::new(calendar_prompt()).with_chunking(ChunkerConfig {
        max_chunk_chars: 4000,
        overlap_chars: 200,
    })
}

fn calendar_prompt() -> PromptTemplate {
    PromptTemplate::new(
        r#"Extract every academic calendar event from the following text.

INSTRUCTIONS:
1. Find dated events: semester starts and ends, exams, registration windows, holidays, cultural and sports fixtures
2. Output ONLY valid JSON, nothing else
3. Use the exact schema below

SCHEMA:
{
  "events": [
    {"title": "Event name", "date": "YYYY-MM-DD", "time": "HH:MM", "location": "where it happens", "description": "brief description", "category": "academic|exam|holiday|registration|cultural|sports|other"}
  ]
}

RULES:
- "title" and "date" are required; omit optional fields you cannot find
- Dates must be ISO format YYYY-MM-DD; for a date range emit one entry at the range start
- category must be one of: academic, exam, holiday, registration, cultural, sports, other
- Do not invent events that are not in the text
- Output ONLY the JSON object, no markdown, no explanations"#,
    )
}

/// Extract calendar events from raw document text, ordered by date.
///
/// `on_progress` is invoked synchronously once per processed window; pass
/// `|_| {}` when no reporting is needed.
pub async fn extract_calendar_events<G, F>(
    engine: &WorkflowEngine<G>,
    text: &str,
    on_progress: F,
) -> Result<CalendarExtraction>
where
    G: TextGenerator,
    F: FnMut(&ExtractionProgress),
{
    let result = engine
        .extract::<CalendarEvent, _>(text, &calendar_config(), on_progress)
        .await?;

    let mut events = result.records;
    events.sort_by(|a, b| a.date.cmp(&b.date));

    Ok(CalendarExtraction {
        success: result.success,
        events,
        error: collapse_errors(&result.errors),
        stats: Some(result.stats),
    })
}
