use anyhow::Result;
use serde::{Deserialize, Serialize};

use chunking::ChunkerConfig;
use extract::{PromptTemplate, SchemaRecord, SchemaViolation, TextGenerator};
use workflow::{ExtractionConfig, ExtractionProgress, ExtractionStats, WorkflowEngine};

use crate::collapse_errors;

/// One course catalog entry as extracted from an uploaded document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub code: String,
    pub title: String,
    #[serde(default)]
    pub credits: Option<f64>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub instructor: Option<String>,
    #[serde(default)]
    pub semester: Option<String>,
    #[serde(default)]
    pub schedule: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl Course {
    /// Canonical course code: uppercase, internal whitespace removed, so
    /// "cs 201" and "CS201" collapse to the same entry.
    pub fn normalized_code(&self) -> String {
        self.code
            .split_whitespace()
            .collect::<String>()
            .to_uppercase()
    }
}

impl SchemaRecord for Course {
    const ENVELOPE: &'static str = "courses";
    const KIND: &'static str = "course";

    fn validate(&self) -> Result<(), SchemaViolation> {
        if self.code.trim().is_empty() {
            return Err(SchemaViolation::new("code", "must not be blank"));
        }
        if self.title.trim().is_empty() {
            return Err(SchemaViolation::new("title", "must not be blank"));
        }
        if let Some(credits) = self.credits {
            if !credits.is_finite() || credits < 0.0 {
                return Err(SchemaViolation::new(
                    "credits",
                    format!("must be a non-negative number, got {credits}"),
                ));
            }
        }
        Ok(())
    }

    fn dedup_key(&self) -> Option<String> {
        let code = self.normalized_code();
        if code.is_empty() {
            return None;
        }
        Some(code)
    }
}

/// Result shape consumed by the portal's catalog upload screen.
#[derive(Debug, Clone, Serialize)]
pub struct CourseExtraction {
    pub success: bool,
    pub courses: Vec<Course>,
    pub error: Option<String>,
    pub stats: Option<ExtractionStats>,
}

pub fn course_config() -> ExtractionConfig {
    ExtractionConfig::new(course_prompt()).with_chunking(ChunkerConfig {
        max_chunk_chars: 4000,
        overlap_chars: 200,
    })
}

fn course_prompt() -> PromptTemplate {
    PromptTemplate::new(
        r#"Extract every course catalog entry from the following text.

INSTRUCTIONS:
1. Find course listings: a course code plus a title, with credits and scheduling details where given
2. Output ONLY valid JSON, nothing else
3. Use the exact schema below

SCHEMA:
{
  "courses": [
    {"code": "CS 201", "title": "Course title", "credits": 3, "department": "offering department", "instructor": "teaching staff", "semester": "term offered", "schedule": "meeting times", "description": "brief description"}
  ]
}

RULES:
- "code" and "title" are required; omit optional fields you cannot find
- "credits" must be a number when present, never a string
- Keep course codes exactly as printed, including the department prefix
- Do not invent courses that are not in the text
- Output ONLY the JSON object, no markdown, no explanations"#,
    )
}

/// Extract catalog courses from raw document text, ordered by course code.
///
/// `on_progress` is invoked synchronously once per processed window; pass
/// `|_| {}` when no reporting is needed.
pub async fn extract_courses<G, F>(
    engine: &WorkflowEngine<G>,
    text: &str,
    on_progress: F,
) -> Result<CourseExtraction>
where
    G: TextGenerator,
    F: FnMut(&ExtractionProgress),
{
    let result = engine
        .extract::<Course, _>(text, &course_config(), on_progress)
        .await?;

    let mut courses = result.records;
    courses.sort_by_cached_key(|course| course.normalized_code());

    Ok(CourseExtraction {
        success: result.success,
        courses,
        error: collapse_errors(&result.errors),
        stats: Some(result.stats),
    })
}
