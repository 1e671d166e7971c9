//! Drives the model: prompt, call, recover, retry once, then give up
//! gracefully.
//!
//! [`Extractor::extract`] never fails. Whatever the model does, the caller
//! gets an [`ExtractionResult`], empty with a diagnostic when nothing could
//! be understood.

use log::{info, warn};
use serde_json::{Map, Value};

use crate::error::{ModelError, RecoveryFailed};
use crate::gemini::{recover, LanguageModel, PromptTemplate};
use crate::model::{Category, ExtractedItem, ExtractionResult, ScheduleEntry};

/// Longest raw-response prefix kept in a diagnostic, in characters.
pub const DIAGNOSTIC_LIMIT: usize = 500;

#[derive(Debug)]
enum AttemptFailure {
    Model(ModelError),
    Recovery { error: RecoveryFailed, raw: String },
}

impl AttemptFailure {
    fn diagnostic(&self) -> String {
        let text = match self {
            AttemptFailure::Model(e) => e.to_string(),
            AttemptFailure::Recovery { error, raw } => match raw.trim() {
                "" => error.to_string(),
                raw => raw.to_string(),
            },
        };
        text.chars().take(DIAGNOSTIC_LIMIT).collect()
    }
}

pub struct Extractor<M> {
    model: M,
}

impl<M: LanguageModel> Extractor<M> {
    pub fn new(model: M) -> Self {
        Self { model }
    }

    pub async fn extract(&self, outline: &str) -> ExtractionResult {
        let first = match self.attempt(PromptTemplate::Full, outline).await {
            Ok(result) => return result,
            Err(failure) => failure,
        };
        warn!("Extraction failed, retrying with simplified prompt: {:?}", first);

        match self.attempt(PromptTemplate::Simplified, outline).await {
            Ok(mut result) => {
                result.diagnostic = Some(format!(
                    "recovered on simplified retry after: {}",
                    first.diagnostic()
                ));
                result
            }
            Err(second) => {
                warn!("Simplified retry failed too: {:?}", second);
                ExtractionResult::degraded(second.diagnostic())
            }
        }
    }

    async fn attempt(
        &self,
        template: PromptTemplate,
        outline: &str,
    ) -> Result<ExtractionResult, AttemptFailure> {
        let prompt = template.build(outline);
        info!("Prompting model ({:?}, {} bytes)", template, prompt.len());

        let raw = self
            .model
            .generate(&prompt)
            .await
            .map_err(AttemptFailure::Model)?;
        info!("Model replied with {} bytes", raw.len());

        let recovered =
            recover(&raw).map_err(|error| AttemptFailure::Recovery { error, raw: raw.clone() })?;

        let result = result_from_object(&recovered.object);
        info!(
            "Extracted {} exams, {} assignments, {} schedule entries",
            result.exams.len(),
            result.assignments.len(),
            result.schedule.len()
        );
        Ok(result)
    }
}

/// Pull the three expected lists out of a recovered object. Missing or
/// malformed keys become empty lists.
pub fn result_from_object(object: &Map<String, Value>) -> ExtractionResult {
    ExtractionResult {
        exams: items(object, "exams", Category::Exam),
        assignments: items(object, "assignments", Category::Assignment),
        schedule: entries(object, "schedule")
            .filter_map(|entry| {
                Some(ScheduleEntry {
                    day_of_week: text_field(entry, "day_of_week")?,
                    time: text_field(entry, "time")?,
                })
            })
            .collect(),
        diagnostic: None,
    }
}

fn items(object: &Map<String, Value>, key: &str, category: Category) -> Vec<ExtractedItem> {
    entries(object, key)
        .map(|entry| ExtractedItem {
            category,
            name: text_field(entry, "name"),
            due_date: text_field(entry, "due_date"),
            description: text_field(entry, "description"),
        })
        .collect()
}

fn entries<'a>(
    object: &'a Map<String, Value>,
    key: &str,
) -> impl Iterator<Item = &'a Map<String, Value>> {
    object
        .get(key)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_object)
}

fn text_field(entry: &Map<String, Value>, key: &str) -> Option<String> {
    match entry.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
