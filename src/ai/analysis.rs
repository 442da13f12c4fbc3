use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

use super::json::{extract_json, extract_json_object};
use super::prompt::{analysis_prompt, semantic_match_prompt, SEMANTIC_SAMPLE_LIMIT};
use super::{AiError, TextModel};
use crate::data::filter::{filter_rows, filter_rows_any, union, unique_values, FilterError, FilteredRows};
use crate::data::model::Table;
use crate::status::StatusLog;

pub const MEETS_GUIDELINES: &str = "Meets Guidelines";
pub const NOTES_ON_COMPLIANCE: &str = "Notes on Compliance";

// ---------------------------------------------------------------------------
// AnalysisRecord – one verdict from the model
// ---------------------------------------------------------------------------

/// A record echoed back by the model with the two verdict fields split out.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisRecord {
    /// Original row fields, in the order the model returned them.
    #[serde(flatten)]
    pub fields: Map<String, JsonValue>,
    #[serde(rename = "Meets Guidelines")]
    pub meets_guidelines: bool,
    #[serde(rename = "Notes on Compliance")]
    pub notes_on_compliance: String,
}

impl AnalysisRecord {
    /// Split the verdict fields out of a raw model object.
    pub fn from_object(mut fields: Map<String, JsonValue>) -> Self {
        let meets_guidelines = normalize_meets_guidelines(fields.shift_remove(MEETS_GUIDELINES).as_ref());
        let notes_on_compliance = match fields.shift_remove(NOTES_ON_COMPLIANCE) {
            Some(JsonValue::String(s)) => s,
            Some(JsonValue::Null) | None => String::new(),
            Some(other) => other.to_string(),
        };
        Self {
            fields,
            meets_guidelines,
            notes_on_compliance,
        }
    }

    /// The record as one flat JSON object, verdict fields last.
    pub fn to_json(&self) -> JsonValue {
        let mut obj = self.fields.clone();
        obj.insert(MEETS_GUIDELINES.to_string(), JsonValue::Bool(self.meets_guidelines));
        obj.insert(
            NOTES_ON_COMPLIANCE.to_string(),
            JsonValue::String(self.notes_on_compliance.clone()),
        );
        JsonValue::Object(obj)
    }
}

/// Best-effort boolean coercion of the "Meets Guidelines" value.
///
/// `"true"` in any case with surrounding whitespace is `true`; JSON booleans
/// are kept; everything else, including a missing field, is `false`.
pub fn normalize_meets_guidelines(value: Option<&JsonValue>) -> bool {
    match value {
        Some(JsonValue::String(s)) => s.trim().eq_ignore_ascii_case("true"),
        Some(JsonValue::Bool(b)) => *b,
        _ => false,
    }
}

/// Parse the JSON array text of an analysis reply into records.
pub fn parse_records(json_text: &str) -> Result<Vec<AnalysisRecord>, AiError> {
    let value: JsonValue =
        serde_json::from_str(json_text).map_err(|e| AiError::Malformed(e.to_string()))?;
    let JsonValue::Array(items) = value else {
        return Err(AiError::Malformed("expected a JSON array of records".to_string()));
    };

    let mut records = Vec::with_capacity(items.len());
    for (i, item) in items.into_iter().enumerate() {
        match item {
            JsonValue::Object(obj) => records.push(AnalysisRecord::from_object(obj)),
            other => log::warn!("Skipping non-object item {i} in AI response: {other}"),
        }
    }
    Ok(records)
}

// ---------------------------------------------------------------------------
// Analysis call
// ---------------------------------------------------------------------------

/// Ask the model to judge `data_text` against `pdf_text`.
pub fn analyze(
    model: &dyn TextModel,
    search_term: &str,
    filter_column: &str,
    pdf_text: &str,
    data_text: &str,
    status: &mut StatusLog,
) -> Result<Vec<AnalysisRecord>, AiError> {
    status.info("Preparing AI analysis...");
    let prompt = analysis_prompt(search_term, filter_column, pdf_text, data_text);

    status.info("Sending request to the AI model...");
    let reply = model.generate(&prompt)?;

    status.info("Processing AI response...");
    let json_text = extract_json(&reply).ok_or(AiError::NoJson)?;
    parse_records(json_text)
}

// ---------------------------------------------------------------------------
// AI-assisted filter
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct SemanticMatches {
    matches: Vec<String>,
    explanation: Option<String>,
}

fn ask_for_matches(
    model: &dyn TextModel,
    table: &Table,
    column: &str,
    search_term: &str,
) -> Result<SemanticMatches, AiError> {
    let values =
        unique_values(table, column, SEMANTIC_SAMPLE_LIMIT).map_err(|e| AiError::Malformed(e.to_string()))?;
    let reply = model.generate(&semantic_match_prompt(search_term, column, &values))?;

    let json_text = extract_json_object(&reply).ok_or(AiError::NoJson)?;
    let value: JsonValue =
        serde_json::from_str(json_text).map_err(|e| AiError::Malformed(e.to_string()))?;

    let matches = value
        .get("matches")
        .and_then(JsonValue::as_array)
        .ok_or_else(|| AiError::Malformed("no \"matches\" list".to_string()))?
        .iter()
        .filter_map(|m| match m {
            JsonValue::String(s) => Some(s.clone()),
            JsonValue::Null => None,
            other => Some(other.to_string()),
        })
        .collect();

    let explanation = value
        .get("explanation")
        .and_then(JsonValue::as_str)
        .map(str::to_string);

    Ok(SemanticMatches { matches, explanation })
}

/// Substring filter widened by model-suggested related values.
///
/// Any model failure falls back to the plain substring filter. Only a
/// missing column is an error.
pub fn ai_assisted_filter(
    model: &dyn TextModel,
    table: &Table,
    column: &str,
    search_term: &str,
    status: &mut StatusLog,
) -> Result<FilteredRows, FilterError> {
    let plain = filter_rows(table, column, search_term)?;
    status.info("Using AI to assist with filtering...");

    match ask_for_matches(model, table, column, search_term) {
        Ok(found) if !found.matches.is_empty() => {
            status.info(format!(
                "AI found {} related terms to '{search_term}'",
                found.matches.len()
            ));
            if let Some(explanation) = found.explanation {
                status.info(format!("AI explanation: {explanation}"));
            }
            let expanded = filter_rows_any(table, column, &found.matches)?;
            Ok(union(&expanded, &plain))
        }
        Ok(_) => {
            status.warn("Falling back to standard filtering (AI didn't provide useful matches)");
            Ok(plain)
        }
        Err(e) => {
            status.warn(format!("AI filtering error: {e}. Falling back to standard filtering."));
            Ok(plain)
        }
    }
}
