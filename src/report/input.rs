//! Classification and normalization of `process_section` input.
//!
//! Callers send an untyped JSON object. Which step it asks for depends on
//! the fields it carries:
//!
//! 1. `topic` present → [`ReportInput::Initialize`]
//! 2. otherwise `searchSources` true → [`ReportInput::SearchSources`]
//! 3. otherwise `sectionNumber` or `totalSections` present →
//!    [`ReportInput::AppendSection`]
//! 4. anything else is a validation error.

use crate::config::ReportConfig;
use crate::error::{Error, Result};
use serde_json::{Map, Value};

/// A classified, validated report step.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportInput {
    Initialize(InitializeInput),
    SearchSources,
    AppendSection(SectionInput),
}

#[derive(Debug, Clone, PartialEq)]
pub struct InitializeInput {
    pub topic: String,
    pub page_count: u32,
    pub source_count: u32,
    pub include_graphics: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SectionInput {
    pub section_number: u32,
    pub total_sections: u32,
    pub title: String,
    pub content: String,
    pub is_bibliography: bool,
    pub sources_used: Vec<i64>,
    pub next_section_needed: bool,
}

impl ReportInput {
    /// Classify and validate raw input, filling defaults from `config`.
    pub fn parse(input: &Value, config: &ReportConfig) -> Result<Self> {
        let Some(obj) = input.as_object() else {
            return Err(Error::validation("Input must be a JSON object"));
        };

        if present(obj, "topic") {
            return parse_initialize(obj, config).map(ReportInput::Initialize);
        }

        if get(obj, "searchSources").is_some_and(coerce_bool) {
            return Ok(ReportInput::SearchSources);
        }

        if present(obj, "sectionNumber") || present(obj, "totalSections") {
            return parse_section(obj).map(ReportInput::AppendSection);
        }

        Err(Error::validation(
            "Missing required field: provide topic, searchSources, or sectionNumber and totalSections",
        ))
    }
}

fn parse_initialize(obj: &Map<String, Value>, config: &ReportConfig) -> Result<InitializeInput> {
    let topic = match get(obj, "topic") {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        _ => return Err(Error::validation("Invalid topic: must be a non-empty string")),
    };

    Ok(InitializeInput {
        topic,
        page_count: positive_int(obj, "pageCount")?.unwrap_or(config.default_page_count),
        source_count: positive_int(obj, "sourceCount")?.unwrap_or(config.default_source_count),
        include_graphics: get(obj, "includeGraphics").is_some_and(coerce_bool),
    })
}

fn parse_section(obj: &Map<String, Value>) -> Result<SectionInput> {
    let section_number = positive_int(obj, "sectionNumber")?
        .ok_or_else(|| Error::validation("Missing required field: sectionNumber"))?;
    let total_sections = positive_int(obj, "totalSections")?
        .ok_or_else(|| Error::validation("Missing required field: totalSections"))?;

    let title = match get(obj, "title") {
        None => format!("Section {}", section_number),
        Some(Value::String(s)) => s.clone(),
        Some(_) => return Err(Error::validation("Invalid title: must be a string")),
    };

    let content = match get(obj, "content") {
        None => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(_) => return Err(Error::validation("Invalid content: must be a string")),
    };

    let sources_used = match get(obj, "sourcesUsed") {
        None => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .map(integer)
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| Error::validation("Invalid sourcesUsed: must be an array of integers"))?,
        Some(_) => {
            return Err(Error::validation(
                "Invalid sourcesUsed: must be an array of integers",
            ));
        }
    };

    Ok(SectionInput {
        section_number,
        total_sections,
        title,
        content,
        is_bibliography: get(obj, "isBibliography").is_some_and(coerce_bool),
        sources_used,
        next_section_needed: get(obj, "nextSectionNeeded").is_none_or(coerce_bool),
    })
}

/// Field value, treating an explicit `null` as absent.
fn get<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    obj.get(key).filter(|v| !v.is_null())
}

fn present(obj: &Map<String, Value>, key: &str) -> bool {
    get(obj, key).is_some()
}

/// Integral JSON number, accepting floats with no fractional part.
fn integer(value: &Value) -> Option<i64> {
    let n = value.as_number()?;
    n.as_i64().or_else(|| {
        n.as_f64()
            .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64)
            .map(|f| f as i64)
    })
}

/// Optional positive integer field. Digit-only strings are converted.
fn positive_int(obj: &Map<String, Value>, key: &str) -> Result<Option<u32>> {
    let Some(value) = get(obj, key) else {
        return Ok(None);
    };

    let parsed = match value {
        Value::Number(_) => integer(value).and_then(|n| u32::try_from(n).ok()),
        Value::String(s) if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) => {
            s.parse::<u32>().ok()
        }
        _ => None,
    };

    match parsed {
        Some(n) if n >= 1 => Ok(Some(n)),
        _ => Err(Error::validation(format!(
            "Invalid {}: must be a positive integer",
            key
        ))),
    }
}

/// Loose truthiness: numbers are true unless zero, and strings are true
/// unless empty or a common spelling of "false".
fn coerce_bool(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "" | "false" | "0" | "no"
        ),
        Value::Array(_) | Value::Object(_) => true,
    }
}
