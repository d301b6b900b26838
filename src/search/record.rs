//! Normalized bibliographic records.

use serde::{Deserialize, Serialize};

/// A Dublin Core field value: either a single string or a list of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    One(String),
    Many(Vec<String>),
}

impl FieldValue {
    /// First value, if any.
    pub fn first(&self) -> Option<&str> {
        match self {
            FieldValue::One(s) => Some(s.as_str()),
            FieldValue::Many(items) => items.first().map(String::as_str),
        }
    }

    /// All values in document order.
    pub fn values(&self) -> Vec<&str> {
        match self {
            FieldValue::One(s) => vec![s.as_str()],
            FieldValue::Many(items) => items.iter().map(String::as_str).collect(),
        }
    }

    /// Add a value, promoting a single value to a list.
    pub fn push(&mut self, value: String) {
        match self {
            FieldValue::One(existing) => {
                let first = std::mem::take(existing);
                *self = FieldValue::Many(vec![first, value]);
            }
            FieldValue::Many(items) => items.push(value),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::One(value.to_string())
    }
}

impl From<Vec<&str>> for FieldValue {
    fn from(values: Vec<&str>) -> Self {
        FieldValue::Many(values.into_iter().map(str::to_string).collect())
    }
}

/// A record returned by the search service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<FieldValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<FieldValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contributor: Option<FieldValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<FieldValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<FieldValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<FieldValue>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub doc_type: Option<FieldValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<FieldValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<FieldValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<FieldValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<FieldValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relation: Option<FieldValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coverage: Option<FieldValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rights: Option<FieldValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<FieldValue>,
    /// Canonical public URL of the item
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Record {
    /// Mutable slot for a Dublin Core element name, or `None` if unknown.
    pub fn field_mut(&mut self, name: &str) -> Option<&mut Option<FieldValue>> {
        let slot = match name {
            "title" => &mut self.title,
            "creator" => &mut self.creator,
            "contributor" => &mut self.contributor,
            "publisher" => &mut self.publisher,
            "date" => &mut self.date,
            "description" => &mut self.description,
            "type" => &mut self.doc_type,
            "format" => &mut self.format,
            "identifier" => &mut self.identifier,
            "source" => &mut self.source,
            "language" => &mut self.language,
            "relation" => &mut self.relation,
            "coverage" => &mut self.coverage,
            "rights" => &mut self.rights,
            "subject" => &mut self.subject,
            _ => return None,
        };
        Some(slot)
    }

    /// Append a value to a Dublin Core field. Unknown elements are ignored.
    pub fn add_field(&mut self, name: &str, value: String) {
        if let Some(slot) = self.field_mut(name) {
            match slot {
                Some(existing) => existing.push(value),
                None => *slot = Some(FieldValue::One(value)),
            }
        }
    }

    /// Derive the canonical URL from the identifiers: the first ARK
    /// identifier, else the first http(s) identifier.
    pub fn canonical_url_from_identifiers(&self) -> Option<String> {
        let identifiers = self.identifier.as_ref()?.values();
        identifiers
            .iter()
            .find(|id| id.starts_with("http") && id.contains("ark:/"))
            .or_else(|| identifiers.iter().find(|id| id.starts_with("http")))
            .map(|id| id.to_string())
    }
}

/// First value of an optional field.
pub fn first_value(field: &Option<FieldValue>) -> Option<&str> {
    field.as_ref().and_then(FieldValue::first)
}
