//! Citation strings for bibliographic records.

use crate::search::{Record, first_value};

/// Format a record as a citation.
///
/// Periodicals and articles omit the publisher; every other document type
/// (monographs included) carries it.
pub fn format_citation(record: &Record) -> String {
    let creator = first_value(&record.creator).unwrap_or("Unknown Author");
    let title = first_value(&record.title).unwrap_or("Unknown Title");
    let publisher = first_value(&record.publisher).unwrap_or("Unknown Publisher");
    let date = first_value(&record.date).unwrap_or("n.d.");
    let url = record
        .url
        .as_deref()
        .filter(|u| !u.is_empty())
        .or_else(|| first_value(&record.identifier))
        .unwrap_or("No URL available");
    let doc_type = record
        .doc_type
        .as_ref()
        .map(|t| t.values().join(" ").to_lowercase())
        .unwrap_or_default();

    if doc_type.contains("periodique") || doc_type.contains("article") {
        format!("{}. ({}). {}. Retrieved from {}", creator, date, title, url)
    } else {
        format!(
            "{}. ({}). {}. {}. Retrieved from {}",
            creator, date, title, publisher, url
        )
    }
}
