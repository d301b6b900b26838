use crate::citation::format_citation;
use crate::error::Result;
use crate::search::{Record, SearchService, first_value, query};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// A bibliographic reference discovered for a report topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    /// 1-based rank within the session
    pub id: u32,
    pub title: String,
    pub creator: String,
    pub date: String,
    #[serde(rename = "type")]
    pub doc_type: String,
    pub language: String,
    pub url: String,
    pub citation: String,
    pub thumbnail: String,
}

impl Source {
    fn from_record(id: u32, record: &Record) -> Self {
        Self {
            id,
            title: first_value(&record.title).unwrap_or("Unknown Title").to_string(),
            creator: first_value(&record.creator).unwrap_or("Unknown Author").to_string(),
            date: first_value(&record.date).unwrap_or("Unknown Date").to_string(),
            doc_type: first_value(&record.doc_type).unwrap_or("Unknown Type").to_string(),
            language: first_value(&record.language)
                .unwrap_or("Unknown Language")
                .to_string(),
            url: record.url.clone().unwrap_or_default(),
            citation: format_citation(record),
            thumbnail: String::new(),
        }
    }
}

/// Find up to `target_count` sources for `topic`, most relevant first.
///
/// A natural-language search is topped up with a subject search when it
/// comes back short. Batches are concatenated without de-duplication.
pub async fn discover_sources(
    search: &dyn SearchService,
    topic: &str,
    target_count: usize,
) -> Vec<Source> {
    match collect_records(search, topic, target_count).await {
        Ok(records) => records
            .iter()
            .zip(1..)
            .map(|(record, id)| Source::from_record(id, record))
            .collect(),
        Err(e) => {
            warn!(topic, error = %e, "source discovery failed");
            Vec::new()
        }
    }
}

async fn collect_records(
    search: &dyn SearchService,
    topic: &str,
    target_count: usize,
) -> Result<Vec<Record>> {
    if target_count == 0 {
        return Ok(Vec::new());
    }

    let primary = query::natural_language(topic);
    let mut records = search.search(&primary, 1, target_count as u32).await?.records;

    if records.len() < target_count {
        let remaining = target_count - records.len();
        debug!(topic, found = records.len(), remaining, "topping up with subject search");
        let supplementary = query::subject(topic, false);
        let extra = search.search(&supplementary, 1, remaining as u32).await?;
        records.extend(extra.records);
    }

    records.truncate(target_count);
    Ok(records)
}
