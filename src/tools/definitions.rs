//! Tool names, descriptions and input schemas.

use serde::Serialize;
use serde_json::{Value, json};

pub const SEARCH_BY_TITLE: &str = "search_by_title";
pub const SEARCH_BY_AUTHOR: &str = "search_by_author";
pub const SEARCH_BY_SUBJECT: &str = "search_by_subject";
pub const SEARCH_BY_DATE: &str = "search_by_date";
pub const SEARCH_BY_DOCUMENT_TYPE: &str = "search_by_document_type";
pub const ADVANCED_SEARCH: &str = "advanced_search";
pub const NATURAL_LANGUAGE_SEARCH: &str = "natural_language_search";
pub const SEQUENTIAL_REPORTING: &str = "sequential_reporting";

/// A tool as advertised to the host.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: Value,
}

/// Paging parameters shared by every search tool.
fn paging() -> Value {
    json!({
        "max_results": {
            "type": "integer",
            "minimum": 1,
            "description": "Maximum number of records to return (capped at 50, default 10)"
        },
        "start_record": {
            "type": "integer",
            "minimum": 1,
            "description": "1-based position of the first record to return (default 1)"
        }
    })
}

/// Object schema with one required string field plus paging.
fn search_schema(field: &str, description: &str, exact: bool) -> Value {
    let mut properties = paging();
    properties[field] = json!({ "type": "string", "minLength": 1, "description": description });
    if exact {
        properties["exact_match"] = json!({
            "type": "boolean",
            "description": "Match the exact phrase instead of all words (default false)"
        });
    }
    json!({
        "type": "object",
        "properties": properties,
        "required": [field]
    })
}

/// A count the report parser coerces itself: an integer, a digit string,
/// or `null` for absent.
fn loose_count() -> Value {
    json!({ "type": ["integer", "string", "null"] })
}

fn reporting_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "topic": {
                "type": ["string", "null"],
                "description": "Report topic. Starts (or restarts) a report and returns its plan"
            },
            "pageCount": loose_count(),
            "sourceCount": loose_count(),
            "includeGraphics": {
                "description": "Also look for images and maps when searching sources"
            },
            "searchSources": {
                "description": "Set to true to discover sources for the current topic"
            },
            "sectionNumber": loose_count(),
            "totalSections": loose_count(),
            "title": { "type": ["string", "null"] },
            "content": { "description": "Section text" },
            "isBibliography": {
                "description": "Whether this section is the bibliography"
            },
            "sourcesUsed": { "description": "Ids of the sources cited by this section" },
            "nextSectionNeeded": {
                "description": "Set to false after the final section"
            }
        }
    })
}

/// Every tool the server exposes.
pub fn all() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: SEARCH_BY_TITLE,
            description: "Search Gallica for documents by title",
            input_schema: search_schema("title", "Title or words from the title", true),
        },
        ToolDefinition {
            name: SEARCH_BY_AUTHOR,
            description: "Search Gallica for documents by author",
            input_schema: search_schema("author", "Author name", true),
        },
        ToolDefinition {
            name: SEARCH_BY_SUBJECT,
            description: "Search Gallica for documents by subject",
            input_schema: search_schema("subject", "Subject heading or keywords", true),
        },
        ToolDefinition {
            name: SEARCH_BY_DATE,
            description: "Search Gallica for documents by date or date range",
            input_schema: {
                let mut schema = search_schema("start_date", "Date or first year of the range (YYYY or YYYY-MM-DD)", false);
                schema["properties"]["end_date"] = json!({
                    "type": "string",
                    "description": "Last date of the range (inclusive)"
                });
                schema
            },
        },
        ToolDefinition {
            name: SEARCH_BY_DOCUMENT_TYPE,
            description: "Search Gallica by document type (monographie, periodique, image, carte, manuscrit, partition, ...)",
            input_schema: search_schema("document_type", "Document type", false),
        },
        ToolDefinition {
            name: ADVANCED_SEARCH,
            description: "Search Gallica with a raw CQL query, e.g. dc.creator all \"Hugo\" and dc.type all \"monographie\"",
            input_schema: search_schema("query", "CQL query", false),
        },
        ToolDefinition {
            name: NATURAL_LANGUAGE_SEARCH,
            description: "Search across all Gallica fields with plain words",
            input_schema: search_schema("query", "Free-text query", false),
        },
        ToolDefinition {
            name: SEQUENTIAL_REPORTING,
            description: "Build a research report step by step: send a topic to get a plan, \
                then searchSources: true to find sources, then each section in order \
                (sectionNumber, totalSections, title, content) until nextSectionNeeded is false",
            input_schema: reporting_schema(),
        },
    ]
}
