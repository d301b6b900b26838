//! Per-session report state.

use super::input::{InitializeInput, SectionInput};
use super::plan::ReportPlan;
use crate::config::ReportConfig;
use crate::discovery::{Graphic, Source};
use serde::{Deserialize, Serialize};

/// Where a session is in the report workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Uninitialized,
    Initialized,
    SourcesSearched,
    Reporting,
    Complete,
}

/// One unit of report content, as submitted by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub section_number: u32,
    pub total_sections: u32,
    pub title: String,
    pub content: String,
    pub is_bibliography: bool,
    pub sources_used: Vec<i64>,
    pub next_section_needed: bool,
}

impl From<SectionInput> for Section {
    /// A section number past the declared total widens the total to match.
    fn from(input: SectionInput) -> Self {
        Self {
            section_number: input.section_number,
            total_sections: input.total_sections.max(input.section_number),
            title: input.title,
            content: input.content,
            is_bibliography: input.is_bibliography,
            sources_used: input.sources_used,
            next_section_needed: input.next_section_needed,
        }
    }
}

/// Everything a session knows about the report being assembled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportState {
    pub topic: Option<String>,
    pub page_count: u32,
    pub source_count: u32,
    pub include_graphics: bool,
    pub sources: Vec<Source>,
    pub graphics: Vec<Graphic>,
    pub plan: Option<ReportPlan>,
    pub sections: Vec<Section>,
    pub current_step: u32,
    pub phase: Phase,
}

impl ReportState {
    /// Empty state using the configured default counts.
    pub fn new(config: &ReportConfig) -> Self {
        Self {
            topic: None,
            page_count: config.default_page_count,
            source_count: config.default_source_count,
            include_graphics: false,
            sources: Vec::new(),
            graphics: Vec::new(),
            plan: None,
            sections: Vec::new(),
            current_step: 0,
            phase: Phase::Uninitialized,
        }
    }

    /// Fresh state for a new topic. Nothing from a previous report survives.
    pub fn initialized(input: &InitializeInput) -> Self {
        Self {
            topic: Some(input.topic.clone()),
            page_count: input.page_count,
            source_count: input.source_count,
            include_graphics: input.include_graphics,
            sources: Vec::new(),
            graphics: Vec::new(),
            plan: Some(ReportPlan::build(&input.topic, input.page_count)),
            sections: Vec::new(),
            current_step: 0,
            phase: Phase::Initialized,
        }
    }
}

impl Default for ReportState {
    fn default() -> Self {
        Self::new(&ReportConfig::default())
    }
}
