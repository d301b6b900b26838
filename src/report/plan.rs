//! Deterministic section outlines.

use serde::{Deserialize, Serialize};

/// Hard cap on the number of sections in a plan.
pub const MAX_SECTIONS: u32 = 20;

/// High-level phases of the report workflow, shown to the caller with the plan.
pub const PLAN_STEPS: [&str; 6] = [
    "Initialize the report with a topic and page count",
    "Search for sources",
    "Create the bibliography",
    "Write the introduction",
    "Write the main content sections",
    "Write the conclusion",
];

/// Initial `nextStep` of a fresh plan.
pub const SEARCH_SOURCES_STEP: &str = "Search for sources";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSection {
    pub title: String,
    pub is_bibliography: bool,
}

impl PlanSection {
    fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            is_bibliography: false,
        }
    }
}

/// Outline of a report: ordered section titles plus progress markers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportPlan {
    pub topic: String,
    pub total_sections: u32,
    pub sections: Vec<PlanSection>,
    pub current_section: u32,
    pub steps: Vec<String>,
    pub next_step: String,
}

/// `min(2 × page_count + 1, MAX_SECTIONS)`
pub fn total_sections(page_count: u32) -> u32 {
    page_count
        .saturating_mul(2)
        .saturating_add(1)
        .min(MAX_SECTIONS)
}

impl ReportPlan {
    /// Build the outline for `topic` at `page_count` pages.
    ///
    /// Bibliography and Introduction always open the report and Conclusion
    /// always closes it. Longer reports gain fixed analytical sections, and
    /// any remaining slots become numbered "Additional Analysis" sections.
    pub fn build(topic: &str, page_count: u32) -> Self {
        let total = total_sections(page_count);

        let mut sections = vec![
            PlanSection {
                title: "Bibliography".to_string(),
                is_bibliography: true,
            },
            PlanSection::new("Introduction"),
        ];
        if page_count >= 2 {
            sections.push(PlanSection::new("Historical Context"));
        }
        if page_count >= 3 {
            sections.push(PlanSection::new("Main Analysis"));
            sections.push(PlanSection::new("Key Findings"));
        }
        if page_count >= 4 {
            sections.push(PlanSection::new("Detailed Examination"));
            sections.push(PlanSection::new("Critical Perspectives"));
        }

        let mut k = 1;
        while (sections.len() as u32) + 1 < total {
            sections.push(PlanSection::new(format!("Additional Analysis {}", k)));
            k += 1;
        }
        sections.push(PlanSection::new("Conclusion"));

        Self {
            topic: topic.to_string(),
            total_sections: total,
            sections,
            current_section: 0,
            steps: PLAN_STEPS.iter().map(|s| s.to_string()).collect(),
            next_step: SEARCH_SOURCES_STEP.to_string(),
        }
    }

    /// Title of the 1-based section `number`, if the plan has one.
    pub fn section_title(&self, number: u32) -> Option<&str> {
        let index = usize::try_from(number).ok()?.checked_sub(1)?;
        self.sections.get(index).map(|s| s.title.as_str())
    }
}
