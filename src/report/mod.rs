//! Sequential, multi-call report assembly.
//!
//! A report is built over several independent calls: set a topic, search
//! for sources, then submit sections one at a time until the caller says
//! no more are needed. [`ReportSession`] holds the state between calls.

mod events;
mod input;
mod plan;
mod session;
mod state;

pub use events::{EventCallback, ReportCallbacks, ReportEvent, verbose_callbacks};
pub use input::{InitializeInput, ReportInput, SectionInput};
pub use plan::{MAX_SECTIONS, PLAN_STEPS, PlanSection, ReportPlan, SEARCH_SOURCES_STEP, total_sections};
pub use session::{CREATE_BIBLIOGRAPHY_STEP, REPORT_COMPLETE, ReportSession, StepOutcome};
pub use state::{Phase, ReportState, Section};
