//! The sequential report state machine.

use super::events::{ReportCallbacks, ReportEvent, verbose_callbacks};
use super::input::{InitializeInput, ReportInput, SectionInput};
use super::plan::SEARCH_SOURCES_STEP;
use super::state::{Phase, ReportState, Section};
use crate::config::ReportConfig;
use crate::discovery::{discover_graphics, discover_sources};
use crate::error::{Error, Result};
use crate::search::SearchService;
use serde_json::{Value, json};
use std::sync::Arc;

/// Terminal `nextStep` once the caller stops requesting sections.
pub const REPORT_COMPLETE: &str = "Report complete";

/// `nextStep` after sources have been found.
pub const CREATE_BIBLIOGRAPHY_STEP: &str = "Create bibliography";

/// Result of one step: a JSON payload and whether it reports an error.
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    pub payload: Value,
    pub is_error: bool,
}

impl StepOutcome {
    pub fn ok(payload: Value) -> Self {
        Self {
            payload,
            is_error: false,
        }
    }

    pub fn error(error: &Error) -> Self {
        Self {
            payload: error.to_payload(),
            is_error: true,
        }
    }
}

/// One report session: a topic, its sources, its plan and the sections
/// written so far.
///
/// A session processes one step at a time and does no locking of its own.
/// Callers must hold exclusive access for the whole of
/// [`process_section`](Self::process_section); [`SessionStore`] does this
/// with one mutex per session.
///
/// [`SessionStore`]: crate::SessionStore
pub struct ReportSession {
    search: Arc<dyn SearchService>,
    config: ReportConfig,
    state: ReportState,
    callbacks: ReportCallbacks,
}

impl ReportSession {
    /// Create an uninitialized session.
    pub fn new(search: Arc<dyn SearchService>, config: ReportConfig) -> Self {
        Self {
            state: ReportState::new(&config),
            search,
            config,
            callbacks: ReportCallbacks::default(),
        }
    }

    /// Log every transition through `tracing`.
    pub fn verbose(mut self, enabled: bool) -> Self {
        if enabled {
            self.callbacks = verbose_callbacks();
        }
        self
    }

    /// Replace all callbacks.
    pub fn with_callbacks(mut self, callbacks: ReportCallbacks) -> Self {
        self.callbacks = callbacks;
        self
    }

    /// Set a catch-all callback for any event.
    pub fn on_event<F>(mut self, f: F) -> Self
    where
        F: Fn(&ReportEvent) + Send + Sync + 'static,
    {
        self.callbacks.on_event = Some(Arc::new(f));
        self
    }

    pub fn state(&self) -> &ReportState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    /// Process one step of the workflow.
    ///
    /// Never fails: rejected input comes back as an error payload and leaves
    /// the session as it was, so the caller can retry.
    pub async fn process_section(&mut self, input: &Value) -> StepOutcome {
        match self.step(input).await {
            Ok(payload) => StepOutcome::ok(payload),
            Err(e) => {
                self.emit(ReportEvent::Error {
                    message: e.to_string(),
                });
                StepOutcome::error(&e)
            }
        }
    }

    async fn step(&mut self, input: &Value) -> Result<Value> {
        match ReportInput::parse(input, &self.config)? {
            ReportInput::Initialize(init) => Ok(self.initialize(init)),
            ReportInput::SearchSources => self.search_sources().await,
            ReportInput::AppendSection(section) => Ok(self.append_section(section)),
        }
    }

    fn initialize(&mut self, init: InitializeInput) -> Value {
        self.state = ReportState::initialized(&init);

        let plan = self.state.plan.as_ref();
        self.emit(ReportEvent::Initialized {
            topic: init.topic.clone(),
            total_sections: plan.map_or(0, |p| p.total_sections),
        });

        json!({
            "status": "initialized",
            "topic": init.topic,
            "pageCount": init.page_count,
            "sourceCount": init.source_count,
            "includeGraphics": init.include_graphics,
            "plan": self.state.plan,
            "currentStep": self.state.current_step,
            "nextStep": SEARCH_SOURCES_STEP,
            "hint": "Call again with searchSources: true to find sources for this topic",
        })
    }

    async fn search_sources(&mut self) -> Result<Value> {
        let Some(topic) = self.state.topic.clone() else {
            return Err(Error::PreconditionFailed(
                "No topic set: initialize the report with a topic before searching for sources"
                    .to_string(),
            ));
        };
        if self.state.current_step > 0 {
            return Err(Error::PreconditionFailed(
                "Sources were already searched for this topic: re-initialize with a topic to search again"
                    .to_string(),
            ));
        }

        let sources =
            discover_sources(self.search.as_ref(), &topic, self.state.source_count as usize).await;
        self.emit(ReportEvent::SourcesFound {
            topic: topic.clone(),
            count: sources.len(),
        });

        let graphics = if self.state.include_graphics {
            let graphics =
                discover_graphics(self.search.as_ref(), &topic, self.config.graphics_count).await;
            self.emit(ReportEvent::GraphicsFound {
                topic: topic.clone(),
                count: graphics.len(),
            });
            graphics
        } else {
            Vec::new()
        };

        self.state.sources = sources;
        self.state.graphics = graphics;
        self.state.current_step = 1;
        self.state.phase = Phase::SourcesSearched;
        if let Some(plan) = self.state.plan.as_mut() {
            plan.next_step = CREATE_BIBLIOGRAPHY_STEP.to_string();
        }

        let mut payload = json!({
            "status": "sources_found",
            "topic": topic,
            "sourceCount": self.state.sources.len(),
            "sources": self.state.sources,
            "currentStep": self.state.current_step,
            "nextStep": CREATE_BIBLIOGRAPHY_STEP,
            "hint": "Write section 1 (the bibliography) with isBibliography: true, citing the sources above",
        });
        if self.state.include_graphics {
            payload["graphics"] = json!(self.state.graphics);
        }
        Ok(payload)
    }

    fn append_section(&mut self, input: SectionInput) -> Value {
        let section = Section::from(input);
        let number = section.section_number;
        let total = section.total_sections;
        let complete = !section.next_section_needed;

        let next_step = if complete {
            REPORT_COMPLETE.to_string()
        } else {
            self.next_section_step(number)
        };

        let mut payload = json!({
            "status": if complete { "complete" } else { "section_added" },
            "sectionNumber": number,
            "totalSections": total,
            "title": section.title,
            "isBibliography": section.is_bibliography,
            "nextSectionNeeded": section.next_section_needed,
        });
        if section.is_bibliography {
            payload["sources"] = json!(self.state.sources);
        }

        self.state.sections.push(section);
        let completed = self.state.sections.len();
        let progress = progress_percent(completed, total);

        if let Some(plan) = self.state.plan.as_mut() {
            plan.current_section = number;
            plan.next_step = next_step.clone();
        }
        self.state.phase = if complete {
            Phase::Complete
        } else {
            Phase::Reporting
        };

        self.emit(ReportEvent::SectionAppended {
            section_number: number,
            total_sections: total,
            progress,
        });
        if complete {
            self.emit(ReportEvent::Completed {
                sections: completed,
            });
        }

        payload["sectionsCompleted"] = json!(completed);
        payload["progress"] = json!(format!("{}%", progress));
        payload["nextStep"] = json!(next_step);
        payload
    }

    /// Guidance for the section after `number`, named from the plan when
    /// it has one.
    fn next_section_step(&self, number: u32) -> String {
        let next = number.saturating_add(1);
        match self.state.plan.as_ref().and_then(|p| p.section_title(next)) {
            Some(title) => format!("Write section {}: {}", next, title),
            None => format!("Write section {}", next),
        }
    }

    fn emit(&self, event: ReportEvent) {
        self.callbacks.emit(&event);
    }
}

/// `completed / total × 100`, rounded.
fn progress_percent(completed: usize, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    ((completed as f64 / total as f64) * 100.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::GraphicKind;
    use crate::search::mock::{MockSearch, records};
    use crate::search::query;
    use std::sync::Mutex;

    fn session(search: MockSearch) -> ReportSession {
        ReportSession::new(Arc::new(search), ReportConfig::default())
    }

    fn stocked_search(topic: &str) -> MockSearch {
        MockSearch::new()
            .on(query::natural_language(topic), records("Source", 10))
            .on(query::image(topic), records("Image", 2))
    }

    #[tokio::test]
    async fn test_initialize_returns_plan() {
        let mut s = session(MockSearch::new());
        let out = s.process_section(&json!({"topic": "X", "pageCount": 1})).await;

        assert!(!out.is_error);
        assert_eq!(out.payload["status"], "initialized");
        assert_eq!(out.payload["plan"]["totalSections"], 3);
        assert_eq!(out.payload["plan"]["sections"][0]["title"], "Bibliography");
        assert_eq!(out.payload["plan"]["sections"][0]["isBibliography"], true);
        assert_eq!(out.payload["nextStep"], SEARCH_SOURCES_STEP);
        assert_eq!(s.phase(), Phase::Initialized);
        assert_eq!(s.state().current_step, 0);
    }

    #[tokio::test]
    async fn test_search_before_topic_is_precondition_failure() {
        let mut s = session(MockSearch::new());
        let out = s.process_section(&json!({"searchSources": true})).await;

        assert!(out.is_error);
        assert_eq!(out.payload["kind"], "PreconditionFailed");
        assert_eq!(out.payload["status"], "failed");
        assert_eq!(s.state().current_step, 0);
        assert_eq!(s.phase(), Phase::Uninitialized);
    }

    #[tokio::test]
    async fn test_search_populates_sources_and_graphics() {
        let mut s = session(stocked_search("Paris"));
        s.process_section(&json!({"topic": "Paris", "sourceCount": 3, "includeGraphics": true}))
            .await;
        let out = s.process_section(&json!({"searchSources": true})).await;

        assert!(!out.is_error);
        assert_eq!(out.payload["sourceCount"], 3);
        assert_eq!(out.payload["sources"][2]["id"], 3);
        assert_eq!(out.payload["graphics"].as_array().map(Vec::len), Some(2));
        assert_eq!(out.payload["nextStep"], CREATE_BIBLIOGRAPHY_STEP);
        assert_eq!(s.state().current_step, 1);
        assert_eq!(s.state().graphics[0].kind, GraphicKind::Image);
        assert_eq!(s.phase(), Phase::SourcesSearched);
    }

    #[tokio::test]
    async fn test_sources_are_searched_once_per_topic() {
        let search = Arc::new(stocked_search("Paris"));
        let mut s = ReportSession::new(search.clone(), ReportConfig::default());
        s.process_section(&json!({"topic": "Paris", "sourceCount": 2}))
            .await;
        s.process_section(&json!({"searchSources": true})).await;
        s.process_section(&json!({
            "sectionNumber": 1,
            "totalSections": 1,
            "isBibliography": true,
            "sourcesUsed": [1, 2],
            "nextSectionNeeded": false,
        }))
        .await;
        let sources = s.state().sources.clone();
        let calls = search.calls().len();

        let again = s.process_section(&json!({"searchSources": true})).await;

        assert!(again.is_error);
        assert_eq!(again.payload["kind"], "PreconditionFailed");
        assert_eq!(search.calls().len(), calls);
        assert_eq!(s.state().sources, sources);
        assert_eq!(s.phase(), Phase::Complete);
        assert_eq!(
            s.state().plan.as_ref().map(|p| p.next_step.as_str()),
            Some(REPORT_COMPLETE)
        );

        s.process_section(&json!({"topic": "Paris"})).await;
        let fresh = s.process_section(&json!({"searchSources": true})).await;
        assert!(!fresh.is_error);
    }

    #[tokio::test]
    async fn test_graphics_omitted_unless_requested() {
        let search = stocked_search("Paris");
        let mut s = session(search);
        s.process_section(&json!({"topic": "Paris"})).await;
        let out = s.process_section(&json!({"searchSources": true})).await;

        assert!(out.payload.get("graphics").is_none());
        assert!(s.state().graphics.is_empty());
    }

    #[tokio::test]
    async fn test_bibliography_section_echoes_sources() {
        let mut s = session(stocked_search("Paris"));
        s.process_section(&json!({"topic": "Paris", "pageCount": 1, "sourceCount": 2}))
            .await;
        s.process_section(&json!({"searchSources": true})).await;

        let out = s
            .process_section(&json!({
                "sectionNumber": 1,
                "totalSections": 3,
                "title": "Bibliography",
                "content": "1. ...",
                "isBibliography": true,
                "sourcesUsed": [1, 2],
            }))
            .await;

        assert!(!out.is_error);
        assert_eq!(out.payload["sources"].as_array().map(Vec::len), Some(2));
        assert_eq!(out.payload["progress"], "33%");
        assert_eq!(out.payload["nextStep"], "Write section 2: Introduction");
        assert_eq!(s.state().plan.as_ref().map(|p| p.current_section), Some(1));
        assert_eq!(s.phase(), Phase::Reporting);
    }

    #[tokio::test]
    async fn test_section_number_past_total_widens_total() {
        let mut s = session(MockSearch::new());
        let out = s
            .process_section(&json!({"sectionNumber": 3, "totalSections": 2}))
            .await;

        assert!(!out.is_error);
        assert_eq!(out.payload["totalSections"], 3);
        assert_eq!(s.state().sections[0].total_sections, 3);
    }

    #[tokio::test]
    async fn test_next_section_not_needed_completes_report() {
        let mut s = session(MockSearch::new());
        s.process_section(&json!({"topic": "X", "pageCount": 4})).await;
        let out = s
            .process_section(&json!({
                "sectionNumber": 2,
                "totalSections": 9,
                "nextSectionNeeded": false,
            }))
            .await;

        assert_eq!(out.payload["nextStep"], REPORT_COMPLETE);
        assert_eq!(out.payload["status"], "complete");
        assert_eq!(
            s.state().plan.as_ref().map(|p| p.next_step.as_str()),
            Some(REPORT_COMPLETE)
        );
        assert_eq!(s.phase(), Phase::Complete);
    }

    #[tokio::test]
    async fn test_invalid_section_leaves_sections_untouched() {
        let mut s = session(MockSearch::new());
        s.process_section(&json!({"sectionNumber": 1, "totalSections": 3}))
            .await;

        let out = s
            .process_section(&json!({"sectionNumber": 2, "totalSections": 3, "content": 7}))
            .await;
        assert!(out.is_error);
        assert_eq!(out.payload["kind"], "ValidationError");
        assert_eq!(s.state().sections.len(), 1);

        let retry = s
            .process_section(&json!({"sectionNumber": 2, "totalSections": 3, "content": "ok"}))
            .await;
        assert!(!retry.is_error);
        assert_eq!(s.state().sections.len(), 2);
    }

    #[tokio::test]
    async fn test_reinitialize_discards_previous_report() {
        let mut s = session(stocked_search("Paris"));
        s.process_section(&json!({"topic": "Paris", "includeGraphics": true}))
            .await;
        s.process_section(&json!({"searchSources": true})).await;
        s.process_section(&json!({"sectionNumber": 1, "totalSections": 9}))
            .await;
        assert!(!s.state().sources.is_empty());

        s.process_section(&json!({"topic": "Lyon"})).await;

        let state = s.state();
        assert_eq!(state.topic.as_deref(), Some("Lyon"));
        assert!(state.sources.is_empty());
        assert!(state.graphics.is_empty());
        assert!(state.sections.is_empty());
        assert!(!state.include_graphics);
        assert_eq!(state.current_step, 0);
    }

    #[tokio::test]
    async fn test_out_of_range_sources_used_is_accepted() {
        let mut s = session(MockSearch::new());
        let out = s
            .process_section(&json!({"sectionNumber": 1, "totalSections": 2, "sourcesUsed": [42]}))
            .await;
        assert!(!out.is_error);
        assert_eq!(s.state().sections[0].sources_used, vec![42]);
    }

    #[tokio::test]
    async fn test_events_follow_transitions() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let mut s = session(stocked_search("Paris")).on_event(move |e| {
            let name = match e {
                ReportEvent::Initialized { .. } => "initialized",
                ReportEvent::SourcesFound { .. } => "sources",
                ReportEvent::GraphicsFound { .. } => "graphics",
                ReportEvent::SectionAppended { .. } => "section",
                ReportEvent::Completed { .. } => "complete",
                ReportEvent::Error { .. } => "error",
            };
            sink.lock().unwrap().push(name);
        });

        s.process_section(&json!({"searchSources": true})).await;
        s.process_section(&json!({"topic": "Paris"})).await;
        s.process_section(&json!({"searchSources": true})).await;
        s.process_section(&json!({"sectionNumber": 1, "totalSections": 1, "nextSectionNeeded": false}))
            .await;

        assert_eq!(
            *seen.lock().unwrap(),
            vec!["error", "initialized", "sources", "section", "complete"]
        );
    }

    #[test]
    fn test_progress_percent() {
        assert_eq!(progress_percent(1, 3), 33);
        assert_eq!(progress_percent(2, 3), 67);
        assert_eq!(progress_percent(4, 2), 200);
        assert_eq!(progress_percent(1, 0), 0);
    }
}
