//! Report events and callbacks for observability.

use std::sync::Arc;
use tracing::{info, warn};

/// Events emitted as a report session moves through its workflow.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportEvent {
    /// A topic was set and a plan built
    Initialized { topic: String, total_sections: u32 },
    /// Source discovery finished
    SourcesFound { topic: String, count: usize },
    /// Graphics discovery finished
    GraphicsFound { topic: String, count: usize },
    /// A section was appended
    SectionAppended {
        section_number: u32,
        total_sections: u32,
        progress: u32,
    },
    /// The caller signalled that no further sections follow
    Completed { sections: usize },
    /// A step was rejected
    Error { message: String },
}

/// Type alias for event callbacks
pub type EventCallback = Arc<dyn Fn(&ReportEvent) + Send + Sync>;

/// Storage for session callbacks
#[derive(Default, Clone)]
pub struct ReportCallbacks {
    pub on_initialized: Option<EventCallback>,
    pub on_sources_found: Option<EventCallback>,
    pub on_graphics_found: Option<EventCallback>,
    pub on_section_appended: Option<EventCallback>,
    pub on_complete: Option<EventCallback>,
    pub on_error: Option<EventCallback>,
    /// Catch-all callback for any event
    pub on_event: Option<EventCallback>,
}

impl ReportCallbacks {
    /// Emit an event to the appropriate callback(s)
    pub fn emit(&self, event: &ReportEvent) {
        let specific = match event {
            ReportEvent::Initialized { .. } => &self.on_initialized,
            ReportEvent::SourcesFound { .. } => &self.on_sources_found,
            ReportEvent::GraphicsFound { .. } => &self.on_graphics_found,
            ReportEvent::SectionAppended { .. } => &self.on_section_appended,
            ReportEvent::Completed { .. } => &self.on_complete,
            ReportEvent::Error { .. } => &self.on_error,
        };

        if let Some(cb) = specific {
            cb(event);
        }

        if let Some(cb) = &self.on_event {
            cb(event);
        }
    }
}

/// Callbacks that log every event through `tracing`.
pub fn verbose_callbacks() -> ReportCallbacks {
    ReportCallbacks {
        on_event: Some(Arc::new(|e| match e {
            ReportEvent::Initialized {
                topic,
                total_sections,
            } => info!(topic = %topic, total_sections, "report initialized"),
            ReportEvent::SourcesFound { topic, count } => {
                info!(topic = %topic, count, "sources found")
            }
            ReportEvent::GraphicsFound { topic, count } => {
                info!(topic = %topic, count, "graphics found")
            }
            ReportEvent::SectionAppended {
                section_number,
                total_sections,
                progress,
            } => info!(
                "section {}/{} appended ({}%)",
                section_number, total_sections, progress
            ),
            ReportEvent::Completed { sections } => info!(sections, "report complete"),
            ReportEvent::Error { message } => warn!("report step rejected: {}", message),
        })),
        ..Default::default()
    }
}
