//! gallica-mcp - Gallica search and sequential report tools
//!
//! gallica-mcp exposes the Gallica digital library (Bibliothèque nationale de
//! France) as a set of callable tools for an MCP host. Besides plain
//! searches by title, author, subject, date or document type, it provides a
//! stateful `sequential_reporting` tool that walks a caller through building
//! a research report one call at a time: topic, sources, bibliography,
//! sections, done.
//!
//! # Quick Start
//!
//! ```ignore
//! use gallica_mcp::{ServerConfig, ToolServer};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> gallica_mcp::Result<()> {
//!     let server = ToolServer::gallica(ServerConfig::default())?;
//!
//!     let plan = server
//!         .call_tool("session-1", "sequential_reporting", &json!({"topic": "La Belle Époque"}))
//!         .await;
//!     println!("{}", plan.text());
//!
//!     let sources = server
//!         .call_tool("session-1", "sequential_reporting", &json!({"searchSources": true}))
//!         .await;
//!     println!("{}", sources.text());
//!     Ok(())
//! }
//! ```

pub mod citation;
mod config;
pub mod discovery;
mod error;
pub mod report;
pub mod search;
mod sessions;
pub mod tools;

pub use citation::format_citation;
pub use config::{ClientConfig, DEFAULT_BASE_URL, ReportConfig, ServerConfig};
pub use discovery::{Graphic, GraphicKind, Source, discover_graphics, discover_sources};
pub use error::{Error, ErrorKind, Result};
pub use report::{ReportPlan, ReportSession, ReportState, StepOutcome};
pub use search::{GallicaClient, Record, SearchPage, SearchService};
pub use sessions::{SessionHandle, SessionStore};
pub use tools::{ToolDefinition, ToolOutput, ToolServer};
