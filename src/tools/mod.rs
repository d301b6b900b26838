//! Tool registry and dispatch.
//!
//! [`ToolServer`] is what a protocol layer talks to: it lists the tools,
//! validates arguments against each tool's JSON schema and routes the call
//! either to a search or to the caller's report session.

pub mod definitions;

pub use definitions::ToolDefinition;

use crate::config::ServerConfig;
use crate::error::{Error, Result};
use crate::report::StepOutcome;
use crate::search::{GallicaClient, SearchService, query};
use crate::sessions::SessionStore;
use definitions::*;
use serde::Serialize;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// One block of tool output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolContent {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub text: String,
}

/// Result of a tool call, shaped for the host protocol.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolOutput {
    pub content: Vec<ToolContent>,
    #[serde(rename = "isError")]
    pub is_error: bool,
}

impl ToolOutput {
    /// The text of the first content block.
    pub fn text(&self) -> &str {
        self.content.first().map_or("", |c| c.text.as_str())
    }

    /// Parse the text back into JSON.
    pub fn json(&self) -> Result<Value> {
        Ok(serde_json::from_str(self.text())?)
    }
}

impl From<StepOutcome> for ToolOutput {
    fn from(outcome: StepOutcome) -> Self {
        let text = serde_json::to_string_pretty(&outcome.payload)
            .unwrap_or_else(|e| format!("{{\"error\": \"{}\", \"status\": \"failed\"}}", e));
        Self {
            content: vec![ToolContent { kind: "text", text }],
            is_error: outcome.is_error,
        }
    }
}

/// Exposes the search tools and the sequential reporting tool.
pub struct ToolServer {
    search: Arc<dyn SearchService>,
    config: ServerConfig,
    sessions: SessionStore,
    definitions: Vec<ToolDefinition>,
    validators: HashMap<&'static str, jsonschema::Validator>,
}

impl ToolServer {
    /// Create a server over any search service.
    pub fn new(search: Arc<dyn SearchService>, config: ServerConfig) -> Result<Self> {
        let definitions = definitions::all();
        let validators = definitions
            .iter()
            .map(|def| {
                jsonschema::validator_for(&def.input_schema)
                    .map(|v| (def.name, v))
                    .map_err(|e| Error::Schema(format!("{}: {}", def.name, e)))
            })
            .collect::<Result<HashMap<_, _>>>()?;

        Ok(Self {
            sessions: SessionStore::new(search.clone(), config.report.clone()),
            search,
            config,
            definitions,
            validators,
        })
    }

    /// Create a server backed by the Gallica SRU endpoint.
    pub fn gallica(config: ServerConfig) -> Result<Self> {
        let client = GallicaClient::new(config.client.clone());
        Self::new(Arc::new(client), config)
    }

    pub fn list_tools(&self) -> &[ToolDefinition] {
        &self.definitions
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Invoke tool `name`. Report steps run in the session `session_id`.
    ///
    /// Never fails: problems come back as an output with `is_error` set.
    pub async fn call_tool(&self, session_id: &str, name: &str, arguments: &Value) -> ToolOutput {
        debug!(tool = name, session = session_id, "tool call");
        match self.dispatch(session_id, name, arguments).await {
            Ok(outcome) => outcome.into(),
            Err(e) => StepOutcome::error(&e).into(),
        }
    }

    async fn dispatch(&self, session_id: &str, name: &str, arguments: &Value) -> Result<StepOutcome> {
        self.validate(name, arguments)?;

        if name == SEQUENTIAL_REPORTING {
            return Ok(self.sessions.process(session_id, arguments).await);
        }

        let cql = build_query(name, arguments)?;
        let limit = self.config.clamp_records(uint_arg(arguments, "max_results"));
        let start = uint_arg(arguments, "start_record")
            .unwrap_or(self.config.default_start_record)
            .max(1);

        let page = self.search.search(&cql, start, limit).await?;
        Ok(StepOutcome::ok(json!({
            "query": cql,
            "startRecord": start,
            "totalRecords": page.total_count,
            "records": page.records,
        })))
    }

    fn validate(&self, name: &str, arguments: &Value) -> Result<()> {
        let validator = self
            .validators
            .get(name)
            .ok_or_else(|| Error::UnknownTool(name.to_string()))?;

        let errors: Vec<String> = validator
            .iter_errors(arguments)
            .map(|e| e.to_string())
            .collect();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(Error::validation(format!(
                "Invalid arguments for {}: {}",
                name,
                errors.join("; ")
            )))
        }
    }
}

fn str_arg<'a>(arguments: &'a Value, key: &str) -> Result<&'a str> {
    arguments[key]
        .as_str()
        .ok_or_else(|| Error::validation(format!("Missing required field: {}", key)))
}

fn uint_arg(arguments: &Value, key: &str) -> Option<u32> {
    arguments[key].as_u64().map(|n| n.min(u32::MAX as u64) as u32)
}

fn exact(arguments: &Value) -> bool {
    arguments["exact_match"].as_bool().unwrap_or(false)
}

/// CQL for a search tool call.
fn build_query(name: &str, arguments: &Value) -> Result<String> {
    Ok(match name {
        SEARCH_BY_TITLE => query::title(str_arg(arguments, "title")?, exact(arguments)),
        SEARCH_BY_AUTHOR => query::author(str_arg(arguments, "author")?, exact(arguments)),
        SEARCH_BY_SUBJECT => query::subject(str_arg(arguments, "subject")?, exact(arguments)),
        SEARCH_BY_DATE => query::date(
            str_arg(arguments, "start_date")?,
            arguments["end_date"].as_str(),
        ),
        SEARCH_BY_DOCUMENT_TYPE => query::document_type(str_arg(arguments, "document_type")?),
        ADVANCED_SEARCH => str_arg(arguments, "query")?.to_string(),
        NATURAL_LANGUAGE_SEARCH => query::natural_language(str_arg(arguments, "query")?),
        _ => return Err(Error::UnknownTool(name.to_string())),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::mock::{MockSearch, records};

    fn server(search: MockSearch) -> (ToolServer, Arc<MockSearch>) {
        let search = Arc::new(search);
        let server = ToolServer::new(search.clone(), ServerConfig::default()).unwrap();
        (server, search)
    }

    #[test]
    fn test_all_schemas_compile() {
        let (server, _) = server(MockSearch::new());
        assert_eq!(server.list_tools().len(), 8);
    }

    #[tokio::test]
    async fn test_search_by_title() {
        let cql = query::title("Germinal", true);
        let (server, search) = server(MockSearch::new().on(cql.clone(), records("Germinal", 3)));

        let out = server
            .call_tool(
                "s",
                SEARCH_BY_TITLE,
                &json!({"title": "Germinal", "exact_match": true, "max_results": 2}),
            )
            .await;

        assert!(!out.is_error);
        let body = out.json().unwrap();
        assert_eq!(body["query"], cql);
        assert_eq!(body["records"].as_array().map(Vec::len), Some(2));
        assert_eq!(search.calls()[0].limit, 2);
        assert_eq!(search.calls()[0].start, 1);
    }

    #[tokio::test]
    async fn test_max_results_is_capped() {
        let (server, search) = server(MockSearch::new());
        server
            .call_tool("s", NATURAL_LANGUAGE_SEARCH, &json!({"query": "Paris", "max_results": 1000, "start_record": 11}))
            .await;
        let call = &search.calls()[0];
        assert_eq!((call.start, call.limit), (11, 50));
    }

    #[tokio::test]
    async fn test_date_range_and_raw_query() {
        let (server, search) = server(MockSearch::new());
        server
            .call_tool("s", SEARCH_BY_DATE, &json!({"start_date": "1870", "end_date": "1871"}))
            .await;
        server
            .call_tool("s", ADVANCED_SEARCH, &json!({"query": "dc.creator all \"Zola\""}))
            .await;

        let queries: Vec<String> = search.calls().into_iter().map(|c| c.query).collect();
        assert_eq!(queries[0], query::date("1870", Some("1871")));
        assert_eq!(queries[1], "dc.creator all \"Zola\"");
    }

    #[tokio::test]
    async fn test_schema_violation_is_validation_error() {
        let (server, search) = server(MockSearch::new());
        let out = server.call_tool("s", SEARCH_BY_AUTHOR, &json!({"max_results": 5})).await;

        assert!(out.is_error);
        let body = out.json().unwrap();
        assert_eq!(body["kind"], "ValidationError");
        assert!(search.calls().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let (server, _) = server(MockSearch::new());
        let out = server.call_tool("s", "get_weather", &json!({})).await;
        assert!(out.is_error);
        assert!(out.text().contains("Unknown tool: get_weather"));
    }

    #[tokio::test]
    async fn test_search_failure_is_reported() {
        let cql = query::subject("Commune", false);
        let (server, _) = server(MockSearch::new().fail_on(cql));
        let out = server.call_tool("s", SEARCH_BY_SUBJECT, &json!({"subject": "Commune"})).await;
        assert!(out.is_error);
        assert_eq!(out.json().unwrap()["status"], "failed");
    }

    #[tokio::test]
    async fn test_sequential_reporting_workflow() {
        let (server, _) = server(
            MockSearch::new()
                .on(query::natural_language("Commune"), records("Source", 2))
                .on(query::subject("Commune", false), records("Subject", 8)),
        );

        let init = server
            .call_tool("s1", SEQUENTIAL_REPORTING, &json!({"topic": "Commune", "pageCount": 1}))
            .await;
        assert_eq!(init.json().unwrap()["plan"]["totalSections"], 3);

        let found = server
            .call_tool("s1", SEQUENTIAL_REPORTING, &json!({"searchSources": true}))
            .await
            .json()
            .unwrap();
        assert_eq!(found["sourceCount"], 10);
        assert_eq!(found["sources"][9]["id"], 10);

        for (n, more) in [(1, true), (2, true), (3, false)] {
            let out = server
                .call_tool(
                    "s1",
                    SEQUENTIAL_REPORTING,
                    &json!({
                        "sectionNumber": n.to_string(),
                        "totalSections": 3,
                        "content": format!("Section {} text", n),
                        "isBibliography": n == 1,
                        "nextSectionNeeded": more,
                    }),
                )
                .await;
            assert!(!out.is_error, "{}", out.text());
        }

        let session = server.sessions().get("s1").unwrap();
        let session = session.lock().await;
        assert_eq!(session.state().sections.len(), 3);
        assert_eq!(
            session.state().plan.as_ref().map(|p| p.next_step.as_str()),
            Some(crate::report::REPORT_COMPLETE)
        );

        // Another conversation starts from nothing.
        let other = server
            .call_tool("s2", SEQUENTIAL_REPORTING, &json!({"searchSources": true}))
            .await;
        assert_eq!(other.json().unwrap()["kind"], "PreconditionFailed");
    }

    #[tokio::test]
    async fn test_null_report_fields_reach_the_session_as_absent() {
        let (server, _) = server(MockSearch::new());
        server
            .call_tool("a", SEQUENTIAL_REPORTING, &json!({"topic": "Commune"}))
            .await;
        server
            .call_tool("b", SEQUENTIAL_REPORTING, &json!({"topic": "Commune"}))
            .await;

        let search = server
            .call_tool("a", SEQUENTIAL_REPORTING, &json!({"topic": null, "searchSources": true}))
            .await;
        assert!(!search.is_error, "{}", search.text());
        assert_eq!(search.json().unwrap()["status"], "sources_found");

        let section = server
            .call_tool(
                "a",
                SEQUENTIAL_REPORTING,
                &json!({"sectionNumber": 1, "totalSections": 3, "title": null}),
            )
            .await;
        assert!(!section.is_error, "{}", section.text());
        assert_eq!(section.json().unwrap()["title"], "Section 1");

        let other = server
            .call_tool(
                "b",
                SEQUENTIAL_REPORTING,
                &json!({"sectionNumber": null, "searchSources": true}),
            )
            .await;
        assert!(!other.is_error, "{}", other.text());
        assert_eq!(other.json().unwrap()["status"], "sources_found");
    }

    #[tokio::test]
    async fn test_reporting_schema_rejects_wrong_types() {
        let (server, _) = server(MockSearch::new());
        let out = server
            .call_tool("s", SEQUENTIAL_REPORTING, &json!({"topic": 12}))
            .await;
        assert!(out.is_error);
        assert_eq!(out.json().unwrap()["kind"], "ValidationError");
    }
}
