//! Scripted search service for tests.

use super::{FieldValue, Record, SearchPage, SearchService};
use crate::error::{Error, Result};
use futures::future::BoxFuture;
use std::sync::Mutex;

/// A recorded call to [`MockSearch::search`].
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub query: String,
    pub start: u32,
    pub limit: u32,
}

enum Reply {
    Records(Vec<Record>),
    Fail,
}

/// Returns canned replies for queries equal to a scripted CQL string;
/// anything unscripted yields an empty page.
#[derive(Default)]
pub struct MockSearch {
    replies: Vec<(String, Reply)>,
    calls: Mutex<Vec<Call>>,
}

impl MockSearch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply to `query` with `records`.
    pub fn on(mut self, query: impl Into<String>, records: Vec<Record>) -> Self {
        self.replies.push((query.into(), Reply::Records(records)));
        self
    }

    /// Fail every call to `query`.
    pub fn fail_on(mut self, query: impl Into<String>) -> Self {
        self.replies.push((query.into(), Reply::Fail));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

impl SearchService for MockSearch {
    fn search<'a>(
        &'a self,
        query: &'a str,
        start: u32,
        limit: u32,
    ) -> BoxFuture<'a, Result<SearchPage>> {
        self.calls.lock().unwrap().push(Call {
            query: query.to_string(),
            start,
            limit,
        });

        let reply = self.replies.iter().find(|(q, _)| q == query).map(|(_, r)| r);
        let result = match reply {
            Some(Reply::Fail) => Err(Error::Http("status 503".to_string())),
            Some(Reply::Records(records)) => {
                let records: Vec<Record> = records.iter().take(limit as usize).cloned().collect();
                Ok(SearchPage {
                    total_count: records.len().to_string(),
                    records,
                })
            }
            None => Ok(SearchPage {
                records: Vec::new(),
                total_count: "0".to_string(),
            }),
        };
        Box::pin(async move { result })
    }
}

/// A record with a title and an ARK-based URL.
pub fn record(title: &str, ark: &str) -> Record {
    let url = format!("https://gallica.bnf.fr/ark:/12148/{}", ark);
    Record {
        title: Some(FieldValue::from(title)),
        identifier: Some(FieldValue::One(url.clone())),
        url: Some(url),
        ..Default::default()
    }
}

/// `n` numbered records: `"{prefix} 1"`, `"{prefix} 2"`, ...
pub fn records(prefix: &str, n: usize) -> Vec<Record> {
    (1..=n)
        .map(|i| record(&format!("{} {}", prefix, i), &format!("{}{}", prefix.to_lowercase(), i)))
        .collect()
}
