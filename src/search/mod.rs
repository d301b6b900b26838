//! Search service abstraction and the Gallica SRU client.
//!
//! Discovery and the search tools only see the [`SearchService`] trait, so
//! tests can swap the network client for a scripted one.

mod client;
#[cfg(test)]
pub(crate) mod mock;
pub mod query;
mod record;
pub mod sru;

pub use client::GallicaClient;
pub use record::{FieldValue, Record, first_value};

use crate::error::Result;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

/// One page of search results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchPage {
    pub records: Vec<Record>,
    /// Total hits reported by the index, as returned by the service
    #[serde(rename = "totalRecords")]
    pub total_count: String,
}

/// A remote bibliographic index.
pub trait SearchService: Send + Sync {
    /// Run a CQL `query`, returning at most `limit` records starting at the
    /// 1-based `start` position.
    fn search<'a>(&'a self, query: &'a str, start: u32, limit: u32)
    -> BoxFuture<'a, Result<SearchPage>>;
}
