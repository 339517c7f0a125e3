//! Route search with stale-response suppression
//!
//! Rapid re-submission can let an earlier, slower response arrive after a
//! later one. Each search takes a generation number; a response whose
//! generation is no longer the latest is reported as [`SearchOutcome::Stale`]
//! instead of overwriting newer results.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, instrument};

use crate::Result;
use crate::client::{ApiClient, HttpTransport, Transport};
use crate::models::{RouteSearchRequest, RouteSearchResult};

/// Which search endpoint to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchMethod {
    #[default]
    Get,
    Post,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Fresh(RouteSearchResult),
    /// A newer search started before this one finished
    Stale { generation: u64 },
}

impl SearchOutcome {
    #[must_use]
    pub fn into_fresh(self) -> Option<RouteSearchResult> {
        match self {
            SearchOutcome::Fresh(result) => Some(result),
            SearchOutcome::Stale { .. } => None,
        }
    }
}

pub struct RouteSearcher<T = HttpTransport> {
    client: Arc<ApiClient<T>>,
    method: SearchMethod,
    generation: AtomicU64,
}

impl<T: Transport> RouteSearcher<T> {
    pub fn new(client: Arc<ApiClient<T>>) -> Self {
        Self {
            client,
            method: SearchMethod::default(),
            generation: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub fn with_method(mut self, method: SearchMethod) -> Self {
        self.method = method;
        self
    }

    /// Generation of the most recently started search
    #[must_use]
    pub fn latest(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Run a search. Errors from a stale search are discarded as well.
    #[instrument(skip(self, request))]
    pub async fn search(&self, request: &RouteSearchRequest) -> Result<SearchOutcome> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let result = match self.method {
            SearchMethod::Get => self.client.search_routes(request).await,
            SearchMethod::Post => self.client.search_routes_post(request).await,
        };

        if generation != self.latest() {
            debug!(
                "Discarding search #{} (latest is #{})",
                generation,
                self.latest()
            );
            return Ok(SearchOutcome::Stale { generation });
        }
        result.map(SearchOutcome::Fresh)
    }
}
