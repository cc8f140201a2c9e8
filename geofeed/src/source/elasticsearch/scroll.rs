//! Cursor-based retrieval of raw documents.
//!
//! The bounds query is drained through a server-side scroll cursor, one page
//! at a time. Each page fetch runs in its own child scope of the caller's
//! [`RequestContext`] with a fixed budget, so the budget applies per page
//! rather than to the whole retrieval. The cursor is cleared on every exit,
//! whether the retrieval completed, failed or was cancelled.

use std::time::Duration;

use geojson::FeatureCollection;
use serde_json::Value;
use tracing::{debug, warn};

use super::client::{Hit, SearchClient};
use crate::feature::{empty_collection, FeatureMapper};
use crate::source::{RequestContext, SourceError};

/// Drives scroll pagination for one source.
pub struct PaginatedRetriever<'a, C: SearchClient> {
    client: &'a C,
    index: &'a str,
    mapper: &'a FeatureMapper,
    page_timeout: Duration,
}

impl<'a, C: SearchClient> PaginatedRetriever<'a, C> {
    pub fn new(
        client: &'a C,
        index: &'a str,
        mapper: &'a FeatureMapper,
        page_timeout: Duration,
    ) -> Self {
        Self {
            client,
            index,
            mapper,
            page_timeout,
        }
    }

    /// Retrieves every document matching `body` and maps it to a feature.
    ///
    /// `body` is the initial scroll request (query, page size, source
    /// filtering). Features keep the order the backend returned them in.
    ///
    /// # Errors
    ///
    /// Any page failure, timeout, cancellation or mapping failure aborts the
    /// retrieval; the features gathered so far are discarded.
    pub async fn retrieve(
        &self,
        ctx: &RequestContext,
        body: &Value,
    ) -> Result<FeatureCollection, SourceError> {
        let mut cursor: Option<String> = None;
        let result = self.drain(ctx, body, &mut cursor).await;

        if let Some(scroll_id) = cursor {
            self.release(&scroll_id).await;
        }
        result
    }

    async fn drain(
        &self,
        ctx: &RequestContext,
        body: &Value,
        cursor: &mut Option<String>,
    ) -> Result<FeatureCollection, SourceError> {
        let mut collection = empty_collection();

        while let Some(hits) = self.next_page(ctx, body, cursor).await? {
            debug!(hits = hits.len(), "Scrolling hits");
            for hit in hits {
                let feature = self.mapper.map(&hit.id, hit.source)?;
                collection.features.push(feature);
            }
        }

        debug!(features = collection.features.len(), "Scroll exhausted");
        Ok(collection)
    }

    /// Fetches the next page, returning `None` at the end of results.
    async fn next_page(
        &self,
        ctx: &RequestContext,
        body: &Value,
        cursor: &mut Option<String>,
    ) -> Result<Option<Vec<Hit>>, SourceError> {
        // Dropped on every return below, which releases the page scope
        let scope = ctx.child(self.page_timeout);
        let page_ctx = scope.context();

        let keep_alive = self.page_timeout;
        let response = match cursor.as_deref() {
            None => {
                let open = self.client.open_scroll(self.index, body, keep_alive);
                page_ctx.run(open).await?
            }
            Some(scroll_id) => {
                let next = self.client.continue_scroll(scroll_id, keep_alive);
                page_ctx.run(next).await?
            }
        };

        if let Some(scroll_id) = response.scroll_id {
            *cursor = Some(scroll_id);
        }

        let hits = response.hits.hits;
        if hits.is_empty() {
            Ok(None)
        } else {
            Ok(Some(hits))
        }
    }

    /// Clears the server-side cursor. Failures are logged, never returned.
    async fn release(&self, scroll_id: &str) {
        let clear = self.client.clear_scroll(scroll_id);
        match tokio::time::timeout(self.page_timeout, clear).await {
            Ok(Ok(())) => debug!("Cleared scroll cursor"),
            Ok(Err(e)) => warn!(error = %e, "Failed to clear scroll cursor"),
            Err(_) => warn!("Timed out clearing scroll cursor"),
        }
    }
}
