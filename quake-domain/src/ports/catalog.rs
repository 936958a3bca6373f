use async_trait::async_trait;

use crate::entities::EventSummary;
use crate::error::CatalogError;
use crate::value_objects::EventFilter;

/// One bounded remote query against the event catalog.
///
/// Implementations perform no pagination of their own: `fetch_page` is a
/// single request, and the caller guarantees the expected result count is
/// at most `limit`.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Probe the number of events matching `filter`.
    async fn count(&self, filter: &EventFilter) -> Result<u64, CatalogError>;

    /// Fetch the events matching `filter`, in ascending time order.
    async fn fetch_page(
        &self,
        filter: &EventFilter,
        limit: u64,
    ) -> Result<Vec<EventSummary>, CatalogError>;
}
