use async_trait::async_trait;

use crate::entities::{DetailRecord, EnrichmentOptions};
use crate::error::CatalogError;
use crate::value_objects::EventId;

/// Per-event supplemental data source (moment tensors, focal mechanisms,
/// magnitude listings).
#[async_trait]
pub trait DetailFetcher: Send + Sync {
    async fn fetch_detail(
        &self,
        id: &EventId,
        options: &EnrichmentOptions,
    ) -> Result<DetailRecord, CatalogError>;
}
