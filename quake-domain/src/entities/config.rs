// Runtime configuration
// Flattened from infrastructure AppConfig once at startup; carried in
// AppState and never mutated.

use serde::{Deserialize, Serialize};

/// What to do when a single event's enrichment fetch fails after retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnrichmentFailurePolicy {
    /// Keep the event, leave its enrichment cells to the sentinel, log it.
    #[default]
    FillSentinel,
    /// Fail the whole export.
    Abort,
}

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub endpoint: String,
    /// Hard per-request result-count ceiling enforced by the service.
    pub page_limit: u64,
    pub request_timeout_seconds: u64,
    pub retry_attempts: u32,
    pub retry_backoff_ms: u64,
    /// Width of the bounded worker pool for per-event detail fetches.
    pub enrich_concurrency: usize,
    pub enrichment_failure: EnrichmentFailurePolicy,
}
