// Export pipeline
// filter -> normalize -> paginate -> enrich -> assemble

use std::collections::HashMap;

use tracing::info;

use quake_domain::services::{assemble, normalize};
use quake_domain::{EnrichmentOptions, FilterParams, ResultTable};

use crate::cancel::CancelToken;
use crate::error::AppError;
use crate::queries::{count_events, fetch_all_events, fetch_details_bulk};
use crate::retry::RetryPolicy;
use crate::state::AppState;

/// One export run: the filter input plus what to enrich.
#[derive(Debug, Clone, Default)]
pub struct ExportRequest {
    pub params: FilterParams,
    pub enrichment: EnrichmentOptions,
}

/// Probe how many events the filter matches, without fetching any.
pub async fn count_matching_events(
    state: &AppState,
    params: FilterParams,
    cancel: &CancelToken,
) -> Result<u64, AppError> {
    let filter = normalize(params)?;
    let retry = RetryPolicy::from_config(&state.config);
    count_events(state.catalog.as_ref(), &filter, &retry, cancel).await
}

/// Build the full result table for an export request.
///
/// Zero matching events is a valid outcome: the table comes back with the
/// canonical summary columns and no rows, and the caller decides how to
/// report it.
pub async fn build_event_table(
    state: &AppState,
    request: &ExportRequest,
    cancel: &CancelToken,
) -> Result<ResultTable, AppError> {
    let filter = normalize(request.params.clone())?;
    let retry = RetryPolicy::from_config(&state.config);

    let events = fetch_all_events(
        state.catalog.as_ref(),
        &filter,
        state.config.page_limit,
        &retry,
        cancel,
    )
    .await?;
    info!("fetched {} matching events", events.len());

    let details = if request.enrichment.any_requested() && !events.is_empty() {
        let details = fetch_details_bulk(
            state.details.as_ref(),
            &events,
            &request.enrichment,
            state.config.enrich_concurrency,
            &retry,
            state.config.enrichment_failure,
            cancel,
        )
        .await?;
        info!("enriched {} of {} events", details.len(), events.len());
        details
    } else {
        HashMap::new()
    };

    Ok(assemble(&events, &details))
}
