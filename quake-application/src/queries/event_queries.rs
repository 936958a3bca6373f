// Pagination engine
// Turns one logical filter into however many bounded remote requests the
// service ceiling requires, without duplicating or dropping events.

use std::collections::VecDeque;

use tracing::{debug, info, warn};

use quake_domain::ports::CatalogClient;
use quake_domain::{EventFilter, EventSummary, TimeWindow};

use crate::cancel::CancelToken;
use crate::error::AppError;
use crate::retry::{with_retry, RetryPolicy};

/// One remote probe, no pagination. For feasibility checks.
pub async fn count_events(
    catalog: &dyn CatalogClient,
    filter: &EventFilter,
    retry: &RetryPolicy,
    cancel: &CancelToken,
) -> Result<u64, AppError> {
    with_retry(retry, cancel, "event count", || catalog.count(filter)).await
}

/// Fetch every event matching `filter`.
///
/// When the probe says the result set exceeds `page_limit`, the time range
/// is cut into half-open sub-windows sized by the count ratio; windows
/// still over the ceiling are re-split until they fit or cannot shrink.
/// Sub-query results are concatenated in chronological window order, so
/// the output order matches what one oversized request would have
/// returned.
pub async fn fetch_all_events(
    catalog: &dyn CatalogClient,
    filter: &EventFilter,
    page_limit: u64,
    retry: &RetryPolicy,
    cancel: &CancelToken,
) -> Result<Vec<EventSummary>, AppError> {
    let page_limit = page_limit.max(1);
    let total = count_events(catalog, filter, retry, cancel).await?;
    if total == 0 {
        debug!("no events matched the filter");
        return Ok(Vec::new());
    }
    if total <= page_limit {
        return with_retry(retry, cancel, "event page", || {
            catalog.fetch_page(filter, page_limit)
        })
        .await;
    }

    let Some(window) = filter.time_window() else {
        return Err(AppError::BadRequest(format!(
            "{total} events exceed the per-request ceiling of {page_limit}; \
             supply a start and end time so the query can be decomposed"
        )));
    };

    info!("{total} events exceed the ceiling of {page_limit}, splitting the time range");

    let mut pending: VecDeque<TimeWindow> =
        window.split_even(segments_for(total, page_limit)).into();
    let mut events: Vec<EventSummary> = Vec::new();
    while let Some(current) = pending.pop_front() {
        if cancel.is_cancelled() {
            return Err(AppError::Cancelled);
        }
        let sub = filter.with_window(current);
        let count = with_retry(retry, cancel, "window count", || catalog.count(&sub)).await?;
        if count == 0 {
            continue;
        }
        if count > page_limit && current.can_split() {
            let windows = current.split_even(segments_for(count, page_limit));
            if windows.len() > 1 {
                debug!(
                    "window {} .. {} holds {count} events, splitting into {}",
                    current.start,
                    current.end,
                    windows.len()
                );
                for (i, w) in windows.into_iter().enumerate() {
                    pending.insert(i, w);
                }
                continue;
            }
        }
        if count > page_limit {
            // cannot narrow a one-tick window any further
            warn!(
                "window {} .. {} holds {count} events but cannot be split; \
                 fetching up to the ceiling",
                current.start, current.end
            );
        }
        let mut page =
            with_retry(retry, cancel, "window page", || catalog.fetch_page(&sub, page_limit))
                .await?;
        events.append(&mut page);
    }
    Ok(events)
}

fn segments_for(count: u64, page_limit: u64) -> u32 {
    count.div_ceil(page_limit).min(u64::from(u32::MAX)) as u32
}
