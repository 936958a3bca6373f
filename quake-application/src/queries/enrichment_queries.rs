// Bulk per-event enrichment
// Independent read-only fetches against disjoint remote resources; run
// through a bounded worker pool so the catalog service never sees an
// unbounded burst of connections.

use std::collections::HashMap;

use futures_util::stream::{self, StreamExt};
use tracing::warn;

use quake_domain::ports::DetailFetcher;
use quake_domain::{
    DetailRecord, EnrichmentFailurePolicy, EnrichmentOptions, EventId, EventSummary,
};

use crate::cancel::CancelToken;
use crate::error::AppError;
use crate::retry::{with_retry, RetryPolicy};

/// Fetch detail records for every event, keyed by event ID.
///
/// Completion order never leaks into the result: the map is keyed, and the
/// assembler folds it in event fetch order. Events whose detail comes back
/// empty get no entry, so their enrichment cells fall back to the
/// sentinel.
pub async fn fetch_details_bulk(
    fetcher: &dyn DetailFetcher,
    events: &[EventSummary],
    options: &EnrichmentOptions,
    concurrency: usize,
    retry: &RetryPolicy,
    policy: EnrichmentFailurePolicy,
    cancel: &CancelToken,
) -> Result<HashMap<EventId, DetailRecord>, AppError> {
    let concurrency = concurrency.max(1);
    let mut fetches = stream::iter(events.iter().map(|event| {
        let id = event.id.clone();
        async move {
            let result = with_retry(retry, cancel, "event detail", || {
                fetcher.fetch_detail(&id, options)
            })
            .await;
            (id, result)
        }
    }))
    .buffered(concurrency);

    let mut details = HashMap::with_capacity(events.len());
    while let Some((id, result)) = fetches.next().await {
        match result {
            Ok(record) => {
                if !record.is_empty() {
                    details.insert(id, record);
                }
            }
            Err(AppError::Cancelled) => return Err(AppError::Cancelled),
            Err(err) => match policy {
                EnrichmentFailurePolicy::Abort => {
                    return Err(AppError::Enrichment {
                        id,
                        source: Box::new(err),
                    })
                }
                EnrichmentFailurePolicy::FillSentinel => {
                    warn!("enrichment for event {id} failed, its cells fall back to the sentinel: {err}");
                }
            },
        }
    }
    Ok(details)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};

    use quake_domain::{CatalogError, CellValue};

    use crate::cancel::cancel_pair;

    fn retry() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 2,
            backoff_ms: 1,
        }
    }

    fn summary(id: &str) -> EventSummary {
        EventSummary {
            id: EventId::from(id),
            time: Utc.timestamp_opt(0, 0).unwrap(),
            location: "somewhere".to_string(),
            latitude: 1.0,
            longitude: 2.0,
            depth: 3.0,
            magnitude: 4.0,
        }
    }

    fn options() -> EnrichmentOptions {
        EnrichmentOptions {
            moment_tensor: quake_domain::ProductSelection::Preferred,
            ..EnrichmentOptions::default()
        }
    }

    /// Returns one tensor field per event; configurable failures.
    struct FakeFetcher {
        fail_id: Option<EventId>,
        calls: AtomicU32,
    }

    #[async_trait]
    impl DetailFetcher for FakeFetcher {
        async fn fetch_detail(
            &self,
            id: &EventId,
            _options: &EnrichmentOptions,
        ) -> Result<DetailRecord, CatalogError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_id.as_ref() == Some(id) {
                return Err(CatalogError::Unavailable("timeout".into()));
            }
            let mut record = DetailRecord::new();
            record.push(format!("us_Mww_{id}"), CellValue::Number(1.5));
            Ok(record)
        }
    }

    #[tokio::test]
    async fn every_event_gets_its_record() {
        let fetcher = FakeFetcher {
            fail_id: None,
            calls: AtomicU32::new(0),
        };
        let events: Vec<EventSummary> = (0..9).map(|i| summary(&format!("ev{i}"))).collect();
        let details = fetch_details_bulk(
            &fetcher,
            &events,
            &options(),
            3,
            &retry(),
            EnrichmentFailurePolicy::FillSentinel,
            &CancelToken::never(),
        )
        .await
        .expect("bulk fetch");
        assert_eq!(details.len(), 9);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 9);
        assert!(details[&EventId::from("ev4")]
            .get("us_Mww_ev4")
            .is_some());
    }

    #[tokio::test]
    async fn sentinel_policy_skips_the_failing_event_and_keeps_the_rest() {
        let fetcher = FakeFetcher {
            fail_id: Some(EventId::from("ev1")),
            calls: AtomicU32::new(0),
        };
        let events = vec![summary("ev0"), summary("ev1"), summary("ev2")];
        let details = fetch_details_bulk(
            &fetcher,
            &events,
            &options(),
            2,
            &retry(),
            EnrichmentFailurePolicy::FillSentinel,
            &CancelToken::never(),
        )
        .await
        .expect("bulk fetch continues");
        assert_eq!(details.len(), 2);
        assert!(!details.contains_key(&EventId::from("ev1")));
    }

    #[tokio::test]
    async fn abort_policy_fails_the_whole_call() {
        let fetcher = FakeFetcher {
            fail_id: Some(EventId::from("ev1")),
            calls: AtomicU32::new(0),
        };
        let events = vec![summary("ev0"), summary("ev1"), summary("ev2")];
        let result = fetch_details_bulk(
            &fetcher,
            &events,
            &options(),
            2,
            &retry(),
            EnrichmentFailurePolicy::Abort,
            &CancelToken::never(),
        )
        .await;
        match result {
            Err(AppError::Enrichment { id, .. }) => assert_eq!(id, EventId::from("ev1")),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn cancelled_token_aborts_the_bulk_fetch() {
        let fetcher = FakeFetcher {
            fail_id: None,
            calls: AtomicU32::new(0),
        };
        let events = vec![summary("ev0"), summary("ev1")];
        let (handle, token) = cancel_pair();
        handle.cancel();
        let result = fetch_details_bulk(
            &fetcher,
            &events,
            &options(),
            2,
            &retry(),
            EnrichmentFailurePolicy::FillSentinel,
            &token,
        )
        .await;
        assert!(matches!(result, Err(AppError::Cancelled)));
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
    }
}
