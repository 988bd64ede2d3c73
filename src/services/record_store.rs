use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::task::JoinSet;

use crate::error::FetchResult;
use crate::models::{CallRecord, RecordQuery};
use crate::services::change_feed::ChangeFeed;
use crate::services::views::RecordView;

/// Read side of the transcriptions table.
#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn fetch(&self, query: &RecordQuery) -> FetchResult<Vec<CallRecord>>;

    /// Short label for logs.
    fn describe(&self) -> String;
}

/// One-shot refresh: loading on, fetch, apply, loading off.
pub async fn refresh<V: RecordView + ?Sized>(source: &dyn RecordSource, view: &mut V) {
    view.set_loading(true);
    let result = source.fetch(&view.query()).await;
    view.apply_fetch(result);
    view.set_loading(false);
}

/// Keeps a view synchronised with the backend: every change event triggers a
/// full refetch. Overlapping refetches are allowed to race and whichever
/// resolves last is what the view ends up holding.
pub struct LiveCollection {
    source: Arc<dyn RecordSource>,
}

impl LiveCollection {
    pub fn new(source: Arc<dyn RecordSource>) -> Self {
        Self { source }
    }

    fn spawn_fetch<V: RecordView + ?Sized>(
        &self,
        in_flight: &mut JoinSet<FetchResult<Vec<CallRecord>>>,
        view: &mut V,
    ) {
        let source = Arc::clone(&self.source);
        let query = view.query();
        in_flight.spawn(async move { source.fetch(&query).await });
        view.set_loading(true);
    }

    /// Runs until the feed closes and every in-flight fetch has resolved, or
    /// until `shutdown` completes. `on_update` sees the view after each change.
    pub async fn run<V, C, S, F>(&self, view: &mut V, feed: &mut C, shutdown: S, mut on_update: F)
    where
        V: RecordView + ?Sized,
        C: ChangeFeed + ?Sized,
        S: Future<Output = ()>,
        F: FnMut(&V),
    {
        let mut in_flight = JoinSet::new();
        let mut feed_open = true;
        tokio::pin!(shutdown);

        log::info!("Watching {} for changes", self.source.describe());
        self.spawn_fetch(&mut in_flight, view);
        on_update(&*view);

        loop {
            if !feed_open && in_flight.is_empty() {
                break;
            }

            tokio::select! {
                _ = &mut shutdown => {
                    log::info!("Live view shutting down with {} fetch(es) in flight", in_flight.len());
                    break;
                }
                event = feed.next_event(), if feed_open => match event {
                    Some(event) => {
                        log::info!("Change received: {:?} at {}", event.kind, event.observed_at);
                        self.spawn_fetch(&mut in_flight, view);
                        on_update(&*view);
                    }
                    None => {
                        log::debug!("Change feed closed");
                        feed_open = false;
                    }
                },
                Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                    match joined {
                        Ok(result) => view.apply_fetch(result),
                        Err(e) => log::error!("Fetch task aborted: {}", e),
                    }
                    view.set_loading(!in_flight.is_empty());
                    on_update(&*view);
                }
            }
        }

        in_flight.abort_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::services::views::CallsView;
    use chrono::{TimeZone, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FlakySource {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl RecordSource for FlakySource {
        async fn fetch(&self, _query: &RecordQuery) -> FetchResult<Vec<CallRecord>> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n == 1 {
                return Err(FetchError::Request("connection reset".into()));
            }
            let ts = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
            Ok((0..=n).map(|i| CallRecord::new(format!("c{}", i), ts)).collect())
        }

        fn describe(&self) -> String {
            "flaky".into()
        }
    }

    #[tokio::test]
    async fn refresh_keeps_previous_rows_on_failure() {
        let source = FlakySource {
            calls: AtomicUsize::new(0),
        };
        let mut view = CallsView::default();

        refresh(&source, &mut view).await;
        assert_eq!(view.records().len(), 1);
        assert!(!view.is_loading());

        refresh(&source, &mut view).await;
        assert_eq!(view.records().len(), 1);
        assert!(!view.is_loading());

        refresh(&source, &mut view).await;
        assert_eq!(view.records().len(), 3);
    }
}
