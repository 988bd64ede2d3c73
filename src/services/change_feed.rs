use std::collections::HashMap;
use std::hash::Hasher;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::models::{CallRecord, RecordQuery};
use crate::services::record_store::RecordSource;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChangeEvent {
    pub kind: ChangeKind,
    pub observed_at: DateTime<Utc>,
}

impl ChangeEvent {
    pub fn now(kind: ChangeKind) -> Self {
        Self {
            kind,
            observed_at: Utc::now(),
        }
    }
}

/// Source of table change notifications. `None` means the feed is closed.
#[async_trait]
pub trait ChangeFeed: Send {
    async fn next_event(&mut self) -> Option<ChangeEvent>;
}

/// Feed driven by whoever holds the sender.
pub struct ChannelChangeFeed {
    rx: mpsc::Receiver<ChangeEvent>,
}

impl ChannelChangeFeed {
    pub fn new(buffer: usize) -> (mpsc::Sender<ChangeEvent>, Self) {
        let (tx, rx) = mpsc::channel(buffer);
        (tx, Self { rx })
    }
}

#[async_trait]
impl ChangeFeed for ChannelChangeFeed {
    async fn next_event(&mut self) -> Option<ChangeEvent> {
        self.rx.recv().await
    }
}

/// Row fingerprints keyed by call id.
pub type Fingerprint = HashMap<String, u64>;

fn hash_record(record: &CallRecord) -> u64 {
    let mut hasher = twox_hash::XxHash64::default();
    hasher.write(&serde_json::to_vec(record).unwrap_or_default());
    hasher.finish()
}

pub fn fingerprint(records: &[CallRecord]) -> Fingerprint {
    records
        .iter()
        .map(|r| (r.call_id.clone(), hash_record(r)))
        .collect()
}

/// Change kinds between two snapshots, at most one of each.
pub fn detect_changes(previous: &Fingerprint, current: &Fingerprint) -> Vec<ChangeKind> {
    let mut kinds = Vec::new();
    if current.keys().any(|id| !previous.contains_key(id)) {
        kinds.push(ChangeKind::Insert);
    }
    if current
        .iter()
        .any(|(id, hash)| previous.get(id).map_or(false, |old| old != hash))
    {
        kinds.push(ChangeKind::Update);
    }
    if previous.keys().any(|id| !current.contains_key(id)) {
        kinds.push(ChangeKind::Delete);
    }
    kinds
}

/// Emulates a change subscription by re-reading the table on an interval and
/// diffing row fingerprints. The first poll only records the baseline.
///
/// Polling runs in its own task and events arrive over a channel, so dropping
/// a pending `next_event` never loses a poll.
pub struct PollingChangeFeed {
    rx: mpsc::Receiver<ChangeEvent>,
    poller: JoinHandle<()>,
}

impl PollingChangeFeed {
    /// Must be called from within a tokio runtime.
    pub fn new(source: Arc<dyn RecordSource>, every: Duration) -> Self {
        let (tx, rx) = mpsc::channel(16);
        let poller = tokio::spawn(poll_table(source, every.max(Duration::from_millis(100)), tx));
        Self { rx, poller }
    }
}

impl Drop for PollingChangeFeed {
    fn drop(&mut self) {
        self.poller.abort();
    }
}

async fn poll_table(source: Arc<dyn RecordSource>, every: Duration, tx: mpsc::Sender<ChangeEvent>) {
    let mut interval = tokio::time::interval(every);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut baseline: Option<Fingerprint> = None;

    loop {
        interval.tick().await;
        let records = match source.fetch(&RecordQuery::all()).await {
            Ok(records) => records,
            Err(e) => {
                log::warn!("Change poll on {} failed: {}", source.describe(), e);
                continue;
            }
        };
        let current = fingerprint(&records);
        let kinds = baseline
            .as_ref()
            .map(|previous| detect_changes(previous, &current))
            .unwrap_or_default();
        log::debug!("Polled {} rows, {} change(s) detected", records.len(), kinds.len());
        baseline = Some(current);

        for kind in kinds {
            if tx.send(ChangeEvent::now(kind)).await.is_err() {
                return;
            }
        }
    }
}

#[async_trait]
impl ChangeFeed for PollingChangeFeed {
    async fn next_event(&mut self) -> Option<ChangeEvent> {
        self.rx.recv().await
    }
}
