use chrono::{DateTime, Utc};
use log::info;
use std::collections::HashMap;

/// Per-pod lifecycle timestamps. `added ≤ eligible ≤ scheduled ≤ bound ≤ started`
/// whenever all are defined; each stage other than `started` is written exactly
/// once, first write wins.
#[derive(Debug, Default, Clone)]
pub struct TraceRecord {
    pub added: Option<DateTime<Utc>>,
    pub eligible: Option<DateTime<Utc>>,
    pub scheduled: Option<DateTime<Utc>>,
    pub bound: Option<DateTime<Utc>>,
    pub started: Option<DateTime<Utc>>,
    pub bind_attempts: u32,
}

/// An injected collaborator, not global mutable state, so the watch loop and
/// its tests can each own an independent instance. Loss of in-memory traces on
/// restart is tolerable; nothing here is durable.
#[derive(Default)]
pub struct TraceRecorder {
    records: HashMap<String, TraceRecord>,
}

impl TraceRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    fn log_stage(key: &str, stage: &str, ts: DateTime<Utc>) {
        info!("stage={} pod={} ts={}", stage, key, ts.timestamp());
    }

    pub fn record_added(&mut self, key: &str, ts: DateTime<Utc>) {
        let entry = self.records.entry(key.to_string()).or_default();
        if entry.added.is_none() {
            entry.added = Some(ts);
            Self::log_stage(key, "added", ts);
        }
    }

    pub fn record_eligible(&mut self, key: &str, ts: DateTime<Utc>) {
        let entry = self.records.entry(key.to_string()).or_default();
        if entry.eligible.is_none() {
            entry.eligible = Some(ts);
            Self::log_stage(key, "eligible", ts);
        }
    }

    pub fn record_scheduled(&mut self, key: &str, ts: DateTime<Utc>) {
        let entry = self.records.entry(key.to_string()).or_default();
        if entry.scheduled.is_none() {
            entry.scheduled = Some(ts);
            Self::log_stage(key, "scheduled", ts);
        }
    }

    pub fn record_bound(&mut self, key: &str, ts: DateTime<Utc>) {
        let entry = self.records.entry(key.to_string()).or_default();
        if entry.bound.is_none() {
            entry.bound = Some(ts);
            Self::log_stage(key, "bound", ts);
            if let Some(added) = entry.added {
                info!(
                    "latency pod={} added_to_bound={}",
                    key,
                    (ts - added).num_seconds()
                );
            }
        }
    }

    /// No-op if no container is currently running or `started` is already set.
    pub fn record_started(&mut self, key: &str, started_at: Option<DateTime<Utc>>) {
        let Some(started_at) = started_at else {
            return;
        };
        let entry = self.records.entry(key.to_string()).or_default();
        if entry.started.is_none() {
            entry.started = Some(started_at);
            Self::log_stage(key, "started", started_at);
        }
    }

    pub fn increment_bind_attempts(&mut self, key: &str) -> u32 {
        let entry = self.records.entry(key.to_string()).or_default();
        entry.bind_attempts += 1;
        entry.bind_attempts
    }

    pub fn get(&self, key: &str) -> Option<&TraceRecord> {
        self.records.get(key)
    }
}
