//! Session-local aggregate counters, driven by deltas from the upload tracker.

use std::fmt;

use crate::models::domain::OutcomeStatus;
use crate::models::dto::{ServerStats, UploadOutcome};

/// Signed change pushed from [`crate::upload::UploadTracker`] to the counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatsDelta {
    /// Raw outcomes of a completed upload batch.
    Add(Vec<UploadOutcome>),
    /// A successful upload was dropped from the result list.
    RemoveOne {
        name: String,
        /// Already negated.
        events_processed: i64,
    },
    /// The whole result list was dropped at once.
    ClearAll {
        events_processed: i64,
        files_processed: i64,
        total_files: i64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AggregateStats {
    pub total_events: u64,
    pub total_files: u64,
    pub processed_files: u64,
}

impl AggregateStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, delta: &StatsDelta) {
        match delta {
            StatsDelta::ClearAll {
                events_processed,
                files_processed,
                total_files,
            } => {
                self.total_events = clamp_add(self.total_events, *events_processed);
                self.total_files = clamp_add(self.total_files, *total_files);
                self.processed_files = clamp_add(self.processed_files, *files_processed);
            }
            StatsDelta::Add(batch) => {
                let events: i64 = batch.iter().map(|o| o.events_processed).sum();
                let succeeded = count(batch, OutcomeStatus::Success);
                let removed = count(batch, OutcomeStatus::Removed);
                self.apply_batch(events, batch.len() as i64, succeeded, removed);
            }
            // One removed entry: its events go, total_files nets to zero.
            StatsDelta::RemoveOne {
                name,
                events_processed,
            } => {
                tracing::debug!(%name, events_processed, "upload result removed");
                self.apply_batch(*events_processed, 1, 0, 1)
            }
        }
        tracing::debug!(stats = %self, "applied stats delta");
    }

    fn apply_batch(&mut self, events: i64, len: i64, succeeded: i64, removed: i64) {
        let file_count_change = succeeded - removed;
        let total_file_change = len - removed;

        self.total_events = clamp_add(self.total_events, events);
        if total_file_change > 0 {
            self.total_files = clamp_add(self.total_files, total_file_change);
        }
        self.processed_files = clamp_add(self.processed_files, file_count_change);
    }

    /// Replace the local counters with the backend's own numbers.
    pub fn resync(&mut self, server: ServerStats) {
        self.total_events = server.total_events;
        self.total_files = server.total_files;
        self.processed_files = server.processed_files;
    }
}

impl fmt::Display for AggregateStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "events={} files={} processed={}",
            self.total_events, self.total_files, self.processed_files
        )
    }
}

fn count(batch: &[UploadOutcome], status: OutcomeStatus) -> i64 {
    batch.iter().filter(|o| o.status == status).count() as i64
}

fn clamp_add(current: u64, delta: i64) -> u64 {
    current.saturating_add_signed(delta)
}
