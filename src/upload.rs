//! Staged file selection, batched upload and the per-session result list.

use std::path::{Path, PathBuf};

use crate::api::EventApi;
use crate::error::UploadError;
use crate::models::dto::UploadOutcome;
use crate::stats::StatsDelta;

pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["log", "txt", "csv"];

/// Name given to the single outcome reported when the whole call fails.
pub const UPLOAD_ERROR_NAME: &str = "Upload Error";

pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|supported| ext.eq_ignore_ascii_case(supported))
        })
        .unwrap_or(false)
}

/// Files picked for the next upload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSelection {
    files: Vec<PathBuf>,
}

impl FileSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the selection. Unsupported file types are skipped.
    pub fn stage<I, P>(&mut self, paths: I)
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.files = paths
            .into_iter()
            .map(Into::into)
            .filter(|path| {
                let keep = is_supported(path);
                if !keep {
                    tracing::warn!(path = %path.display(), "skipping unsupported file type");
                }
                keep
            })
            .collect();
    }

    pub fn remove(&mut self, index: usize) -> Option<PathBuf> {
        (index < self.files.len()).then(|| self.files.remove(index))
    }

    pub fn clear(&mut self) {
        self.files.clear();
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadReport {
    /// The backend answered; one outcome per file, in its order.
    Processed(Vec<UploadOutcome>),
    /// The call as a whole failed; nothing was applied.
    Failed(UploadOutcome),
}

impl UploadReport {
    pub fn outcomes(&self) -> &[UploadOutcome] {
        match self {
            UploadReport::Processed(outcomes) => outcomes,
            UploadReport::Failed(outcome) => std::slice::from_ref(outcome),
        }
    }
}

/// Send every staged file in one request.
///
/// An empty selection fails before touching the network. The selection is
/// only cleared once the backend has answered.
pub async fn upload_selection<A: EventApi>(
    api: &A,
    selection: &mut FileSelection,
) -> Result<UploadReport, UploadError> {
    if selection.is_empty() {
        return Err(UploadError::NoFilesSelected);
    }

    match api.upload_files(selection.files()).await {
        Ok(outcomes) => {
            let failed = outcomes.iter().filter(|o| !o.is_success()).count();
            tracing::info!(files = outcomes.len(), failed, "upload finished");
            selection.clear();
            Ok(UploadReport::Processed(outcomes))
        }
        Err(e) => {
            tracing::error!("upload failed: {}", e);
            Ok(UploadReport::Failed(UploadOutcome::error(
                UPLOAD_ERROR_NAME,
                e.user_message(),
            )))
        }
    }
}

/// Outcomes shown for the current session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadTracker {
    outcomes: Vec<UploadOutcome>,
}

impl UploadTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn outcomes(&self) -> &[UploadOutcome] {
        &self.outcomes
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// A new batch replaces the previous list.
    pub fn new_batch(&mut self, outcomes: Vec<UploadOutcome>) -> StatsDelta {
        self.outcomes = outcomes.clone();
        StatsDelta::Add(outcomes)
    }

    pub fn show_failure(&mut self, outcome: UploadOutcome) {
        self.outcomes = vec![outcome];
    }

    /// Hide the list without taking anything back from the counters.
    pub fn dismiss(&mut self) {
        self.outcomes.clear();
    }

    pub fn remove_one(&mut self, index: usize) -> Option<StatsDelta> {
        if index >= self.outcomes.len() {
            return None;
        }
        let removed = self.outcomes.remove(index);
        removed.is_success().then(|| StatsDelta::RemoveOne {
            name: removed.name,
            events_processed: -removed.events_processed,
        })
    }

    pub fn clear_all(&mut self) -> StatsDelta {
        let (events, succeeded) = self
            .outcomes
            .iter()
            .filter(|o| o.is_success())
            .fold((0i64, 0i64), |(events, n), o| (events + o.events_processed, n + 1));

        let delta = StatsDelta::ClearAll {
            events_processed: -events,
            files_processed: -succeeded,
            total_files: -(self.outcomes.len() as i64),
        };
        self.outcomes.clear();
        delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::filters::SearchFilters;
    use crate::models::domain::OutcomeStatus;
    use crate::models::dto::{EventFile, SearchResultPage, ServerStats};
    use crate::stats::AggregateStats;
    use std::sync::Mutex;

    struct FakeApi {
        reply: Mutex<Option<Result<Vec<UploadOutcome>, ApiError>>>,
        calls: Mutex<usize>,
    }

    impl FakeApi {
        fn replying(reply: Result<Vec<UploadOutcome>, ApiError>) -> Self {
            Self {
                reply: Mutex::new(Some(reply)),
                calls: Mutex::new(0),
            }
        }

        fn calls(&self) -> usize {
            *self.calls.lock().unwrap()
        }
    }

    impl EventApi for FakeApi {
        async fn upload_files(&self, _files: &[PathBuf]) -> Result<Vec<UploadOutcome>, ApiError> {
            *self.calls.lock().unwrap() += 1;
            self.reply.lock().unwrap().take().unwrap()
        }

        async fn search_events(&self, _: &SearchFilters) -> Result<SearchResultPage, ApiError> {
            unreachable!()
        }

        async fn stats(&self) -> Result<ServerStats, ApiError> {
            unreachable!()
        }

        async fn files(&self) -> Result<Vec<EventFile>, ApiError> {
            unreachable!()
        }
    }

    fn staged(names: &[&str]) -> FileSelection {
        let mut selection = FileSelection::new();
        selection.stage(names.iter().map(PathBuf::from));
        selection
    }

    fn tracker_with(outcomes: Vec<UploadOutcome>) -> UploadTracker {
        let mut tracker = UploadTracker::new();
        tracker.new_batch(outcomes);
        tracker
    }

    #[test]
    fn staging_skips_unsupported_types() {
        let selection = staged(&["a.log", "b.TXT", "c.csv", "d.exe", "noext"]);
        assert_eq!(
            selection.files(),
            &[PathBuf::from("a.log"), PathBuf::from("b.TXT"), PathBuf::from("c.csv")]
        );
    }

    #[tokio::test]
    async fn empty_selection_fails_without_calling_backend() {
        let api = FakeApi::replying(Ok(vec![]));
        let mut selection = FileSelection::new();

        let result = upload_selection(&api, &mut selection).await;
        assert!(matches!(result, Err(UploadError::NoFilesSelected)));
        assert_eq!(api.calls(), 0);
    }

    #[tokio::test]
    async fn answered_upload_clears_the_selection() {
        let outcomes = vec![
            UploadOutcome::success("a.log", 50),
            UploadOutcome::error("b.log", "bad header"),
        ];
        let api = FakeApi::replying(Ok(outcomes.clone()));
        let mut selection = staged(&["a.log", "b.log"]);

        let report = upload_selection(&api, &mut selection).await.unwrap();
        assert_eq!(report, UploadReport::Processed(outcomes));
        assert!(selection.is_empty());
    }

    #[tokio::test]
    async fn failed_call_keeps_selection_and_reports_one_error() {
        let api = FakeApi::replying(Err(ApiError::Api {
            status: 400,
            body: r#"{"error": "No files provided"}"#.to_string(),
        }));
        let mut selection = staged(&["a.log", "b.log"]);

        let report = upload_selection(&api, &mut selection).await.unwrap();
        assert_eq!(report.outcomes().len(), 1);
        let outcome = &report.outcomes()[0];
        assert_eq!(outcome.name, UPLOAD_ERROR_NAME);
        assert_eq!(outcome.status, OutcomeStatus::Error);
        assert_eq!(outcome.error.as_deref(), Some("No files provided"));
        assert_eq!(selection.len(), 2);
    }

    #[test]
    fn remove_success_emits_negated_events_and_keeps_order() {
        let mut tracker = tracker_with(vec![
            UploadOutcome::success("a.log", 10),
            UploadOutcome::success("b.log", 25),
            UploadOutcome::error("c.log", "x"),
        ]);

        let delta = tracker.remove_one(1);
        assert_eq!(
            delta,
            Some(StatsDelta::RemoveOne {
                name: "b.log".to_string(),
                events_processed: -25,
            })
        );
        let names: Vec<_> = tracker.outcomes().iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, ["a.log", "c.log"]);
    }

    #[test]
    fn remove_error_entry_emits_nothing() {
        let mut tracker = tracker_with(vec![
            UploadOutcome::error("c.log", "x"),
            UploadOutcome::success("a.log", 10),
        ]);
        assert_eq!(tracker.remove_one(0), None);
        assert_eq!(tracker.outcomes().len(), 1);
        assert_eq!(tracker.remove_one(5), None);
        assert_eq!(tracker.outcomes().len(), 1);
    }

    #[test]
    fn clear_all_sums_only_successes() {
        let mut tracker = tracker_with(vec![
            UploadOutcome::success("a.log", 10),
            UploadOutcome::error("b.log", "x"),
            UploadOutcome::success("c.log", 32),
            UploadOutcome::error("d.log", "y"),
            UploadOutcome::success("e.log", 8),
        ]);

        assert_eq!(
            tracker.clear_all(),
            StatsDelta::ClearAll {
                events_processed: -50,
                files_processed: -3,
                total_files: -5,
            }
        );
        assert!(tracker.is_empty());
    }

    #[test]
    fn upload_then_clear_returns_stats_to_zero() {
        let mut stats = AggregateStats::new();
        let mut tracker = UploadTracker::new();

        stats.apply(&tracker.new_batch(vec![
            UploadOutcome::success("a.log", 50),
            UploadOutcome::error("b.log", "x"),
        ]));
        stats.apply(&tracker.clear_all());

        assert_eq!(stats, AggregateStats::default());
    }

    #[test]
    fn dismiss_emits_no_delta() {
        let mut stats = AggregateStats::new();
        let mut tracker = UploadTracker::new();
        stats.apply(&tracker.new_batch(vec![UploadOutcome::success("a.log", 7)]));

        tracker.dismiss();
        assert!(tracker.is_empty());
        assert_eq!(stats.total_events, 7);
        // Nothing left to take back.
        stats.apply(&tracker.clear_all());
        assert_eq!(stats.total_events, 7);
    }

    #[test]
    fn new_batch_replaces_previous_list() {
        let mut tracker = tracker_with(vec![UploadOutcome::success("a.log", 1)]);
        let delta = tracker.new_batch(vec![UploadOutcome::success("b.log", 2)]);
        assert_eq!(tracker.outcomes().len(), 1);
        assert_eq!(tracker.outcomes()[0].name, "b.log");
        assert!(matches!(delta, StatsDelta::Add(batch) if batch.len() == 1));
    }
}
