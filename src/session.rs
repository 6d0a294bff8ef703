//! One user session: search form, last results, staged files, upload
//! outcomes and the running counters, wired together over an [`EventApi`].

use std::path::PathBuf;

use crate::api::EventApi;
use crate::error::{ApiError, SearchError, UploadError};
use crate::filters::{SearchFilters, SearchForm};
use crate::models::dto::{EventFile, UploadOutcome};
use crate::results::{PageStrip, ResultsView};
use crate::stats::AggregateStats;
use crate::upload::{upload_selection, FileSelection, UploadReport, UploadTracker};

pub struct Session<A> {
    api: A,
    form: SearchForm,
    last_filters: Option<SearchFilters>,
    results: ResultsView,
    selection: FileSelection,
    tracker: UploadTracker,
    stats: AggregateStats,
}

impl<A: EventApi> Session<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            form: SearchForm::new(),
            last_filters: None,
            results: ResultsView::Empty,
            selection: FileSelection::new(),
            tracker: UploadTracker::new(),
            stats: AggregateStats::new(),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn form(&self) -> &SearchForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut SearchForm {
        &mut self.form
    }

    pub fn results(&self) -> &ResultsView {
        &self.results
    }

    pub fn last_filters(&self) -> Option<&SearchFilters> {
        self.last_filters.as_ref()
    }

    pub fn selection(&self) -> &FileSelection {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut FileSelection {
        &mut self.selection
    }

    /// Pick a new set of files. Outcomes of the previous upload are hidden
    /// without touching the counters.
    pub fn stage_files<I, P>(&mut self, paths: I)
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.selection.stage(paths);
        self.tracker.dismiss();
    }

    pub fn uploads(&self) -> &[UploadOutcome] {
        self.tracker.outcomes()
    }

    pub fn stats(&self) -> &AggregateStats {
        &self.stats
    }

    /// Submit the form. Invalid input never reaches the backend.
    pub async fn search(&mut self) -> Result<(), SearchError> {
        let filters = self.form.submit()?;
        self.search_with(filters).await?;
        Ok(())
    }

    /// Run a search and replace whatever the results area showed.
    ///
    /// A failure is shown as an error, never as substitute records.
    pub async fn search_with(&mut self, filters: SearchFilters) -> Result<(), ApiError> {
        self.last_filters = Some(filters.clone());

        match self.api.search_events(&filters).await {
            Ok(page) => {
                tracing::info!(
                    total = page.total_count,
                    page = page.page,
                    pages = page.total_pages,
                    "search finished"
                );
                self.results = ResultsView::Page(page);
                Ok(())
            }
            Err(e) => {
                tracing::error!("search failed: {}", e);
                self.results = ResultsView::Failed(e.user_message());
                Err(e)
            }
        }
    }

    /// Re-run the last search on another page.
    ///
    /// Returns `Ok(false)` without a request when there is no result page to
    /// paginate or `page` is outside `[1, total_pages]`.
    pub async fn change_page(&mut self, page: u32) -> Result<bool, ApiError> {
        let Some(current) = self.results.page() else {
            return Ok(false);
        };
        if !PageStrip::new(current.page, current.total_pages).accepts(page) {
            tracing::debug!(page, total = current.total_pages, "ignoring page change");
            return Ok(false);
        }
        let Some(filters) = self.last_filters.as_ref().map(|f| f.with_page(page)) else {
            return Ok(false);
        };

        self.search_with(filters).await?;
        Ok(true)
    }

    pub fn current_page(&self) -> Option<(u32, u32)> {
        self.results.page().map(|p| (p.page, p.total_pages))
    }

    /// Upload the staged files and fold the answer into the counters.
    pub async fn upload(&mut self) -> Result<&[UploadOutcome], UploadError> {
        match upload_selection(&self.api, &mut self.selection).await? {
            UploadReport::Processed(outcomes) => {
                let delta = self.tracker.new_batch(outcomes);
                self.stats.apply(&delta);
            }
            UploadReport::Failed(outcome) => self.tracker.show_failure(outcome),
        }
        Ok(self.tracker.outcomes())
    }

    /// Drop one upload outcome. Returns false if `index` is out of range.
    pub fn remove_result(&mut self, index: usize) -> bool {
        if index >= self.tracker.outcomes().len() {
            return false;
        }
        if let Some(delta) = self.tracker.remove_one(index) {
            self.stats.apply(&delta);
        }
        true
    }

    pub fn clear_results(&mut self) {
        let delta = self.tracker.clear_all();
        self.stats.apply(&delta);
    }

    /// Replace the local counters with the backend's.
    pub async fn sync_stats(&mut self) -> Result<(), ApiError> {
        let server = self.api.stats().await?;
        self.stats.resync(server);
        Ok(())
    }

    pub async fn list_files(&self) -> Result<Vec<EventFile>, ApiError> {
        self.api.files().await
    }
}
