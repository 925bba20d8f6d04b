//! Query state controller: applies user interactions to the query state, issues
//! fetches and publishes the results.
//!
//! Fetches are not serialized. Every fetch takes a sequence number when it is
//! issued and its outcome is applied only if no newer fetch was issued in the
//! meantime, so a slow response for an old state can never overwrite the
//! result of a newer one.

use std::{
    sync::{Arc, Weak},
    time::Duration,
};

use shared::domain::{CourseId, PageSize, SortField, SubjectId};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, error, info, warn};

use crate::{
    debounce::{Debouncer, DEFAULT_SEARCH_DEBOUNCE},
    error::FetchError,
    filters::{derive_options, FilterOptions, DEFAULT_SAMPLE_SIZE},
    query::{search_qualifies, QueryState},
    DashboardEvent, FetchContext, PerformanceSource, ResultPage,
};

const EVENT_CAPACITY: usize = 256;

#[derive(Debug, Clone)]
pub struct ControllerOptions {
    pub search_debounce: Duration,
    pub sample_size: u32,
    pub initial_query: QueryState,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            search_debounce: DEFAULT_SEARCH_DEBOUNCE,
            sample_size: DEFAULT_SAMPLE_SIZE,
            initial_query: QueryState::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied(ResultPage),
    /// A newer fetch was issued while this one was in flight; its outcome was
    /// dropped.
    Superseded,
}

/// Everything a front end needs to draw the dashboard.
#[derive(Debug, Clone)]
pub struct DashboardSnapshot {
    pub query: QueryState,
    pub search_draft: String,
    pub options: FilterOptions,
    pub result: Option<ResultPage>,
    pub error: Option<FetchError>,
    pub loading: bool,
}

struct ControllerState {
    query: QueryState,
    search_draft: String,
    options: FilterOptions,
    result: Option<ResultPage>,
    error: Option<FetchError>,
    issued_seq: u64,
    in_flight: usize,
}

pub struct QueryController {
    source: Arc<dyn PerformanceSource>,
    sample_size: u32,
    inner: Mutex<ControllerState>,
    search_debounce: Debouncer,
    events: broadcast::Sender<DashboardEvent>,
    this: Weak<QueryController>,
}

impl QueryController {
    pub fn new(source: Arc<dyn PerformanceSource>, options: ControllerOptions) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Arc::new_cyclic(|this| Self {
            source,
            sample_size: options.sample_size,
            inner: Mutex::new(ControllerState {
                search_draft: options.initial_query.search_text().to_string(),
                query: options.initial_query,
                options: FilterOptions::default(),
                result: None,
                error: None,
                issued_seq: 0,
                in_flight: 0,
            }),
            search_debounce: Debouncer::new(options.search_debounce),
            events,
            this: this.clone(),
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<DashboardEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: DashboardEvent) {
        let _ = self.events.send(event);
    }

    /// Samples the dataset for filter options, then loads the first page.
    /// A failed sample leaves the option lists empty and does not stop the
    /// first page from loading.
    pub async fn initialize(&self) -> Result<FetchOutcome, FetchError> {
        if let Err(err) = self.load_filter_options().await {
            warn!(error = %err, "continuing without filter options");
        }
        self.refresh().await
    }

    pub async fn load_filter_options(&self) -> Result<FilterOptions, FetchError> {
        match self.source.fetch_sample(self.sample_size).await {
            Ok(sample) => {
                let options = derive_options(&sample);
                info!(
                    sampled = sample.len(),
                    courses = options.courses.len(),
                    subjects = options.subjects.len(),
                    "derived filter options"
                );
                self.inner.lock().await.options = options.clone();
                self.emit(DashboardEvent::FilterOptionsLoaded(options.clone()));
                Ok(options)
            }
            Err(err) => {
                error!(error = %err, "failed to load filter options");
                self.inner.lock().await.error = Some(err.clone());
                self.emit(DashboardEvent::FetchFailed {
                    context: FetchContext::FilterOptions,
                    error: err.clone(),
                });
                Err(err)
            }
        }
    }

    /// Records raw search input. Qualifying input is committed once typing has
    /// paused for the debounce delay; shorter input is only held locally.
    pub async fn input_search(&self, raw: &str) {
        let raw = raw.to_string();
        self.inner.lock().await.search_draft = raw.clone();

        let this = self.this.clone();
        self.search_debounce.schedule(async move {
            let Some(controller) = this.upgrade() else {
                return;
            };
            // The fetch runs detached so a later keystroke cancelling this
            // timer cannot abort a request that was already issued.
            tokio::spawn(async move {
                let _ = controller.commit_search(&raw).await;
            });
        });
    }

    /// Commits a search term immediately, bypassing the debounce. Returns
    /// `None` when the term is too short to be sent.
    pub async fn commit_search(&self, raw: &str) -> Option<Result<FetchOutcome, FetchError>> {
        if !search_qualifies(raw) {
            debug!(draft = raw, "search term held locally");
            self.emit(DashboardEvent::SearchHeld {
                draft: raw.to_string(),
            });
            return None;
        }
        Some(
            self.apply(|state| {
                state.search_draft = raw.trim().to_string();
                state.query.commit_search(raw);
            })
            .await,
        )
    }

    pub async fn set_course(&self, course: Option<CourseId>) -> Result<FetchOutcome, FetchError> {
        self.apply(|state| state.query.set_course(course)).await
    }

    pub async fn set_subject(
        &self,
        subject: Option<SubjectId>,
    ) -> Result<FetchOutcome, FetchError> {
        self.apply(|state| state.query.set_subject(subject)).await
    }

    pub async fn set_page_size(&self, page_size: PageSize) -> Result<FetchOutcome, FetchError> {
        self.apply(|state| state.query.set_page_size(page_size)).await
    }

    pub async fn sort_by(&self, field: SortField) -> Result<FetchOutcome, FetchError> {
        self.apply(|state| state.query.sort_by(field)).await
    }

    pub async fn go_to_page(&self, page: u32) -> Result<FetchOutcome, FetchError> {
        self.apply(|state| {
            let total_pages = state.total_pages();
            state.query.go_to_page(page, total_pages);
        })
        .await
    }

    /// Advances one page. `None` on the last page.
    pub async fn next_page(&self) -> Option<Result<FetchOutcome, FetchError>> {
        let target = {
            let state = self.inner.lock().await;
            let page = state.query.page();
            (page < state.total_pages()).then_some(page + 1)
        }?;
        Some(self.go_to_page(target).await)
    }

    /// Goes back one page. `None` on the first page.
    pub async fn previous_page(&self) -> Option<Result<FetchOutcome, FetchError>> {
        let target = {
            let state = self.inner.lock().await;
            let page = state.query.page();
            (page > 1).then(|| page - 1)
        }?;
        Some(self.go_to_page(target).await)
    }

    pub async fn refresh(&self) -> Result<FetchOutcome, FetchError> {
        self.apply(|_| {}).await
    }

    pub async fn dismiss_error(&self) {
        let had_error = self.inner.lock().await.error.take().is_some();
        if had_error {
            self.emit(DashboardEvent::ErrorDismissed);
        }
    }

    pub async fn snapshot(&self) -> DashboardSnapshot {
        let state = self.inner.lock().await;
        DashboardSnapshot {
            query: state.query.clone(),
            search_draft: state.search_draft.clone(),
            options: state.options.clone(),
            result: state.result.clone(),
            error: state.error.clone(),
            loading: state.in_flight > 0,
        }
    }

    /// Mutates the state and issues a fetch for the result, as one step under
    /// the lock so the sequence number always matches the state it fetches.
    async fn apply<F>(&self, change: F) -> Result<FetchOutcome, FetchError>
    where
        F: FnOnce(&mut ControllerState),
    {
        let (seq, query) = {
            let mut state = self.inner.lock().await;
            change(&mut state);
            state.issued_seq += 1;
            state.in_flight += 1;
            (state.issued_seq, state.query.to_query())
        };

        self.emit(DashboardEvent::Loading);
        debug!(seq, ?query, "fetching performance data");
        let response = self.source.fetch_page(&query).await;

        let mut state = self.inner.lock().await;
        state.in_flight -= 1;
        if seq != state.issued_seq {
            debug!(seq, latest = state.issued_seq, "discarding stale response");
            return Ok(FetchOutcome::Superseded);
        }

        match response {
            Ok(page) => {
                let result = ResultPage::from_fetched(page, query.page_size);
                state.query.sync_page(result.current_page);
                state.result = Some(result.clone());
                state.error = None;
                drop(state);

                debug!(
                    seq,
                    items = result.items.len(),
                    total_items = result.total_items,
                    "applied performance page"
                );
                self.emit(DashboardEvent::ResultsUpdated(result.clone()));
                Ok(FetchOutcome::Applied(result))
            }
            Err(err) => {
                state.error = Some(err.clone());
                drop(state);

                error!(seq, error = %err, "failed to fetch performance data");
                self.emit(DashboardEvent::FetchFailed {
                    context: FetchContext::Data,
                    error: err.clone(),
                });
                Err(err)
            }
        }
    }
}

impl ControllerState {
    fn total_pages(&self) -> u32 {
        self.result
            .as_ref()
            .map(|result| result.total_pages)
            .unwrap_or(0)
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
