use async_trait::async_trait;
use shared::{
    domain::PageSize,
    protocol::{PaginationMeta, PerformanceQuery},
};

pub mod controller;
pub mod debounce;
pub mod endpoint;
pub mod error;
pub mod filters;
pub mod query;
pub mod records;
pub mod view;

pub use controller::{ControllerOptions, DashboardSnapshot, FetchOutcome, QueryController};
pub use endpoint::{ApiSession, EndpointResolver, ResolverOptions};
pub use error::{ConnectivityError, FetchError};
pub use filters::FilterOptions;
pub use query::QueryState;
pub use records::PerformanceRecord;

/// One page of normalized records plus the backend's pagination metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub records: Vec<PerformanceRecord>,
    pub pagination: PaginationMeta,
}

/// Where performance data comes from. [`ApiSession`] is the HTTP
/// implementation bound to the resolved endpoint.
#[async_trait]
pub trait PerformanceSource: Send + Sync {
    async fn fetch_page(&self, query: &PerformanceQuery) -> Result<FetchedPage, FetchError>;
    async fn fetch_sample(&self, sample_size: u32) -> Result<Vec<PerformanceRecord>, FetchError>;
}

/// The data currently on screen. Replaced wholesale by every applied fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultPage {
    pub items: Vec<PerformanceRecord>,
    pub total_items: u64,
    pub total_pages: u32,
    pub current_page: u32,
    /// Page size the request was issued with.
    pub page_size: PageSize,
}

impl ResultPage {
    pub fn from_fetched(page: FetchedPage, page_size: PageSize) -> Self {
        Self {
            items: page.records,
            total_items: page.pagination.total_items,
            total_pages: page.pagination.total_pages,
            current_page: page.pagination.current_page.max(1),
            page_size,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn page_info(&self) -> view::PageInfo {
        view::page_info(self.current_page, self.page_size.get(), self.total_items)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchContext {
    FilterOptions,
    Data,
}

#[derive(Debug, Clone)]
pub enum DashboardEvent {
    FilterOptionsLoaded(FilterOptions),
    Loading,
    ResultsUpdated(ResultPage),
    FetchFailed {
        context: FetchContext,
        error: FetchError,
    },
    /// A one or two character search term is held locally and not queried.
    SearchHeld {
        draft: String,
    },
    ErrorDismissed,
}
