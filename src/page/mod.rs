// Hosting page for one admin grid.
//
// Owns the per-instance state the read adaptors depend on: the filter cell
// and the init barrier. Nothing here is process-wide; every page instance
// (one per grid per session) gets its own.

pub mod session;
pub mod storage;

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::adaptor::{
    normalize_filter, BarrierError, FailurePolicy, FilterCell, FilterSource, GridSource, InitBarrier, ReadOutcome,
    ReadRequest,
};
use crate::admin::AdminGrid;
use crate::api::RemoteFetch;

pub use session::{AccessPolicy, LoginSession, SESSION_STORAGE_KEY};
pub use storage::{FileStore, LocalStore, MemoryStore, StoreError};

#[derive(Debug, Error)]
pub enum PageError {
    #[error("Not logged in")]
    NotLoggedIn,

    #[error("Role '{role}' may not open the {grid} screen")]
    Forbidden { grid: AdminGrid, role: String },

    #[error("Page already initialized: {0}")]
    AlreadyInitialized(#[from] BarrierError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Store an already-normalized filter as the grid's seed. Empty removes it.
pub async fn write_filter_seed(store: &dyn LocalStore, grid: AdminGrid, filter: &str) -> Result<(), StoreError> {
    let key = grid.storage_key();
    if filter.is_empty() {
        store.remove(&key).await
    } else {
        store.set(&key, filter).await
    }
}

/// Normalize raw input and store it as the grid's seed, for callers without a page
pub async fn save_filter_seed(
    store: &dyn LocalStore,
    grid: AdminGrid,
    candidate: Option<&str>,
) -> Result<String, StoreError> {
    let filter = normalize_filter(candidate);
    write_filter_seed(store, grid, &filter).await?;
    Ok(filter)
}

pub struct AdminPage {
    grid: AdminGrid,
    filter: FilterCell,
    barrier: Arc<InitBarrier>,
    grid_source: Box<dyn GridSource>,
    search_source: Box<dyn GridSource>,
}

impl AdminPage {
    pub fn new(grid: AdminGrid, client: Arc<dyn RemoteFetch>, policy: FailurePolicy) -> Self {
        let filter = FilterCell::new();
        let barrier = Arc::new(InitBarrier::new());
        let grid_source = grid.grid_source(client.clone(), barrier.clone(), FilterSource::Page(filter.clone()), policy);
        let search_source = grid.search_source(client, barrier.clone(), policy);

        Self {
            grid,
            filter,
            barrier,
            grid_source,
            search_source,
        }
    }

    pub fn grid(&self) -> AdminGrid {
        self.grid
    }

    pub fn is_initialized(&self) -> bool {
        self.barrier.is_signaled()
    }

    /// Resolve the login, apply the role check, seed the filter from storage,
    /// then release any reads waiting on the barrier.
    ///
    /// On error the barrier stays unset and the caller is expected to
    /// redirect away from the page.
    pub async fn initialize(
        &self,
        store: &dyn LocalStore,
        access: &AccessPolicy,
    ) -> Result<LoginSession, PageError> {
        let session = LoginSession::load(store).await?.ok_or(PageError::NotLoggedIn)?;
        if !access.allows(&session) {
            return Err(PageError::Forbidden {
                grid: self.grid,
                role: session.role.clone(),
            });
        }

        let seed = store.get(&self.grid.storage_key()).await?;
        let filter = self.filter.set(seed.as_deref());

        self.barrier.signal()?;
        tracing::info!(
            "Initialized {} page for {} (filter={:?})",
            self.grid,
            session.user_id,
            filter
        );
        Ok(session)
    }

    /// Text-input change handler
    pub fn set_filter(&self, candidate: Option<&str>) -> String {
        self.filter.set(candidate)
    }

    pub fn filter(&self) -> String {
        self.filter.get()
    }

    /// Set the filter and persist it as this page's seed
    pub async fn persist_filter(&self, store: &dyn LocalStore, candidate: Option<&str>) -> Result<String, StoreError> {
        let value = self.set_filter(candidate);
        write_filter_seed(store, self.grid, &value).await?;
        Ok(value)
    }

    pub async fn read(&self, request: &ReadRequest, key: Option<&str>) -> ReadOutcome<Value> {
        self.grid_source.read_json(request, key).await
    }

    pub async fn suggest(&self, request: &ReadRequest) -> ReadOutcome<Value> {
        let key = self.grid.storage_key();
        self.search_source.read_json(request, Some(&key)).await
    }
}
