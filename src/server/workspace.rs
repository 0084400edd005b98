use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::adaptor::FailurePolicy;
use crate::admin::AdminGrid;
use crate::api::RemoteFetch;
use crate::page::{AccessPolicy, AdminPage, LocalStore, LoginSession, MemoryStore, PageError};

/// Every admin page for one signed-in session, plus that session's storage
pub struct Workspace {
    session: LoginSession,
    store: MemoryStore,
    pages: BTreeMap<AdminGrid, AdminPage>,
    last_access: Mutex<Instant>,
}

impl Workspace {
    /// Create and initialize all pages. Fails on the first page that refuses.
    pub async fn open(
        client: Arc<dyn RemoteFetch>,
        policy: FailurePolicy,
        access: &AccessPolicy,
        session: LoginSession,
        filters: &BTreeMap<AdminGrid, String>,
    ) -> Result<Self, PageError> {
        let store = MemoryStore::new();
        session.save(&store).await?;
        for (grid, seed) in filters {
            store.set(&grid.storage_key(), seed).await?;
        }

        let mut pages = BTreeMap::new();
        for grid in AdminGrid::ALL {
            let page = AdminPage::new(grid, client.clone(), policy);
            page.initialize(&store, access).await?;
            pages.insert(grid, page);
        }

        Ok(Self {
            session,
            store,
            pages,
            last_access: Mutex::new(Instant::now()),
        })
    }

    pub fn session(&self) -> &LoginSession {
        &self.session
    }

    pub fn store(&self) -> &dyn LocalStore {
        &self.store
    }

    pub fn page(&self, grid: AdminGrid) -> Option<&AdminPage> {
        self.pages.get(&grid)
    }

    /// Mark the workspace as used now
    pub fn touch(&self) {
        let mut last = match self.last_access.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *last = Instant::now();
    }

    pub fn idle_for(&self) -> Duration {
        let last = match self.last_access.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        };
        last.elapsed()
    }

    pub fn is_expired(&self, idle_timeout: Duration) -> bool {
        self.idle_for() > idle_timeout
    }
}
