pub mod workspace;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::HeaderValue,
    routing::{get, post, put},
    Router,
};
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use uuid::Uuid;

use crate::adaptor::FailurePolicy;
use crate::api::RemoteFetch;
use crate::handlers;
use crate::page::AccessPolicy;

pub use workspace::Workspace;

/// Shared service state. Workspaces are keyed by session id so no filter or
/// barrier state is ever shared between users.
#[derive(Clone)]
pub struct AppState {
    pub client: Arc<dyn RemoteFetch>,
    pub access: AccessPolicy,
    pub policy: FailurePolicy,
    idle_timeout: Duration,
    sessions: Arc<RwLock<HashMap<Uuid, Arc<Workspace>>>>,
}

impl AppState {
    pub fn new(client: Arc<dyn RemoteFetch>, access: AccessPolicy, policy: FailurePolicy) -> Self {
        Self {
            client,
            access,
            policy,
            idle_timeout: crate::config::config().session.idle_timeout(),
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    pub fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }

    pub fn from_config(client: Arc<dyn RemoteFetch>) -> Self {
        Self::new(
            client,
            AccessPolicy::from_config(),
            crate::config::config().grid.failure_policy,
        )
    }

    /// Register a new workspace, evicting idle ones first
    pub async fn insert_workspace(&self, workspace: Workspace) -> Uuid {
        let id = Uuid::new_v4();
        let mut sessions = self.sessions.write().await;
        self.retain_active(&mut sessions);
        sessions.insert(id, Arc::new(workspace));
        id
    }

    /// Look up a live workspace and refresh its last access. An idle one is
    /// dropped and reported as missing.
    pub async fn workspace(&self, id: &Uuid) -> Option<Arc<Workspace>> {
        let workspace = self.sessions.read().await.get(id).cloned()?;
        if workspace.is_expired(self.idle_timeout) {
            let mut sessions = self.sessions.write().await;
            if sessions.get(id).is_some_and(|w| w.is_expired(self.idle_timeout)) {
                sessions.remove(id);
                tracing::info!("Session {} expired after {:?} idle", id, workspace.idle_for());
            }
            return None;
        }
        workspace.touch();
        Some(workspace)
    }

    /// Drop every workspace idle for longer than the timeout
    pub async fn evict_idle(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        self.retain_active(&mut sessions)
    }

    fn retain_active(&self, sessions: &mut HashMap<Uuid, Arc<Workspace>>) -> usize {
        let before = sessions.len();
        sessions.retain(|_, workspace| !workspace.is_expired(self.idle_timeout));
        let evicted = before - sessions.len();
        if evicted > 0 {
            tracing::info!("Evicted {} idle session(s)", evicted);
        }
        evicted
    }

    /// Background sweep so abandoned sessions go away without new traffic
    pub fn spawn_idle_sweep(&self) -> tokio::task::JoinHandle<()> {
        let state = self.clone();
        let period = (self.idle_timeout / 2).max(Duration::from_secs(1));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                state.evict_idle().await;
            }
        })
    }

    pub async fn remove_workspace(&self, id: &Uuid) -> Option<Arc<Workspace>> {
        self.sessions.write().await.remove(id)
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

pub fn app(state: AppState) -> Router {
    let router = Router::new()
        // Public
        .route("/", get(handlers::public::root))
        .route("/health", get(handlers::public::health))
        // Session lifecycle
        .route(
            "/api/session",
            post(handlers::session::session_open).delete(handlers::session::session_close),
        )
        // Grid datasource
        .route("/api/grid/:grid/read", post(handlers::grid::grid_read))
        .route("/api/grid/:grid/suggest", post(handlers::grid::grid_suggest))
        .route("/api/grid/:grid/filter", put(handlers::grid::grid_filter))
        .with_state(state);

    let router = router.layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()));

    if crate::config::config().server.enable_cors {
        router.layer(cors_layer(&crate::config::config().server.cors_origins))
    } else {
        router
    }
}

// No configured origins means any origin
fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    if origins.is_empty() {
        return CorsLayer::permissive();
    }
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}
