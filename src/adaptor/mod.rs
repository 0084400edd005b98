// Single-flight paged read adaptor.
//
// One instance per grid. A read takes the gate (or reports Busy), waits for
// the hosting page to finish initializing, fetches, and projects the payload
// into what the grid expects. Fetch failures are answered by the configured
// FailurePolicy instead of being propagated.

pub mod barrier;
pub mod endpoint;
pub mod filter;
pub mod gate;
pub mod projection;
pub mod request;
pub mod result;

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::api::{FetchError, RemoteFetch};

pub use barrier::{BarrierError, InitBarrier};
pub use endpoint::{AdminEndpoint, PagingParams};
pub use filter::{filter_set, normalize_filter, FilterCell};
pub use gate::{GateEntry, GatePermit, SingleFlightGate};
pub use projection::Projection;
pub use request::{ReadRequest, WherePredicate};
pub use result::{FailurePolicy, FetchResult, ReadOutcome};

/// Where a read gets its filter text
#[derive(Debug, Clone)]
pub enum FilterSource {
    /// The hosting page's filter cell (grid reads)
    Page(FilterCell),
    /// The first `where` predicate of the request (autocomplete reads)
    FirstPredicate,
}

impl FilterSource {
    fn text(&self, request: &ReadRequest) -> String {
        match self {
            FilterSource::Page(cell) => cell.get(),
            FilterSource::FirstPredicate => normalize_filter(request.first_predicate_text().as_deref()),
        }
    }
}

pub struct PagedAdaptor<T> {
    endpoint: AdminEndpoint,
    client: Arc<dyn RemoteFetch>,
    gate: SingleFlightGate,
    barrier: Arc<InitBarrier>,
    filter: FilterSource,
    policy: FailurePolicy,
    _record: PhantomData<fn() -> T>,
}

impl<T> PagedAdaptor<T>
where
    T: DeserializeOwned + Default + Send,
{
    pub fn new(
        endpoint: AdminEndpoint,
        client: Arc<dyn RemoteFetch>,
        barrier: Arc<InitBarrier>,
        filter: FilterSource,
    ) -> Self {
        Self {
            endpoint,
            client,
            gate: SingleFlightGate::new(),
            barrier,
            filter,
            policy: FailurePolicy::default(),
            _record: PhantomData,
        }
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn endpoint(&self) -> &AdminEndpoint {
        &self.endpoint
    }

    pub fn is_fetching(&self) -> bool {
        self.gate.is_held()
    }

    /// Read one page for the grid. `key` is the widget's opaque datasource key.
    pub async fn read(&self, request: &ReadRequest, key: Option<&str>) -> ReadOutcome<T> {
        let _permit = match self.gate.try_enter() {
            GateEntry::Entered(permit) => permit,
            GateEntry::Busy => {
                tracing::debug!("read skipped, {} already in flight (key={:?})", self.endpoint.path, key);
                return ReadOutcome::Busy;
            }
        };

        self.barrier.wait().await;

        let filter_text = self.filter.text(request);
        match self.fetch_page(request, &filter_text).await {
            Ok((records, count)) => {
                if crate::config::config().grid.log_reads {
                    tracing::debug!(
                        "read {} filter={:?} -> {} records (count={})",
                        self.endpoint.path,
                        filter_text,
                        records.len(),
                        count
                    );
                }
                ReadOutcome::Ready(FetchResult::new(records, count, request.requires_counts))
            }
            Err(error) => {
                tracing::warn!(
                    "read {} failed ({}), answering with {:?}: {}",
                    self.endpoint.path,
                    error.error_code(),
                    self.policy,
                    error
                );
                ReadOutcome::Degraded {
                    result: self.policy.fallback(request.requires_counts),
                    error,
                }
            }
        }
    }

    async fn fetch_page(&self, request: &ReadRequest, filter_text: &str) -> Result<(Vec<T>, i64), FetchError> {
        let call = self.endpoint.call(filter_text, request.skip, request.take);
        let payload = self.client.fetch_value(&call).await?;
        self.endpoint.projection.project(payload)
    }
}

/// Type-erased grid datasource, so one handler can serve every admin grid
#[async_trait]
pub trait GridSource: Send + Sync {
    fn endpoint(&self) -> &AdminEndpoint;

    async fn read_json(&self, request: &ReadRequest, key: Option<&str>) -> ReadOutcome<Value>;
}

#[async_trait]
impl<T> GridSource for PagedAdaptor<T>
where
    T: DeserializeOwned + Serialize + Default + Send + Sync + 'static,
{
    fn endpoint(&self) -> &AdminEndpoint {
        PagedAdaptor::endpoint(self)
    }

    async fn read_json(&self, request: &ReadRequest, key: Option<&str>) -> ReadOutcome<Value> {
        self.read(request, key).await.into_json()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::FetchCall;
    use serde::Deserialize;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::sync::Notify;

    #[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
    struct StateRow {
        #[serde(rename = "ID")]
        id: i32,
        #[serde(rename = "Name")]
        name: String,
    }

    /// Answers with a fixed payload; optionally parks until released
    struct ScriptedFetch {
        payload: Result<Value, fn() -> FetchError>,
        hold: bool,
        started: Notify,
        release: Notify,
        calls: AtomicUsize,
        last_call: Mutex<Option<FetchCall>>,
    }

    impl ScriptedFetch {
        fn ok(payload: Value) -> Arc<Self> {
            Arc::new(Self::build(Ok(payload), false))
        }

        fn held(payload: Value) -> Arc<Self> {
            Arc::new(Self::build(Ok(payload), true))
        }

        fn failing(error: fn() -> FetchError) -> Arc<Self> {
            Arc::new(Self::build(Err(error), false))
        }

        fn build(payload: Result<Value, fn() -> FetchError>, hold: bool) -> Self {
            Self {
                payload,
                hold,
                started: Notify::new(),
                release: Notify::new(),
                calls: AtomicUsize::new(0),
                last_call: Mutex::new(None),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RemoteFetch for ScriptedFetch {
        async fn fetch_value(&self, call: &FetchCall) -> Result<Value, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_call.lock().unwrap() = Some(call.clone());
            self.started.notify_one();
            if self.hold {
                self.release.notified().await;
            }
            match &self.payload {
                Ok(value) => Ok(value.clone()),
                Err(make) => Err(make()),
            }
        }
    }

    fn states_payload() -> Value {
        json!({ "States": "[{\"ID\":1,\"Name\":\"NY\"}]", "Count": 1 })
    }

    fn ready_barrier() -> Arc<InitBarrier> {
        let barrier = Arc::new(InitBarrier::new());
        barrier.signal().unwrap();
        barrier
    }

    fn states_adaptor(fetch: Arc<ScriptedFetch>, barrier: Arc<InitBarrier>, filter: FilterCell) -> PagedAdaptor<StateRow> {
        PagedAdaptor::new(
            AdminEndpoint::get("Admin/GetStates").result_field("States"),
            fetch,
            barrier,
            FilterSource::Page(filter),
        )
    }

    #[tokio::test]
    async fn counted_read_projects_records_and_total() {
        let fetch = ScriptedFetch::ok(states_payload());
        let adaptor = states_adaptor(fetch.clone(), ready_barrier(), FilterCell::new());

        let outcome = adaptor.read(&ReadRequest::counted(), None).await;
        match outcome {
            ReadOutcome::Ready(FetchResult::Counted { result, count }) => {
                assert_eq!(result, vec![StateRow { id: 1, name: "NY".to_string() }]);
                assert_eq!(count, 1);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }

        let call = fetch.last_call.lock().unwrap().clone().unwrap();
        assert_eq!(call.parameters["filter"], "");
    }

    #[tokio::test]
    async fn page_filter_flows_into_parameters() {
        let fetch = ScriptedFetch::ok(states_payload());
        let filter = FilterCell::seeded(Some("\"New\""));
        let adaptor = states_adaptor(fetch.clone(), ready_barrier(), filter.clone());

        adaptor.read(&ReadRequest::default(), None).await;
        assert_eq!(fetch.last_call.lock().unwrap().as_ref().unwrap().parameters["filter"], "New");

        filter.set(Some("Jersey"));
        adaptor.read(&ReadRequest::default(), None).await;
        assert_eq!(fetch.last_call.lock().unwrap().as_ref().unwrap().parameters["filter"], "Jersey");
    }

    #[tokio::test]
    async fn overlapping_read_is_refused_without_waiting() {
        let fetch = ScriptedFetch::held(states_payload());
        let adaptor = Arc::new(states_adaptor(fetch.clone(), ready_barrier(), FilterCell::new()));

        let first = {
            let adaptor = adaptor.clone();
            tokio::spawn(async move { adaptor.read(&ReadRequest::counted(), None).await })
        };
        fetch.started.notified().await;
        assert!(adaptor.is_fetching());

        let second = tokio::time::timeout(Duration::from_millis(50), adaptor.read(&ReadRequest::counted(), None))
            .await
            .expect("busy read must return immediately");
        assert!(second.is_busy());
        assert_eq!(fetch.calls(), 1);

        fetch.release.notify_one();
        let first = first.await.unwrap();
        assert!(matches!(first, ReadOutcome::Ready(_)));
        assert!(!adaptor.is_fetching());
    }

    #[tokio::test]
    async fn failed_fetch_releases_gate_and_degrades() {
        let fetch = ScriptedFetch::failing(|| FetchError::Timeout("operation timed out".to_string()));
        let adaptor = states_adaptor(fetch.clone(), ready_barrier(), FilterCell::new());

        let bare = adaptor.read(&ReadRequest::default(), None).await;
        match bare {
            ReadOutcome::Degraded { result, error } => {
                assert_eq!(result, FetchResult::Items(vec![StateRow::default()]));
                assert!(matches!(error, FetchError::Timeout(_)));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }

        // gate is free again
        let counted = adaptor.read(&ReadRequest::counted(), None).await;
        assert_eq!(
            counted.into_grid(),
            Some(FetchResult::Counted { result: vec![StateRow::default()], count: 1 })
        );
        assert_eq!(fetch.calls(), 2);
    }

    #[tokio::test]
    async fn missing_field_uses_policy_and_null_payload_does_not() {
        let missing = ScriptedFetch::ok(json!({ "Count": 3 }));
        let adaptor = states_adaptor(missing, ready_barrier(), FilterCell::new()).with_policy(FailurePolicy::Empty);
        let outcome = adaptor.read(&ReadRequest::counted(), None).await;
        assert!(outcome.is_degraded());
        assert_eq!(outcome.result().and_then(FetchResult::count), Some(0));

        let null = ScriptedFetch::ok(Value::Null);
        let adaptor = states_adaptor(null, ready_barrier(), FilterCell::new());
        let outcome = adaptor.read(&ReadRequest::counted(), None).await;
        assert!(matches!(outcome, ReadOutcome::Ready(FetchResult::Counted { ref result, count: 0 }) if result.is_empty()));
    }

    #[tokio::test]
    async fn no_fetch_before_barrier_signal() {
        let fetch = ScriptedFetch::ok(states_payload());
        let barrier = Arc::new(InitBarrier::new());
        let adaptor = Arc::new(states_adaptor(fetch.clone(), barrier.clone(), FilterCell::new()));

        let pending = {
            let adaptor = adaptor.clone();
            tokio::spawn(async move { adaptor.read(&ReadRequest::counted(), None).await })
        };

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(fetch.calls(), 0);
        assert!(!pending.is_finished());
        // the waiting read holds the gate
        assert!(adaptor.read(&ReadRequest::counted(), None).await.is_busy());

        barrier.signal().unwrap();
        let outcome = tokio::time::timeout(Duration::from_secs(1), pending).await.unwrap().unwrap();
        assert!(matches!(outcome, ReadOutcome::Ready(_)));
        assert_eq!(fetch.calls(), 1);
    }

    #[tokio::test]
    async fn autocomplete_reads_first_predicate() {
        let fetch = ScriptedFetch::ok(json!(["New York", "New Jersey"]));
        let adaptor: PagedAdaptor<String> = PagedAdaptor::new(
            AdminEndpoint::get("Admin/SearchState"),
            fetch.clone(),
            ready_barrier(),
            FilterSource::FirstPredicate,
        );

        let request = ReadRequest::default()
            .with_predicate("State", "New")
            .with_predicate("Code", "ignored");
        let outcome = adaptor.read(&request, Some("autoState")).await;
        assert_eq!(
            outcome.into_grid(),
            Some(FetchResult::Items(vec!["New York".to_string(), "New Jersey".to_string()]))
        );
        assert_eq!(fetch.last_call.lock().unwrap().as_ref().unwrap().parameters["filter"], "New");
    }

    #[tokio::test]
    async fn grid_source_yields_json_records() {
        let fetch = ScriptedFetch::ok(states_payload());
        let source: Box<dyn GridSource> = Box::new(states_adaptor(fetch, ready_barrier(), FilterCell::new()));
        assert_eq!(source.endpoint().path, "Admin/GetStates");

        let outcome = source.read_json(&ReadRequest::counted(), None).await;
        let grid = serde_json::to_value(outcome.into_grid().unwrap()).unwrap();
        assert_eq!(grid, json!({ "result": [{ "ID": 1, "Name": "NY" }], "count": 1 }));
    }
}
