use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::FetchError;

/// Shape handed to the grid: a bare list, or a page plus the server-side total.
///
/// `count` is the total number of matching rows, not `result.len()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FetchResult<T> {
    Counted { result: Vec<T>, count: i64 },
    Items(Vec<T>),
}

impl<T> FetchResult<T> {
    pub fn new(records: Vec<T>, count: i64, requires_counts: bool) -> Self {
        if requires_counts {
            FetchResult::Counted {
                result: records,
                count,
            }
        } else {
            FetchResult::Items(records)
        }
    }

    pub fn empty(requires_counts: bool) -> Self {
        Self::new(Vec::new(), 0, requires_counts)
    }

    pub fn records(&self) -> &[T] {
        match self {
            FetchResult::Counted { result, .. } => result,
            FetchResult::Items(items) => items,
        }
    }

    pub fn count(&self) -> Option<i64> {
        match self {
            FetchResult::Counted { count, .. } => Some(*count),
            FetchResult::Items(_) => None,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> FetchResult<U> {
        match self {
            FetchResult::Counted { result, count } => FetchResult::Counted {
                result: result.into_iter().map(f).collect(),
                count,
            },
            FetchResult::Items(items) => FetchResult::Items(items.into_iter().map(f).collect()),
        }
    }
}

/// What to show the grid when a fetch fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// One default-constructed row, count 1
    #[default]
    DefaultRecord,
    /// No rows, count 0
    Empty,
}

impl FailurePolicy {
    pub fn fallback<T: Default>(self, requires_counts: bool) -> FetchResult<T> {
        match self {
            FailurePolicy::DefaultRecord => FetchResult::new(vec![T::default()], 1, requires_counts),
            FailurePolicy::Empty => FetchResult::empty(requires_counts),
        }
    }
}

impl std::str::FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "default_record" | "default-record" | "placeholder" => Ok(FailurePolicy::DefaultRecord),
            "empty" => Ok(FailurePolicy::Empty),
            other => Err(format!("unknown failure policy: {}", other)),
        }
    }
}

/// Result of one adaptor read
#[derive(Debug)]
pub enum ReadOutcome<T> {
    /// Another read holds the gate; the grid should ask again later
    Busy,
    Ready(FetchResult<T>),
    /// The fetch failed and the failure policy supplied `result`
    Degraded { result: FetchResult<T>, error: FetchError },
}

impl<T> ReadOutcome<T> {
    pub fn is_busy(&self) -> bool {
        matches!(self, ReadOutcome::Busy)
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, ReadOutcome::Degraded { .. })
    }

    pub fn result(&self) -> Option<&FetchResult<T>> {
        match self {
            ReadOutcome::Busy => None,
            ReadOutcome::Ready(result) | ReadOutcome::Degraded { result, .. } => Some(result),
        }
    }

    /// Collapse to the grid widget contract, where `None` means "try again"
    pub fn into_grid(self) -> Option<FetchResult<T>> {
        match self {
            ReadOutcome::Busy => None,
            ReadOutcome::Ready(result) | ReadOutcome::Degraded { result, .. } => Some(result),
        }
    }

    pub fn map_records<U>(self, f: impl FnMut(T) -> U) -> ReadOutcome<U> {
        match self {
            ReadOutcome::Busy => ReadOutcome::Busy,
            ReadOutcome::Ready(result) => ReadOutcome::Ready(result.map(f)),
            ReadOutcome::Degraded { result, error } => ReadOutcome::Degraded {
                result: result.map(f),
                error,
            },
        }
    }
}

impl<T: Serialize> ReadOutcome<T> {
    pub fn into_json(self) -> ReadOutcome<Value> {
        self.map_records(record_to_json)
    }
}

// A record that cannot be represented as JSON becomes a null row; the grid
// keeps its row count and the failure is logged.
fn record_to_json<T: Serialize>(record: T) -> Value {
    match serde_json::to_value(record) {
        Ok(value) => value,
        Err(e) => {
            tracing::error!("Failed to serialize grid record: {}", e);
            Value::Null
        }
    }
}
