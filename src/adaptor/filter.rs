use std::sync::{Arc, RwLock};

/// Normalize raw filter input from a text box or persisted seed.
///
/// Null, blank, and the literal `"null"` all mean "no filter". Otherwise one
/// leading and one trailing double quote are stripped (seeds are persisted as
/// JSON strings).
pub fn normalize_filter(candidate: Option<&str>) -> String {
    let value = match candidate {
        Some(v) if !v.trim().is_empty() && v != "null" => v,
        _ => return String::new(),
    };

    let value = value.strip_prefix('"').unwrap_or(value);
    let value = value.strip_suffix('"').unwrap_or(value);
    value.to_string()
}

/// Two-argument form used by the change handlers. The previous value never
/// influences the result.
pub fn filter_set(_current: &str, candidate: Option<&str>) -> String {
    normalize_filter(candidate)
}

/// Per-page filter text shared between the change handler and the read path
#[derive(Debug, Clone, Default)]
pub struct FilterCell {
    value: Arc<RwLock<String>>,
}

impl FilterCell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded(candidate: Option<&str>) -> Self {
        let cell = Self::new();
        cell.set(candidate);
        cell
    }

    /// Snapshot of the current filter text
    pub fn get(&self) -> String {
        match self.value.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Overwrite with the normalized candidate and return the stored value
    pub fn set(&self, candidate: Option<&str>) -> String {
        let mut guard = match self.value.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let next = filter_set(&guard, candidate);
        *guard = next.clone();
        next
    }
}
