use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What the grid widget asks for on each read
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadRequest {
    #[serde(default)]
    pub skip: usize,
    #[serde(default)]
    pub take: Option<usize>,
    #[serde(default)]
    pub requires_counts: bool,
    #[serde(default, rename = "where")]
    pub predicates: Vec<WherePredicate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WherePredicate {
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub value: Option<Value>,
}

impl ReadRequest {
    pub fn counted() -> Self {
        Self {
            requires_counts: true,
            ..Self::default()
        }
    }

    pub fn page(mut self, skip: usize, take: usize) -> Self {
        self.skip = skip;
        self.take = Some(take);
        self
    }

    pub fn with_predicate(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.predicates.push(WherePredicate {
            field: Some(field.into()),
            value: Some(value.into()),
        });
        self
    }

    /// Text of the first predicate; later predicates are ignored
    pub fn first_predicate_text(&self) -> Option<String> {
        let value = self.predicates.first()?.value.as_ref()?;
        match value {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}
