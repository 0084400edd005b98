//! Row types for the admin grids.
//!
//! Wire names are PascalCase like the backend's. Every struct is `Default`
//! (the failure placeholder row) and keeps unknown columns in `extra` so the
//! grid still sees them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct StateRecord {
    #[serde(rename = "ID")]
    pub id: i32,
    pub code: String,
    pub name: String,
    pub country: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct SkillRecord {
    #[serde(rename = "ID")]
    pub id: i32,
    pub name: String,
    pub category: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct RoleRecord {
    #[serde(rename = "ID")]
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct UserRecord {
    #[serde(rename = "UserID")]
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: String,
    pub status: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct StatusCodeRecord {
    #[serde(rename = "ID")]
    pub id: i32,
    pub code: String,
    pub status: String,
    pub applies_to: String,
    pub description: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Shared shape of the simple code/name lookup tables
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct LookupRecord {
    #[serde(rename = "ID")]
    pub id: i32,
    pub name: String,
    pub description: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
