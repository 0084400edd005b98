use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::storage::{LocalStore, StoreError};

/// Fixed local-storage key of the persisted login
pub const SESSION_STORAGE_KEY: &str = "LoginCookie";

/// The logged-in user as persisted by the login screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LoginSession {
    #[serde(rename = "UserID")]
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub role: String,
    pub logged_in_at: DateTime<Utc>,
}

impl LoginSession {
    pub fn new(user_id: impl Into<String>, name: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            name: name.into(),
            email: String::new(),
            role: role.into(),
            logged_in_at: Utc::now(),
        }
    }

    /// Read the persisted login. An unreadable value counts as logged out.
    pub async fn load(store: &dyn LocalStore) -> Result<Option<Self>, StoreError> {
        let Some(raw) = store.get(SESSION_STORAGE_KEY).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                tracing::warn!("Discarding unreadable login session: {}", e);
                Ok(None)
            }
        }
    }

    pub async fn save(&self, store: &dyn LocalStore) -> Result<(), StoreError> {
        let raw = serde_json::to_string(self)?;
        store.set(SESSION_STORAGE_KEY, &raw).await
    }

    pub async fn clear(store: &dyn LocalStore) -> Result<(), StoreError> {
        store.remove(SESSION_STORAGE_KEY).await
    }
}

/// Mechanical role check for the admin screens
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPolicy {
    admin_roles: Vec<String>,
}

impl AccessPolicy {
    pub fn new(admin_roles: Vec<String>) -> Self {
        Self { admin_roles }
    }

    pub fn from_config() -> Self {
        Self::new(crate::config::config().session.admin_roles.clone())
    }

    pub fn allows(&self, session: &LoginSession) -> bool {
        let role = session.role.trim();
        self.admin_roles.iter().any(|r| r.eq_ignore_ascii_case(role))
    }
}
