use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

use crate::adaptor::FailurePolicy;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub api: ApiConfig,
    pub grid: GridConfig,
    pub session: SessionConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

/// Backend REST API the adaptors read from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub host: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridConfig {
    pub failure_policy: FailurePolicy,
    pub log_reads: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub admin_roles: Vec<String>,
    /// Seconds a workspace may sit unused before it is evicted
    pub idle_timeout_secs: u64,
}

impl SessionConfig {
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = env::var("APPTRACK_API_HOST") {
            if !v.trim().is_empty() {
                self.api.host = v.trim().to_string();
            }
        }

        if let Ok(v) = env::var("GRID_FAILURE_POLICY") {
            match v.parse() {
                Ok(policy) => self.grid.failure_policy = policy,
                Err(e) => tracing::warn!("Ignoring GRID_FAILURE_POLICY: {}", e),
            }
        }
        if let Ok(v) = env::var("GRID_LOG_READS") {
            self.grid.log_reads = v.parse().unwrap_or(self.grid.log_reads);
        }

        if let Ok(v) = env::var("SESSION_ADMIN_ROLES") {
            self.session.admin_roles = split_list(&v);
        }
        if let Ok(v) = env::var("SESSION_IDLE_TIMEOUT_SECS") {
            self.session.idle_timeout_secs = v.parse().unwrap_or(self.session.idle_timeout_secs);
        }

        if let Ok(v) = env::var("SERVER_PORT") {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.server.enable_cors = v.parse().unwrap_or(self.server.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.server.cors_origins = split_list(&v);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            api: ApiConfig {
                host: "http://localhost:5000/api".to_string(),
            },
            grid: GridConfig {
                failure_policy: FailurePolicy::DefaultRecord,
                log_reads: true,
            },
            session: SessionConfig {
                admin_roles: vec!["AD".to_string(), "Administrator".to_string()],
                idle_timeout_secs: 8 * 60 * 60,
            },
            server: ServerConfig {
                port: 3000,
                enable_cors: true,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            api: ApiConfig {
                host: "https://staging-api.apptrack.local/api".to_string(),
            },
            grid: GridConfig {
                failure_policy: FailurePolicy::DefaultRecord,
                log_reads: true,
            },
            session: SessionConfig {
                admin_roles: vec!["AD".to_string()],
                idle_timeout_secs: 30 * 60,
            },
            server: ServerConfig {
                port: 8080,
                enable_cors: true,
                cors_origins: vec!["https://staging.apptrack.local".to_string()],
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            api: ApiConfig {
                host: "https://api.apptrack.local/api".to_string(),
            },
            grid: GridConfig {
                failure_policy: FailurePolicy::DefaultRecord,
                log_reads: false,
            },
            session: SessionConfig {
                admin_roles: vec!["AD".to_string()],
                idle_timeout_secs: 30 * 60,
            },
            server: ServerConfig {
                port: 8080,
                enable_cors: false,
                cors_origins: Vec::new(),
            },
        }
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[macro_export]
macro_rules! is_development {
    () => {
        matches!($crate::config::CONFIG.environment, $crate::config::Environment::Development)
    };
}
