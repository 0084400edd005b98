use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use super::error::FetchError;

/// HTTP verbs the backend admin endpoints accept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FetchMethod {
    Get,
    Post,
}

impl fmt::Display for FetchMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchMethod::Get => write!(f, "GET"),
            FetchMethod::Post => write!(f, "POST"),
        }
    }
}

impl FromStr for FetchMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(FetchMethod::Get),
            "POST" => Ok(FetchMethod::Post),
            other => Err(format!("unsupported method: {}", other)),
        }
    }
}

/// One remote call: `{method} {host}/{endpoint}?k=v...` with an optional JSON body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchCall {
    pub endpoint: String,
    pub method: FetchMethod,
    pub parameters: BTreeMap<String, String>,
    pub body: Option<Value>,
}

impl FetchCall {
    pub fn get(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            method: FetchMethod::Get,
            parameters: BTreeMap::new(),
            body: None,
        }
    }

    pub fn post(endpoint: impl Into<String>, body: Option<Value>) -> Self {
        Self {
            endpoint: endpoint.into(),
            method: FetchMethod::Post,
            parameters: BTreeMap::new(),
            body,
        }
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }
}

/// Seam between the read adaptors and the network.
/// Implementations return the raw JSON payload; typing happens in the caller.
#[async_trait]
pub trait RemoteFetch: Send + Sync {
    async fn fetch_value(&self, call: &FetchCall) -> Result<Value, FetchError>;
}

/// Issue a call and deserialize the payload as `T`
pub async fn fetch<T: DeserializeOwned>(
    client: &dyn RemoteFetch,
    call: &FetchCall,
) -> Result<T, FetchError> {
    let value = client.fetch_value(call).await?;
    Ok(serde_json::from_value(value)?)
}

/// reqwest-backed client against the configured API host
#[derive(Debug, Clone)]
pub struct RestClient {
    http: reqwest::Client,
    base: Url,
}

impl RestClient {
    pub fn new(api_host: &str) -> Result<Self, FetchError> {
        Ok(Self {
            http: reqwest::Client::new(),
            base: Self::normalize_base(api_host)?,
        })
    }

    /// Build a client from the global configuration
    pub fn from_config() -> Result<Self, FetchError> {
        Self::new(&crate::config::config().api.host)
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    // Url::join drops the last path segment unless the base ends in '/'
    fn normalize_base(api_host: &str) -> Result<Url, FetchError> {
        let trimmed = api_host.trim();
        if trimmed.is_empty() {
            return Err(FetchError::InvalidUrl("API host is empty".to_string()));
        }
        let with_slash = if trimmed.ends_with('/') {
            trimmed.to_string()
        } else {
            format!("{}/", trimmed)
        };
        Ok(Url::parse(&with_slash)?)
    }

    fn endpoint_url(&self, endpoint: &str) -> Result<Url, FetchError> {
        Ok(self.base.join(endpoint.trim_start_matches('/'))?)
    }
}

#[async_trait]
impl RemoteFetch for RestClient {
    async fn fetch_value(&self, call: &FetchCall) -> Result<Value, FetchError> {
        let url = self.endpoint_url(&call.endpoint)?;

        let mut request = match call.method {
            FetchMethod::Get => self.http.get(url.clone()),
            FetchMethod::Post => self.http.post(url.clone()),
        };
        if !call.parameters.is_empty() {
            request = request.query(&call.parameters);
        }
        if let Some(body) = &call.body {
            request = request.json(body);
        }

        tracing::debug!("{} {} params={:?}", call.method, url, call.parameters);

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }
}
