use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::projection::Projection;
use crate::api::{FetchCall, FetchMethod};

/// Query parameter names used to forward grid paging to the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagingParams {
    pub skip: String,
    pub take: String,
}

/// Everything that distinguishes one admin list endpoint from another
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminEndpoint {
    pub path: String,
    pub method: FetchMethod,
    pub fixed_params: BTreeMap<String, String>,
    pub filter_param: Option<String>,
    pub paging: Option<PagingParams>,
    pub body: Option<Value>,
    pub projection: Projection,
}

impl AdminEndpoint {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method: FetchMethod::Get,
            fixed_params: BTreeMap::new(),
            filter_param: Some("filter".to_string()),
            paging: None,
            body: None,
            projection: Projection::bare(),
        }
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: FetchMethod::Post,
            body: Some(body),
            ..Self::get(path)
        }
    }

    pub fn result_field(mut self, field: impl Into<String>) -> Self {
        self.projection = Projection::named(field);
        self
    }

    pub fn projection(mut self, projection: Projection) -> Self {
        self.projection = projection;
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fixed_params.insert(key.into(), value.into());
        self
    }

    pub fn filter_param(mut self, name: Option<&str>) -> Self {
        self.filter_param = name.map(str::to_string);
        self
    }

    pub fn with_paging(mut self, skip: &str, take: &str) -> Self {
        self.paging = Some(PagingParams {
            skip: skip.to_string(),
            take: take.to_string(),
        });
        self
    }

    /// Build the remote call for one read. An empty filter is still sent.
    pub fn call(&self, filter_text: &str, skip: usize, take: Option<usize>) -> FetchCall {
        let mut parameters = self.fixed_params.clone();
        if let Some(name) = &self.filter_param {
            parameters.insert(name.clone(), filter_text.to_string());
        }
        if let Some(paging) = &self.paging {
            parameters.insert(paging.skip.clone(), skip.to_string());
            if let Some(take) = take {
                parameters.insert(paging.take.clone(), take.to_string());
            }
        }

        FetchCall {
            endpoint: self.path.clone(),
            method: self.method,
            parameters,
            body: self.body.clone(),
        }
    }
}
