//! In-memory source for tests and local runs
//!
//! Answers from a fixed set of parameters without any I/O.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use parking_lot::Mutex;

use super::{GetParametersRequest, ParameterSource};
use crate::parameter::{Parameter, ParameterKind};

/// Returned for `SecureString` values when decryption was not requested
pub const ENCRYPTED_PLACEHOLDER: &str = "<ENCRYPTED>";

/// Source that serves predefined parameters
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    /// Stored parameters
    params: Vec<Parameter>,
    /// Fail every request with this message
    failure: Option<String>,
    /// Track all requests made (for assertions)
    requests: Arc<Mutex<Vec<GetParametersRequest>>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_params(params: impl IntoIterator<Item = Parameter>) -> Self {
        Self {
            params: params.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Add a parameter, replacing any with the same name
    pub fn insert(mut self, param: Parameter) -> Self {
        self.params.retain(|p| p.name != param.name);
        self.params.push(param);
        self
    }

    /// Make every request fail
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    pub fn params(&self) -> &[Parameter] {
        &self.params
    }

    /// Get all requests made to this source
    pub fn requests(&self) -> Vec<GetParametersRequest> {
        self.requests.lock().clone()
    }

    /// Get the last request made
    pub fn last_request(&self) -> Option<GetParametersRequest> {
        self.requests.lock().last().cloned()
    }

    /// Answer a request from `params`, in request order
    pub(crate) fn answer(params: &[Parameter], request: &GetParametersRequest) -> Vec<Parameter> {
        request
            .names
            .iter()
            .filter_map(|name| params.iter().find(|p| &p.name == name))
            .map(|p| {
                let mut p = p.clone();
                if p.kind == ParameterKind::SecureString && !request.with_decryption {
                    p.value = ENCRYPTED_PLACEHOLDER.to_string();
                }
                p
            })
            .collect()
    }
}

#[async_trait]
impl ParameterSource for MemorySource {
    fn name(&self) -> &str {
        "memory"
    }

    async fn get_parameters(&self, request: GetParametersRequest) -> Result<Vec<Parameter>> {
        self.requests.lock().push(request.clone());

        if let Some(message) = &self.failure {
            return Err(anyhow!("{}", message));
        }
        Ok(Self::answer(&self.params, &request))
    }
}
