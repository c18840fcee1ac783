//! # Parameter Sources
//!
//! A [`ParameterSource`] is the one external capability the binder uses:
//! fetch a batch of parameters by full key path.
//!
//! - [`MemorySource`] - in-process parameters, records requests (tests, local runs)
//! - [`FileSource`] - parameters loaded from a YAML or JSON document
//! - `SsmSource` - AWS Systems Manager Parameter Store (`aws` feature)
//!
//! Sources only return parameters that exist. Missing names are simply
//! absent from the result; the binder turns them into a not-found error.
//! Retries, pagination and caching are the source's business.

mod file;
mod memory;
#[cfg(feature = "aws")]
mod ssm;

pub use file::FileSource;
pub use memory::MemorySource;
#[cfg(feature = "aws")]
pub use ssm::SsmSource;

use anyhow::Result;
use async_trait::async_trait;

use crate::parameter::Parameter;

/// Batch read of parameters by name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetParametersRequest {
    /// Fully-qualified key paths
    pub names: Vec<String>,
    /// Return `SecureString` values decrypted
    pub with_decryption: bool,
}

impl GetParametersRequest {
    /// Request with decryption on, as the binder always issues
    pub fn decrypted(names: Vec<String>) -> Self {
        Self {
            names,
            with_decryption: true,
        }
    }
}

/// Core trait that every parameter backend implements
#[async_trait]
pub trait ParameterSource: Send + Sync {
    /// Short backend name for logs and errors ("memory", "file", "ssm")
    fn name(&self) -> &str;

    /// Fetch the requested parameters
    ///
    /// A backend that cannot honor `with_decryption` must fail the call
    /// rather than hand back ciphertext.
    async fn get_parameters(&self, request: GetParametersRequest) -> Result<Vec<Parameter>>;
}
