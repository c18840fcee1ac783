//! AWS Systems Manager Parameter Store source (`aws` feature)
//!
//! Uses the standard AWS SDK credential chain (environment, profile, IMDS,
//! ECS task role). When no client is supplied, one is built from the
//! default configuration on first use.
//!
//! `GetParameters` accepts at most ten names, so larger requests are sent
//! as consecutive calls and their results concatenated.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use aws_sdk_ssm::error::DisplayErrorContext;
use aws_sdk_ssm::types::ParameterType;
use aws_sdk_ssm::Client;
use tokio::sync::OnceCell;
use tracing::debug;

use super::{GetParametersRequest, ParameterSource};
use crate::parameter::{Parameter, ParameterKind};

/// Service limit on names per `GetParameters` call
pub const MAX_NAMES_PER_CALL: usize = 10;

/// Parameter Store backed source
#[derive(Debug, Default)]
pub struct SsmSource {
    client: OnceCell<Client>,
}

impl SsmSource {
    /// Use an explicitly configured client
    pub fn new(client: Client) -> Self {
        Self {
            client: OnceCell::new_with(Some(client)),
        }
    }

    /// Build the client lazily from the default AWS configuration
    pub fn from_env() -> Self {
        Self::default()
    }

    async fn client(&self) -> &Client {
        self.client
            .get_or_init(|| async {
                debug!("loading default AWS configuration for SSM");
                let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
                Client::new(&config)
            })
            .await
    }
}

fn parameter_kind(ty: Option<&ParameterType>) -> Result<ParameterKind> {
    match ty {
        Some(ParameterType::String) => Ok(ParameterKind::String),
        Some(ParameterType::SecureString) => Ok(ParameterKind::SecureString),
        Some(ParameterType::StringList) => Ok(ParameterKind::StringList),
        Some(other) => Err(anyhow!("unknown parameter type {}", other.as_str())),
        None => Err(anyhow!("parameter without type")),
    }
}

#[async_trait]
impl ParameterSource for SsmSource {
    fn name(&self) -> &str {
        "ssm"
    }

    async fn get_parameters(&self, request: GetParametersRequest) -> Result<Vec<Parameter>> {
        let client = self.client().await;
        let mut params = Vec::with_capacity(request.names.len());

        for names in batches(&request.names) {
            debug!(names = names.len(), "GetParameters");
            let output = client
                .get_parameters()
                .set_names(Some(names.to_vec()))
                .with_decryption(request.with_decryption)
                .send()
                .await
                .map_err(|e| anyhow!("GetParameters: {}", DisplayErrorContext(&e)))?;

            for p in output.parameters() {
                params.push(to_parameter(p)?);
            }
        }

        Ok(params)
    }
}

/// Split a request into calls the service accepts
fn batches(names: &[String]) -> impl Iterator<Item = &[String]> {
    names.chunks(MAX_NAMES_PER_CALL)
}

fn to_parameter(p: &aws_sdk_ssm::types::Parameter) -> Result<Parameter> {
    let name = p.name().context("parameter without name")?;
    let kind = parameter_kind(p.r#type()).with_context(|| name.to_string())?;
    Ok(Parameter::new(name, kind, p.value().unwrap_or_default()))
}
