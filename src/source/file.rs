//! File-backed source
//!
//! Reads a YAML (or JSON) document mapping key paths to values:
//!
//! ```yaml
//! /dev/db/user: alice                                  # String
//! /dev/db/port: 5432                                   # String "5432"
//! /dev/db/version: "1.10"                              # String, quoted
//! /dev/db/hosts: [db1, db2]                            # StringList
//! /dev/db/shards: [1, 2, 3]                            # StringList "1,2,3"
//! /dev/db/password: { type: SecureString, value: pw }  # explicit kind
//! ```
//!
//! Parameter values are text. Decimal integers are taken as written;
//! unquoted floats and booleans are rejected because the parser would not
//! keep their spelling (`1.10` reads back as `1.1`). Quote them.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;

use super::{GetParametersRequest, MemorySource, ParameterSource};
use crate::parameter::{Parameter, ParameterKind};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Int(i64),
    Uint(u64),
    Float(f64),
    Bool(bool),
}

impl Scalar {
    fn into_text(self, name: &str) -> Result<String> {
        match self {
            Scalar::Text(text) => Ok(text),
            Scalar::Int(value) => Ok(value.to_string()),
            Scalar::Uint(value) => Ok(value.to_string()),
            Scalar::Float(value) => {
                bail!("{}: unquoted number {} would lose its spelling; quote it", name, value)
            }
            Scalar::Bool(value) => {
                bail!("{}: unquoted boolean {} would lose its spelling; quote it", name, value)
            }
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FileValue {
    Scalar(Scalar),
    List(Vec<Scalar>),
    Typed {
        #[serde(rename = "type")]
        kind: ParameterKind,
        value: String,
    },
}

impl FileValue {
    fn into_parameter(self, name: String) -> Result<Parameter> {
        let param = match self {
            FileValue::Scalar(value) => {
                let text = value.into_text(&name)?;
                Parameter::string(name, text)
            }
            FileValue::List(items) => {
                let items = items
                    .into_iter()
                    .map(|item| item.into_text(&name))
                    .collect::<Result<Vec<_>>>()?;
                Parameter::string_list(name, items.join(","))
            }
            FileValue::Typed { kind, value } => Parameter::new(name, kind, value),
        };
        Ok(param)
    }
}

/// Source serving parameters parsed from a document
#[derive(Debug, Clone, Default)]
pub struct FileSource {
    params: Vec<Parameter>,
}

impl FileSource {
    /// Parse a YAML document (JSON is valid YAML)
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let doc: BTreeMap<String, FileValue> =
            serde_yaml::from_str(content).context("parse parameter document")?;
        Self::from_doc(doc)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let doc: BTreeMap<String, FileValue> =
            serde_json::from_str(content).context("parse parameter document")?;
        Self::from_doc(doc)
    }

    /// Load from a file; `.json` files use the JSON parser, anything else YAML
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("read parameter file {}", path.display()))?;

        let source = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&content),
            _ => Self::from_yaml_str(&content),
        };
        source.with_context(|| format!("load parameter file {}", path.display()))
    }

    fn from_doc(doc: BTreeMap<String, FileValue>) -> Result<Self> {
        let params = doc
            .into_iter()
            .map(|(name, value)| value.into_parameter(name))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &[Parameter] {
        &self.params
    }
}

#[async_trait]
impl ParameterSource for FileSource {
    fn name(&self) -> &str {
        "file"
    }

    async fn get_parameters(&self, request: GetParametersRequest) -> Result<Vec<Parameter>> {
        Ok(MemorySource::answer(&self.params, &request))
    }
}
