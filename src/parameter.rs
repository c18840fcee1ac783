//! Parameters as returned by a source

use std::fmt;

use serde::{Deserialize, Serialize};

/// Value kind of a stored parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParameterKind {
    /// Plain text
    String,
    /// Encrypted at rest, delivered already decrypted
    SecureString,
    /// Comma separated list of plain strings
    StringList,
}

impl ParameterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterKind::String => "String",
            ParameterKind::SecureString => "SecureString",
            ParameterKind::StringList => "StringList",
        }
    }
}

impl fmt::Display for ParameterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One retrieved parameter: full key path, kind and raw payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub kind: ParameterKind,
    pub value: String,
}

impl Parameter {
    pub fn new(name: impl Into<String>, kind: ParameterKind, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            value: value.into(),
        }
    }

    pub fn string(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, ParameterKind::String, value)
    }

    pub fn secure_string(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, ParameterKind::SecureString, value)
    }

    pub fn string_list(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, ParameterKind::StringList, value)
    }

    /// List elements, split on `,` (an empty payload yields one empty element)
    pub fn elements(&self) -> Vec<&str> {
        self.value.split(',').collect()
    }
}
