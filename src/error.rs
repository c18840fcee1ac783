//! Error types with fix suggestions
//!
//! Error code ranges:
//! - PARAM-000-009: Usage errors (bad target, bad record definition)
//! - PARAM-010-019: Source errors (fetch failure, cancellation)
//! - PARAM-020-029: Missing parameters
//! - PARAM-030-039: Conversion errors
//! - PARAM-040-049: Unsupported target types
//! - PARAM-050-059: Configuration errors

use std::fmt;

use thiserror::Error;

use crate::field::Kind;
use crate::parameter::ParameterKind;

pub type Result<T> = std::result::Result<T, BindError>;

/// Trait for errors that provide fix suggestions
pub trait FixSuggestion {
    fn fix_suggestion(&self) -> Option<&str>;
}

/// Returned when one or more requested parameters were not returned by the
/// source. Carries every missing name, not just the first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotFoundError {
    names: Vec<String>,
}

impl NotFoundError {
    /// Names are kept sorted so the message is stable between runs
    pub fn new(mut names: Vec<String>) -> Self {
        names.sort();
        Self { names }
    }

    /// Missing key paths
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn into_names(self) -> Vec<String> {
        self.names
    }
}

impl fmt::Display for NotFoundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "not found: {}", self.names.join(", "))
    }
}

impl std::error::Error for NotFoundError {}

/// All error variants are part of the public API.
#[derive(Error, Debug)]
pub enum BindError {
    // ═══════════════════════════════════════════
    // USAGE ERRORS (000-009)
    // ═══════════════════════════════════════════
    #[error("[PARAM-001] target is an unset optional")]
    NilTarget,

    #[error("[PARAM-002] target is not a record: {type_name}")]
    NotRecord { type_name: &'static str },

    #[error("[PARAM-003] field '{field}' must be exported")]
    FieldNotExported { field: &'static str },

    #[error("[PARAM-004] no parameter source configured")]
    NoSource,

    // ═══════════════════════════════════════════
    // SOURCE ERRORS (010-019)
    // ═══════════════════════════════════════════
    #[error("[PARAM-010] read parameters from {source_name}: {error:#}")]
    Source {
        source_name: String,
        error: anyhow::Error,
    },

    #[error("[PARAM-011] bind cancelled before parameters were read")]
    Cancelled,

    // ═══════════════════════════════════════════
    // MISSING PARAMETERS (020-029)
    // ═══════════════════════════════════════════
    #[error("[PARAM-020] {0}")]
    NotFound(#[from] NotFoundError),

    // ═══════════════════════════════════════════
    // CONVERSION ERRORS (030-039)
    // ═══════════════════════════════════════════
    #[error("[PARAM-030] {name}: {source}")]
    Param {
        name: String,
        #[source]
        source: Box<BindError>,
    },

    #[error("[PARAM-031] cannot assign {from} to {to}")]
    TypeMismatch {
        from: ParameterKind,
        to: &'static str,
    },

    #[error("[PARAM-032] set slice index {index}: {source}")]
    Element {
        index: usize,
        #[source]
        source: Box<BindError>,
    },

    #[error("[PARAM-033] parse {value:?} as {target}: {reason}")]
    Parse {
        value: String,
        target: &'static str,
        reason: String,
    },

    #[error("[PARAM-034] value {value} out of range for {target}")]
    OutOfRange { value: String, target: &'static str },

    #[error("[PARAM-035] no field at index {index} of {type_name}")]
    InvalidFieldPath {
        index: usize,
        type_name: &'static str,
    },

    // ═══════════════════════════════════════════
    // UNSUPPORTED TYPES (040-049)
    // ═══════════════════════════════════════════
    #[error("[PARAM-040] unsupported: {kind} ({type_name})")]
    Unsupported {
        kind: Kind,
        type_name: &'static str,
    },

    // ═══════════════════════════════════════════
    // CONFIG ERRORS (050-059)
    // ═══════════════════════════════════════════
    #[error("[PARAM-050] invalid configuration: {reason}")]
    Config { reason: String },
}

impl BindError {
    /// Wrap a conversion failure with the key path it came from
    pub fn for_param(name: impl Into<String>, source: BindError) -> Self {
        BindError::Param {
            name: name.into(),
            source: Box::new(source),
        }
    }

    pub fn parse(value: &str, target: &'static str, reason: impl fmt::Display) -> Self {
        BindError::Parse {
            value: value.to_string(),
            target,
            reason: reason.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, BindError::NotFound(_))
    }

    /// Missing names when this is a not-found error
    pub fn not_found(&self) -> Option<&NotFoundError> {
        match self {
            BindError::NotFound(err) => Some(err),
            _ => None,
        }
    }

    /// Innermost error, looking through key path and slice index wrappers
    pub fn root_cause(&self) -> &BindError {
        match self {
            BindError::Param { source, .. } | BindError::Element { source, .. } => {
                source.root_cause()
            }
            other => other,
        }
    }
}

impl FixSuggestion for BindError {
    fn fix_suggestion(&self) -> Option<&str> {
        match self {
            BindError::NilTarget => Some("Pass Some(record) or a plain record to bind"),
            BindError::NotRecord { .. } => Some("Bind into a type declared with record!"),
            BindError::FieldNotExported { .. } => {
                Some("Mark the annotated field pub or remove its annotation")
            }
            BindError::NoSource => {
                Some("Call with_source on the builder or enable the `aws` feature")
            }
            BindError::Source { .. } => Some("Check credentials, region and network access"),
            BindError::Cancelled => None,
            BindError::NotFound(_) => Some("Create the missing parameters or fix the prefix"),
            BindError::Param { source, .. } | BindError::Element { source, .. } => {
                source.fix_suggestion()
            }
            BindError::TypeMismatch { .. } => {
                Some("Use a StringList parameter for Vec fields and String otherwise")
            }
            BindError::Parse { .. } => Some("Fix the stored value or the configured layout"),
            BindError::OutOfRange { .. } => Some("Use a wider numeric field type"),
            BindError::InvalidFieldPath { .. } => None,
            BindError::Unsupported { .. } => {
                Some("Enable a converter for this type (with_parse_number, with_parse_duration, ...)")
            }
            BindError::Config { .. } => Some("Check the configuration file syntax"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_lists_every_name_sorted() {
        let err = NotFoundError::new(vec!["/b".to_string(), "/a".to_string()]);
        assert_eq!(err.names(), &["/a".to_string(), "/b".to_string()]);
        assert_eq!(err.to_string(), "not found: /a, /b");
    }

    #[test]
    fn not_found_names_can_be_taken() {
        let err = NotFoundError::new(vec!["/z".to_string(), "/a".to_string(), "/m".to_string()]);
        assert_eq!(err.into_names(), vec!["/a", "/m", "/z"]);
    }

    #[test]
    fn not_found_is_distinguishable() {
        let err: BindError = NotFoundError::new(vec!["/x".to_string()]).into();
        assert!(err.is_not_found());
        assert_eq!(err.not_found().map(|e| e.names().len()), Some(1));
        assert!(err.to_string().contains("PARAM-020"));
    }

    #[test]
    fn param_wrapper_names_key_and_keeps_cause() {
        let err = BindError::for_param(
            "/timeout",
            BindError::parse("nonsense", "Duration", "unknown unit"),
        );
        let msg = err.to_string();
        assert!(msg.contains("/timeout"));
        assert!(msg.contains("nonsense"));
        assert!(matches!(err.root_cause(), BindError::Parse { .. }));
    }

    #[test]
    fn type_mismatch_names_both_sides() {
        let err = BindError::TypeMismatch {
            from: ParameterKind::StringList,
            to: "alloc::string::String",
        };
        assert_eq!(
            err.to_string(),
            "[PARAM-031] cannot assign StringList to alloc::string::String"
        );
    }

    #[test]
    fn suggestions_pass_through_wrappers() {
        let inner = BindError::Unsupported {
            kind: Kind::Bool,
            type_name: "bool",
        };
        let err = BindError::for_param("/flag", inner);
        assert!(err.fix_suggestion().unwrap().contains("converter"));
        assert!(BindError::Cancelled.fix_suggestion().is_none());
    }
}
