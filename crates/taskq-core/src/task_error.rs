//! Structured task errors.
//!
//! A task failure is a single [`StructuredError`] value tagged with an
//! [`ErrorKind`]. There is no error type hierarchy: the factory functions
//! (`path_not_found`, `invalid_input`, ...) only fix the kind and the shape of
//! `details`. Every value can be flattened into the canonical
//! `[kind, message, details]` triple and rebuilt from it, which is what lets a
//! failure survive a lossy serialization boundary.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use crate::CoreError;

/// Free-form diagnostic fields attached to an error.
pub type Details = serde_json::Map<String, Value>;

/// Closed taxonomy of task error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    PathNotFound,
    FileNotFound,
    InvalidInput,
    TaskFailed,
    PermissionDenied,
    InternalError,
}

impl ErrorKind {
    /// All kinds, in declaration order.
    pub const ALL: [ErrorKind; 6] = [
        ErrorKind::PathNotFound,
        ErrorKind::FileNotFound,
        ErrorKind::InvalidInput,
        ErrorKind::TaskFailed,
        ErrorKind::PermissionDenied,
        ErrorKind::InternalError,
    ];

    /// Stable wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PathNotFound => "PATH_NOT_FOUND",
            Self::FileNotFound => "FILE_NOT_FOUND",
            Self::InvalidInput => "INVALID_INPUT",
            Self::TaskFailed => "TASK_FAILED",
            Self::PermissionDenied => "PERMISSION_DENIED",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ErrorKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| CoreError::UnknownErrorKind(s.to_string()))
    }
}

/// A domain-level task failure.
///
/// Fields are private so a constructed value cannot be mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
#[error("{kind}: {message}")]
pub struct StructuredError {
    kind: ErrorKind,
    message: String,
    #[serde(default, deserialize_with = "details_or_empty")]
    details: Details,
}

impl StructuredError {
    /// Create an error with empty details.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self::with_details(kind, message, Details::new())
    }

    /// Create an error with the given details.
    pub fn with_details(kind: ErrorKind, message: impl Into<String>, details: Details) -> Self {
        Self {
            kind,
            message: message.into(),
            details,
        }
    }

    /// A path that was expected to exist does not.
    pub fn path_not_found(path: &str) -> Self {
        Self::with_details(
            ErrorKind::PathNotFound,
            format!("Path does not exist: {path}"),
            single_detail("path", path),
        )
    }

    /// A file disappeared or could not be located.
    pub fn file_not_found(filename: &str) -> Self {
        Self::with_details(
            ErrorKind::FileNotFound,
            format!("File not found: {filename}"),
            single_detail("filename", filename),
        )
    }

    /// Caller supplied arguments the task cannot work with.
    pub fn invalid_input(message: impl Into<String>, details: Option<Details>) -> Self {
        Self::with_details(ErrorKind::InvalidInput, message, details.unwrap_or_default())
    }

    /// The process lacks permission to access a path.
    pub fn permission_denied(path: &str) -> Self {
        Self::with_details(
            ErrorKind::PermissionDenied,
            format!("Permission denied: {path}"),
            single_detail("path", path),
        )
    }

    /// The task could not run to completion.
    pub fn task_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TaskFailed, message)
    }

    /// Anything not covered by a more specific kind.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InternalError, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn details(&self) -> &Details {
        &self.details
    }

    /// Canonical positional form: `[kind, message, details]`.
    pub fn to_transport_form(&self) -> Value {
        json!([self.kind.as_str(), self.message, self.details])
    }

    /// Rebuild an error from its positional form.
    ///
    /// Extra trailing elements are ignored. A falsy third element (`null`,
    /// `false`, `0`, `""`, `{}`, `[]`) becomes empty details.
    pub fn from_transport_form(value: &Value) -> Result<Self, CoreError> {
        let items = value
            .as_array()
            .filter(|items| items.len() >= 3)
            .ok_or_else(|| {
                CoreError::MalformedTransportForm("expected at least 3 elements".to_string())
            })?;

        let kind = items[0]
            .as_str()
            .ok_or_else(|| CoreError::MalformedTransportForm("kind is not a string".to_string()))?
            .parse::<ErrorKind>()?;
        let message = items[1].as_str().ok_or_else(|| {
            CoreError::MalformedTransportForm("message is not a string".to_string())
        })?;

        let details = match &items[2] {
            v if is_falsy(v) => Details::new(),
            Value::Object(map) => map.clone(),
            other => {
                return Err(CoreError::MalformedTransportForm(format!(
                    "details is not a mapping: {other}"
                )))
            }
        };

        Ok(Self::with_details(kind, message, details))
    }
}

/// Truthiness as understood by dynamically typed brokers.
pub(crate) fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

fn single_detail(key: &str, value: &str) -> Details {
    let mut details = Details::new();
    details.insert(key.to_string(), Value::String(value.to_string()));
    details
}

fn details_or_empty<'de, D>(deserializer: D) -> Result<Details, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Details>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_wire_names_are_stable() {
        for kind in ErrorKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
            assert_eq!(kind.as_str().parse::<ErrorKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let err = "NOT_A_KIND".parse::<ErrorKind>().unwrap_err();
        assert!(matches!(err, CoreError::UnknownErrorKind(s) if s == "NOT_A_KIND"));
    }

    #[test]
    fn test_path_not_found_factory() {
        let err = StructuredError::path_not_found("/nonexistent");
        assert_eq!(err.kind(), ErrorKind::PathNotFound);
        assert_eq!(err.message(), "Path does not exist: /nonexistent");
        assert_eq!(err.details()["path"], "/nonexistent");
    }

    #[test]
    fn test_file_not_found_factory() {
        let err = StructuredError::file_not_found("report.csv");
        assert_eq!(err.kind(), ErrorKind::FileNotFound);
        assert_eq!(err.message(), "File not found: report.csv");
        assert_eq!(err.details()["filename"], "report.csv");
    }

    #[test]
    fn test_invalid_input_defaults_to_empty_details() {
        let err = StructuredError::invalid_input("bad", None);
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(err.details().is_empty());
    }

    #[test]
    fn test_display() {
        let err = StructuredError::task_failed("boom");
        assert_eq!(err.to_string(), "TASK_FAILED: boom");
    }

    #[test]
    fn test_transport_form_round_trip() {
        let err = StructuredError::path_not_found("/tmp/x");
        let form = err.to_transport_form();
        assert_eq!(form[0], "PATH_NOT_FOUND");
        assert_eq!(form[1], "Path does not exist: /tmp/x");
        assert_eq!(StructuredError::from_transport_form(&form).unwrap(), err);
    }

    #[test]
    fn test_transport_form_survives_json_text() {
        let err = StructuredError::permission_denied("/root/secret");
        let text = serde_json::to_string(&err.to_transport_form()).unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(StructuredError::from_transport_form(&value).unwrap(), err);
    }

    #[test]
    fn test_falsy_details_become_empty() {
        for falsy in [json!(null), json!({}), json!(false), json!(""), json!(0), json!([])] {
            let form = json!(["TASK_FAILED", "x", falsy]);
            let err = StructuredError::from_transport_form(&form).unwrap();
            assert!(err.details().is_empty());
        }
    }

    #[test]
    fn test_short_or_malformed_forms_are_rejected() {
        assert!(StructuredError::from_transport_form(&json!(["TASK_FAILED", "x"])).is_err());
        assert!(StructuredError::from_transport_form(&json!([1, "x", {}])).is_err());
        assert!(StructuredError::from_transport_form(&json!(["TASK_FAILED", "x", "d"])).is_err());
        assert!(StructuredError::from_transport_form(&json!("TASK_FAILED")).is_err());
    }

    #[test]
    fn test_named_field_null_details_deserialize_to_empty() {
        let err: StructuredError =
            serde_json::from_value(json!({"kind": "INVALID_INPUT", "message": "m", "details": null}))
                .unwrap();
        assert!(err.details().is_empty());

        let err: StructuredError =
            serde_json::from_value(json!({"kind": "INVALID_INPUT", "message": "m"})).unwrap();
        assert!(err.details().is_empty());
    }
}
