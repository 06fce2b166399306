//! Result envelope codec.
//!
//! Outcomes cross the result store as JSON. The preferred encoding is the
//! envelope, which workers store as the task's normal return value:
//!
//! ```text
//! {"success": true,  "data": <payload>}
//! {"success": false, "error": {"kind": "...", "message": "...", "details": {...}}}
//! ```
//!
//! Failures reported through the store's native failure channel only keep
//! positional arguments:
//!
//! ```text
//! {"exc_type": "StructuredError", "exc_message": [kind, message, details]}
//! ```
//!
//! [`decode`] accepts either of these, a bare named-field error object, or a
//! bare positional triple. Anything else becomes an `INTERNAL_ERROR` failure.

use serde_json::{json, Value};

use crate::task_error::is_falsy;
use crate::{Details, ErrorKind, StructuredError, TaskOutcome, TaskState};

/// Type name recorded for failures sent through the native channel.
pub const NATIVE_FAILURE_TYPE: &str = "StructuredError";

/// Wrap an outcome into the success/failure envelope.
pub fn encode(outcome: &TaskOutcome) -> Value {
    match outcome {
        TaskOutcome::Success(data) => json!({ "success": true, "data": data }),
        TaskOutcome::Failure(err) => json!({ "success": false, "error": err }),
    }
}

/// Encode a failure for the store's native failure channel.
pub fn encode_native_failure(err: &StructuredError) -> Value {
    json!({
        "exc_type": NATIVE_FAILURE_TYPE,
        "exc_message": err.to_transport_form(),
    })
}

/// Decode whatever the store handed back. Never fails.
pub fn decode(raw: &Value) -> TaskOutcome {
    decode_envelope(raw).unwrap_or_else(|| TaskOutcome::Failure(decode_error(raw)))
}

/// Decode a stored outcome in light of the state the store reports.
///
/// A task the store marked `Succeeded` may hold a bare return value instead of
/// an envelope; that value is the payload. A bare value that is itself an
/// object with a boolean `success` key cannot be told apart from an envelope
/// and is read as one, which is why workers always envelope their successes.
/// A task marked `Failed` always decodes to a failure.
pub fn decode_stored(state: TaskState, raw: &Value) -> TaskOutcome {
    match state {
        TaskState::Succeeded => {
            decode_envelope(raw).unwrap_or_else(|| TaskOutcome::Success(raw.clone()))
        }
        TaskState::Failed => match decode(raw) {
            TaskOutcome::Failure(err) => TaskOutcome::Failure(err),
            TaskOutcome::Success(_) => TaskOutcome::Failure(StructuredError::internal(
                "Task failed but stored a success payload",
            )),
        },
        _ => decode(raw),
    }
}

/// Decode a value known to describe a failure. Never fails.
pub fn decode_error(raw: &Value) -> StructuredError {
    decode_named(raw)
        .or_else(|| decode_positional(raw))
        .unwrap_or_else(|| fallback(raw))
}

fn decode_envelope(raw: &Value) -> Option<TaskOutcome> {
    let envelope = raw.as_object()?;
    let success = envelope.get("success")?.as_bool()?;

    let outcome = if success {
        TaskOutcome::Success(envelope.get("data").cloned().unwrap_or(Value::Null))
    } else {
        let err = match envelope.get("error") {
            Some(error) if !error.is_null() => decode_error(error),
            _ => StructuredError::internal("Task failed without an error payload"),
        };
        TaskOutcome::Failure(err)
    };
    Some(outcome)
}

// `code` is accepted as an alias of `kind` for older producers.
fn decode_named(raw: &Value) -> Option<StructuredError> {
    let fields = raw.as_object()?;
    let kind = fields
        .get("kind")
        .or_else(|| fields.get("code"))?
        .as_str()?
        .parse::<ErrorKind>()
        .ok()?;
    let message = fields.get("message")?.as_str()?;
    let details = match fields.get("details") {
        None => Details::new(),
        Some(v) if is_falsy(v) => Details::new(),
        Some(Value::Object(map)) => map.clone(),
        Some(_) => return None,
    };
    Some(StructuredError::with_details(kind, message, details))
}

fn decode_positional(raw: &Value) -> Option<StructuredError> {
    let args = match raw {
        Value::Array(_) => raw,
        Value::Object(fields) => fields.get("exc_message").or_else(|| fields.get("args"))?,
        _ => return None,
    };
    StructuredError::from_transport_form(args).ok()
}

fn fallback(raw: &Value) -> StructuredError {
    let mut details = Details::new();
    if let Some(type_name) = raw.get("exc_type").and_then(Value::as_str) {
        details.insert("exc_type".to_string(), Value::String(type_name.to_string()));
    }

    let message = match raw.get("exc_message") {
        Some(args) => render(single_arg(args).unwrap_or(args)),
        None => render(raw),
    };
    StructuredError::with_details(ErrorKind::InternalError, message, details)
}

fn single_arg(args: &Value) -> Option<&Value> {
    match args.as_array()?.as_slice() {
        [only] => Some(only),
        _ => None,
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
