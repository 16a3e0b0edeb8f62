use thiserror::Error;

/// Errors raised by typed record field access.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
  /// The record has no such field.
  #[error("field '{field}' not found in record")]
  MissingField { field: String },

  /// The field exists but holds a value of another type.
  #[error("field '{field}' is not {expected} (found {found})")]
  TypeMismatch {
    field: String,
    expected: &'static str,
    found: &'static str,
  },

  /// A value that was expected to be an object could not become a record.
  #[error("expected an object, found {found}")]
  NotAnObject { found: &'static str },
}

impl RecordError {
  pub(crate) fn missing(field: &str) -> Self {
    Self::MissingField {
      field: field.to_string(),
    }
  }

  pub(crate) fn mismatch(field: &str, expected: &'static str, found: &serde_json::Value) -> Self {
    Self::TypeMismatch {
      field: field.to_string(),
      expected,
      found: kind_of(found),
    }
  }
}

/// Human-readable name of a value's variant.
pub(crate) fn kind_of(value: &serde_json::Value) -> &'static str {
  match value {
    serde_json::Value::Null => "null",
    serde_json::Value::Bool(_) => "a boolean",
    serde_json::Value::Number(_) => "a number",
    serde_json::Value::String(_) => "a string",
    serde_json::Value::Array(_) => "an array",
    serde_json::Value::Object(_) => "an object",
  }
}
