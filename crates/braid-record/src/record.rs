use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{RecordError, kind_of};

/// An ordered sequence of records. Order is significant to steps such as
/// batching and must be preserved.
pub type Batch = Vec<Record>;

/// A single structured record: field name to dynamically-typed value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
  /// Create an empty record.
  pub fn new() -> Self {
    Self(Map::new())
  }

  /// Get a raw field value.
  pub fn get(&self, field: &str) -> Option<&Value> {
    self.0.get(field)
  }

  /// Get a field that must be present, whatever its type.
  pub fn require(&self, field: &str) -> Result<&Value, RecordError> {
    self.0.get(field).ok_or_else(|| RecordError::missing(field))
  }

  pub fn get_str(&self, field: &str) -> Result<&str, RecordError> {
    let value = self.require(field)?;
    value
      .as_str()
      .ok_or_else(|| RecordError::mismatch(field, "a string", value))
  }

  pub fn get_i64(&self, field: &str) -> Result<i64, RecordError> {
    let value = self.require(field)?;
    value
      .as_i64()
      .ok_or_else(|| RecordError::mismatch(field, "an integer", value))
  }

  pub fn get_f64(&self, field: &str) -> Result<f64, RecordError> {
    let value = self.require(field)?;
    value
      .as_f64()
      .ok_or_else(|| RecordError::mismatch(field, "a number", value))
  }

  pub fn get_bool(&self, field: &str) -> Result<bool, RecordError> {
    let value = self.require(field)?;
    value
      .as_bool()
      .ok_or_else(|| RecordError::mismatch(field, "a boolean", value))
  }

  pub fn get_object(&self, field: &str) -> Result<&Map<String, Value>, RecordError> {
    let value = self.require(field)?;
    value
      .as_object()
      .ok_or_else(|| RecordError::mismatch(field, "an object", value))
  }

  pub fn get_array(&self, field: &str) -> Result<&Vec<Value>, RecordError> {
    let value = self.require(field)?;
    value
      .as_array()
      .ok_or_else(|| RecordError::mismatch(field, "an array", value))
  }

  /// Set a field, returning the previous value if there was one.
  pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
    self.0.insert(field.into(), value.into())
  }

  /// Remove a field, returning its value if it was present.
  pub fn remove(&mut self, field: &str) -> Option<Value> {
    self.0.remove(field)
  }

  pub fn contains_key(&self, field: &str) -> bool {
    self.0.contains_key(field)
  }

  /// Copy every field of `other` into this record. Fields of `other` win.
  pub fn merge(&mut self, other: &Record) {
    for (field, value) in &other.0 {
      self.0.insert(field.clone(), value.clone());
    }
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
    self.0.iter()
  }

  pub fn into_value(self) -> Value {
    Value::Object(self.0)
  }
}

impl From<Map<String, Value>> for Record {
  fn from(map: Map<String, Value>) -> Self {
    Self(map)
  }
}

impl From<Record> for Value {
  fn from(record: Record) -> Self {
    record.into_value()
  }
}

impl TryFrom<Value> for Record {
  type Error = RecordError;

  fn try_from(value: Value) -> Result<Self, Self::Error> {
    match value {
      Value::Object(map) => Ok(Self(map)),
      other => Err(RecordError::NotAnObject {
        found: kind_of(&other),
      }),
    }
  }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Record {
  fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
    Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
  }
}
