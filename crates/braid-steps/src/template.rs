//! Template rendering for request fields.
//!
//! Strings containing `{{ .. }}` or `{% .. %}` are rendered with minijinja
//! against the context's environment bag overlaid with the current record's
//! fields:
//!
//! ```text
//! url: "https://api.example.com/users/{{ public_identifier }}?account_id={{ account_id }}"
//! ```
//!
//! Undefined variables are an error rather than an empty string.

use braid_step::{Context, Record, StepError, Value};
use minijinja::{Environment, UndefinedBehavior};
use serde_json::Map;

pub(crate) struct Templates {
  env: Environment<'static>,
  data: Value,
}

impl Templates {
  /// Build the template context for one record. Record fields win over
  /// environment values of the same name.
  pub(crate) fn new(ctx: &Context, record: &Record) -> Self {
    let mut data: Map<String, Value> = ctx
      .env()
      .iter()
      .map(|(key, value)| (key.clone(), Value::String(value.clone())))
      .collect();
    for (key, value) in record.iter() {
      data.insert(key.clone(), value.clone());
    }

    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Strict);

    Self {
      env,
      data: Value::Object(data),
    }
  }

  pub(crate) fn render(&self, raw: &str) -> Result<String, StepError> {
    if !is_template(raw) {
      return Ok(raw.to_string());
    }
    self
      .env
      .render_str(raw, &self.data)
      .map_err(|e| StepError::failed(format!("failed to render template '{}': {}", raw, e)))
  }

  /// Render every string inside `value`, leaving other leaves untouched.
  pub(crate) fn render_value(&self, value: &Value) -> Result<Value, StepError> {
    match value {
      Value::String(s) => Ok(Value::String(self.render(s)?)),
      Value::Array(items) => items
        .iter()
        .map(|item| self.render_value(item))
        .collect::<Result<Vec<_>, _>>()
        .map(Value::Array),
      Value::Object(fields) => fields
        .iter()
        .map(|(key, item)| Ok((key.clone(), self.render_value(item)?)))
        .collect::<Result<Map<_, _>, StepError>>()
        .map(Value::Object),
      other => Ok(other.clone()),
    }
  }
}

fn is_template(raw: &str) -> bool {
  raw.contains("{{") || raw.contains("{%")
}
