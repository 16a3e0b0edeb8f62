use async_trait::async_trait;
use braid_step::{Batch, Context, Record, Step, StepError, Value};
use reqwest::Method;
use serde::Deserialize;
use tracing::debug;

use crate::template::Templates;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpRequestConfig {
  pub url_key: String,
  pub method_key: String,
  #[serde(default)]
  pub headers_key: Option<String>,
  #[serde(default)]
  pub body_key: Option<String>,
}

/// Issues one JSON request per input record, reading the URL, method,
/// headers and body from the record's fields.
///
/// The URL, string header values and strings inside the body are rendered
/// as templates against the context's environment bag and the record, so
/// `?account_id={{ account_id }}` picks up an operator-supplied value.
///
/// A response object with an `items` array contributes each item as a
/// record; any other object is emitted whole.
#[derive(Debug, Clone)]
pub struct HttpRequest {
  config: HttpRequestConfig,
}

impl HttpRequest {
  pub fn new(config: HttpRequestConfig) -> Self {
    Self { config }
  }

  async fn send(&self, ctx: &Context, record: &Record) -> Result<Value, StepError> {
    let templates = Templates::new(ctx, record);
    let url = templates.render(record.get_str(&self.config.url_key)?)?;
    let method = parse_method(record.get_str(&self.config.method_key)?)?;

    let mut request = ctx
      .http()
      .request(method.clone(), &url)
      .header(reqwest::header::CONTENT_TYPE, "application/json");

    if let Some(key) = &self.config.headers_key {
      for (name, value) in record.get_object(key)? {
        if let Some(value) = value.as_str() {
          request = request.header(name.as_str(), templates.render(value)?);
        }
      }
    }

    if let Some(key) = &self.config.body_key {
      request = request.json(&templates.render_value(record.require(key)?)?);
    }

    let response = tokio::select! {
      biased;
      _ = ctx.cancellation().cancelled() => return Err(StepError::Cancelled),
      response = request.send() => response?,
    };

    debug!(
      method = %method,
      url = %url,
      status = response.status().as_u16(),
      "http_request_completed"
    );

    Ok(response.json::<Value>().await?)
  }
}

fn parse_method(method: &str) -> Result<Method, StepError> {
  match method.to_uppercase().as_str() {
    "GET" => Ok(Method::GET),
    "POST" => Ok(Method::POST),
    "PUT" => Ok(Method::PUT),
    "DELETE" => Ok(Method::DELETE),
    "PATCH" => Ok(Method::PATCH),
    "HEAD" => Ok(Method::HEAD),
    "OPTIONS" => Ok(Method::OPTIONS),
    _ => Err(StepError::failed(format!(
      "unsupported HTTP method: {}",
      method
    ))),
  }
}

/// Split a response body into output records.
fn response_records(body: Value) -> Result<Batch, StepError> {
  match body {
    Value::Object(mut object) => match object.remove("items") {
      Some(Value::Array(items)) => items
        .into_iter()
        .map(|item| Record::try_from(item).map_err(StepError::from))
        .collect(),
      Some(other) => {
        object.insert("items".to_string(), other);
        Ok(vec![Record::from(object)])
      }
      None => Ok(vec![Record::from(object)]),
    },
    other => Err(StepError::failed(format!(
      "response body is not a JSON object: {}",
      other
    ))),
  }
}

#[async_trait]
impl Step for HttpRequest {
  async fn execute(&self, ctx: &Context, input: Batch) -> Result<Batch, StepError> {
    let mut output = Vec::new();
    for record in &input {
      let body = self.send(ctx, record).await?;
      output.extend(response_records(body)?);
    }
    Ok(output)
  }
}
