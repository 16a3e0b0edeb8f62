use std::collections::HashMap;
use std::sync::Arc;

use braid_telemetry::Metrics;
use tokio_util::sync::CancellationToken;

/// Process-wide resources passed by reference into every step invocation.
///
/// The engine never mutates a context. Cloning is cheap: the HTTP client,
/// metrics and environment are shared.
#[derive(Debug, Clone)]
pub struct Context {
  cancel: CancellationToken,
  http: reqwest::Client,
  metrics: Arc<Metrics>,
  env: Arc<HashMap<String, String>>,
}

impl Context {
  /// Create a context with a fresh cancellation token, a default HTTP
  /// client and an empty environment.
  pub fn new(metrics: Arc<Metrics>) -> Self {
    Self {
      cancel: CancellationToken::new(),
      http: reqwest::Client::new(),
      metrics,
      env: Arc::new(HashMap::new()),
    }
  }

  pub fn with_env(mut self, env: HashMap<String, String>) -> Self {
    self.env = Arc::new(env);
    self
  }

  pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
    self.cancel = cancel;
    self
  }

  /// A copy of this context whose cancellation token is a child of ours:
  /// cancelling the parent cancels the child, not the reverse.
  pub fn child(&self) -> Self {
    Self {
      cancel: self.cancel.child_token(),
      ..self.clone()
    }
  }

  pub fn cancellation(&self) -> &CancellationToken {
    &self.cancel
  }

  pub fn is_cancelled(&self) -> bool {
    self.cancel.is_cancelled()
  }

  pub fn http(&self) -> &reqwest::Client {
    &self.http
  }

  pub fn metrics(&self) -> &Metrics {
    &self.metrics
  }

  /// The environment bag: operator-supplied values such as account ids
  /// and API keys that steps may substitute into requests.
  pub fn env(&self) -> &HashMap<String, String> {
    &self.env
  }
}
