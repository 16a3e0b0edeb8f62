use thiserror::Error;

#[derive(Debug, Error)]
pub enum TelemetryError {
  /// The collectors are already registered with this registry.
  #[error("step collectors already registered: {0}")]
  AlreadyRegistered(String),

  /// Any other collector or encoding failure.
  #[error("telemetry error: {0}")]
  Prometheus(#[from] prometheus::Error),

  #[error("metrics output is not valid utf-8")]
  Encoding(#[from] std::string::FromUtf8Error),
}
