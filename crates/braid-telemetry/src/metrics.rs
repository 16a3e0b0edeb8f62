use std::time::Duration;

use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};

use crate::error::TelemetryError;

const NAMESPACE: &str = "braid";
const STEP_LABEL: &str = "step";

/// Step duration histogram and step error counter.
///
/// Cheap to share behind an `Arc`; the collectors are internally synchronized
/// so concurrent runs may record into them at the same time.
#[derive(Clone)]
pub struct Metrics {
  step_duration: HistogramVec,
  step_errors: IntCounterVec,
}

impl Metrics {
  /// Create the collectors and register them with `registry`.
  pub fn register(registry: &Registry) -> Result<Self, TelemetryError> {
    let step_duration = HistogramVec::new(
      HistogramOpts::new("step_duration_seconds", "Wall-clock duration of step invocations")
        .namespace(NAMESPACE),
      &[STEP_LABEL],
    )?;
    let step_errors = IntCounterVec::new(
      Opts::new("step_errors_total", "Failed step invocations").namespace(NAMESPACE),
      &[STEP_LABEL],
    )?;

    registry
      .register(Box::new(step_duration.clone()))
      .map_err(already_registered)?;
    if let Err(err) = registry.register(Box::new(step_errors.clone())) {
      // leave the registry as it was before the call
      let _ = registry.unregister(Box::new(step_duration.clone()));
      return Err(already_registered(err));
    }

    Ok(Self {
      step_duration,
      step_errors,
    })
  }

  /// Record one invocation of `step`, successful or not.
  pub fn observe_duration(&self, step: &str, elapsed: Duration) {
    self
      .step_duration
      .with_label_values(&[step])
      .observe(elapsed.as_secs_f64());
  }

  /// Record one failed invocation of `step`.
  pub fn record_error(&self, step: &str) {
    self.step_errors.with_label_values(&[step]).inc();
  }

  /// Number of duration observations recorded for `step`.
  pub fn invocation_count(&self, step: &str) -> u64 {
    self
      .step_duration
      .with_label_values(&[step])
      .get_sample_count()
  }

  /// Number of errors recorded for `step`.
  pub fn error_count(&self, step: &str) -> u64 {
    self.step_errors.with_label_values(&[step]).get()
  }
}

fn already_registered(err: prometheus::Error) -> TelemetryError {
  match err {
    prometheus::Error::AlreadyReg => {
      TelemetryError::AlreadyRegistered("braid_step_duration_seconds/braid_step_errors_total".into())
    }
    other => TelemetryError::Prometheus(other),
  }
}

impl std::fmt::Debug for Metrics {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Metrics").finish_non_exhaustive()
  }
}

/// Render everything in `registry` in the Prometheus text exposition format.
pub fn encode_text(registry: &Registry) -> Result<String, TelemetryError> {
  let mut buffer = Vec::new();
  TextEncoder::new().encode(&registry.gather(), &mut buffer)?;
  Ok(String::from_utf8(buffer)?)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_double_registration_is_rejected() {
    let registry = Registry::new();
    Metrics::register(&registry).unwrap();

    let err = Metrics::register(&registry).unwrap_err();
    assert!(matches!(err, TelemetryError::AlreadyRegistered(_)));
  }

  #[test]
  fn test_failed_registration_leaves_registry_unchanged() {
    let registry = Registry::new();
    let taken = IntCounterVec::new(
      Opts::new("step_errors_total", "taken").namespace(NAMESPACE),
      &[STEP_LABEL],
    )
    .unwrap();
    registry.register(Box::new(taken.clone())).unwrap();

    assert!(Metrics::register(&registry).is_err());

    // the histogram from the failed call must not block a retry
    registry.unregister(Box::new(taken)).unwrap();
    assert!(Metrics::register(&registry).is_ok());
  }

  #[test]
  fn test_separate_registries_are_independent() {
    let a = Metrics::register(&Registry::new()).unwrap();
    let b = Metrics::register(&Registry::new()).unwrap();

    a.record_error("fetch");
    assert_eq!(a.error_count("fetch"), 1);
    assert_eq!(b.error_count("fetch"), 0);
  }

  #[test]
  fn test_counts_are_per_step() {
    let metrics = Metrics::register(&Registry::new()).unwrap();

    metrics.observe_duration("a", Duration::from_millis(3));
    metrics.observe_duration("a", Duration::from_millis(5));
    metrics.observe_duration("b", Duration::from_millis(1));
    metrics.record_error("b");

    assert_eq!(metrics.invocation_count("a"), 2);
    assert_eq!(metrics.invocation_count("b"), 1);
    assert_eq!(metrics.error_count("a"), 0);
    assert_eq!(metrics.error_count("b"), 1);
  }

  #[test]
  fn test_encode_text_exports_both_collectors() {
    let registry = Registry::new();
    let metrics = Metrics::register(&registry).unwrap();
    metrics.observe_duration("load", Duration::from_millis(2));
    metrics.record_error("load");

    let text = encode_text(&registry).unwrap();
    assert!(text.contains("braid_step_duration_seconds_count{step=\"load\"} 1"));
    assert!(text.contains("braid_step_errors_total{step=\"load\"} 1"));
  }
}
