use std::time::{Duration, Instant};

/// Logs how long a scope took when dropped.
///
/// ```
/// let _guard = sift_core::LogDuration::new("build index");
/// // ... work ...
/// ```
#[derive(Debug)]
pub struct LogDuration {
    operation: String,
    start: Instant,
}

impl LogDuration {
    pub fn new(operation: impl Into<String>) -> Self {
        Self { operation: operation.into(), start: Instant::now() }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for LogDuration {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed();
        tracing::info!(
            operation = %self.operation,
            took_ms = elapsed.as_millis() as u64,
            took_s = elapsed.as_secs_f64(),
            "operation finished"
        );
    }
}
