use std::time::Instant;

/// Logs how long it lived when dropped.
pub struct LogDuration {
    operation: String,
    start: Instant,
}

impl LogDuration {
    pub fn new(operation: impl Into<String>) -> Self {
        Self { operation: operation.into(), start: Instant::now() }
    }
}

impl Drop for LogDuration {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed();
        tracing::info!(
            operation = %self.operation,
            elapsed_ms = elapsed.as_secs_f64() * 1000.0,
            "finished"
        );
    }
}
