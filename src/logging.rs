//! Logging utilities for taproot.
//!
//! This module provides structured logging functionality to make logs more
//! searchable and analyzable.

use std::time::Instant;
use tracing::{debug, error, info};

/// Initialize the tracing subscriber with the given log level
pub fn init_tracing(log_level: &str) {
    let filter = match std::env::var("RUST_LOG") {
        Ok(val) => val,
        Err(_) => log_level.to_string(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

/// Log an operation with timing and result in a single statement
pub fn log_timed_operation<F, R>(operation: &str, f: F) -> R
where
    F: FnOnce() -> R,
{
    let start = Instant::now();

    debug!(operation = operation, "Starting operation");

    let result = f();

    let duration = start.elapsed();

    info!(
        operation = operation,
        duration_ms = duration.as_secs_f64() * 1000.0,
        "Operation completed"
    );

    result
}

/// Log detailed information about the data loaded
pub fn log_data_load_stats(
    file_path: &str,
    var_count: usize,
    var_names: &[&str],
    dim_count: usize,
    dim_details: &str,
) {
    info!(
        operation = "data_load",
        file_path = file_path,
        var_count = var_count,
        vars = %var_names.join(", "),
        dim_count = dim_count,
        dims = dim_details,
        "Data loaded successfully"
    );
}

/// Log an error with context
pub fn log_error(error: &crate::error::TaprootError, context: &str) {
    error!(
        error = %error,
        context = context,
        "Error occurred"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_log_timed_operation() {
        // Functional test to ensure the wrapper passes the result through.
        let result = log_timed_operation("test_operation", || {
            std::thread::sleep(Duration::from_millis(1));
            42
        });

        assert_eq!(result, 42);
    }
}
