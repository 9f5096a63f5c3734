//! Tracing/logging setup shared by command-driven processes.

/// Initialize process-wide tracing from the environment.
///
/// Safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init(&ObservabilityConfig::from_env());
}

/// Initialize with an explicit configuration.
pub fn init_with(config: &ObservabilityConfig) {
    tracing::init(config);
}

/// Initialize for test runs: captured test output, `debug` unless `RUST_LOG` says otherwise.
pub fn init_for_tests() {
    tracing::init_for_tests();
}

/// Configuration sourced from the environment.
pub mod config;

/// Subscriber installation.
pub mod tracing;

pub use config::{LogFormat, ObservabilityConfig};
