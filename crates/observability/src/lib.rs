//! Tracing and logging setup shared by the binaries.

pub mod tracing;

pub use crate::tracing::LogFormat;

/// Initialize process-wide tracing/logging with JSON output.
///
/// Safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init(LogFormat::Json);
}

/// Same as [`init`] with an explicit output format.
pub fn init_with(format: LogFormat) {
    tracing::init(format);
}
