//! Tracing and logging setup shared by the binaries.

/// Initialize process-wide logging using `FOLIO_LOG_FORMAT` and `RUST_LOG`.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init();
}

/// Subscriber configuration (filters, output format).
pub mod tracing;

pub use crate::tracing::LogFormat;
