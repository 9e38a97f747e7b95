//! Tracing setup and file-based span export.
//!
//! Every process gets a `tracing` subscriber writing human-readable events to
//! stderr. When [`Config::trace_file`](crate::Config::trace_file) is set,
//! finished spans are additionally exported through OpenTelemetry:
//!
//! ```text
//! tracing spans → tracing-opentelemetry → JsonLinesExporter → RotatingFile
//! ```
//!
//! Each exported line is one self-contained JSON object, so the file can be
//! tailed or fed to `jq` while the process runs.
//!
//! # Filter Resolution
//!
//! 1. `trace_level` from configuration
//! 2. `RUST_LOG`
//! 3. `info`
//!
//! # Modules
//!
//! - [`init`]: Subscriber assembly
//! - [`exporter`]: OpenTelemetry span exporter and span record format
//! - [`file_writer`]: Size-rotated line writer

pub mod exporter;
pub mod file_writer;
mod init;

pub use exporter::{tracer_provider, JsonLinesExporter, SpanRecord};
pub use file_writer::RotatingFile;
pub use init::{env_filter, init_tracing};
