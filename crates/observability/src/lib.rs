//! Observability infrastructure for Instrack
//!
//! Structured logging via `tracing`. Log output goes to stderr so that
//! command output on stdout stays clean.
//!
//! ```ignore
//! use observability::{init_logging, LogFormat};
//!
//! init_logging("instrack", LogFormat::Compact, "warn")?;
//! ```

pub mod logging;

pub use logging::{init_logging, LogFormat};
