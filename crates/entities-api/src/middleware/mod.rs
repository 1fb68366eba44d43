//! # Middleware Stack
//!
//! Tower middleware for the API layer:
//! - [`tracing_layer`]: request/response tracing with `TraceLayer`.
//! - [`metrics`]: Prometheus request metrics.
//!
//! Version reporting and enforcement live in [`crate::versioning`].

pub mod metrics;
pub mod tracing_layer;
