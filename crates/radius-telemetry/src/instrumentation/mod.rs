//! HTTP instrumentation layers.

pub mod axum;

pub use axum::TraceLayer as AxumTraceLayer;
