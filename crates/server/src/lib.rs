//! HTTP server for TuneForge.
//!
//! Exposes playlist generation, history and connection checks under
//! `/api/v1`, plus Prometheus metrics at `/metrics`.

pub mod api;
pub mod metrics;
pub mod state;
