//! HTTP/REST API layer for the BMO backend.
//!
//! Axum-based API under `/api/v1/` with CORS and request tracing, plus a
//! bare `/health` probe.

pub mod error;
pub mod handlers;
pub mod router;
