//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, trace, timeout)
//!     → POST /v1/route → Router::route → RoutingResult as JSON
//!     → /admin/* → admin module (bearer auth)
//! ```
//!
//! A dropped client connection or an elapsed request timeout drops the
//! handler future, which aborts the in-flight backend call.

pub mod server;

pub use server::{AppState, HttpServer};
