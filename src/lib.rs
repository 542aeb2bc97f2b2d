//! Multi-backend request router.
//!
//! Selects among interchangeable text-generation backends, executes a request
//! against one of them and falls back to alternates on failure, while tracking
//! per-backend health, request windows and latency.

pub mod admin;
pub mod client;
pub mod config;
pub mod error;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod load_balancer;
pub mod observability;
pub mod rate_limit;
pub mod registry;
pub mod resilience;
pub mod routing;
pub mod status;

pub use config::RouterConfig;
pub use error::RouterError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::{Router, RoutingRequest, RoutingResult};
