//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! RoutingRequest (prompt, capabilities, preferred backend)
//!     → router.rs (Router::route)
//!     → resilience::fallback (ordered attempts)
//!     → Return: RoutingResult (success or structured failure)
//! ```
//!
//! # Design Decisions
//! - Registry compiled at startup, immutable at runtime
//! - Failures are values, never errors or panics
//! - Requests are independent and may complete out of order

pub mod request;
pub mod result;
pub mod router;

pub use request::RoutingRequest;
pub use result::{Attempt, AttemptOutcome, FailureKind, RoutedResponse, RoutingFailure, RoutingResult};
pub use router::Router;
