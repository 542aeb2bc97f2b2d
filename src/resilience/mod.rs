//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to router:
//!     → fallback.rs (order candidates, skip unhealthy / rate limited)
//!     → timeouts.rs (enforce per-attempt deadline)
//!     → On failure: record into health tracker, try next candidate
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every backend call has a deadline
//! - One pass over the candidates per request; callers re-invoke to retry
//! - Health tracking prevents hammering a failing backend

pub mod fallback;
pub mod timeouts;

pub use fallback::FallbackExecutor;
