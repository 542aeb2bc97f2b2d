//! Per-backend rate limiting.
//!
//! # Data Flow
//! ```text
//! Candidate considered by the fallback executor
//!     → window.rs try_admit (roll window if expired, check-and-increment)
//!     → admitted: attempt proceeds
//!     → rejected: candidate skipped for this request, never queued
//! ```
//!
//! # Design Decisions
//! - Fixed window, not a token bucket: backends publish per-minute quotas
//! - Check-and-increment happens under the backend's own mutex
//! - Advisory for selection; the upstream enforces its own hard limit

pub mod window;

pub use window::{RateLimiter, WindowUsage};
