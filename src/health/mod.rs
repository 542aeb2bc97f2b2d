//! Health tracking subsystem.
//!
//! # Data Flow
//! ```text
//! Passive tracking (tracker.rs):
//!     Attempt outcome observed by the fallback executor
//!     → success: reset failures, record response time
//!     → failure: increment failures, mark unhealthy at threshold
//!
//! State machine (state.rs):
//!     Healthy ←→ Unhealthy
//!     Unhealthy → Healthy also happens after the recovery window (half-open)
//! ```
//!
//! # Design Decisions
//! - No active probing; recovery is time-based and validated by real traffic
//! - No backend is ever permanently blacklisted
//! - Health state is per-backend and in-memory only

pub mod state;
pub mod tracker;

pub use state::{HealthPolicy, HealthState, Outcome, Transition};
pub use tracker::{HealthSnapshot, HealthTracker};
