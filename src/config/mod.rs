//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → RouterConfig (validated, immutable)
//!     → consumed once when the Router is built
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the backend registry never changes at runtime
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    AdminConfig, BackendEntry, HealthConfig, ListenerConfig, ObservabilityConfig,
    RateLimitConfig, RouterConfig, TimeoutConfig,
};
pub use validation::ValidationError;
