//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → CLI flags override individual fields
//! ```
//!
//! # Design Decisions
//! - All fields have defaults so the file can be omitted entirely
//! - Validation separates syntactic (serde) from semantic checks
//! - Per-run parameters (state, host, weight) are not configuration;
//!   they arrive as a `ReconcileRequest`

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::AppConfig;
pub use schema::AdminSocketConfig;
pub use schema::ObservabilityConfig;
