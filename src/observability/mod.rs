//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events (structured fields: backend, host, status, weight)
//!     → spans: reconcile (invocation_id) ⊃ exchange (exchange_id, socket)
//!
//! Consumers:
//!     → logging.rs subscriber (stderr, pretty or JSON)
//! ```
//!
//! # Design Decisions
//! - stdout carries only the outcome; logs never interleave with it
//! - Invocation ID flows through every exchange of one run

pub mod logging;

pub use logging::init_logging;
