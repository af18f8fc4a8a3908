//! Statistics dump subsystem.
//!
//! # Data Flow
//! ```text
//! AdminChannel::execute("show stat")
//!     → snapshot.rs (strip marker, split rows and fields)
//!     → schema.rs (pinned column offsets)
//!     → MemberRecord { pool_name, server_name, status, weight }
//! ```
//!
//! # Design Decisions
//! - Rebuilt from the live dump on every run; never cached
//! - Only the columns reconciliation reads are decoded
//! - Offsets live in one versioned table so a new layout is a new constant

pub mod schema;
pub mod snapshot;

pub use schema::{StatSchema, HAPROXY_1_5};
pub use snapshot::{MemberRecord, StatSnapshot, MAINTENANCE_STATUS};
