//! Reconciliation subsystem.
//!
//! # Data Flow
//! ```text
//! ReconcileRequest (validated at the boundary)
//!     → engine.rs: Load (StatSnapshot → MemberRecord, backend auto-detect)
//!     → engine.rs: Evaluate (status == MAINT, weight.rs policy)
//!     → engine.rs: plan() → Decision { query, mutations }
//!     → command.rs: CommandBatch joined with "; "
//!     → AdminChannel::execute (single round trip)
//!     → Outcome { changed, stdout, command }
//! ```
//!
//! # Design Decisions
//! - Deciding is a pure function of request and member record
//! - `get weight` is always sent, so every run leaves the same trail
//! - Dry runs send the query alone but report what a live run would
//! - No rollback: a failed composite is reported and the run can be repeated

pub mod command;
pub mod engine;
pub mod request;
pub mod weight;

pub use command::{AdminCommand, CommandBatch, ServerRef};
pub use engine::{plan, ReconcileEngine};
pub use request::{Decision, DesiredState, Outcome, ReconcileRequest};
pub use weight::{is_change_needed, WeightExpr};
