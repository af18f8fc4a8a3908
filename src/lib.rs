//! HAProxy backend server reconciliation over the runtime admin socket.

pub mod config;
pub mod error;
pub mod net;
pub mod observability;
pub mod reconcile;
pub mod stats;

pub use config::schema::AppConfig;
pub use error::{ReconcileError, ReconcileResult};
pub use net::{AdminChannel, SocketTransport};
pub use reconcile::{DesiredState, Outcome, ReconcileEngine, ReconcileRequest, WeightExpr};
