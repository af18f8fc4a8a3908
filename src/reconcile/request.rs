//! Reconciliation input and output types.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::ReconcileError;
use crate::reconcile::command::{AdminCommand, CommandBatch};
use crate::reconcile::weight::WeightExpr;

/// Target operational state for the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DesiredState {
    /// Accepting traffic.
    Enabled,
    /// Drained for maintenance.
    Disabled,
}

impl FromStr for DesiredState {
    type Err = ReconcileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "enabled" => Ok(DesiredState::Enabled),
            "disabled" => Ok(DesiredState::Disabled),
            other => Err(ReconcileError::UnknownState(other.to_string())),
        }
    }
}

impl fmt::Display for DesiredState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DesiredState::Enabled => f.write_str("enabled"),
            DesiredState::Disabled => f.write_str("disabled"),
        }
    }
}

/// Everything one reconciliation needs, fixed before the engine runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileRequest {
    pub state: DesiredState,
    pub host: String,
    /// Backend pool; auto-detected from the statistics dump when absent.
    pub backend: Option<String>,
    pub weight: Option<WeightExpr>,
    /// Only honoured for [`DesiredState::Disabled`].
    pub shutdown_sessions: bool,
    pub dry_run: bool,
}

impl ReconcileRequest {
    pub fn new(state: DesiredState, host: impl Into<String>) -> Self {
        Self {
            state,
            host: host.into(),
            backend: None,
            weight: None,
            shutdown_sessions: false,
            dry_run: false,
        }
    }

    pub fn with_backend(mut self, backend: impl Into<String>) -> Self {
        self.backend = Some(backend.into());
        self
    }

    pub fn with_weight(mut self, weight: WeightExpr) -> Self {
        self.weight = Some(weight);
        self
    }

    pub fn with_shutdown_sessions(mut self, shutdown_sessions: bool) -> Self {
        self.shutdown_sessions = shutdown_sessions;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// What the engine decided for one run.
///
/// `query` is always sent. `mutations` is empty when the server already
/// matches the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub query: AdminCommand,
    pub mutations: Vec<AdminCommand>,
}

impl Decision {
    pub fn changed(&self) -> bool {
        !self.mutations.is_empty()
    }

    /// Query followed by every mutation, in order.
    pub fn composite(&self) -> CommandBatch {
        std::iter::once(self.query.clone())
            .chain(self.mutations.iter().cloned())
            .collect()
    }

    /// Query alone, for no-op and dry runs.
    pub fn query_only(&self) -> CommandBatch {
        std::iter::once(self.query.clone()).collect()
    }
}

/// Result reported back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub changed: bool,
    /// Trimmed response of the last executed command line.
    pub stdout: String,
    /// The last command line sent.
    pub command: String,
    pub dry_run: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::command::ServerRef;

    #[test]
    fn test_desired_state_parse() {
        assert_eq!("enabled".parse::<DesiredState>().unwrap(), DesiredState::Enabled);
        assert_eq!("disabled".parse::<DesiredState>().unwrap(), DesiredState::Disabled);

        let err = "drained".parse::<DesiredState>().unwrap_err();
        assert!(err.is_usage());
        assert_eq!(err.to_string(), "unknown state specified: 'drained'");
        assert!("Enabled".parse::<DesiredState>().is_err());
    }

    #[test]
    fn test_decision_changed_tracks_mutations() {
        let target = ServerRef::new("www", "web1");
        let noop = Decision {
            query: AdminCommand::GetWeight(target.clone()),
            mutations: Vec::new(),
        };
        assert!(!noop.changed());
        assert_eq!(noop.composite(), noop.query_only());

        let change = Decision {
            query: AdminCommand::GetWeight(target.clone()),
            mutations: vec![AdminCommand::EnableServer(target)],
        };
        assert!(change.changed());
        assert_eq!(
            change.composite().to_string(),
            "get weight www/web1; enable server www/web1"
        );
        assert_eq!(change.query_only().to_string(), "get weight www/web1");
    }
}
