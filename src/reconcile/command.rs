//! Runtime API command vocabulary.

use std::fmt;

use crate::reconcile::weight::WeightExpr;

/// Separator that chains several commands on one line.
pub const COMMAND_SEPARATOR: &str = "; ";

/// A `<backend>/<server>` reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerRef {
    pub backend: String,
    pub server: String,
}

impl ServerRef {
    pub fn new(backend: impl Into<String>, server: impl Into<String>) -> Self {
        Self {
            backend: backend.into(),
            server: server.into(),
        }
    }
}

impl fmt::Display for ServerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.backend, self.server)
    }
}

/// One admin socket command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminCommand {
    ShowStat,
    GetWeight(ServerRef),
    SetWeight(ServerRef, WeightExpr),
    EnableServer(ServerRef),
    DisableServer(ServerRef),
    ShutdownSessions(ServerRef),
}

impl AdminCommand {
    /// Whether the command changes load balancer state.
    pub fn is_mutating(&self) -> bool {
        !matches!(self, AdminCommand::ShowStat | AdminCommand::GetWeight(_))
    }
}

impl fmt::Display for AdminCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdminCommand::ShowStat => write!(f, "show stat"),
            AdminCommand::GetWeight(target) => write!(f, "get weight {}", target),
            AdminCommand::SetWeight(target, weight) => {
                write!(f, "set weight {} {}", target, weight)
            }
            AdminCommand::EnableServer(target) => write!(f, "enable server {}", target),
            AdminCommand::DisableServer(target) => write!(f, "disable server {}", target),
            AdminCommand::ShutdownSessions(target) => {
                write!(f, "shutdown sessions server {}", target)
            }
        }
    }
}

/// Commands sent together as a single line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandBatch(Vec<AdminCommand>);

impl CommandBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: AdminCommand) {
        self.0.push(command);
    }

    pub fn commands(&self) -> &[AdminCommand] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<AdminCommand> for CommandBatch {
    fn from_iter<I: IntoIterator<Item = AdminCommand>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for CommandBatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, command) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(COMMAND_SEPARATOR)?;
            }
            write!(f, "{}", command)?;
        }
        Ok(())
    }
}
