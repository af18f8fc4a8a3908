//! Reconciliation engine.
//!
//! # Responsibilities
//! - Load the member's current status and weight from a fresh snapshot
//! - Decide the minimal set of mutating commands for the desired state
//! - Send query and mutations as one composite line (one round trip)
//! - Report the last response and whether anything changed

use tracing::Instrument;
use uuid::Uuid;

use crate::error::ReconcileResult;
use crate::net::AdminChannel;
use crate::reconcile::command::{AdminCommand, ServerRef};
use crate::reconcile::request::{Decision, DesiredState, Outcome, ReconcileRequest};
use crate::reconcile::weight;
use crate::stats::{MemberRecord, StatSchema, StatSnapshot};

/// Drives one server towards a [`ReconcileRequest`] over an [`AdminChannel`].
#[derive(Debug, Clone)]
pub struct ReconcileEngine<C> {
    channel: C,
    schema: StatSchema,
}

impl<C: AdminChannel> ReconcileEngine<C> {
    /// Create an engine using the default statistics layout.
    pub fn new(channel: C) -> Self {
        Self {
            channel,
            schema: StatSchema::default(),
        }
    }

    /// Use a different statistics column layout.
    pub fn with_schema(mut self, schema: StatSchema) -> Self {
        self.schema = schema;
        self
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    /// Run one reconciliation.
    ///
    /// Exactly one round trip follows the snapshot read. It carries the
    /// `get weight` query and, on a live run that needs changes, every
    /// mutation on the same line.
    pub async fn reconcile(&self, request: &ReconcileRequest) -> ReconcileResult<Outcome> {
        let span = tracing::info_span!(
            "reconcile",
            invocation_id = %Uuid::new_v4(),
            host = %request.host,
            state = %request.state,
            dry_run = request.dry_run,
        );

        async move {
            self.channel.ensure_available().await?;

            // Load
            let snapshot = StatSnapshot::fetch(&self.channel, self.schema).await?;
            let member = snapshot.find_member(&request.host)?;
            let backend = match &request.backend {
                Some(backend) => {
                    if *backend != member.pool_name {
                        tracing::warn!(
                            requested = %backend,
                            found = %member.pool_name,
                            "Status and weight read from a row in another backend"
                        );
                    }
                    backend.clone()
                }
                None => member.pool_name.clone(),
            };

            tracing::info!(
                backend = %backend,
                status = %member.status,
                weight = %member.weight,
                "Member record loaded"
            );

            // Evaluate and decide
            let decision = plan(request, &member, &backend);
            let changed = decision.changed();

            // Execute
            let batch = if changed && !request.dry_run {
                decision.composite()
            } else {
                decision.query_only()
            };
            let command = batch.to_string();

            if changed && request.dry_run {
                tracing::info!(
                    skipped = %decision.composite(),
                    "Check mode: mutations not applied"
                );
            }

            let response = self.channel.execute(&command).await?;
            tracing::info!(changed, command = %command, "Reconciliation complete");

            Ok(Outcome {
                changed,
                stdout: response.trim().to_string(),
                command,
                dry_run: request.dry_run,
            })
        }
        .instrument(span)
        .await
    }
}

/// Compute the commands that bring `member` to the requested state.
pub fn plan(request: &ReconcileRequest, member: &MemberRecord, backend: &str) -> Decision {
    let target = ServerRef::new(backend, request.host.as_str());
    let in_maintenance = member.in_maintenance();
    let mut mutations = Vec::new();

    match request.state {
        DesiredState::Enabled => {
            if request.shutdown_sessions {
                tracing::debug!("shutdown_sessions ignored when enabling");
            }

            let weight_change = weight::is_change_needed(request.weight.as_ref(), &member.weight);
            tracing::debug!(in_maintenance, weight_change, "Evaluated member");

            if weight_change {
                if let Some(weight) = &request.weight {
                    mutations.push(AdminCommand::SetWeight(target.clone(), weight.clone()));
                }
            }
            if in_maintenance {
                mutations.push(AdminCommand::EnableServer(target.clone()));
            }
        }
        DesiredState::Disabled => {
            if request.weight.is_some() {
                tracing::debug!("weight ignored when disabling");
            }
            tracing::debug!(in_maintenance, "Evaluated member");

            if !in_maintenance {
                mutations.push(AdminCommand::DisableServer(target.clone()));
                if request.shutdown_sessions {
                    mutations.push(AdminCommand::ShutdownSessions(target.clone()));
                }
            }
        }
    }

    Decision {
        query: AdminCommand::GetWeight(target),
        mutations,
    }
}
