//! Statistics snapshot and member lookup.
//!
//! # Responsibilities
//! - Issue `show stat` over the admin channel
//! - Split the CSV dump into rows of fields
//! - Locate the row for one server and decode it into a [`MemberRecord`]

use serde::Serialize;

use crate::error::{ReconcileError, ReconcileResult};
use crate::net::AdminChannel;
use crate::reconcile::command::AdminCommand;
use crate::stats::schema::StatSchema;

/// Status reported for a server drained for maintenance.
pub const MAINTENANCE_STATUS: &str = "MAINT";

/// The three fields reconciliation needs from one member row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberRecord {
    pub pool_name: String,
    pub server_name: String,
    pub status: String,
    pub weight: String,
}

impl MemberRecord {
    pub fn in_maintenance(&self) -> bool {
        self.status == MAINTENANCE_STATUS
    }
}

/// One parsed `show stat` response.
#[derive(Debug, Clone, Default)]
pub struct StatSnapshot {
    schema: StatSchema,
    header: Option<Vec<String>>,
    rows: Vec<Vec<String>>,
}

impl StatSnapshot {
    /// Fetch and parse a fresh snapshot.
    pub async fn fetch<C: AdminChannel>(channel: &C, schema: StatSchema) -> ReconcileResult<Self> {
        let raw = channel.execute(&AdminCommand::ShowStat.to_string()).await?;
        let snapshot = Self::parse(&raw, schema);
        tracing::debug!(
            rows = snapshot.rows.len(),
            schema = schema.version,
            "Statistics snapshot loaded"
        );
        Ok(snapshot)
    }

    /// Parse a raw dump.
    ///
    /// The leading `# ` marker and surrounding whitespace are stripped. When
    /// the dump starts with the marker its first line is the column header and
    /// is kept apart from the member rows.
    pub fn parse(raw: &str, schema: StatSchema) -> Self {
        let has_header = raw.starts_with('#');
        let body = raw.trim_start_matches(['#', ' ']).trim();

        let mut lines = body.lines().map(|l| l.trim_end_matches('\r'));
        let header = if has_header {
            lines.next().map(split_fields)
        } else {
            None
        };

        let rows = lines
            .filter(|l| !l.is_empty())
            .map(split_fields)
            .collect();

        let snapshot = Self {
            schema,
            header,
            rows,
        };
        snapshot.check_header();
        snapshot
    }

    /// All member rows, header excluded.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn header(&self) -> Option<&[String]> {
        self.header.as_deref()
    }

    /// Find the first row whose server name equals `host`.
    pub fn find_member(&self, host: &str) -> ReconcileResult<MemberRecord> {
        let schema = &self.schema;
        let mut matches = self
            .rows
            .iter()
            .filter(|fields| fields.get(schema.server_name).map(String::as_str) == Some(host));

        let fields = matches.next().ok_or_else(|| ReconcileError::MemberNotFound {
            host: host.to_string(),
        })?;

        let extra = matches.count();
        if extra > 0 {
            tracing::warn!(
                host,
                additional = extra,
                "Server appears in several backends; using the first match"
            );
        }

        if fields.len() < schema.min_fields() {
            return Err(ReconcileError::MalformedRecord {
                host: host.to_string(),
                expected: schema.min_fields(),
                actual: fields.len(),
            });
        }

        Ok(MemberRecord {
            pool_name: fields[schema.pool_name].clone(),
            server_name: fields[schema.server_name].clone(),
            status: fields[schema.status].clone(),
            weight: fields[schema.weight].clone(),
        })
    }

    fn check_header(&self) {
        let Some(header) = &self.header else {
            return;
        };
        for (offset, expected) in self.schema.expected_header() {
            let found = header.get(offset).map(String::as_str);
            if found != Some(expected) {
                tracing::warn!(
                    offset,
                    expected,
                    found = found.unwrap_or("<missing>"),
                    schema = self.schema.version,
                    "Statistics header does not match pinned column layout"
                );
            }
        }
    }
}

fn split_fields(line: &str) -> Vec<String> {
    line.split(',').map(str::to_string).collect()
}
