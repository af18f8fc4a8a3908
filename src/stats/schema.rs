//! Column layout of the `show stat` CSV dump.
//!
//! Fields are located by position, not by name. The offsets below match the
//! HAProxy 1.5 statistics schema. A protocol upgrade that reorders columns
//! will not fail here; it will feed the wrong values into the reconcile
//! decision. `StatSnapshot::parse` compares the dump's header against
//! [`StatSchema::expected_header`] and warns on mismatch, but never
//! re-derives offsets from it.

/// Named column offsets for one statistics schema version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatSchema {
    /// Schema label used in log output.
    pub version: &'static str,
    /// Proxy (backend pool) name, `pxname`.
    pub pool_name: usize,
    /// Server (member) name, `svname`.
    pub server_name: usize,
    /// Operational status, `status`.
    pub status: usize,
    /// Effective weight, `weight`.
    pub weight: usize,
}

/// HAProxy 1.5 statistics layout.
pub const HAPROXY_1_5: StatSchema = StatSchema {
    version: "haproxy-1.5",
    pool_name: 0,
    server_name: 1,
    status: 17,
    weight: 18,
};

impl StatSchema {
    /// Minimum number of fields a member row needs for every offset to resolve.
    pub fn min_fields(&self) -> usize {
        [self.pool_name, self.server_name, self.status, self.weight]
            .into_iter()
            .max()
            .unwrap_or(0)
            + 1
    }

    /// Header names expected at each pinned offset.
    pub fn expected_header(&self) -> [(usize, &'static str); 4] {
        [
            (self.pool_name, "pxname"),
            (self.server_name, "svname"),
            (self.status, "status"),
            (self.weight, "weight"),
        ]
    }
}

impl Default for StatSchema {
    fn default() -> Self {
        HAPROXY_1_5
    }
}
