//! Queue and pool definitions.

use serde::{Deserialize, Serialize};

/// The one queueing strategy currently understood by pools. Pools created
/// with any other strategy string are rejected.
pub const STRICT_FIFO: &str = "strict_fifo";

/// A namespaced submission point. Workloads name a queue; the queue names
/// the pool that actually admits them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QueueSpec {
    pub namespace: String,
    pub name: String,
    /// Pool this queue feeds into.
    pub cluster_queue: String,
}

impl QueueSpec {
    /// `namespace/name`, unique across the cluster.
    pub fn key(&self) -> String {
        format!("{}/{}", self.namespace, self.name)
    }
}

/// A cluster-scoped admission pool.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClusterQueueSpec {
    pub name: String,
    pub queueing_strategy: String,
}

// ── Tests ───────────────────────────────────────────────────────────────────
