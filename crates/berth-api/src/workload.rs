//! Workload definitions.
//!
//! A workload is one unit of admission: a named set of pod templates with
//! replica counts, routed to a [queue](crate::queue::QueueSpec) and, once
//! admitted, stamped with the pool and flavors it was admitted under.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::resource::{ResourceList, ResourceName};

/// One container of a pod template. Only the requests matter for
/// admission; limits and images stay with the cluster that runs the pods.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Container {
    pub name: String,
    #[serde(default)]
    pub requests: ResourceList,
}

/// Pod template of a pod set.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PodSpec {
    #[serde(default)]
    pub containers: Vec<Container>,
    /// Run sequentially before the main containers start.
    #[serde(default)]
    pub init_containers: Vec<Container>,
    /// Per-pod runtime overhead, added on top of container requests.
    #[serde(default)]
    pub overhead: ResourceList,
}

/// A homogeneous group of pods: one template, `count` replicas.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PodSet {
    pub name: String,
    pub count: u32,
    #[serde(default)]
    pub spec: PodSpec,
}

/// Flavor assignment for one pod set, recorded at admission.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PodSetFlavors {
    pub name: String,
    #[serde(default)]
    pub flavors: BTreeMap<ResourceName, String>,
}

/// Set once a workload is admitted; names the pool that took it and the
/// flavor each pod set resource was charged against.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Admission {
    pub cluster_queue: String,
    #[serde(default)]
    pub pod_set_flavors: Vec<PodSetFlavors>,
}

/// A unit of admission, identified by `namespace/name`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorkloadSpec {
    pub namespace: String,
    pub name: String,
    /// Queue this workload was submitted to.
    #[serde(default)]
    pub queue_name: String,
    #[serde(default)]
    pub priority: Option<i32>,
    /// Creation time as seconds since the Unix epoch.
    pub created_at: u64,
    #[serde(default)]
    pub pod_sets: Vec<PodSet>,
    #[serde(default)]
    pub admission: Option<Admission>,
}

impl WorkloadSpec {
    /// `namespace/name`, unique across the cluster.
    pub fn key(&self) -> String {
        format!("{}/{}", self.namespace, self.name)
    }

    /// Effective priority; a workload without one is priority zero.
    pub fn priority(&self) -> i32 {
        self.priority.unwrap_or_default()
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
