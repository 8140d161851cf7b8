//! Queued-workload snapshots.
//!
//! A [`WorkloadInfo`] wraps one workload definition together with its
//! accounted demand, computed once up front so that admission decisions
//! never re-parse quantities. Infos are owned snapshots; whoever holds
//! one is free to mutate it without affecting anybody else's copy.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use berth_api::resource::ResourceName;
use berth_api::workload::WorkloadSpec;

use crate::requests::{pod_requests, Requests};

/// Accounted demand of one pod set: per-pod demand scaled by the replica
/// count, plus the flavors it was admitted under, if any.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PodSetResources {
    pub name: String,
    pub requests: Requests,
    #[serde(default)]
    pub flavors: BTreeMap<ResourceName, String>,
}

/// A workload with its demand precomputed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorkloadInfo {
    pub obj: WorkloadSpec,
    pub total_requests: Vec<PodSetResources>,
    /// Pool currently holding this workload; empty until it reaches one.
    #[serde(default)]
    pub cluster_queue: String,
}

impl WorkloadInfo {
    pub fn new(obj: WorkloadSpec) -> Self {
        let total_requests = total_requests(&obj);
        WorkloadInfo {
            obj,
            total_requests,
            cluster_queue: String::new(),
        }
    }

    /// `namespace/name` of the underlying workload.
    pub fn key(&self) -> String {
        self.obj.key()
    }
}

fn total_requests(w: &WorkloadSpec) -> Vec<PodSetResources> {
    w.pod_sets
        .iter()
        .map(|ps| {
            let mut requests = pod_requests(&ps.spec);
            requests.scale(i64::from(ps.count));
            PodSetResources {
                name: ps.name.clone(),
                requests,
                flavors: admitted_flavors(w, &ps.name),
            }
        })
        .collect()
}

fn admitted_flavors(w: &WorkloadSpec, pod_set: &str) -> BTreeMap<ResourceName, String> {
    match &w.admission {
        Some(admission) => admission
            .pod_set_flavors
            .iter()
            .find(|f| f.name == pod_set)
            .map(|f| f.flavors.clone())
            .unwrap_or_default(),
        None => BTreeMap::new(),
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
