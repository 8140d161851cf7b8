//! berth-workload — resource demand accounting for queued workloads.
//!
//! Turns workload definitions into accounted integer demand: cpu in
//! thousandths of a core, every other resource in whole units. Demand is
//! computed per pod set as `(container sum, lifted to the largest init
//! container, plus overhead) * count`, and cached on a [`WorkloadInfo`]
//! snapshot that the queueing core passes around by value.

pub mod info;
pub mod requests;

pub use info::{PodSetResources, WorkloadInfo};
pub use requests::{pod_requests, resource_quantity, resource_value, Requests};
