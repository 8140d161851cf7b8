//! berth-api — definition types shared across the berth crates.
//!
//! Everything here is plain data: workloads, queues, pools, and the
//! resource quantities they request. The queueing core consumes these
//! types by value and keeps its own copies, so definitions carry no
//! behavior beyond parsing, rendering, and key derivation.
//!
//! # Conventions
//!
//! Namespaced objects are identified by composite `{namespace}/{name}`
//! keys. Quantities use the suffix notation of workload definitions
//! (`"500m"`, `"1.5Gi"`); cpu is accounted in thousandths of a core,
//! every other resource in whole units.

pub mod quantity;
pub mod queue;
pub mod resource;
pub mod workload;

pub use quantity::{Format, ParseQuantityError, Quantity};
pub use queue::{ClusterQueueSpec, QueueSpec, STRICT_FIFO};
pub use resource::{ResourceList, ResourceName, HUGE_PAGES_PREFIX};
pub use workload::{Admission, Container, PodSet, PodSetFlavors, PodSpec, WorkloadSpec};
