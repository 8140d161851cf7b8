//! berth-queue — the admission-ordering core of berth.
//!
//! Decides which pending workload becomes eligible for admission next:
//! - `Queue`: an unordered, keyed holding set per submission queue
//! - `ClusterQueue`: the ordered pending set of one admission pool,
//!   backed by a key-indexed binary heap with O(log n) insert, update,
//!   and removal at arbitrary keys
//! - `Manager`: the process-wide registry routing workloads from queues
//!   into pools and handing out pool heads
//!
//! The core holds no locks across calls, never blocks, and persists
//! nothing; it is rebuilt by replaying definitions on process start.
//! Admission itself, matching a head against available capacity, is
//! the caller's business.

pub mod cluster_queue;
pub mod error;
pub mod heap;
pub mod manager;
pub mod queue;

pub use cluster_queue::ClusterQueue;
pub use error::{QueueError, QueueResult};
pub use heap::IndexedHeap;
pub use manager::Manager;
pub use queue::{queue_key_for_workload, Queue};
