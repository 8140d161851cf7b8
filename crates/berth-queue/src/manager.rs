//! Registry of queues and pools.
//!
//! The `Manager` owns every [`Queue`] and [`ClusterQueue`] in the process
//! and serializes all access behind one lock, taken per call. Operations
//! are synchronous and never block on queue contents: an empty registry
//! simply yields no heads.
//!
//! Nothing is persisted. On process start the reconciliation layer
//! replays the definitions it finds in the authoritative store through
//! these same operations: pools and queues first, then workloads.
//! Workloads observed before their queue or pool are reported back via
//! the boolean results so the caller can retry once the missing piece
//! arrives; a pool created late adopts the matching queues by itself.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, info};

use berth_api::queue::{ClusterQueueSpec, QueueSpec};
use berth_api::workload::WorkloadSpec;
use berth_workload::WorkloadInfo;

use crate::cluster_queue::ClusterQueue;
use crate::error::{QueueError, QueueResult};
use crate::queue::{queue_key_for_workload, Queue};

struct ManagerInner {
    /// Queues by `{namespace}/{name}`.
    queues: HashMap<String, Queue>,
    /// Pools by name.
    cluster_queues: HashMap<String, ClusterQueue>,
}

/// Process-wide queueing registry.
pub struct Manager {
    inner: Mutex<ManagerInner>,
}

impl Manager {
    pub fn new() -> Self {
        Manager {
            inner: Mutex::new(ManagerInner {
                queues: HashMap::new(),
                cluster_queues: HashMap::new(),
            }),
        }
    }

    fn locked(&self) -> MutexGuard<'_, ManagerInner> {
        // Every operation completes its mutations before returning, so
        // state behind a poisoned lock is still consistent.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Activates a pool. Queues already bound to it contribute their
    /// workloads immediately; returns whether that made anything newly
    /// pending, so the caller knows to kick off an admission round.
    pub fn add_cluster_queue(&self, spec: &ClusterQueueSpec) -> QueueResult<bool> {
        let mut guard = self.locked();
        let inner = &mut *guard;
        if inner.cluster_queues.contains_key(&spec.name) {
            return Err(QueueError::ClusterQueueAlreadyExists(spec.name.clone()));
        }
        let mut cq = ClusterQueue::new(spec)?;
        let mut added = false;
        for queue in inner.queues.values() {
            if queue.cluster_queue == spec.name && cq.add_from_queue(queue) {
                added = true;
            }
        }
        inner.cluster_queues.insert(spec.name.clone(), cq);
        info!(
            cluster_queue = %spec.name,
            strategy = %spec.queueing_strategy,
            "cluster queue added"
        );
        Ok(added)
    }

    /// Applies a changed pool definition; the strategy is re-validated.
    pub fn update_cluster_queue(&self, spec: &ClusterQueueSpec) -> QueueResult<()> {
        let mut inner = self.locked();
        let Some(cq) = inner.cluster_queues.get_mut(&spec.name) else {
            return Err(QueueError::ClusterQueueNotFound(spec.name.clone()));
        };
        cq.update(spec)?;
        info!(
            cluster_queue = %spec.name,
            strategy = %spec.queueing_strategy,
            "cluster queue updated"
        );
        Ok(())
    }

    /// Drops a pool and its pending set. Queues bound to it stay, with
    /// their membership, until their own definitions change.
    pub fn delete_cluster_queue(&self, spec: &ClusterQueueSpec) {
        let mut inner = self.locked();
        if inner.cluster_queues.remove(&spec.name).is_none() {
            return;
        }
        info!(cluster_queue = %spec.name, "cluster queue deleted");
    }

    /// Registers a queue. Workloads naming it are replayed separately by
    /// the caller, so a fresh queue starts empty.
    pub fn add_queue(&self, spec: &QueueSpec) -> QueueResult<()> {
        let mut inner = self.locked();
        let key = spec.key();
        if inner.queues.contains_key(&key) {
            return Err(QueueError::QueueAlreadyExists(key));
        }
        inner.queues.insert(key.clone(), Queue::new(spec));
        info!(queue = %key, cluster_queue = %spec.cluster_queue, "queue added");
        Ok(())
    }

    /// Applies a changed queue definition. A changed pool binding moves
    /// the queue's whole membership from the old pool to the new one;
    /// returns whether the new pool gained anything.
    pub fn update_queue(&self, spec: &QueueSpec) -> QueueResult<bool> {
        let mut guard = self.locked();
        let inner = &mut *guard;
        let key = spec.key();
        let Some(queue) = inner.queues.get_mut(&key) else {
            return Err(QueueError::QueueNotFound(key));
        };
        let mut added = false;
        if queue.cluster_queue != spec.cluster_queue {
            if let Some(old) = inner.cluster_queues.get_mut(&queue.cluster_queue) {
                old.delete_from_queue(queue);
            }
            if let Some(new) = inner.cluster_queues.get_mut(&spec.cluster_queue) {
                added = new.add_from_queue(queue);
            }
            info!(
                queue = %key,
                from = %queue.cluster_queue,
                to = %spec.cluster_queue,
                "queue moved to another cluster queue"
            );
        }
        queue.update(spec);
        Ok(added)
    }

    /// Unregisters a queue, removing its workloads from the bound pool
    /// first. Unknown queues are a no-op.
    pub fn delete_queue(&self, spec: &QueueSpec) {
        let mut guard = self.locked();
        let inner = &mut *guard;
        let key = spec.key();
        let Some(queue) = inner.queues.get(&key) else {
            return;
        };
        if let Some(cq) = inner.cluster_queues.get_mut(&queue.cluster_queue) {
            cq.delete_from_queue(queue);
        }
        inner.queues.remove(&key);
        info!(queue = %key, "queue deleted");
    }

    /// Routes a workload into the queue it names and the pool behind it.
    /// Returns false if the queue or pool is not registered yet; the
    /// caller retries once they are.
    pub fn add_or_update_workload(&self, w: WorkloadSpec) -> bool {
        self.locked().add_or_update_workload(w)
    }

    /// Applies a changed workload definition, moving it between queues
    /// when the definition's queue name changed.
    pub fn update_workload(&self, old: &WorkloadSpec, w: WorkloadSpec) -> bool {
        let mut inner = self.locked();
        let old_queue = queue_key_for_workload(old);
        if old_queue != queue_key_for_workload(&w) {
            inner.delete_workload(old, &old_queue);
        }
        inner.add_or_update_workload(w)
    }

    /// Removes a workload from its queue and pool. Unknown workloads and
    /// queues are a no-op.
    pub fn delete_workload(&self, w: &WorkloadSpec) {
        self.locked().delete_workload(w, &queue_key_for_workload(w));
    }

    /// Puts a previously popped workload back, unless it was admitted in
    /// the meantime or its queue is gone. Returns whether the pool gained
    /// it back.
    pub fn requeue_workload(&self, info: &WorkloadInfo) -> bool {
        if info.obj.admission.is_some() {
            return false;
        }
        let mut guard = self.locked();
        let inner = &mut *guard;
        let queue_key = queue_key_for_workload(&info.obj);
        let Some(queue) = inner.queues.get_mut(&queue_key) else {
            return false;
        };
        queue.items.insert(info.key(), info.clone());
        let Some(cq) = inner.cluster_queues.get_mut(&queue.cluster_queue) else {
            return false;
        };
        let added = cq.push_if_not_present(info);
        if added {
            debug!(workload = %info.key(), queue = %queue_key, "workload requeued");
        }
        added
    }

    /// Pops the head of every pool, stamped with the pool it came from.
    /// Pools with nothing pending contribute nothing; an empty result
    /// means there is nothing to attempt admission for right now.
    pub fn heads(&self) -> Vec<WorkloadInfo> {
        let mut inner = self.locked();
        let mut heads = Vec::new();
        for (name, cq) in inner.cluster_queues.iter_mut() {
            let Some(mut info) = cq.pop() else {
                continue;
            };
            info.cluster_queue = name.clone();
            heads.push(info);
        }
        debug!(count = heads.len(), "collected cluster queue heads");
        heads
    }

    /// Number of workloads a queue currently holds, for status reporting.
    pub fn pending_workloads(&self, spec: &QueueSpec) -> QueueResult<usize> {
        let inner = self.locked();
        let key = spec.key();
        match inner.queues.get(&key) {
            Some(queue) => Ok(queue.len()),
            None => Err(QueueError::QueueNotFound(key)),
        }
    }

    /// Number of workloads pending admission in a pool's ordered index.
    pub fn pending(&self, spec: &ClusterQueueSpec) -> Option<usize> {
        let inner = self.locked();
        inner.cluster_queues.get(&spec.name).map(ClusterQueue::len)
    }
}

impl Default for Manager {
    fn default() -> Self {
        Manager::new()
    }
}

impl ManagerInner {
    fn add_or_update_workload(&mut self, w: WorkloadSpec) -> bool {
        let queue_key = queue_key_for_workload(&w);
        let workload_key = w.key();
        let Some(queue) = self.queues.get_mut(&queue_key) else {
            debug!(
                workload = %workload_key,
                queue = %queue_key,
                "no queue for workload; ignored for now"
            );
            return false;
        };
        queue.add_or_update(w.clone());
        let Some(cq) = self.cluster_queues.get_mut(&queue.cluster_queue) else {
            debug!(
                workload = %workload_key,
                cluster_queue = %queue.cluster_queue,
                "no cluster queue for workload; ignored for now"
            );
            return false;
        };
        cq.push_or_update(w);
        debug!(workload = %workload_key, queue = %queue_key, "workload queued");
        true
    }

    fn delete_workload(&mut self, w: &WorkloadSpec, queue_key: &str) {
        let Some(queue) = self.queues.get_mut(queue_key) else {
            return;
        };
        queue.items.remove(&w.key());
        if let Some(cq) = self.cluster_queues.get_mut(&queue.cluster_queue) {
            cq.delete(w);
        }
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
