//! Admission pools and their ordered pending sets.

use berth_api::queue::{ClusterQueueSpec, STRICT_FIFO};
use berth_api::workload::WorkloadSpec;
use berth_workload::WorkloadInfo;

use crate::error::{QueueError, QueueResult};
use crate::heap::IndexedHeap;
use crate::queue::Queue;

type LessFn = fn(&WorkloadInfo, &WorkloadInfo) -> bool;

/// Strict priority-then-age order: higher priority pops first; equal
/// priorities pop in creation order. Entries equal on both counts have no
/// defined relative order.
fn strict_fifo(a: &WorkloadInfo, b: &WorkloadInfo) -> bool {
    let p1 = a.obj.priority();
    let p2 = b.obj.priority();
    if p1 != p2 {
        return p1 > p2;
    }
    a.obj.created_at < b.obj.created_at
}

fn ordering(strategy: &str) -> QueueResult<LessFn> {
    match strategy {
        STRICT_FIFO => Ok(strict_fifo),
        other => Err(QueueError::UnknownStrategy(other.to_string())),
    }
}

fn workload_info_key(info: &WorkloadInfo) -> String {
    info.key()
}

/// In-memory state of one pool: the set of workloads pending admission
/// against it, ordered by the pool's queueing strategy.
///
/// The index stores owned snapshots. Pushing hands the pool its own copy;
/// a caller that mutates its workload afterwards must push again for the
/// pool to notice.
pub struct ClusterQueue {
    pub queueing_strategy: String,

    heap: IndexedHeap<WorkloadInfo>,
}

impl ClusterQueue {
    /// Fails on an unrecognized strategy, leaving nothing behind.
    pub fn new(spec: &ClusterQueueSpec) -> QueueResult<Self> {
        let less = ordering(&spec.queueing_strategy)?;
        Ok(ClusterQueue {
            queueing_strategy: spec.queueing_strategy.clone(),
            heap: IndexedHeap::new(workload_info_key, less),
        })
    }

    /// Applies a changed pool definition. The strategy is validated like
    /// at construction; on error the pool is left as it was.
    pub fn update(&mut self, spec: &ClusterQueueSpec) -> QueueResult<()> {
        let less = ordering(&spec.queueing_strategy)?;
        self.queueing_strategy = spec.queueing_strategy.clone();
        self.heap.set_less(less);
        Ok(())
    }

    /// Adopts every workload of `queue` that is not already pending here.
    /// Returns whether anything new arrived, so the caller knows to kick
    /// off another admission round.
    pub fn add_from_queue(&mut self, queue: &Queue) -> bool {
        let mut added = false;
        for info in queue.items.values() {
            if self.push_if_not_present(info) {
                added = true;
            }
        }
        added
    }

    /// Drops every workload of `queue` from the pending set.
    pub fn delete_from_queue(&mut self, queue: &Queue) {
        for info in queue.items.values() {
            self.delete(&info.obj);
        }
    }

    /// Inserts a snapshot of `info` unless its key is already pending.
    /// Returns whether an insertion happened.
    pub fn push_if_not_present(&mut self, info: &WorkloadInfo) -> bool {
        if self.heap.contains(&info.key()) {
            return false;
        }
        self.heap.push_if_absent(info.clone())
    }

    /// Inserts the workload with freshly computed demand, or replaces the
    /// pending entry in place and restores order from its position. The
    /// replace path is what picks up changed priority or admission state.
    pub fn push_or_update(&mut self, w: WorkloadSpec) {
        self.heap.push_or_update(WorkloadInfo::new(w));
    }

    /// Removes the entry for this workload; absent keys are a no-op.
    pub fn delete(&mut self, w: &WorkloadSpec) {
        self.heap.remove(&w.key());
    }

    /// Removes and returns the next workload to attempt admission for.
    pub fn pop(&mut self) -> Option<WorkloadInfo> {
        self.heap.pop()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.heap.contains(key)
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use berth_api::queue::QueueSpec;

    fn sample_cluster_queue() -> ClusterQueue {
        ClusterQueue::new(&ClusterQueueSpec {
            name: "shared-pool".to_string(),
            queueing_strategy: STRICT_FIFO.to_string(),
        })
        .unwrap()
    }

    fn make_workload(name: &str, priority: i32, created_at: u64) -> WorkloadSpec {
        WorkloadSpec {
            namespace: "tenant-a".to_string(),
            name: name.to_string(),
            queue_name: "main".to_string(),
            priority: Some(priority),
            created_at,
            pod_sets: Vec::new(),
            admission: None,
        }
    }

    #[test]
    fn rejects_unknown_strategies() {
        let result = ClusterQueue::new(&ClusterQueueSpec {
            name: "shared-pool".to_string(),
            queueing_strategy: "best_effort".to_string(),
        });
        assert!(matches!(result, Err(QueueError::UnknownStrategy(s)) if s == "best_effort"));
    }

    #[test]
    fn update_validates_the_strategy_and_keeps_state_on_error() {
        let mut cq = sample_cluster_queue();
        cq.push_or_update(make_workload("w1", 0, 1));

        let err = cq.update(&ClusterQueueSpec {
            name: "shared-pool".to_string(),
            queueing_strategy: "lifo".to_string(),
        });
        assert!(matches!(err, Err(QueueError::UnknownStrategy(_))));
        assert_eq!(cq.queueing_strategy, STRICT_FIFO);
        assert_eq!(cq.len(), 1);
    }

    #[test]
    fn pops_by_priority_then_creation_time() {
        let mut cq = sample_cluster_queue();
        // Two priority-5 workloads created at t1 < t2, one low, one high.
        cq.push_or_update(make_workload("five-late", 5, 20));
        cq.push_or_update(make_workload("five-early", 5, 10));
        cq.push_or_update(make_workload("three", 3, 5));
        cq.push_or_update(make_workload("nine", 9, 30));

        let order: Vec<String> = std::iter::from_fn(|| cq.pop())
            .map(|info| info.obj.name)
            .collect();
        assert_eq!(order, ["nine", "five-early", "five-late", "three"]);
    }

    #[test]
    fn unset_priority_sorts_as_zero() {
        let mut cq = sample_cluster_queue();
        let mut unset = make_workload("unset", 0, 10);
        unset.priority = None;
        cq.push_or_update(unset);
        cq.push_or_update(make_workload("negative", -1, 5));
        cq.push_or_update(make_workload("positive", 1, 20));

        let order: Vec<String> = std::iter::from_fn(|| cq.pop())
            .map(|info| info.obj.name)
            .collect();
        assert_eq!(order, ["positive", "unset", "negative"]);
    }

    #[test]
    fn push_if_not_present_leaves_existing_entries_alone() {
        let mut cq = sample_cluster_queue();
        let original = WorkloadInfo::new(make_workload("w1", 5, 10));
        assert!(cq.push_if_not_present(&original));
        assert!(cq.contains("tenant-a/w1"));

        let replacement = WorkloadInfo::new(make_workload("w1", 9, 1));
        assert!(!cq.push_if_not_present(&replacement));
        assert_eq!(cq.len(), 1);
        assert_eq!(cq.pop().map(|info| info.obj.priority()), Some(5));
    }

    #[test]
    fn push_or_update_keeps_one_entry_and_reorders() {
        let mut cq = sample_cluster_queue();
        cq.push_or_update(make_workload("w1", 1, 10));
        cq.push_or_update(make_workload("w2", 5, 10));

        // Raising w1's priority moves it to the head.
        cq.push_or_update(make_workload("w1", 9, 10));
        assert_eq!(cq.len(), 2);
        assert_eq!(cq.pop().map(|info| info.obj.name), Some("w1".to_string()));
    }

    #[test]
    fn delete_is_a_no_op_for_absent_keys() {
        let mut cq = sample_cluster_queue();
        cq.push_or_update(make_workload("w1", 1, 10));
        cq.delete(&make_workload("unknown", 0, 0));
        assert_eq!(cq.len(), 1);

        cq.delete(&make_workload("w1", 1, 10));
        assert!(cq.is_empty());
        assert!(cq.pop().is_none());
    }

    #[test]
    fn bulk_transfer_reports_whether_anything_new_arrived() {
        let queue_spec = QueueSpec {
            namespace: "tenant-a".to_string(),
            name: "main".to_string(),
            cluster_queue: "shared-pool".to_string(),
        };
        let mut queue = Queue::new(&queue_spec);
        queue.add_or_update(make_workload("w1", 1, 10));
        queue.add_or_update(make_workload("w2", 2, 11));

        let mut cq = sample_cluster_queue();
        assert!(cq.add_from_queue(&queue));
        assert_eq!(cq.len(), 2);

        // Everything already present: no new arrivals.
        assert!(!cq.add_from_queue(&queue));
        assert_eq!(cq.len(), 2);

        // One new workload among known ones.
        queue.add_or_update(make_workload("w3", 3, 12));
        assert!(cq.add_from_queue(&queue));
        assert_eq!(cq.len(), 3);

        cq.delete_from_queue(&queue);
        assert!(cq.is_empty());
    }
}
