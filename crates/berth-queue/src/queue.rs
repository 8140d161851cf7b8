//! Namespaced submission queues.

use std::collections::HashMap;

use berth_api::queue::QueueSpec;
use berth_api::workload::WorkloadSpec;
use berth_workload::WorkloadInfo;

/// Key of the queue a workload names in its definition.
pub fn queue_key_for_workload(w: &WorkloadSpec) -> String {
    format!("{}/{}", w.namespace, w.queue_name)
}

/// In-memory state of one queue: an unordered set of workloads, keyed by
/// workload key, bound to the pool named in the queue definition.
///
/// A queue imposes no order; ordering happens in the pool it feeds. Its
/// membership is what gets bulk-transferred when the pool binding of the
/// queue changes.
pub struct Queue {
    /// Pool this queue currently feeds into.
    pub cluster_queue: String,

    pub(crate) items: HashMap<String, WorkloadInfo>,
}

impl Queue {
    pub fn new(spec: &QueueSpec) -> Self {
        let mut queue = Queue {
            cluster_queue: String::new(),
            items: HashMap::new(),
        };
        queue.update(spec);
        queue
    }

    /// Applies a changed queue definition. Membership is untouched; moving
    /// items between pools is the registry's job.
    pub fn update(&mut self, spec: &QueueSpec) {
        self.cluster_queue = spec.cluster_queue.clone();
    }

    /// Inserts a workload, or refreshes the stored definition of a present
    /// one. A refresh keeps the existing demand snapshot; the pool index
    /// recomputes its own copy when the workload is pushed there.
    pub fn add_or_update(&mut self, w: WorkloadSpec) {
        let key = w.key();
        match self.items.get_mut(&key) {
            Some(info) => info.obj = w,
            None => {
                self.items.insert(key, WorkloadInfo::new(w));
            }
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_queue_spec() -> QueueSpec {
        QueueSpec {
            namespace: "tenant-a".to_string(),
            name: "main".to_string(),
            cluster_queue: "shared-pool".to_string(),
        }
    }

    fn sample_workload(name: &str) -> WorkloadSpec {
        WorkloadSpec {
            namespace: "tenant-a".to_string(),
            name: name.to_string(),
            queue_name: "main".to_string(),
            priority: None,
            created_at: 1,
            pod_sets: Vec::new(),
            admission: None,
        }
    }

    #[test]
    fn tracks_the_bound_pool() {
        let mut spec = sample_queue_spec();
        let mut queue = Queue::new(&spec);
        assert_eq!(queue.cluster_queue, "shared-pool");

        spec.cluster_queue = "other-pool".to_string();
        queue.update(&spec);
        assert_eq!(queue.cluster_queue, "other-pool");
    }

    #[test]
    fn add_or_update_keeps_one_entry_per_key() {
        let mut queue = Queue::new(&sample_queue_spec());
        queue.add_or_update(sample_workload("w1"));
        queue.add_or_update(sample_workload("w2"));
        assert_eq!(queue.len(), 2);

        let mut updated = sample_workload("w1");
        updated.priority = Some(7);
        queue.add_or_update(updated);
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.items["tenant-a/w1"].obj.priority(), 7);
    }

    #[test]
    fn workload_queue_key_uses_the_queue_name() {
        let w = sample_workload("w1");
        assert_eq!(queue_key_for_workload(&w), "tenant-a/main");
    }
}
