//! Binary heap with key-addressed entries.
//!
//! A classic array heap paired with a key-to-position map that is updated
//! on every swap. On top of plain push and pop this buys:
//! - membership tests and length in O(1)
//! - removal of an arbitrary key in O(log n)
//! - in-place replacement of a value followed by an O(log n) re-sift,
//!   instead of a remove-and-reinsert
//!
//! Entries are owned by the heap. The head is the entry that sorts first
//! under the `less` function chosen at construction.

use std::collections::HashMap;

struct Entry<T> {
    key: String,
    value: T,
}

pub struct IndexedHeap<T> {
    entries: Vec<Entry<T>>,
    /// Current position of every key in `entries`.
    index: HashMap<String, usize>,
    key_of: fn(&T) -> String,
    less: fn(&T, &T) -> bool,
}

impl<T> IndexedHeap<T> {
    /// `less(a, b)` returns true iff `a` must leave the heap before `b`.
    pub fn new(key_of: fn(&T) -> String, less: fn(&T, &T) -> bool) -> Self {
        IndexedHeap {
            entries: Vec::new(),
            index: HashMap::new(),
            key_of,
            less,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&T> {
        let &pos = self.index.get(key)?;
        self.entries.get(pos).map(|e| &e.value)
    }

    /// The entry that sorts first, without removing it.
    pub fn peek(&self) -> Option<&T> {
        self.entries.first().map(|e| &e.value)
    }

    /// Inserts `value` only if its key is not already present. Returns
    /// whether an insertion happened; a present key is left untouched.
    pub fn push_if_absent(&mut self, value: T) -> bool {
        let key = (self.key_of)(&value);
        if self.index.contains_key(&key) {
            return false;
        }
        let pos = self.entries.len();
        self.index.insert(key.clone(), pos);
        self.entries.push(Entry { key, value });
        self.sift_up(pos);
        true
    }

    /// Inserts `value`, or replaces the entry sharing its key and re-sifts
    /// from that position.
    pub fn push_or_update(&mut self, value: T) {
        let key = (self.key_of)(&value);
        match self.index.get(&key) {
            Some(&pos) => {
                self.entries[pos].value = value;
                self.fix(pos);
            }
            None => {
                let pos = self.entries.len();
                self.index.insert(key.clone(), pos);
                self.entries.push(Entry { key, value });
                self.sift_up(pos);
            }
        }
    }

    /// Removes the entry for `key`, if present.
    pub fn remove(&mut self, key: &str) -> Option<T> {
        let &pos = self.index.get(key)?;
        self.remove_at(pos)
    }

    /// Removes and returns the entry that sorts first.
    pub fn pop(&mut self) -> Option<T> {
        self.remove_at(0)
    }

    /// Replaces the ordering function. Existing entries are not re-sorted;
    /// callers that change the order of live entries must rebuild.
    pub fn set_less(&mut self, less: fn(&T, &T) -> bool) {
        self.less = less;
    }

    // ── Internal sifting ────────────────────────────────────────────

    fn remove_at(&mut self, pos: usize) -> Option<T> {
        let last = self.entries.len().checked_sub(1)?;
        if pos > last {
            return None;
        }
        if pos != last {
            self.swap_entries(pos, last);
        }
        let entry = self.entries.pop()?;
        self.index.remove(&entry.key);
        if pos != last {
            self.fix(pos);
        }
        Some(entry.value)
    }

    fn less_at(&self, a: usize, b: usize) -> bool {
        (self.less)(&self.entries[a].value, &self.entries[b].value)
    }

    fn swap_entries(&mut self, a: usize, b: usize) {
        self.entries.swap(a, b);
        self.index.insert(self.entries[a].key.clone(), a);
        self.index.insert(self.entries[b].key.clone(), b);
    }

    fn sift_up(&mut self, mut pos: usize) {
        while pos > 0 {
            let parent = (pos - 1) / 2;
            if !self.less_at(pos, parent) {
                break;
            }
            self.swap_entries(pos, parent);
            pos = parent;
        }
    }

    /// Returns whether the entry moved.
    fn sift_down(&mut self, mut pos: usize) -> bool {
        let start = pos;
        let len = self.entries.len();
        loop {
            let left = 2 * pos + 1;
            if left >= len {
                break;
            }
            let mut first = left;
            let right = left + 1;
            if right < len && self.less_at(right, left) {
                first = right;
            }
            if !self.less_at(first, pos) {
                break;
            }
            self.swap_entries(pos, first);
            pos = first;
        }
        pos > start
    }

    /// Restores heap order after the value at `pos` changed in place.
    fn fix(&mut self, pos: usize) {
        if !self.sift_down(pos) {
            self.sift_up(pos);
        }
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct Task {
        id: String,
        rank: i32,
    }

    fn task(id: &str, rank: i32) -> Task {
        Task {
            id: id.to_string(),
            rank,
        }
    }

    fn task_heap() -> IndexedHeap<Task> {
        IndexedHeap::new(|t| t.id.clone(), |a, b| a.rank < b.rank)
    }

    /// Every parent must not sort after its children, and the position map
    /// must agree with the backing array.
    fn assert_heap_shape(heap: &IndexedHeap<Task>) {
        for pos in 1..heap.entries.len() {
            let parent = (pos - 1) / 2;
            assert!(
                !heap.less_at(pos, parent),
                "entry at {pos} sorts before its parent at {parent}"
            );
        }
        assert_eq!(heap.index.len(), heap.entries.len());
        for (key, &pos) in &heap.index {
            assert_eq!(&heap.entries[pos].key, key);
        }
    }

    #[test]
    fn pops_in_rank_order() {
        let mut heap = task_heap();
        for (id, rank) in [("a", 30), ("b", 10), ("c", 20), ("d", 5), ("e", 25)] {
            assert!(heap.push_if_absent(task(id, rank)));
            assert_heap_shape(&heap);
        }
        assert_eq!(heap.len(), 5);
        assert_eq!(heap.peek().map(|t| t.id.as_str()), Some("d"));

        let mut ids = Vec::new();
        while let Some(t) = heap.pop() {
            ids.push(t.id);
            assert_heap_shape(&heap);
        }
        assert_eq!(ids, ["d", "b", "c", "e", "a"]);
        assert!(heap.pop().is_none());
    }

    #[test]
    fn push_if_absent_rejects_present_keys() {
        let mut heap = task_heap();
        assert!(heap.push_if_absent(task("a", 10)));
        assert!(!heap.push_if_absent(task("a", 1)));
        assert_eq!(heap.len(), 1);
        // The stored value is the original one.
        assert_eq!(heap.get("a").map(|t| t.rank), Some(10));
    }

    #[test]
    fn push_or_update_replaces_and_resifts() {
        let mut heap = task_heap();
        for (id, rank) in [("a", 10), ("b", 20), ("c", 30)] {
            heap.push_or_update(task(id, rank));
        }

        // Move the last entry to the front.
        heap.push_or_update(task("c", 1));
        assert_heap_shape(&heap);
        assert_eq!(heap.len(), 3);
        assert_eq!(heap.peek().map(|t| t.id.as_str()), Some("c"));

        // And push the head to the back.
        heap.push_or_update(task("c", 99));
        assert_heap_shape(&heap);
        assert_eq!(heap.peek().map(|t| t.id.as_str()), Some("a"));
    }

    #[test]
    fn removes_arbitrary_keys() {
        let mut heap = task_heap();
        for (id, rank) in [("a", 10), ("b", 20), ("c", 30), ("d", 40), ("e", 50)] {
            heap.push_if_absent(task(id, rank));
        }

        let removed = heap.remove("c");
        assert_eq!(removed.map(|t| t.rank), Some(30));
        assert_heap_shape(&heap);
        assert!(!heap.contains("c"));
        assert!(heap.remove("c").is_none());

        let mut ids = Vec::new();
        while let Some(t) = heap.pop() {
            ids.push(t.id);
        }
        assert_eq!(ids, ["a", "b", "d", "e"]);
    }

    #[test]
    fn stays_consistent_under_mixed_operations() {
        let mut heap = task_heap();
        for i in 0..32 {
            heap.push_if_absent(task(&format!("t{i}"), (37 * i) % 64));
            assert_heap_shape(&heap);
        }
        for i in (0..32).step_by(3) {
            heap.remove(&format!("t{i}"));
            assert_heap_shape(&heap);
        }
        for i in 0..32 {
            heap.push_or_update(task(&format!("t{i}"), (13 * i) % 64));
            assert_heap_shape(&heap);
        }

        let mut previous = i32::MIN;
        while let Some(t) = heap.pop() {
            assert_heap_shape(&heap);
            assert!(t.rank >= previous);
            previous = t.rank;
        }
    }
}
