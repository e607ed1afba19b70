use std::{
    cmp::Ordering,
    collections::BinaryHeap,
    sync::{Mutex, PoisonError},
};

/// A path waiting to be expanded, with its estimated total length `f = g + h`
/// and its length so far `g`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct FrontierEntry {
    pub(crate) f: u8,
    pub(crate) g: u8,
    pub(crate) node: usize,
}

impl Ord for FrontierEntry {
    /// Greatest is the smallest `f`, then the deepest path, then the oldest
    /// node, so that `BinaryHeap` pops in that order.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .cmp(&self.f)
            .then(self.g.cmp(&other.g))
            .then(other.node.cmp(&self.node))
    }
}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A thread-safe priority queue of paths, lowest `f` first.
#[derive(Debug, Default)]
pub(crate) struct Frontier {
    heap: Mutex<BinaryHeap<FrontierEntry>>,
}

impl Frontier {
    pub(crate) fn push(&self, entry: FrontierEntry) {
        self.heap
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry);
    }

    pub(crate) fn pop(&self) -> Option<FrontierEntry> {
        self.heap.lock().unwrap_or_else(PoisonError::into_inner).pop()
    }

    pub(crate) fn len(&self) -> usize {
        self.heap.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub(crate) fn clear(&self) {
        self.heap.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pop_order() {
        let frontier = Frontier::default();
        for (f, g, node) in [(5, 1, 0), (3, 0, 1), (3, 2, 2), (4, 4, 3), (3, 2, 4)] {
            frontier.push(FrontierEntry { f, g, node });
        }
        assert_eq!(frontier.len(), 5);
        let order = std::iter::from_fn(|| frontier.pop())
            .map(|entry| entry.node)
            .collect::<Vec<_>>();
        assert_eq!(order, vec![2, 4, 1, 3, 0]);
        assert!(frontier.pop().is_none());

        frontier.push(FrontierEntry { f: 1, g: 1, node: 0 });
        frontier.clear();
        assert_eq!(frontier.len(), 0);
    }
}
