// ── Reactive snapshot cell ──
//
// Full-replace storage for one entity kind with push-based change
// notification via `watch` channels.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::watch;

/// Holds the last successfully fetched full list of one entity kind.
///
/// The snapshot is only ever replaced wholesale: a failed load never
/// touches it, so readers either see the previous complete list or the new
/// complete list, never a partial state. `loaded` distinguishes "never
/// fetched" from "fetched and legitimately empty".
pub(crate) struct SnapshotCell<T> {
    snapshot: watch::Sender<Arc<Vec<T>>>,
    loaded: AtomicBool,
}

impl<T: Clone + Send + Sync + 'static> SnapshotCell<T> {
    pub(crate) fn new() -> Self {
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));
        Self {
            snapshot,
            loaded: AtomicBool::new(false),
        }
    }

    /// Replace the entire snapshot and mark the cell loaded.
    pub(crate) fn replace(&self, items: Vec<T>) {
        // `send_modify` updates unconditionally, even with zero receivers.
        self.snapshot.send_modify(|snap| *snap = Arc::new(items));
        self.loaded.store(true, Ordering::Release);
    }

    /// Current snapshot (cheap `Arc` clone).
    pub(crate) fn snapshot(&self) -> Arc<Vec<T>> {
        self.snapshot.borrow().clone()
    }

    /// Subscribe to snapshot changes via a `watch::Receiver`.
    pub(crate) fn subscribe(&self) -> watch::Receiver<Arc<Vec<T>>> {
        self.snapshot.subscribe()
    }

    /// Whether at least one load has completed successfully.
    pub(crate) fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::Acquire)
    }

    pub(crate) fn len(&self) -> usize {
        self.snapshot.borrow().len()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty_and_unloaded() {
        let cell: SnapshotCell<String> = SnapshotCell::new();
        assert!(cell.snapshot().is_empty());
        assert!(!cell.is_loaded());
        assert_eq!(cell.len(), 0);
    }

    #[test]
    fn replace_swaps_the_whole_snapshot() {
        let cell: SnapshotCell<String> = SnapshotCell::new();
        cell.replace(vec!["a".into(), "b".into()]);
        assert_eq!(cell.len(), 2);

        cell.replace(vec!["c".into()]);
        let snap = cell.snapshot();
        assert_eq!(snap.as_slice(), ["c".to_string()]);
    }

    #[test]
    fn replace_with_empty_list_still_counts_as_loaded() {
        // A legitimately emptied list must not look like "never fetched".
        let cell: SnapshotCell<String> = SnapshotCell::new();
        cell.replace(Vec::new());
        assert!(cell.is_loaded());
        assert!(cell.snapshot().is_empty());
    }

    #[test]
    fn subscribers_see_replacements() {
        let cell: SnapshotCell<u32> = SnapshotCell::new();
        let mut rx = cell.subscribe();
        assert!(rx.borrow_and_update().is_empty());

        cell.replace(vec![1, 2, 3]);
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().len(), 3);
    }

    #[test]
    fn old_snapshot_handles_survive_replacement() {
        let cell: SnapshotCell<u32> = SnapshotCell::new();
        cell.replace(vec![1]);
        let old = cell.snapshot();

        cell.replace(vec![2, 3]);
        assert_eq!(old.as_slice(), [1]);
        assert_eq!(cell.snapshot().as_slice(), [2, 3]);
    }
}
