use std::sync::Arc;

use tokio::sync::watch;

use super::snapshot::SystemSnapshot;

/// Holder of the currently published snapshot.
///
/// Cloning shares the same slot. Replacement only happens when the incoming
/// snapshot carries a higher sequence number than the published one, so a slow
/// cycle can never overwrite the result of a cycle that started after it.
#[derive(Clone, Debug)]
pub struct SnapshotStore {
    tx: Arc<watch::Sender<Arc<SystemSnapshot>>>,
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Arc::new(SystemSnapshot::default()));
        SnapshotStore { tx: Arc::new(tx) }
    }

    pub fn latest(&self) -> Arc<SystemSnapshot> {
        self.tx.borrow().clone()
    }

    /// Returns `false` if a snapshot with an equal or newer sequence is
    /// already published.
    pub fn publish(&self, snapshot: SystemSnapshot) -> bool {
        self.tx.send_if_modified(|current| {
            if snapshot.sequence > current.sequence {
                *current = Arc::new(snapshot);
                true
            } else {
                false
            }
        })
    }

    /// Receiver notified on every successful publish.
    pub fn subscribe(&self) -> watch::Receiver<Arc<SystemSnapshot>> {
        self.tx.subscribe()
    }
}
