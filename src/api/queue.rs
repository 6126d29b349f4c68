use std::sync::{Arc, Mutex};

use tokio::task::AbortHandle;

/// Tracks fire-and-forget requests so a full cleanup can discard them en
/// masse. This is the controller's only cancellation mechanism; individual
/// requests are never aborted mid-flight.
#[derive(Clone, Default)]
pub struct RequestQueue {
    inner: Arc<Mutex<Vec<AbortHandle>>>,
}

impl RequestQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a spawned request. Finished entries are pruned as a side
    /// effect so the queue stays bounded by in-flight work.
    pub fn register(&self, handle: AbortHandle) {
        let mut handles = self.inner.lock().unwrap();
        handles.retain(|existing| !existing.is_finished());
        handles.push(handle);
    }

    /// The number of tracked requests, including finished ones not yet pruned.
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().unwrap().is_empty()
    }

    /// Aborts everything in flight and queued.
    pub fn clear(&self) {
        let handles: Vec<AbortHandle> = self.inner.lock().unwrap().drain(..).collect();
        if !handles.is_empty() {
            tracing::info!("🧹 Discarding {} queued network request(s)", handles.len());
        }
        for handle in handles {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn clear_aborts_pending_requests() {
        let queue = RequestQueue::new();
        let handle = tokio::spawn(async {
            tokio::time::sleep(Duration::from_secs(60)).await;
        });
        queue.register(handle.abort_handle());
        assert_eq!(queue.len(), 1);

        queue.clear();
        assert!(queue.is_empty());
        assert!(handle.await.unwrap_err().is_cancelled());
    }
}
