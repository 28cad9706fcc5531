//! Request Coalescer
//!
//! Collapses concurrent calls for the same key into a single execution.

use std::collections::HashMap;
use std::future::Future;

use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::debug;

/// Result slot shared between the leader of a call and its waiters.
type Pending<T> = watch::Receiver<Option<T>>;

enum Role<T> {
    Leader(watch::Sender<Option<T>>),
    Waiter(Pending<T>),
}

// == Request Coalescer ==
/// Deduplicates concurrent work per key.
///
/// The first caller for a key becomes the leader and runs the work; callers
/// arriving while it runs wait for the leader's result instead of running the
/// work again. The key is deregistered as soon as the work finishes, so a
/// later call starts a fresh execution. Nothing is cached here.
pub struct RequestCoalescer<T> {
    calls: Mutex<HashMap<String, Pending<T>>>,
}

impl<T: Clone> RequestCoalescer<T> {
    /// Creates a coalescer with no calls in flight.
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(HashMap::new()),
        }
    }

    /// Runs `work` for `key` unless a call for `key` is already in flight, in
    /// which case this waits for that call and returns a clone of its result.
    ///
    /// The bookkeeping lock is never held while `work` runs, so other keys are
    /// not delayed. If a leader is dropped before finishing, its waiters go
    /// through the same path again and one of them takes over.
    pub async fn run<F, Fut>(&self, key: &str, work: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        loop {
            let role = {
                let mut calls = self.calls.lock();
                match calls.get(key) {
                    Some(pending) => Role::Waiter(pending.clone()),
                    None => {
                        let (tx, rx) = watch::channel(None);
                        calls.insert(key.to_string(), rx);
                        Role::Leader(tx)
                    }
                }
            };

            match role {
                Role::Leader(tx) => return self.lead(key, tx, work).await,
                Role::Waiter(mut pending) => {
                    if let Ok(done) = pending.wait_for(Option::is_some).await {
                        if let Some(value) = done.as_ref() {
                            return value.clone();
                        }
                    }
                    debug!(key, "in-flight call abandoned, retrying");
                }
            }
        }
    }

    async fn lead<F, Fut>(&self, key: &str, tx: watch::Sender<Option<T>>, work: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let _registration = Registration { calls: &self.calls, key };

        let value = work().await;
        tx.send_replace(Some(value.clone()));
        value
    }

    /// Number of keys with a call currently in flight.
    pub fn in_flight(&self) -> usize {
        self.calls.lock().len()
    }
}

impl<T: Clone> Default for RequestCoalescer<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Removes the leader's entry when the leader finishes or is dropped.
struct Registration<'a, T> {
    calls: &'a Mutex<HashMap<String, Pending<T>>>,
    key: &'a str,
}

impl<T> Drop for Registration<'_, T> {
    fn drop(&mut self) {
        self.calls.lock().remove(self.key);
    }
}
