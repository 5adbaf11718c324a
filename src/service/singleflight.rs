//! Single-Flight Module
//!
//! Collapses concurrent work on the same cache key into one execution.

use std::collections::HashMap;
use std::future::Future;

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tracing::debug;

use crate::cache::CacheKey;

// == Single Flight ==
/// Registry of in-flight work keyed by cache key.
///
/// The first caller for a key runs the work; callers arriving while it runs
/// wait for and share its output.
#[derive(Debug)]
pub struct SingleFlight<T> {
    calls: Mutex<HashMap<CacheKey, broadcast::Sender<T>>>,
}

enum Role<T> {
    Leader(broadcast::Sender<T>),
    Waiter(broadcast::Receiver<T>),
}

/// Unregisters the leader's key, including when its future is dropped.
struct FlightGuard<'a, T> {
    calls: &'a Mutex<HashMap<CacheKey, broadcast::Sender<T>>>,
    key: &'a CacheKey,
}

impl<T> Drop for FlightGuard<'_, T> {
    fn drop(&mut self) {
        self.calls.lock().remove(self.key);
    }
}

impl<T: Clone> SingleFlight<T> {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(HashMap::new()),
        }
    }

    /// Runs `work` for `key` unless another caller already is, in which case
    /// that caller's output is returned.
    ///
    /// If the running caller is cancelled before finishing, waiters fall back
    /// to running `work` themselves.
    pub async fn run<F, Fut>(&self, key: &CacheKey, work: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let role = {
            let mut calls = self.calls.lock();
            match calls.get(key) {
                Some(tx) => Role::Waiter(tx.subscribe()),
                None => {
                    let (tx, _) = broadcast::channel(1);
                    calls.insert(key.clone(), tx.clone());
                    Role::Leader(tx)
                }
            }
        };

        match role {
            Role::Leader(tx) => {
                let guard = FlightGuard {
                    calls: &self.calls,
                    key,
                };
                let output = work().await;
                // Unregister before publishing so late arrivals start fresh
                drop(guard);
                let _ = tx.send(output.clone());
                output
            }
            Role::Waiter(mut rx) => {
                debug!(key = %key, "Joining in-flight fetch");
                match rx.recv().await {
                    Ok(output) => output,
                    Err(_) => {
                        debug!(key = %key, "In-flight fetch abandoned, running own");
                        work().await
                    }
                }
            }
        }
    }

    /// Number of keys with work currently running.
    pub fn in_flight(&self) -> usize {
        self.calls.lock().len()
    }
}

impl<T: Clone> Default for SingleFlight<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upstream::{Endpoint, Location, Units};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn key(city: &str) -> CacheKey {
        CacheKey::derive(Endpoint::Current, &Location::City(city.to_string()), Units::Metric)
    }

    #[tokio::test]
    async fn test_single_caller_runs_work() {
        let flights = SingleFlight::new();
        let out = flights.run(&key("Gaya"), || async { 7 }).await;
        assert_eq!(out, 7);
        assert_eq!(flights.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_run() {
        let flights = Arc::new(SingleFlight::new());
        let runs = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let flights = flights.clone();
            let runs = runs.clone();
            handles.push(tokio::spawn(async move {
                flights
                    .run(&key("Gaya"), move || async move {
                        runs.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(100)).await;
                        "payload".to_string()
                    })
                    .await
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap(), "payload");
        }
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(flights.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_different_keys_run_independently() {
        let flights = Arc::new(SingleFlight::new());
        let runs = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for city in ["Gaya", "Patna", "Delhi"] {
            let flights = flights.clone();
            let runs = runs.clone();
            handles.push(tokio::spawn(async move {
                flights
                    .run(&key(city), move || async move {
                        runs.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        city.len()
                    })
                    .await
            }));
        }

        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(runs.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_sequential_calls_each_run() {
        let flights = SingleFlight::new();
        let counter = AtomicUsize::new(0);
        let runs = &counter;

        for _ in 0..3 {
            flights
                .run(&key("Gaya"), move || async move {
                    runs.fetch_add(1, Ordering::SeqCst);
                })
                .await;
        }
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_waiter_recovers_from_cancelled_leader() {
        let flights = Arc::new(SingleFlight::new());

        let leader = {
            let flights = flights.clone();
            tokio::spawn(async move {
                flights
                    .run(&key("Gaya"), || async {
                        tokio::time::sleep(Duration::from_secs(30)).await;
                        "leader"
                    })
                    .await
            })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(flights.in_flight(), 1);

        let waiter = {
            let flights = flights.clone();
            tokio::spawn(async move { flights.run(&key("Gaya"), || async { "waiter" }).await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;

        leader.abort();
        let out = tokio::time::timeout(Duration::from_secs(5), waiter)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(out, "waiter");
        assert_eq!(flights.in_flight(), 0);
    }
}
