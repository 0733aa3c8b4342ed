// crates/keydeck-core/src/runtime/poller.rs
// ============================================================================
// Module: Live Query Poller
// Description: Background refetch loop driven by a query key and refresh policy.
// Purpose: Poll live views on an interval and restart whenever the key changes.
// Dependencies: crate::{interfaces, query}, tokio
// ============================================================================

//! ## Overview
//! A [`Poller`] owns one tokio task. The current [`PollRequest`] lives in a
//! `watch` channel. The first fetch waits until the startup delay of the
//! initial request has elapsed since spawn; after that the task refetches on
//! the policy interval while the policy is live. Publishing a different
//! request cancels the pending timer, any in-flight fetch, and any blocked
//! event delivery, then fetches the new key. Key changes never push the
//! startup deadline back. Dropping the [`Poller`] stops the task.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::future::Future;

use tokio::sync::mpsc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio::time::sleep;
use tokio::time::sleep_until;

use crate::interfaces::QueryState;
use crate::interfaces::RpcError;
use crate::query::RefreshPolicy;

/// Buffered poll events before the task waits for the consumer.
const EVENT_BUFFER: usize = 16;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Query key paired with its refresh policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollRequest<K> {
    /// Query key; usually the built payload.
    pub key: K,
    /// Polling behaviour for the key.
    pub refresh: RefreshPolicy,
}

/// One fetch outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollEvent<K, T> {
    /// Key the fetch was made for.
    pub key: K,
    /// Fetch result.
    pub state: QueryState<T>,
}

/// Handle to a running poll loop.
pub struct Poller<K, T> {
    /// Current request.
    requests: watch::Sender<PollRequest<K>>,
    /// Fetch outcomes.
    events: mpsc::Receiver<PollEvent<K, T>>,
    /// Background task.
    task: JoinHandle<()>,
}

impl<K, T> Poller<K, T>
where
    K: Clone + PartialEq + Send + Sync + 'static,
    T: Send + 'static,
{
    /// Spawns the poll loop on the current tokio runtime.
    pub fn spawn<F, Fut>(initial: PollRequest<K>, fetch: F) -> Self
    where
        F: FnMut(K) -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, RpcError>> + Send + 'static,
    {
        let (requests, request_rx) = watch::channel(initial);
        let (event_tx, events) = mpsc::channel(EVENT_BUFFER);
        let task = tokio::spawn(run(request_rx, event_tx, fetch));
        Self {
            requests,
            events,
            task,
        }
    }

    /// Publishes a new request; returns true when it differs and restarted the loop.
    pub fn update(&self, request: PollRequest<K>) -> bool {
        self.requests.send_if_modified(|current| {
            if *current == request {
                false
            } else {
                *current = request;
                true
            }
        })
    }

    /// Waits for the next fetch outcome; `None` once the loop has stopped.
    pub async fn next(&mut self) -> Option<PollEvent<K, T>> {
        self.events.recv().await
    }

    /// Returns a fetch outcome if one is already buffered.
    pub fn try_next(&mut self) -> Option<PollEvent<K, T>> {
        self.events.try_recv().ok()
    }
}

impl<K, T> Drop for Poller<K, T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

// ============================================================================
// SECTION: Loop
// ============================================================================

/// Poll loop body.
async fn run<K, T, F, Fut>(
    mut requests: watch::Receiver<PollRequest<K>>,
    events: mpsc::Sender<PollEvent<K, T>>,
    mut fetch: F,
) where
    K: Clone + Send + Sync,
    F: FnMut(K) -> Fut,
    Fut: Future<Output = Result<T, RpcError>>,
{
    let startup_deadline = requests
        .borrow()
        .refresh
        .startup_delay()
        .map(|delay| Instant::now() + delay);
    'restart: loop {
        let request = requests.borrow_and_update().clone();
        if let Some(deadline) = startup_deadline {
            tokio::select! {
                () = sleep_until(deadline) => {}
                changed = requests.changed() => {
                    if changed.is_err() {
                        return;
                    }
                    continue 'restart;
                }
            }
        }
        loop {
            let result = tokio::select! {
                result = fetch(request.key.clone()) => result,
                changed = requests.changed() => {
                    if changed.is_err() {
                        return;
                    }
                    continue 'restart;
                }
            };
            let event = PollEvent {
                key: request.key.clone(),
                state: QueryState::from_result(result),
            };
            tokio::select! {
                sent = events.send(event) => {
                    if sent.is_err() {
                        return;
                    }
                }
                changed = requests.changed() => {
                    if changed.is_err() {
                        return;
                    }
                    continue 'restart;
                }
            }
            match request.refresh.refetch_interval() {
                Some(interval) => {
                    tokio::select! {
                        () = sleep(interval) => {}
                        changed = requests.changed() => {
                            if changed.is_err() {
                                return;
                            }
                            continue 'restart;
                        }
                    }
                }
                None => {
                    tokio::select! {
                        changed = requests.changed() => {
                            if changed.is_err() {
                                return;
                            }
                            continue 'restart;
                        }
                        () = events.closed() => return,
                    }
                }
            }
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    use tokio::time::Instant;

    use super::EVENT_BUFFER;
    use super::PollRequest;
    use super::Poller;
    use crate::interfaces::RpcError;
    use crate::query::RefreshPolicy;

    fn live(startup_ms: Option<u64>) -> RefreshPolicy {
        RefreshPolicy {
            refetch_interval_ms: Some(10_000),
            startup_delay_ms: startup_ms,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn waits_for_startup_delay_then_polls_on_interval() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let started = Instant::now();
        let mut poller = Poller::spawn(
            PollRequest {
                key: "k1",
                refresh: live(Some(1_000)),
            },
            move |key: &'static str| {
                let counter = Arc::clone(&counter);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, RpcError>(key.len())
                }
            },
        );
        let first = poller.next().await;
        assert_eq!(first.map(|event| event.key), Some("k1"));
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(1_000) && elapsed < Duration::from_millis(1_100));
        let _ = poller.next().await;
        let elapsed = started.elapsed();
        assert!(
            elapsed >= Duration::from_millis(11_000) && elapsed < Duration::from_millis(11_100)
        );
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn key_change_after_mount_skips_startup_delay() {
        let mut poller = Poller::spawn(
            PollRequest {
                key: "k1",
                refresh: live(Some(1_000)),
            },
            |key: &'static str| async move { Ok::<_, RpcError>(key.len()) },
        );
        let first = poller.next().await;
        assert_eq!(first.map(|event| event.key), Some("k1"));

        let changed_at = Instant::now();
        assert!(poller.update(PollRequest {
            key: "k2",
            refresh: live(Some(1_000)),
        }));
        let second = poller.next().await;
        assert_eq!(second.map(|event| event.key), Some("k2"));
        assert!(changed_at.elapsed() < Duration::from_millis(100));
    }

    #[tokio::test(start_paused = true)]
    async fn key_change_during_startup_delay_keeps_deadline() {
        let started = Instant::now();
        let mut poller = Poller::spawn(
            PollRequest {
                key: "k1",
                refresh: live(Some(1_000)),
            },
            |key: &'static str| async move { Ok::<_, RpcError>(key.len()) },
        );
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert!(poller.update(PollRequest {
            key: "k2",
            refresh: live(Some(1_000)),
        }));
        let first = poller.next().await;
        assert_eq!(first.map(|event| event.key), Some("k2"));
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(1_000) && elapsed < Duration::from_millis(1_100));
    }

    #[tokio::test(start_paused = true)]
    async fn key_change_is_seen_while_event_buffer_is_full() {
        let mut poller = Poller::spawn(
            PollRequest {
                key: "k1",
                refresh: RefreshPolicy {
                    refetch_interval_ms: Some(1_000),
                    startup_delay_ms: None,
                },
            },
            |key: &'static str| async move { Ok::<_, RpcError>(key.len()) },
        );
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert!(poller.update(PollRequest {
            key: "k2",
            refresh: RefreshPolicy::default(),
        }));
        tokio::time::sleep(Duration::from_millis(1)).await;

        let mut stale = 0;
        let fresh = loop {
            let key = poller.next().await.map(|event| event.key);
            if key != Some("k1") {
                break key;
            }
            stale += 1;
        };
        assert_eq!(fresh, Some("k2"));
        assert_eq!(stale, EVENT_BUFFER);
    }

    #[tokio::test(start_paused = true)]
    async fn historical_window_fetches_once_until_key_changes() {
        let mut poller = Poller::spawn(
            PollRequest {
                key: 1_u32,
                refresh: RefreshPolicy::default(),
            },
            |key: u32| async move { Ok::<_, RpcError>(key * 10) },
        );
        let first = poller.next().await;
        assert_eq!(first.and_then(|event| event.state.ready().copied()), Some(10));
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert!(poller.try_next().is_none());

        assert!(poller.update(PollRequest {
            key: 2,
            refresh: RefreshPolicy::default(),
        }));
        let second = poller.next().await;
        assert_eq!(second.map(|event| event.key), Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn same_request_does_not_restart() {
        let request = PollRequest {
            key: "same",
            refresh: RefreshPolicy::default(),
        };
        let poller = Poller::spawn(request.clone(), |_key: &'static str| async {
            Ok::<_, RpcError>(())
        });
        assert!(!poller.update(request));
    }

    #[tokio::test(start_paused = true)]
    async fn failures_surface_as_failed_state() {
        let mut poller = Poller::spawn(
            PollRequest {
                key: (),
                refresh: RefreshPolicy::default(),
            },
            |()| async { Err::<u8, _>(RpcError::Transport("offline".to_string())) },
        );
        let event = poller.next().await;
        assert!(event.is_some_and(|event| event.state.is_failed()));
    }
}
