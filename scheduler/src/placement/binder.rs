use crate::placement::trace::TraceRecorder;
use chrono::Utc;
use k8s::errors::BindError;
use k8s::{Cluster, PodExt};
use k8s_openapi::api::core::v1::Pod;
use log::warn;
use std::future::Future;
use std::time::Duration;

/// Issues the authoritative bind RPC with bounded, fixed-delay retry. This is
/// not exponential backoff: it exists to absorb a transient blip against an
/// already-selected node, not to survive an extended outage (that's the watch
/// stream's problem, see the watch loop's own backoff).
pub struct Binder {
    retries: u32,
    delay: Duration,
}

impl Binder {
    pub fn new(retries: u32, delay_secs: u64) -> Self {
        Self {
            retries: retries.max(1),
            delay: Duration::from_secs(delay_secs),
        }
    }

    /// Returns `true` once bound, `false` if every attempt failed. No rejection
    /// mark is written on bind failure — the event will be re-observed and
    /// re-attempted on the next watch tick.
    pub async fn bind(
        &self,
        cluster: &Cluster,
        trace: &mut TraceRecorder,
        pod: &Pod,
        node_name: &str,
    ) -> bool {
        let key = pod.key();
        let namespace = pod.metadata.namespace.clone().unwrap_or_default();
        let name = pod.metadata.name.clone().unwrap_or_default();
        self.bind_with(&key, trace, |_attempt| {
            let namespace = namespace.clone();
            let name = name.clone();
            async move { cluster.bind(&namespace, &name, node_name).await }
        })
        .await
    }

    /// The retry loop itself, parameterized over the actual bind RPC so it can
    /// be driven against a fake in tests without a live cluster. `attempt_fn`
    /// is handed the 1-based attempt number and must perform one bind attempt.
    async fn bind_with<F, Fut>(&self, key: &str, trace: &mut TraceRecorder, mut attempt_fn: F) -> bool
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = std::result::Result<(), BindError>>,
    {
        trace.record_scheduled(key, Utc::now());
        for attempt in 1..=self.retries {
            trace.increment_bind_attempts(key);
            match attempt_fn(attempt).await {
                Ok(()) => {
                    trace.record_bound(key, Utc::now());
                    return true;
                }
                Err(err) => {
                    let transient = err.is_transient();
                    warn!(
                        "bind attempt {} of {} failed for pod {}: {}",
                        attempt, self.retries, key, err
                    );
                    if !transient {
                        warn!(
                            "bind error for pod {} is not transient, aborting remaining attempts",
                            key
                        );
                        return false;
                    }
                    if attempt < self.retries {
                        tokio::time::sleep(self.delay).await;
                    }
                }
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s::errors::ApiError;
    use kube::error::ErrorResponse;
    use std::cell::Cell;

    fn transient() -> BindError {
        ApiError::Transient(kube::Error::Api(ErrorResponse {
            status: "Failure".into(),
            message: "etcd unavailable".into(),
            reason: "InternalError".into(),
            code: 503,
        }))
        .into()
    }

    fn terminal() -> BindError {
        ApiError::Terminal(kube::Error::Api(ErrorResponse {
            status: "Failure".into(),
            message: "pod not found".into(),
            reason: "NotFound".into(),
            code: 404,
        }))
        .into()
    }

    #[tokio::test]
    async fn succeeds_after_a_transient_failure_within_the_retry_budget() {
        let binder = Binder::new(3, 0);
        let mut trace = TraceRecorder::new();
        let calls = Cell::new(0u32);
        let bound = binder
            .bind_with("default/p", &mut trace, |_attempt| {
                calls.set(calls.get() + 1);
                async move {
                    if calls.get() < 2 {
                        Err(transient())
                    } else {
                        Ok(())
                    }
                }
            })
            .await;
        assert!(bound);
        assert_eq!(calls.get(), 2);
        let record = trace.get("default/p").unwrap();
        assert_eq!(record.bind_attempts, 2);
        assert!(record.bound.is_some());
    }

    #[tokio::test]
    async fn exhausts_every_attempt_when_failures_stay_transient() {
        let binder = Binder::new(3, 0);
        let mut trace = TraceRecorder::new();
        let bound = binder
            .bind_with("default/p", &mut trace, |_attempt| async { Err(transient()) })
            .await;
        assert!(!bound);
        assert_eq!(trace.get("default/p").unwrap().bind_attempts, 3);
    }

    #[tokio::test]
    async fn a_terminal_failure_aborts_before_exhausting_the_retry_budget() {
        let binder = Binder::new(3, 0);
        let mut trace = TraceRecorder::new();
        let calls = Cell::new(0u32);
        let bound = binder
            .bind_with("default/p", &mut trace, |_attempt| {
                calls.set(calls.get() + 1);
                async { Err(terminal()) }
            })
            .await;
        assert!(!bound);
        assert_eq!(calls.get(), 1);
        assert_eq!(trace.get("default/p").unwrap().bind_attempts, 1);
    }
}
