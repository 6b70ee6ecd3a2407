use crate::cli::Config;
use crate::placement::binder::Binder;
use crate::placement::rejection::RejectionRegistry;
use crate::placement::selector;
use crate::placement::trace::TraceRecorder;
use backoff::{backoff::Backoff, ExponentialBackoff};
use chrono::Utc;
use futures::StreamExt;
use k8s::{Cluster, PodEvent, PodExt};
use k8s_openapi::api::core::v1::Pod;
use log::{debug, error, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use term_colors::cyan;

/// Long-running event consumer. Dispatches eligible pods through the
/// rejection registry, selector, and binder; restarts the watch stream on
/// timeout or transient error; exits cleanly on shutdown.
pub struct WatchLoop {
    cluster: Cluster,
    scheduler_name: String,
    watch_timeout_secs: u32,
    rejection: RejectionRegistry,
    binder: Binder,
    trace: TraceRecorder,
    shutdown: Arc<AtomicBool>,
}

impl WatchLoop {
    pub fn new(cluster: Cluster, config: &Config, shutdown: Arc<AtomicBool>) -> Self {
        Self {
            cluster,
            scheduler_name: config.scheduler_name.clone(),
            watch_timeout_secs: config.watch_timeout_secs,
            rejection: RejectionRegistry::new(config.rejection_timeout_secs),
            binder: Binder::new(config.bind_retries, config.bind_retry_delay_secs),
            trace: TraceRecorder::new(),
            shutdown,
        }
    }

    /// Scheduling model is single-threaded cooperative: one event is processed
    /// to completion before the next is consumed, so the rejection registry and
    /// trace recorder above need no locks.
    pub async fn run(&mut self) {
        let mut backoff = ExponentialBackoff::default();
        loop {
            if self.shutdown.load(Ordering::SeqCst) {
                info!("shutdown requested, exiting watch loop");
                return;
            }

            let stream = match self.cluster.watch_pods(self.watch_timeout_secs).await {
                Ok(stream) => stream,
                Err(err) => {
                    match backoff.next_backoff() {
                        Some(delay) => {
                            warn!("failed to open watch stream: {} (retrying in {:?})", err, delay);
                            tokio::time::sleep(delay).await;
                        }
                        None => {
                            error!(
                                "watch stream has been unreachable for an extended period: {}; \
                                continuing to retry",
                                err
                            );
                            backoff.reset();
                        }
                    }
                    continue;
                }
            };
            backoff.reset();
            futures::pin_mut!(stream);

            while let Some(event) = stream.next().await {
                if self.shutdown.load(Ordering::SeqCst) {
                    info!("shutdown requested, abandoning in-flight event");
                    return;
                }
                match event {
                    PodEvent::Error(err) => {
                        warn!("watch stream reported an error event: {}", err);
                    }
                    PodEvent::Deleted(_) => {}
                    PodEvent::Added(pod) | PodEvent::Modified(pod) => {
                        self.dispatch(pod).await;
                    }
                }
            }
            debug!("watch stream closed by the server, reopening");
        }
    }

    async fn dispatch(&mut self, pod: Pod) {
        let key = pod.key();
        debug!(
            "observed pod {} scheduler_name={:?} phase={:?}",
            cyan(&key),
            pod.scheduler_name(),
            pod.status.as_ref().and_then(|s| s.phase.clone())
        );

        if !pod.is_unscheduled() {
            if pod.is_running() {
                self.trace.record_started(&key, pod.max_started_at());
            }
            return;
        }

        if !pod.is_owned_by(&self.scheduler_name) {
            return;
        }

        if !pod.is_pending() {
            if pod.is_running() {
                self.trace.record_started(&key, pod.max_started_at());
            }
            return;
        }

        if self.rejection.is_recently_rejected(&pod) {
            debug!("pod {} is cooling down from a previous rejection", cyan(&key));
            return;
        }

        if let Some(created_at) = pod.created_at() {
            self.trace.record_added(&key, created_at);
        }
        self.trace.record_eligible(&key, Utc::now());

        let node_name = match selector::choose_node(&self.cluster, &pod).await {
            Ok(node_name) => node_name,
            Err(err) => {
                error!(
                    "failed to list cluster state while placing pod {}: {}",
                    cyan(&key),
                    err
                );
                return;
            }
        };

        let node_name = match node_name {
            Some(node_name) => node_name,
            None => {
                info!("no compatible node found for pod {}; marking rejected", cyan(&key));
                if let Err(err) = self.rejection.mark_rejected(&self.cluster, &pod).await {
                    warn!(
                        "failed to persist rejection mark for pod {}: {}",
                        cyan(&key),
                        err
                    );
                }
                return;
            }
        };

        let bound = self
            .binder
            .bind(&self.cluster, &mut self.trace, &pod, &node_name)
            .await;
        if !bound {
            warn!(
                "exhausted bind attempts for pod {} on node {}",
                cyan(&key),
                cyan(&node_name)
            );
        }
    }
}
