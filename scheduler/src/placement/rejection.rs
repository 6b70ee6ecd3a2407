use chrono::{Duration, Utc};
use k8s::{Cluster, PodExt, REJECTION_ANNOTATION};
use k8s_openapi::api::core::v1::Pod;
use result::Result;
use std::collections::BTreeMap;

/// Answers "is this pod still cooling down from a failed placement?" and, when
/// placement fails again, persists a fresh cool-down mark. The mark lives on the
/// pod annotation rather than in-process so the controller survives restarts
/// without losing it and stays a pure function of observable cluster state.
pub struct RejectionRegistry {
    timeout: Duration,
}

impl RejectionRegistry {
    pub fn new(timeout_secs: i64) -> Self {
        Self {
            timeout: Duration::seconds(timeout_secs),
        }
    }

    pub fn is_recently_rejected(&self, pod: &Pod) -> bool {
        match pod.rejected_at(REJECTION_ANNOTATION) {
            Some(rejected_at) => Utc::now() - rejected_at < self.timeout,
            None => false,
        }
    }

    pub async fn mark_rejected(&self, cluster: &Cluster, pod: &Pod) -> Result<()> {
        let namespace = pod.metadata.namespace.clone().unwrap_or_default();
        let name = pod.metadata.name.clone().unwrap_or_default();
        let mut annotations = BTreeMap::new();
        annotations.insert(REJECTION_ANNOTATION.to_string(), Utc::now().to_rfc3339());
        cluster.patch_annotations(&namespace, &name, annotations).await
    }
}
