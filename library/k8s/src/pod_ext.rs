use chrono::{DateTime, Utc};
use k8s_openapi::api::core::v1::{Pod, Toleration};
use kube::ResourceExt;

/// Extension trait answering the questions the placement core asks of a pod,
/// mirroring the defensive, `Option`-chasing style the reference client library
/// uses for its own pod accessors.
pub trait PodExt {
    /// `namespace/name`, the key the trace recorder and rejection registry index on.
    fn key(&self) -> String;
    fn scheduler_name(&self) -> Option<&str>;
    fn is_owned_by(&self, scheduler_name: &str) -> bool;
    fn is_unscheduled(&self) -> bool;
    fn is_pending(&self) -> bool;
    fn is_running(&self) -> bool;
    fn app_label(&self) -> Option<&str>;
    fn tolerations(&self) -> Vec<Toleration>;
    fn rejected_at(&self, annotation: &str) -> Option<DateTime<Utc>>;
    fn created_at(&self) -> Option<DateTime<Utc>>;
    /// `max(started_at)` across containers currently reported running; `None`
    /// if no container has started yet.
    fn max_started_at(&self) -> Option<DateTime<Utc>>;
}

impl PodExt for Pod {
    fn key(&self) -> String {
        format!("{}/{}", self.namespace().unwrap_or_default(), self.name_any())
    }

    fn scheduler_name(&self) -> Option<&str> {
        self.spec.as_ref()?.scheduler_name.as_deref()
    }

    fn is_owned_by(&self, scheduler_name: &str) -> bool {
        self.scheduler_name() == Some(scheduler_name)
    }

    fn is_unscheduled(&self) -> bool {
        self.spec
            .as_ref()
            .and_then(|spec| spec.node_name.as_ref())
            .is_none()
    }

    fn is_pending(&self) -> bool {
        self.status.as_ref().and_then(|s| s.phase.as_deref()) == Some("Pending")
    }

    fn is_running(&self) -> bool {
        self.status.as_ref().and_then(|s| s.phase.as_deref()) == Some("Running")
    }

    fn app_label(&self) -> Option<&str> {
        self.metadata
            .labels
            .as_ref()?
            .get("app")
            .map(|s| s.as_str())
    }

    fn tolerations(&self) -> Vec<Toleration> {
        self.spec
            .as_ref()
            .and_then(|spec| spec.tolerations.clone())
            .unwrap_or_default()
    }

    fn rejected_at(&self, annotation: &str) -> Option<DateTime<Utc>> {
        let raw = self.metadata.annotations.as_ref()?.get(annotation)?;
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.metadata.creation_timestamp.as_ref().map(|t| t.0)
    }

    fn max_started_at(&self) -> Option<DateTime<Utc>> {
        self.status
            .as_ref()?
            .container_statuses
            .as_ref()?
            .iter()
            .filter_map(|status| {
                status
                    .state
                    .as_ref()?
                    .running
                    .as_ref()?
                    .started_at
                    .as_ref()
                    .map(|t| t.0)
            })
            .max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::api::core::v1::PodSpec;
    use kube::api::ObjectMeta;
    use std::collections::BTreeMap;

    fn pod_with_scheduler(name: &str) -> Pod {
        Pod {
            metadata: ObjectMeta {
                name: Some("p".into()),
                namespace: Some("default".into()),
                ..Default::default()
            },
            spec: Some(PodSpec {
                scheduler_name: Some(name.to_string()),
                ..Default::default()
            }),
            status: None,
        }
    }

    #[test]
    fn owned_by_matches_exact_scheduler_name() {
        let pod = pod_with_scheduler("my-scheduler");
        assert!(pod.is_owned_by("my-scheduler"));
        assert!(!pod.is_owned_by("default-scheduler"));
    }

    #[test]
    fn key_combines_namespace_and_name() {
        let pod = pod_with_scheduler("my-scheduler");
        assert_eq!(pod.key(), "default/p");
    }

    #[test]
    fn no_annotations_means_not_rejected() {
        let pod = pod_with_scheduler("my-scheduler");
        assert_eq!(pod.rejected_at("scheduler-rejected"), None);
    }

    #[test]
    fn app_label_absent_by_default() {
        let mut pod = pod_with_scheduler("my-scheduler");
        assert_eq!(pod.app_label(), None);
        pod.metadata.labels = Some(BTreeMap::from([("app".to_string(), "web".to_string())]));
        assert_eq!(pod.app_label(), Some("web"));
    }
}
