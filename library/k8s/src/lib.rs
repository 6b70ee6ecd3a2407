pub mod client;
pub mod errors;
pub mod node_ext;
pub mod pod_ext;
pub mod watch;

pub use node_ext::NodeExt;
pub use pod_ext::PodExt;
pub use watch::PodEvent;

pub use errors::BindError;

use errors::{ApiError, BindSerializationError};
use futures::Stream;
use k8s_openapi::api::core::v1::{Binding, Node, ObjectReference, Pod};
use kube::api::{ListParams, Patch, PatchParams, PostParams};
use kube::{Api, Client};
use result::Result;
use std::collections::BTreeMap;

/// The annotation key the rejection registry persists its cool-down mark under.
pub const REJECTION_ANNOTATION: &str = "scheduler-rejected";

/// Thin facade over the five list/watch/patch/bind operations the placement
/// core depends on. It owns exactly one concern: turning the client library's
/// rich error enum into the `Transient`/`Terminal` classification in
/// [`errors::ApiError`] and assembling the Binding/patch request bodies, so
/// nothing above this module ever touches `kube::Error` or `kube::Api` directly.
#[derive(Clone)]
pub struct Cluster {
    client: Client,
    pods_all: Api<Pod>,
    nodes_all: Api<Node>,
}

impl Cluster {
    pub fn new(client: Client) -> Self {
        Self {
            pods_all: Api::all(client.clone()),
            nodes_all: Api::all(client.clone()),
            client,
        }
    }

    fn pods_in(&self, namespace: &str) -> Api<Pod> {
        Api::namespaced(self.client.clone(), namespace)
    }

    pub async fn list_nodes(&self) -> Result<Vec<Node>> {
        Ok(self
            .nodes_all
            .list(&ListParams::default())
            .await
            .map_err(ApiError::from)?
            .items)
    }

    pub async fn list_pods_all_namespaces(&self) -> Result<Vec<Pod>> {
        Ok(self
            .pods_all
            .list(&ListParams::default())
            .await
            .map_err(ApiError::from)?
            .items)
    }

    /// Opens a single finite watch call. The caller re-invokes this once the
    /// stream ends; no reconnect logic lives here.
    pub async fn watch_pods(
        &self,
        timeout_s: u32,
    ) -> Result<impl Stream<Item = PodEvent> + '_> {
        Ok(watch::watch_pods(&self.pods_all, timeout_s).await?)
    }

    pub async fn patch_annotations(
        &self,
        namespace: &str,
        name: &str,
        annotations: BTreeMap<String, String>,
    ) -> Result<()> {
        let patch = serde_json::json!({ "metadata": { "annotations": annotations } });
        self.pods_in(namespace)
            .patch(name, &PatchParams::default(), &Patch::Merge(patch))
            .await
            .map_err(ApiError::from)?;
        Ok(())
    }

    /// Issues the authoritative Binding. There is no typed `bind()` method on
    /// `Api<Pod>`; a Binding is created by POSTing to the pod's `binding`
    /// subresource, same as the orchestrator's own default scheduler does.
    ///
    /// Returns the typed [`BindError`] rather than the crate-wide boxed
    /// `Result` alias, since the caller needs to ask `is_transient()` of the
    /// failure to decide whether another attempt is worthwhile.
    pub async fn bind(
        &self,
        namespace: &str,
        pod_name: &str,
        node_name: &str,
    ) -> std::result::Result<(), BindError> {
        let binding = Binding {
            metadata: kube::api::ObjectMeta {
                name: Some(pod_name.to_string()),
                namespace: Some(namespace.to_string()),
                ..Default::default()
            },
            target: ObjectReference {
                api_version: Some("v1".to_string()),
                kind: Some("Node".to_string()),
                name: Some(node_name.to_string()),
                ..Default::default()
            },
        };
        let bytes = serde_json::to_vec(&binding)
            .map_err(|cause| BindSerializationError { cause })?;
        let _: Binding = self
            .pods_in(namespace)
            .create_subresource("binding", pod_name, &PostParams::default(), bytes)
            .await
            .map_err(ApiError::from)?;
        Ok(())
    }
}
