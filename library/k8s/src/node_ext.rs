use k8s_openapi::api::core::v1::{Node, Taint};
use kube::ResourceExt;

/// Extension trait answering the questions the node filter asks of a node.
pub trait NodeExt {
    fn node_name(&self) -> String;
    fn env_label(&self) -> Option<&str>;
    fn taints(&self) -> Vec<Taint>;
}

impl NodeExt for Node {
    fn node_name(&self) -> String {
        self.name_any()
    }

    fn env_label(&self) -> Option<&str> {
        self.metadata.labels.as_ref()?.get("env").map(|s| s.as_str())
    }

    fn taints(&self) -> Vec<Taint> {
        self.spec
            .as_ref()
            .and_then(|spec| spec.taints.clone())
            .unwrap_or_default()
    }
}
